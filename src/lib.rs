//! imagequota - quota evaluator registries for image stream resources

pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod image;
pub mod logging;
pub mod quota;
