//! Error types for imagequota

use crate::quota::GroupResource;
use thiserror::Error;

/// Main error type for imagequota
#[derive(Debug, Error)]
pub enum QuotaError {
    #[error("Kubernetes API error: {0}")]
    Kube(#[from] kube::Error),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Duplicate quota alias: {alias}")]
    DuplicateAlias { alias: String },

    #[error("No lister available for {0}")]
    ListerUnavailable(GroupResource),

    #[error("No lister registered for resource {0}")]
    UnknownResource(String),

    #[error("Lister failed for {resource}: {message}")]
    Lister { resource: String, message: String },

    #[error("Invalid object: {0}")]
    InvalidObject(String),

    #[error("Invalid quantity: {0}")]
    InvalidQuantity(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl QuotaError {
    /// Whether this error is a static configuration defect rather than a
    /// failure of a collaborator at evaluation time
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            QuotaError::Configuration(_) | QuotaError::DuplicateAlias { .. }
        )
    }
}

impl From<serde_json::Error> for QuotaError {
    fn from(e: serde_json::Error) -> Self {
        QuotaError::Serialization(e.to_string())
    }
}

impl From<toml::de::Error> for QuotaError {
    fn from(e: toml::de::Error) -> Self {
        QuotaError::Configuration(e.to_string())
    }
}

/// Result type alias for imagequota
pub type Result<T> = std::result::Result<T, QuotaError>;
