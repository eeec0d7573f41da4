//! Quota evaluators for image streams and the virtual resources that create them
//!
//! The evaluators built here are handed to the resource quota controller
//! (replenishment) and to the quota admission plugin. Admission has to accept
//! every form of a resource, legacy and group-qualified, while reconciliation
//! only ever sees the group-qualified one.

pub mod aliases;
pub mod imagestreamimport;
pub mod imagestreamtag;
pub mod registry;
pub mod types;

pub use aliases::{AliasEntry, AliasTable};
pub use imagestreamimport::ImageStreamImportEvaluator;
pub use imagestreamtag::ImageStreamTagEvaluator;
pub use registry::{
    build_evaluators, new_evaluators_for_admission, new_evaluators_for_admission_with_aliases,
    new_replenishment_evaluators, new_replenishment_evaluators_with_aliases, ConsumerMode,
};
pub use types::{ImageStream, ImageStreamImport, ImageStreamTag};

use crate::error::Result;
use async_trait::async_trait;
use std::fmt::Debug;
use std::sync::Arc;

/// Read access to cached image streams
pub trait ImageStreamLister: Send + Sync + Debug {
    /// Get an image stream, `None` when it does not exist
    fn get(&self, namespace: &str, name: &str) -> Result<Option<ImageStream>>;

    /// All image streams in a namespace
    fn list(&self, namespace: &str) -> Result<Vec<ImageStream>>;
}

/// Source of image stream listers
pub trait ImageStreamInformer {
    fn lister(&self) -> Arc<dyn ImageStreamLister>;
}

/// Reads image stream tags from the API
#[async_trait]
pub trait ImageStreamTagsGetter: Send + Sync + Debug {
    /// Get an image stream tag by `<stream>:<tag>` name, `None` when it does not exist
    async fn get(&self, namespace: &str, name: &str) -> Result<Option<ImageStreamTag>>;
}
