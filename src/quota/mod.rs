//! Quota evaluator contract and the generic building blocks registries are made of

pub mod generic;
pub mod identity;
pub mod legacy;
pub mod registry;
pub mod resources;
pub mod traits;

pub use generic::{
    list_resource_using_lister_func, GenericLister, ListFuncByNamespace, ListerForResourceFunc,
    ObjectCountEvaluator,
};
pub use identity::{GroupResource, GroupVersionResource, LEGACY_GROUP};
pub use legacy::LegacyResourceEvaluator;
pub use registry::Registry;
pub use resources::{ResourceList, RESOURCE_IMAGE_STREAMS};
pub use traits::*;
