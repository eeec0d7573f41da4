//! Core traits for quota evaluators

use crate::error::Result;
use crate::quota::identity::GroupResource;
use crate::quota::resources::ResourceList;
use async_trait::async_trait;
use k8s_openapi::api::core::v1::ResourceQuota;
use kube::core::DynamicObject;
use std::fmt::Debug;
use std::sync::Arc;

/// Admission operation being checked
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Create,
    Update,
    Delete,
    Connect,
}

/// The parts of an admission request an evaluator inspects
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attributes {
    pub operation: Operation,
    pub resource: GroupResource,
    pub subresource: Option<String>,
    pub namespace: Option<String>,
}

impl Attributes {
    pub fn new(operation: Operation, resource: GroupResource) -> Self {
        Self {
            operation,
            resource,
            subresource: None,
            namespace: None,
        }
    }

    pub fn in_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }
}

/// Options for computing aggregate usage of a namespace
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UsageStatsOptions {
    /// Namespace to compute usage for
    pub namespace: String,
    /// Restrict the result to these resource names (all tracked names when empty)
    pub resources: Vec<String>,
}

impl UsageStatsOptions {
    pub fn for_namespace(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            resources: Vec::new(),
        }
    }
}

/// Aggregate usage of a namespace
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UsageStats {
    pub used: ResourceList,
}

/// Computes resource consumption for one resource kind and decides whether
/// that usage counts toward a given quota
#[async_trait]
pub trait Evaluator: Send + Sync + Debug {
    /// The identity this evaluator is registered under
    fn group_resource(&self) -> GroupResource;

    /// Whether this evaluator owns the admission operation
    fn handles(&self, attributes: &Attributes) -> bool;

    /// Whether usage of `item` counts toward `quota`
    async fn matches(&self, quota: &ResourceQuota, item: &DynamicObject) -> Result<bool>;

    /// The subset of `input` this evaluator reports usage for
    fn matching_resources(&self, input: &[String]) -> Vec<String>;

    /// Resources consumed by a single object
    async fn usage(&self, item: &DynamicObject) -> Result<ResourceList>;

    /// Resources consumed by all objects in a namespace
    async fn usage_stats(&self, options: &UsageStatsOptions) -> Result<UsageStats>;

    /// The evaluator doing the work when this one only re-addresses it
    fn wrapped(&self) -> Option<&Arc<dyn Evaluator>> {
        None
    }
}
