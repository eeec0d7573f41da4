//! Evaluators addressed by their pre-migration, ungrouped identity

use crate::error::Result;
use crate::quota::identity::GroupResource;
use crate::quota::resources::ResourceList;
use crate::quota::traits::{Attributes, Evaluator, UsageStats, UsageStatsOptions};
use async_trait::async_trait;
use k8s_openapi::api::core::v1::ResourceQuota;
use kube::core::DynamicObject;
use std::sync::Arc;

/// Registers an existing evaluator under a legacy identity.
///
/// Only `group_resource` differs from the delegate; the wrapped evaluator
/// still does all of the work.
#[derive(Debug, Clone)]
pub struct LegacyResourceEvaluator {
    delegate: Arc<dyn Evaluator>,
    legacy: GroupResource,
}

impl LegacyResourceEvaluator {
    pub fn new(delegate: Arc<dyn Evaluator>, legacy: GroupResource) -> Self {
        Self { delegate, legacy }
    }

    /// Wrap `delegate` under the ungrouped form of its own identity
    pub fn for_delegate(delegate: Arc<dyn Evaluator>) -> Self {
        let legacy = delegate.group_resource().legacy();
        Self::new(delegate, legacy)
    }

    pub fn delegate(&self) -> &Arc<dyn Evaluator> {
        &self.delegate
    }
}

#[async_trait]
impl Evaluator for LegacyResourceEvaluator {
    fn group_resource(&self) -> GroupResource {
        self.legacy.clone()
    }

    fn handles(&self, attributes: &Attributes) -> bool {
        self.delegate.handles(attributes)
    }

    async fn matches(&self, quota: &ResourceQuota, item: &DynamicObject) -> Result<bool> {
        self.delegate.matches(quota, item).await
    }

    fn matching_resources(&self, input: &[String]) -> Vec<String> {
        self.delegate.matching_resources(input)
    }

    async fn usage(&self, item: &DynamicObject) -> Result<ResourceList> {
        self.delegate.usage(item).await
    }

    async fn usage_stats(&self, options: &UsageStatsOptions) -> Result<UsageStats> {
        self.delegate.usage_stats(options).await
    }

    fn wrapped(&self) -> Option<&Arc<dyn Evaluator>> {
        Some(&self.delegate)
    }
}
