//! Generic object-count evaluator

use crate::error::{QuotaError, Result};
use crate::quota::identity::{GroupResource, GroupVersionResource};
use crate::quota::resources::{self, ResourceList};
use crate::quota::traits::{Attributes, Evaluator, Operation, UsageStats, UsageStatsOptions};
use async_trait::async_trait;
use k8s_openapi::api::core::v1::ResourceQuota;
use kube::core::DynamicObject;
use std::fmt;
use std::sync::Arc;

/// Lists cached objects of one resource type
pub trait GenericLister: Send + Sync {
    fn list(&self, namespace: &str) -> Result<Vec<DynamicObject>>;
}

/// Produces the lister for a resource type
pub type ListerForResourceFunc =
    Arc<dyn Fn(&GroupVersionResource) -> Result<Arc<dyn GenericLister>> + Send + Sync>;

/// Lists the objects of a fixed resource type in a namespace
pub type ListFuncByNamespace = Arc<dyn Fn(&str) -> Result<Vec<DynamicObject>> + Send + Sync>;

/// Bind a lister factory to a resource type.
///
/// The lister is resolved on every call, so a factory that cannot serve the
/// resource fails at listing time with its own error. Returns `None` when no
/// factory is supplied.
pub fn list_resource_using_lister_func(
    lister_for: Option<ListerForResourceFunc>,
    resource: GroupVersionResource,
) -> Option<ListFuncByNamespace> {
    let lister_for = lister_for?;
    let list_func: ListFuncByNamespace = Arc::new(move |namespace: &str| {
        let lister = lister_for(&resource)?;
        lister.list(namespace)
    });
    Some(list_func)
}

/// Whether a quota covers at least one resource from `matching` and every
/// one of its scopes. Evaluators built here match no scope.
pub fn matches_unscoped(quota: &ResourceQuota, matching: &[String]) -> bool {
    !matching.is_empty() && resources::quota_scope_count(quota) == 0
}

/// Reports one unit of usage per object under an alias resource name
pub struct ObjectCountEvaluator {
    group_resource: GroupResource,
    list_func: Option<ListFuncByNamespace>,
    alias: String,
}

impl ObjectCountEvaluator {
    pub fn new(
        group_resource: GroupResource,
        list_func: Option<ListFuncByNamespace>,
        alias: impl Into<String>,
    ) -> Self {
        Self {
            group_resource,
            list_func,
            alias: alias.into(),
        }
    }

    /// The resource name usage is reported under
    pub fn alias(&self) -> &str {
        &self.alias
    }

    pub fn has_lister(&self) -> bool {
        self.list_func.is_some()
    }
}

impl fmt::Debug for ObjectCountEvaluator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectCountEvaluator")
            .field("group_resource", &self.group_resource)
            .field("alias", &self.alias)
            .field("has_lister", &self.has_lister())
            .finish()
    }
}

#[async_trait]
impl Evaluator for ObjectCountEvaluator {
    fn group_resource(&self) -> GroupResource {
        self.group_resource.clone()
    }

    fn handles(&self, attributes: &Attributes) -> bool {
        attributes.operation == Operation::Create
    }

    async fn matches(&self, quota: &ResourceQuota, _item: &DynamicObject) -> Result<bool> {
        let matching = self.matching_resources(&resources::hard_resource_names(quota));
        Ok(matches_unscoped(quota, &matching))
    }

    fn matching_resources(&self, input: &[String]) -> Vec<String> {
        resources::intersection(input, &[self.alias.as_str()])
    }

    async fn usage(&self, _item: &DynamicObject) -> Result<ResourceList> {
        Ok(ResourceList::from([(self.alias.clone(), resources::count(1))]))
    }

    async fn usage_stats(&self, options: &UsageStatsOptions) -> Result<UsageStats> {
        let list_func = self
            .list_func
            .as_ref()
            .ok_or_else(|| QuotaError::ListerUnavailable(self.group_resource.clone()))?;

        let items = list_func(options.namespace.as_str())?;

        let mut used = ResourceList::from([(self.alias.clone(), resources::count(0))]);
        for item in &items {
            used = resources::add(&used, &self.usage(item).await?)?;
        }

        if !options.resources.is_empty() {
            used = resources::mask(used, &options.resources);
        }

        tracing::trace!(
            resource = %self.group_resource,
            namespace = %options.namespace,
            objects = items.len(),
            "computed object count usage"
        );

        Ok(UsageStats { used })
    }
}
