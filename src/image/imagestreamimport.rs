//! Usage of image streams created by persisted imports

use crate::error::Result;
use crate::image::types::{self, from_dynamic, ImageStreamImport, IMAGE_STREAM_IMPORTS};
use crate::image::ImageStreamLister;
use crate::quota::generic::matches_unscoped;
use crate::quota::resources::{self, hard_resource_names, ResourceList, RESOURCE_IMAGE_STREAMS};
use crate::quota::{Attributes, Evaluator, GroupResource, Operation, UsageStats, UsageStatsOptions};
use async_trait::async_trait;
use k8s_openapi::api::core::v1::ResourceQuota;
use kube::core::DynamicObject;
use std::sync::Arc;

/// An import with `spec.import` set into a stream that does not exist yet
/// creates the stream
#[derive(Debug, Clone)]
pub struct ImageStreamImportEvaluator {
    lister: Arc<dyn ImageStreamLister>,
}

impl ImageStreamImportEvaluator {
    pub fn new(lister: Arc<dyn ImageStreamLister>) -> Self {
        Self { lister }
    }
}

#[async_trait]
impl Evaluator for ImageStreamImportEvaluator {
    fn group_resource(&self) -> GroupResource {
        types::resource(IMAGE_STREAM_IMPORTS)
    }

    fn handles(&self, attributes: &Attributes) -> bool {
        attributes.operation == Operation::Create
    }

    async fn matches(&self, quota: &ResourceQuota, _item: &DynamicObject) -> Result<bool> {
        let matching = self.matching_resources(&hard_resource_names(quota));
        Ok(matches_unscoped(quota, &matching))
    }

    fn matching_resources(&self, input: &[String]) -> Vec<String> {
        resources::intersection(input, &[RESOURCE_IMAGE_STREAMS])
    }

    async fn usage(&self, item: &DynamicObject) -> Result<ResourceList> {
        let isi: ImageStreamImport = from_dynamic(item)?;
        if !isi.spec.import {
            return Ok(ResourceList::new());
        }

        let name = isi.metadata.name.as_deref().unwrap_or_default();
        let namespace = isi.metadata.namespace.as_deref().unwrap_or_default();

        if self.lister.get(namespace, name)?.is_some() {
            return Ok(ResourceList::new());
        }

        Ok(ResourceList::from([(
            RESOURCE_IMAGE_STREAMS.to_string(),
            resources::count(1),
        )]))
    }

    async fn usage_stats(&self, _options: &UsageStatsOptions) -> Result<UsageStats> {
        Ok(UsageStats::default())
    }
}
