//! Usage of image streams created implicitly by image stream tags

use crate::error::Result;
use crate::image::types::{self, from_dynamic, ImageStreamTag, IMAGE_STREAM_TAGS};
use crate::image::{ImageStreamLister, ImageStreamTagsGetter};
use crate::quota::generic::matches_unscoped;
use crate::quota::resources::{self, hard_resource_names, ResourceList, RESOURCE_IMAGE_STREAMS};
use crate::quota::{Attributes, Evaluator, GroupResource, Operation, UsageStats, UsageStatsOptions};
use async_trait::async_trait;
use k8s_openapi::api::core::v1::ResourceQuota;
use kube::core::DynamicObject;
use std::sync::Arc;

/// Creating or updating a tag on a stream that does not exist yet creates
/// the stream, which consumes one `openshift.io/imagestreams`
#[derive(Debug, Clone)]
pub struct ImageStreamTagEvaluator {
    lister: Arc<dyn ImageStreamLister>,
    client: Arc<dyn ImageStreamTagsGetter>,
}

impl ImageStreamTagEvaluator {
    pub fn new(lister: Arc<dyn ImageStreamLister>, client: Arc<dyn ImageStreamTagsGetter>) -> Self {
        Self { lister, client }
    }
}

#[async_trait]
impl Evaluator for ImageStreamTagEvaluator {
    fn group_resource(&self) -> GroupResource {
        types::resource(IMAGE_STREAM_TAGS)
    }

    fn handles(&self, attributes: &Attributes) -> bool {
        matches!(attributes.operation, Operation::Create | Operation::Update)
    }

    async fn matches(&self, quota: &ResourceQuota, _item: &DynamicObject) -> Result<bool> {
        let matching = self.matching_resources(&hard_resource_names(quota));
        Ok(matches_unscoped(quota, &matching))
    }

    fn matching_resources(&self, input: &[String]) -> Vec<String> {
        resources::intersection(input, &[RESOURCE_IMAGE_STREAMS])
    }

    async fn usage(&self, item: &DynamicObject) -> Result<ResourceList> {
        let istag: ImageStreamTag = from_dynamic(item)?;
        let name = istag.metadata.name.as_deref().unwrap_or_default();
        let namespace = istag.metadata.namespace.as_deref().unwrap_or_default();
        let (stream, _) = types::parse_image_stream_tag_name(name)?;

        if self.lister.get(namespace, &stream)?.is_some() {
            return Ok(ResourceList::new());
        }

        // The cache may lag behind the API; an existing tag implies an existing stream.
        tracing::warn!(namespace, name, "image stream not cached, checking tag");
        if self.client.get(namespace, name).await?.is_some() {
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
