//! Tests for src/quota/legacy.rs - LegacyResourceEvaluator

use crate::common::*;
use imagequota::cache::ImageStreamCache;
use imagequota::error::QuotaError;
use imagequota::image::types::{self, IMAGE_STREAMS};
use imagequota::image::{ImageStream, ImageStreamImportEvaluator, ImageStreamTagEvaluator};
use imagequota::quota::{
    Attributes, Evaluator, GroupResource, LegacyResourceEvaluator, ObjectCountEvaluator,
    Operation, UsageStatsOptions, RESOURCE_IMAGE_STREAMS,
};
use std::sync::Arc;

fn tag_evaluator(cache: &ImageStreamCache) -> Arc<dyn Evaluator> {
    Arc::new(ImageStreamTagEvaluator::new(
        Arc::new(cache.clone()),
        Arc::new(FakeImageStreamTags::new()),
    ))
}

// ============================================================================
// group_resource tests
// ============================================================================

#[test]
fn test_group_resource_returns_supplied_identity() {
    let delegate = tag_evaluator(&ImageStreamCache::new());
    let supplied = GroupResource::new("old.example.com", "tags");
    let wrapper = LegacyResourceEvaluator::new(delegate.clone(), supplied.clone());

    assert_eq!(wrapper.group_resource(), supplied);
    assert_ne!(wrapper.group_resource(), delegate.group_resource());
}

#[test]
fn test_for_delegate_uses_ungrouped_form() {
    let delegate = tag_evaluator(&ImageStreamCache::new());
    let wrapper = LegacyResourceEvaluator::for_delegate(delegate);

    assert_eq!(
        wrapper.group_resource(),
        GroupResource::legacy_resource("imagestreamtags")
    );
}

#[test]
fn test_delegate_is_shared_not_copied() {
    let delegate = tag_evaluator(&ImageStreamCache::new());
    let wrapper = LegacyResourceEvaluator::for_delegate(delegate.clone());
    assert!(Arc::ptr_eq(wrapper.delegate(), &delegate));
    assert!(Arc::ptr_eq(wrapper.wrapped().unwrap(), &delegate));
}

// ============================================================================
// Forwarding tests
// ============================================================================

#[test]
fn test_handles_is_unchanged() {
    let delegates: Vec<Arc<dyn Evaluator>> = vec![
        tag_evaluator(&ImageStreamCache::new()),
        Arc::new(ImageStreamImportEvaluator::new(Arc::new(ImageStreamCache::new()))),
        Arc::new(ObjectCountEvaluator::new(
            types::resource(IMAGE_STREAMS),
            None,
            RESOURCE_IMAGE_STREAMS,
        )),
    ];

    for delegate in delegates {
        let wrapper = LegacyResourceEvaluator::for_delegate(delegate.clone());
        for op in [
            Operation::Create,
            Operation::Update,
            Operation::Delete,
            Operation::Connect,
        ] {
            let attrs = Attributes::new(op, delegate.group_resource());
            assert_eq!(wrapper.handles(&attrs), delegate.handles(&attrs));
        }
    }
}

#[test]
fn test_matching_resources_is_unchanged() {
    let delegate = tag_evaluator(&ImageStreamCache::new());
    let wrapper = LegacyResourceEvaluator::for_delegate(delegate.clone());

    let inputs = [
        vec![],
        vec![RESOURCE_IMAGE_STREAMS.to_string()],
        vec!["pods".to_string(), RESOURCE_IMAGE_STREAMS.to_string()],
        vec!["pods".to_string()],
    ];
    for input in inputs {
        assert_eq!(
            wrapper.matching_resources(&input),
            delegate.matching_resources(&input)
        );
    }
}

#[tokio::test]
async fn test_matches_is_unchanged() {
    let delegate = tag_evaluator(&ImageStreamCache::new());
    let wrapper = LegacyResourceEvaluator::for_delegate(delegate.clone());
    let item = image_stream_tag_object("dev", "ruby:latest");

    let quotas = [
        quota_with_hard(&[(RESOURCE_IMAGE_STREAMS, 10)]),
        quota_with_hard(&[("pods", 10)]),
        quota_with_hard(&[]),
        scoped_quota(&[(RESOURCE_IMAGE_STREAMS, 10)], &["Terminating"]),
    ];
    for quota in &quotas {
        assert_eq!(
            wrapper.matches(quota, &item).await.unwrap(),
            delegate.matches(quota, &item).await.unwrap()
        );
    }
}

#[tokio::test]
async fn test_usage_is_unchanged() {
    let cache = ImageStreamCache::new();
    cache.upsert(ImageStream::new("dev", "ruby"));
    let delegate = tag_evaluator(&cache);
    let wrapper = LegacyResourceEvaluator::for_delegate(delegate.clone());

    for item in [
        image_stream_tag_object("dev", "ruby:latest"),
        image_stream_tag_object("dev", "nginx:1.27"),
        image_stream_tag_object("prod", "ruby:latest"),
    ] {
        assert_eq!(
            wrapper.usage(&item).await.unwrap(),
            delegate.usage(&item).await.unwrap()
        );
    }
}

#[tokio::test]
async fn test_usage_errors_pass_through() {
    let delegate = tag_evaluator(&ImageStreamCache::new());
    let wrapper = LegacyResourceEvaluator::for_delegate(delegate);

    let err = wrapper
        .usage(&image_stream_tag_object("dev", "no-tag-delimiter"))
        .await
        .unwrap_err();
    assert!(matches!(err, QuotaError::InvalidObject(_)));
}

#[tokio::test]
async fn test_usage_stats_errors_keep_delegate_identity() {
    let current = types::resource(IMAGE_STREAMS);
    let delegate: Arc<dyn Evaluator> = Arc::new(ObjectCountEvaluator::new(
        current.clone(),
        None,
        RESOURCE_IMAGE_STREAMS,
    ));
    let wrapper = LegacyResourceEvaluator::for_delegate(delegate);

    let err = wrapper
        .usage_stats(&UsageStatsOptions::for_namespace("dev"))
        .await
        .unwrap_err();
    match err {
        QuotaError::ListerUnavailable(gr) => assert_eq!(gr, current),
        other => panic!("unexpected error: {other}"),
    }
}
