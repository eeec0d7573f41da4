//! Tests for src/image/registry.rs - replenishment and admission registries

use crate::common::*;
use imagequota::cache::ImageStreamCache;
use imagequota::error::QuotaError;
use imagequota::image::types::{self, resource_version};
use imagequota::image::{
    build_evaluators, new_evaluators_for_admission, new_evaluators_for_admission_with_aliases,
    new_replenishment_evaluators, new_replenishment_evaluators_with_aliases, AliasEntry,
    AliasTable, ConsumerMode, ImageStream,
};
use imagequota::quota::{
    Attributes, GroupResource, Operation, Registry, UsageStatsOptions, RESOURCE_IMAGE_STREAMS,
};
use std::sync::Arc;

fn replenishment(cache: &ImageStreamCache) -> Registry {
    new_replenishment_evaluators(
        cache.lister_for_resource(),
        cache,
        Arc::new(FakeImageStreamTags::new()),
    )
}

fn admission(cache: &ImageStreamCache) -> Registry {
    new_evaluators_for_admission(cache, Arc::new(FakeImageStreamTags::new()))
}

fn two_alias_table() -> AliasTable {
    AliasTable::new(vec![
        AliasEntry::new(resource_version("imagestreams"), RESOURCE_IMAGE_STREAMS),
        AliasEntry::new(resource_version("images"), "openshift.io/images"),
    ])
    .unwrap()
}

fn current(resource: &str) -> GroupResource {
    types::resource(resource)
}

fn legacy(resource: &str) -> GroupResource {
    GroupResource::legacy_resource(resource)
}

// ============================================================================
// Registry layout
// ============================================================================

#[test]
fn test_replenishment_registry_order() {
    init_tracing();
    let registry = replenishment(&ImageStreamCache::new());

    assert_eq!(
        registry.group_resources(),
        vec![
            current("imagestreamtags"),
            current("imagestreamimports"),
            current("imagestreams"),
        ]
    );
}

#[test]
fn test_admission_registry_order() {
    let registry = admission(&ImageStreamCache::new());

    assert_eq!(
        registry.group_resources(),
        vec![
            current("imagestreamtags"),
            current("imagestreamimports"),
            legacy("imagestreamtags"),
            legacy("imagestreamimports"),
            current("imagestreams"),
            legacy("imagestreams"),
        ]
    );
}

#[test]
fn test_replenishment_never_registers_legacy_identity() {
    let registry = new_replenishment_evaluators_with_aliases(
        &two_alias_table(),
        ImageStreamCache::new().lister_for_resource(),
        &ImageStreamCache::new(),
        Arc::new(FakeImageStreamTags::new()),
    );

    assert!(registry.iter().all(|e| !e.group_resource().is_legacy()));
}

#[test]
fn test_admission_resolves_every_identity_form() {
    let registry = admission(&ImageStreamCache::new());

    for resource in ["imagestreams", "imagestreamtags", "imagestreamimports"] {
        assert!(registry.get(&current(resource)).is_some(), "missing {resource}");
        assert!(registry.get(&legacy(resource)).is_some(), "missing legacy {resource}");
    }
}

#[test]
fn test_admission_registers_each_specialized_evaluator_exactly_twice() {
    let registry = admission(&ImageStreamCache::new());

    for resource in ["imagestreamtags", "imagestreamimports"] {
        assert_eq!(registry.all_for(&current(resource)).len(), 1);
        assert_eq!(registry.all_for(&legacy(resource)).len(), 1);
    }
}

#[test]
fn test_identities_are_unique_within_a_registry() {
    let table = two_alias_table();
    let cache = ImageStreamCache::new();

    for mode in [ConsumerMode::Replenishment, ConsumerMode::Admission] {
        let registry = build_evaluators(
            mode,
            &table,
            Some(cache.lister_for_resource()),
            &cache,
            Arc::new(FakeImageStreamTags::new()),
        );
        let mut identities = registry.group_resources();
        let total = identities.len();
        identities.sort();
        identities.dedup();
        assert_eq!(identities.len(), total, "duplicate identity in {mode:?}");
    }
}

#[test]
fn test_empty_alias_table_yields_only_specialized_evaluators() {
    let cache = ImageStreamCache::new();
    let client = Arc::new(FakeImageStreamTags::new());

    let replenishment = new_replenishment_evaluators_with_aliases(
        &AliasTable::empty(),
        cache.lister_for_resource(),
        &cache,
        client.clone(),
    );
    assert_eq!(replenishment.len(), 2);

    let admission = new_evaluators_for_admission_with_aliases(&AliasTable::empty(), &cache, client);
    assert_eq!(admission.len(), 4);
}

#[test]
fn test_consumer_mode_legacy_registration() {
    assert!(ConsumerMode::Admission.registers_legacy());
    assert!(!ConsumerMode::Replenishment.registers_legacy());
}

// ============================================================================
// Alias count evaluators
// ============================================================================

#[tokio::test]
async fn test_every_alias_has_count_evaluators_in_both_registries() {
    let table = two_alias_table();
    let cache = ImageStreamCache::new();
    let client = Arc::new(FakeImageStreamTags::new());

    let replenishment = new_replenishment_evaluators_with_aliases(
        &table,
        cache.lister_for_resource(),
        &cache,
        client.clone(),
    );
    let admission = new_evaluators_for_admission_with_aliases(&table, &cache, client);
    let item = image_stream_object("dev", "ruby");

    for entry in &table {
        let expected = resource_list(&[(entry.alias.as_str(), 1)]);

        let evaluator = replenishment.get(&entry.current()).unwrap();
        assert_eq!(evaluator.usage(&item).await.unwrap(), expected);
        assert!(replenishment.get(&entry.legacy()).is_none());

        for identity in [entry.current(), entry.legacy()] {
            let evaluator = admission.get(&identity).unwrap();
            assert_eq!(evaluator.usage(&item).await.unwrap(), expected);
        }
    }
}

#[tokio::test]
async fn test_admission_counts_image_streams_under_both_identities() {
    let registry = admission(&ImageStreamCache::new());
    let item = image_stream_object("dev", "ruby");
    let expected = resource_list(&[(RESOURCE_IMAGE_STREAMS, 1)]);

    let counters: Vec<_> = registry
        .iter()
        .filter(|e| e.group_resource().resource == "imagestreams")
        .collect();
    assert_eq!(counters.len(), 2);

    let grouped = registry.get(&current("imagestreams")).unwrap();
    let ungrouped = registry.get(&legacy("imagestreams")).unwrap();
    assert_eq!(grouped.group_resource().group, types::GROUP);
    assert_eq!(ungrouped.group_resource().group, "");

    assert_eq!(grouped.usage(&item).await.unwrap(), expected);
    assert_eq!(ungrouped.usage(&item).await.unwrap(), expected);
}

#[test]
fn test_replenishment_counts_image_streams_once() {
    let registry = replenishment(&ImageStreamCache::new());

    let counters: Vec<_> = registry
        .iter()
        .filter(|e| e.group_resource().resource == "imagestreams")
        .collect();
    assert_eq!(counters.len(), 1);
    assert_eq!(counters[0].group_resource(), current("imagestreams"));
}

#[tokio::test]
async fn test_admission_count_evaluators_compute_usage_from_the_object() {
    let cache = ImageStreamCache::new();
    let registry = admission(&cache);
    let item = image_stream_object("dev", "ruby");

    // No lister is involved: the stream is not cached anywhere.
    for identity in [current("imagestreams"), legacy("imagestreams")] {
        let evaluator = registry.get(&identity).unwrap();
        assert_eq!(
            evaluator.usage(&item).await.unwrap(),
            resource_list(&[(RESOURCE_IMAGE_STREAMS, 1)])
        );
    }
}

#[tokio::test]
async fn test_admission_count_evaluators_refuse_namespace_usage() {
    let cache = ImageStreamCache::new();
    cache.upsert(ImageStream::new("dev", "ruby"));
    let registry = admission(&cache);

    for identity in [current("imagestreams"), legacy("imagestreams")] {
        let err = registry
            .get(&identity)
            .unwrap()
            .usage_stats(&UsageStatsOptions::for_namespace("dev"))
            .await
            .unwrap_err();
        assert!(matches!(err, QuotaError::ListerUnavailable(_)));
    }
}

#[tokio::test]
async fn test_replenishment_count_evaluator_lists_through_lister_func() {
    let cache = ImageStreamCache::new();
    cache.upsert(ImageStream::new("dev", "ruby"));
    cache.upsert(ImageStream::new("dev", "nginx"));
    cache.upsert(ImageStream::new("prod", "python"));
    let registry = replenishment(&cache);

    let evaluator = registry.get(&current("imagestreams")).unwrap();
    let stats = evaluator
        .usage_stats(&UsageStatsOptions::for_namespace("dev"))
        .await
        .unwrap();
    assert_eq!(stats.used, resource_list(&[(RESOURCE_IMAGE_STREAMS, 2)]));

    // Streams added after the build are seen: the lister is resolved per call.
    cache.upsert(ImageStream::new("dev", "golang"));
    let stats = evaluator
        .usage_stats(&UsageStatsOptions::for_namespace("dev"))
        .await
        .unwrap();
    assert_eq!(stats.used, resource_list(&[(RESOURCE_IMAGE_STREAMS, 3)]));
}

#[tokio::test]
async fn test_replenishment_propagates_lister_factory_errors() {
    let cache = ImageStreamCache::new();
    let registry = new_replenishment_evaluators(
        failing_lister_for(),
        &cache,
        Arc::new(FakeImageStreamTags::new()),
    );

    let err = registry
        .get(&current("imagestreams"))
        .unwrap()
        .usage_stats(&UsageStatsOptions::for_namespace("dev"))
        .await
        .unwrap_err();
    assert!(matches!(err, QuotaError::UnknownResource(_)));
}

// ============================================================================
// Specialized evaluators under both identities
// ============================================================================

#[tokio::test]
async fn test_legacy_and_current_tag_evaluators_report_identical_usage() {
    let cache = ImageStreamCache::new();
    cache.upsert(ImageStream::new("dev", "ruby"));
    let registry = admission(&cache);

    let grouped = registry.get(&current("imagestreamtags")).unwrap();
    let ungrouped = registry.get(&legacy("imagestreamtags")).unwrap();

    for item in [
        image_stream_tag_object("dev", "ruby:latest"),
        image_stream_tag_object("dev", "python:3.12"),
    ] {
        assert_eq!(
            grouped.usage(&item).await.unwrap(),
            ungrouped.usage(&item).await.unwrap()
        );
    }
}

#[tokio::test]
async fn test_legacy_and_current_import_evaluators_report_identical_usage() {
    let cache = ImageStreamCache::new();
    cache.upsert(ImageStream::new("dev", "ruby"));
    let registry = admission(&cache);

    let grouped = registry.get(&current("imagestreamimports")).unwrap();
    let ungrouped = registry.get(&legacy("imagestreamimports")).unwrap();

    for item in [
        image_stream_import_object("dev", "ruby", true),
        image_stream_import_object("dev", "python", true),
        image_stream_import_object("dev", "python", false),
    ] {
        assert_eq!(
            grouped.usage(&item).await.unwrap(),
            ungrouped.usage(&item).await.unwrap()
        );
    }
}

#[test]
fn test_legacy_entries_handle_the_same_operations() {
    let registry = admission(&ImageStreamCache::new());

    for resource in ["imagestreamtags", "imagestreamimports", "imagestreams"] {
        let grouped = registry.get(&current(resource)).unwrap();
        let ungrouped = registry.get(&legacy(resource)).unwrap();
        for op in [
            Operation::Create,
            Operation::Update,
            Operation::Delete,
            Operation::Connect,
        ] {
            let attrs = Attributes::new(op, current(resource));
            assert_eq!(grouped.handles(&attrs), ungrouped.handles(&attrs));
        }
    }
}

#[test]
fn test_registries_are_built_fresh() {
    let cache = ImageStreamCache::new();
    let first = admission(&cache);
    let second = admission(&cache);

    for (a, b) in first.iter().zip(second.iter()) {
        assert!(!Arc::ptr_eq(a, b));
    }
}

#[tokio::test]
async fn test_lister_failures_surface_under_both_identities() {
    let registry = new_evaluators_for_admission(&FailingInformer, Arc::new(FakeImageStreamTags::new()));
    let tag = image_stream_tag_object("dev", "ruby:latest");
    let import = image_stream_import_object("dev", "ruby", true);

    for identity in [current("imagestreamtags"), legacy("imagestreamtags")] {
        let err = registry.get(&identity).unwrap().usage(&tag).await.unwrap_err();
        assert!(matches!(err, QuotaError::Lister { .. }));
    }
    for identity in [current("imagestreamimports"), legacy("imagestreamimports")] {
        let err = registry.get(&identity).unwrap().usage(&import).await.unwrap_err();
        assert!(matches!(err, QuotaError::Lister { .. }));
    }
}

#[test]
fn test_admission_legacy_entries_share_the_current_instance() {
    let registry = admission(&ImageStreamCache::new());

    for resource in ["imagestreamtags", "imagestreamimports"] {
        let grouped = registry.get(&current(resource)).unwrap();
        let ungrouped = registry.get(&legacy(resource)).unwrap();

        assert!(grouped.wrapped().is_none());
        let delegate = ungrouped.wrapped().expect("legacy entry wraps an evaluator");
        assert!(Arc::ptr_eq(delegate, grouped), "{resource} was constructed twice");
    }

    // Count evaluators are built per identity, not wrapped.
    assert!(registry.get(&legacy("imagestreams")).unwrap().wrapped().is_none());
}
