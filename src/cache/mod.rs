//! In-memory image stream cache serving as the informer for quota evaluators

use crate::config::QuotaConfig;
use crate::error::{QuotaError, Result};
use crate::image::types::{self, from_dynamic, ImageStream, IMAGE_STREAMS};
use crate::image::{ImageStreamInformer, ImageStreamLister};
use crate::quota::{GenericLister, GroupVersionResource, ListerForResourceFunc};
use dashmap::DashMap;
use kube::api::ListParams;
use kube::core::DynamicObject;
use kube::{Api, Client};
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Sync-time key for a cluster-wide sync
const ALL_NAMESPACES: &str = "*";

/// Image streams keyed by `namespace/name`
#[derive(Clone, Default)]
pub struct ImageStreamCache {
    /// DashMap for concurrent access from evaluators and the sync loop
    streams: Arc<DashMap<String, ImageStream>>,
    /// Last successful sync per namespace
    synced_at: Arc<DashMap<String, Instant>>,
    /// How long a sync stays fresh (zero: always stale)
    ttl: Duration,
}

impl ImageStreamCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            ttl,
            ..Self::default()
        }
    }

    pub fn from_config(config: &QuotaConfig) -> Self {
        Self::with_ttl(config.cache_ttl())
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn key(namespace: &str, name: &str) -> String {
        format!("{namespace}/{name}")
    }

    fn sync_key(namespace: Option<&str>) -> &str {
        namespace.unwrap_or(ALL_NAMESPACES)
    }

    /// Whether a namespace (or the whole cluster) was synced within the TTL.
    /// A cluster-wide sync also covers every namespace.
    pub fn is_fresh(&self, namespace: Option<&str>) -> bool {
        let fresh = |key: &str| {
            self.synced_at
                .get(key)
                .is_some_and(|at| at.elapsed() < self.ttl)
        };
        fresh(ALL_NAMESPACES) || namespace.is_some_and(fresh)
    }

    /// Insert or replace an image stream
    pub fn upsert(&self, stream: ImageStream) {
        let key = Self::key(stream.namespace(), stream.name());
        self.streams.insert(key, stream);
    }

    /// Remove an image stream, returning it if it was cached
    pub fn remove(&self, namespace: &str, name: &str) -> Option<ImageStream> {
        self.streams
            .remove(&Self::key(namespace, name))
            .map(|(_, stream)| stream)
    }

    pub fn clear(&self) {
        self.streams.clear();
        self.synced_at.clear();
    }

    pub fn len(&self) -> usize {
        self.streams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.streams.is_empty()
    }

    /// Replace the cached streams of a namespace (or of all namespaces) with
    /// what the API server currently holds. Returns the number of streams loaded.
    pub async fn sync_from_api(&self, client: Client, namespace: Option<&str>) -> Result<usize> {
        let resource = types::image_stream_api_resource();
        let api: Api<DynamicObject> = match namespace {
            Some(ns) => Api::namespaced_with(client, ns, &resource),
            None => Api::all_with(client, &resource),
        };

        let list = api.list(&ListParams::default()).await?;
        let loaded = self.replace_from_objects(namespace, &list.items)?;

        tracing::info!(namespace = namespace.unwrap_or("all"), loaded, "synced image stream cache");
        Ok(loaded)
    }

    /// Sync only when the last sync covering `namespace` is older than the TTL.
    /// Returns `None` when the cached streams were still fresh.
    pub async fn sync_if_stale(
        &self,
        client: Client,
        namespace: Option<&str>,
    ) -> Result<Option<usize>> {
        if self.is_fresh(namespace) {
            tracing::debug!(namespace = namespace.unwrap_or("all"), "image stream cache is fresh");
            return Ok(None);
        }
        self.sync_from_api(client, namespace).await.map(Some)
    }

    /// Replace the cached streams of a namespace (or of all namespaces) with
    /// `objects`. Nothing changes if any object is not an image stream.
    pub fn replace_from_objects(
        &self,
        namespace: Option<&str>,
        objects: &[DynamicObject],
    ) -> Result<usize> {
        let streams = objects
            .iter()
            .map(|obj| {
                from_dynamic::<ImageStream>(obj).map_err(|e| QuotaError::Lister {
                    resource: types::resource(IMAGE_STREAMS).to_string(),
                    message: format!(
                        "cannot cache {}: {e}",
                        obj.metadata.name.as_deref().unwrap_or("<unnamed>")
                    ),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        match namespace {
            Some(ns) => {
                let prefix = format!("{ns}/");
                self.streams.retain(|key, _| !key.starts_with(&prefix));
            }
            None => self.streams.clear(),
        }

        let loaded = streams.len();
        for stream in streams {
            self.upsert(stream);
        }
        self.synced_at
            .insert(Self::sync_key(namespace).to_string(), Instant::now());
        Ok(loaded)
    }

    /// Lister factory for count evaluators. Only image streams are served.
    pub fn lister_for_resource(&self) -> ListerForResourceFunc {
        let cache = self.clone();
        Arc::new(move |resource: &GroupVersionResource| {
            if resource.group == types::GROUP && resource.resource == IMAGE_STREAMS {
                Ok(Arc::new(cache.clone()) as Arc<dyn GenericLister>)
            } else {
                Err(QuotaError::UnknownResource(resource.to_string()))
            }
        })
    }
}

impl fmt::Debug for ImageStreamCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageStreamCache")
            .field("streams", &self.streams.len())
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl ImageStreamLister for ImageStreamCache {
    fn get(&self, namespace: &str, name: &str) -> Result<Option<ImageStream>> {
        Ok(self
            .streams
            .get(&Self::key(namespace, name))
            .map(|entry| entry.value().clone()))
    }

    fn list(&self, namespace: &str) -> Result<Vec<ImageStream>> {
        let mut streams: Vec<ImageStream> = self
            .streams
            .iter()
            .filter(|entry| entry.value().namespace() == namespace)
            .map(|entry| entry.value().clone())
            .collect();
        streams.sort_by(|a, b| a.name().cmp(b.name()));
        Ok(streams)
    }
}

impl GenericLister for ImageStreamCache {
    fn list(&self, namespace: &str) -> Result<Vec<DynamicObject>> {
        ImageStreamLister::list(self, namespace)?
            .iter()
            .map(ImageStream::to_dynamic)
            .collect()
    }
}

impl ImageStreamInformer for ImageStreamCache {
    fn lister(&self) -> Arc<dyn ImageStreamLister> {
        Arc::new(self.clone())
    }
}
