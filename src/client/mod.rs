//! Kubernetes client abstraction

use crate::config::QuotaConfig;
use crate::error::{QuotaError, Result};
use crate::image::types::{self, from_dynamic, ImageStreamTag};
use crate::image::ImageStreamTagsGetter;
use async_trait::async_trait;
use kube::config::KubeConfigOptions;
use kube::core::DynamicObject;
use kube::{Api, Client, Config};

/// Create a Kubernetes client for the specified context
pub async fn create_client(context: Option<&str>) -> Result<Client> {
    let config = load_config(context).await?;
    Client::try_from(config).map_err(QuotaError::from)
}

/// Create a Kubernetes client for the context named in the imagequota config,
/// or the kubeconfig's current context
pub async fn create_client_from_config(config: &QuotaConfig) -> Result<Client> {
    create_client(config.context.as_deref()).await
}

/// Load Kubernetes configuration
async fn load_config(context: Option<&str>) -> Result<Config> {
    let options = KubeConfigOptions {
        context: context.map(String::from),
        ..Default::default()
    };

    Config::from_kubeconfig(&options)
        .await
        .map_err(|e| QuotaError::Configuration(format!("Failed to load kubeconfig: {e}")))
}

/// Image stream tag reads through the API server
#[derive(Clone)]
pub struct KubeImageStreamTags {
    client: Client,
}

impl KubeImageStreamTags {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

impl std::fmt::Debug for KubeImageStreamTags {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KubeImageStreamTags").finish_non_exhaustive()
    }
}

#[async_trait]
impl ImageStreamTagsGetter for KubeImageStreamTags {
    async fn get(&self, namespace: &str, name: &str) -> Result<Option<ImageStreamTag>> {
        let api: Api<DynamicObject> = Api::namespaced_with(
            self.client.clone(),
            namespace,
            &types::image_stream_tag_api_resource(),
        );

        match api.get_opt(name).await? {
            Some(obj) => Ok(Some(from_dynamic(&obj)?)),
            None => Ok(None),
        }
    }
}
