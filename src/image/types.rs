//! Image API objects, limited to the fields quota evaluation reads

use crate::error::{QuotaError, Result};
use crate::quota::{GroupResource, GroupVersionResource};
use k8s_openapi::api::core::v1::ObjectReference;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kube::core::{ApiResource, DynamicObject, TypeMeta};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

pub const GROUP: &str = "image.openshift.io";
pub const VERSION: &str = "v1";
pub const API_VERSION: &str = "image.openshift.io/v1";

pub const IMAGE_STREAMS: &str = "imagestreams";
pub const IMAGE_STREAM_TAGS: &str = "imagestreamtags";
pub const IMAGE_STREAM_IMPORTS: &str = "imagestreamimports";

/// Current identity of an image resource
pub fn resource(name: &str) -> GroupResource {
    GroupResource::new(GROUP, name)
}

/// Current identity of an image resource, with version
pub fn resource_version(name: &str) -> GroupVersionResource {
    GroupVersionResource::new(GROUP, VERSION, name)
}

fn api_resource(kind: &str, plural: &str) -> ApiResource {
    ApiResource {
        group: GROUP.to_string(),
        version: VERSION.to_string(),
        api_version: API_VERSION.to_string(),
        kind: kind.to_string(),
        plural: plural.to_string(),
    }
}

pub fn image_stream_api_resource() -> ApiResource {
    api_resource("ImageStream", IMAGE_STREAMS)
}

pub fn image_stream_tag_api_resource() -> ApiResource {
    api_resource("ImageStreamTag", IMAGE_STREAM_TAGS)
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageStream {
    #[serde(default)]
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub spec: ImageStreamSpec,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ImageStreamStatus>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageStreamSpec {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<TagReference>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagReference {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<ObjectReference>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageStreamStatus {
    #[serde(default)]
    pub docker_image_repository: String,
}

impl ImageStream {
    pub fn new(namespace: &str, name: &str) -> Self {
        Self {
            metadata: ObjectMeta {
                name: Some(name.to_string()),
                namespace: Some(namespace.to_string()),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    pub fn name(&self) -> &str {
        self.metadata.name.as_deref().unwrap_or_default()
    }

    pub fn namespace(&self) -> &str {
        self.metadata.namespace.as_deref().unwrap_or_default()
    }

    pub fn to_dynamic(&self) -> Result<DynamicObject> {
        to_dynamic(self, "ImageStream")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageStreamTag {
    #[serde(default)]
    pub metadata: ObjectMeta,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<TagReference>,
}

impl ImageStreamTag {
    pub fn to_dynamic(&self) -> Result<DynamicObject> {
        to_dynamic(self, "ImageStreamTag")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageStreamImport {
    #[serde(default)]
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub spec: ImageStreamImportSpec,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageStreamImportSpec {
    /// Whether the import is persisted into the image stream
    #[serde(default)]
    pub import: bool,
}

impl ImageStreamImport {
    pub fn to_dynamic(&self) -> Result<DynamicObject> {
        to_dynamic(self, "ImageStreamImport")
    }
}

/// Decode a typed image object from its dynamic form
pub fn from_dynamic<T: DeserializeOwned>(obj: &DynamicObject) -> Result<T> {
    let value = serde_json::to_value(obj)?;
    serde_json::from_value(value).map_err(|e| QuotaError::InvalidObject(e.to_string()))
}

fn to_dynamic<T: Serialize>(obj: &T, kind: &str) -> Result<DynamicObject> {
    let mut data = serde_json::to_value(obj)?;
    let metadata = match data.as_object_mut().and_then(|m| m.remove("metadata")) {
        Some(meta) => serde_json::from_value(meta)?,
        None => ObjectMeta::default(),
    };

    Ok(DynamicObject {
        types: Some(TypeMeta {
            api_version: API_VERSION.to_string(),
            kind: kind.to_string(),
        }),
        metadata,
        data,
    })
}

/// Split an image stream tag name of the form `<stream>:<tag>`
pub fn parse_image_stream_tag_name(name: &str) -> Result<(String, String)> {
    if name.contains('@') {
        return Err(QuotaError::InvalidObject(format!(
            "invalid image stream tag name {name:?}: contains an image reference"
        )));
    }

    match name.split(':').collect::<Vec<_>>().as_slice() {
        [stream, tag] if !stream.is_empty() && !tag.is_empty() => {
            Ok((stream.to_string(), tag.to_string()))
        }
        _ => Err(QuotaError::InvalidObject(format!(
            "expected exactly one : delimiter in the image stream tag {name:?}"
        ))),
    }
}
