//! Configuration for imagequota

use crate::error::{QuotaError, Result};
use crate::image::{AliasEntry, AliasTable};
use crate::quota::GroupVersionResource;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Configuration stored in ~/.imagequota/config.toml
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QuotaConfig {
    /// Kubeconfig context used to reach the cluster
    #[serde(default)]
    pub context: Option<String>,

    /// Image stream cache TTL in seconds
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl: u64,

    /// Replaces the built-in alias table when present
    #[serde(default)]
    pub aliases: Option<Vec<AliasConfig>>,
}

impl Default for QuotaConfig {
    fn default() -> Self {
        Self {
            context: None,
            cache_ttl: default_cache_ttl(),
            aliases: None,
        }
    }
}

fn default_cache_ttl() -> u64 {
    30
}

/// One `[[aliases]]` entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AliasConfig {
    pub group: String,
    #[serde(default = "default_version")]
    pub version: String,
    pub resource: String,
    pub alias: String,
}

fn default_version() -> String {
    "v1".to_string()
}

impl QuotaConfig {
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl)
    }

    /// The configured alias table, or the built-in one
    pub fn alias_table(&self) -> Result<AliasTable> {
        match &self.aliases {
            None => Ok(AliasTable::default()),
            Some(aliases) => AliasTable::new(
                aliases
                    .iter()
                    .map(|a| {
                        AliasEntry::new(
                            GroupVersionResource::new(&a.group, &a.version, &a.resource),
                            &a.alias,
                        )
                    })
                    .collect(),
            ),
        }
    }
}

/// Get the config directory (~/.imagequota)
pub fn config_dir() -> Result<PathBuf> {
    dirs::home_dir()
        .map(|h| h.join(".imagequota"))
        .ok_or_else(|| QuotaError::Configuration("Could not determine home directory".to_string()))
}

/// Load config from ~/.imagequota/config.toml
pub fn load_config() -> Result<QuotaConfig> {
    load_config_from(&config_dir()?.join("config.toml"))
}

/// Load config from a file, defaults when it does not exist
pub fn load_config_from(path: &Path) -> Result<QuotaConfig> {
    if path.exists() {
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    } else {
        Ok(QuotaConfig::default())
    }
}
