//! Object-count aliases kept for quota rules written before the group migration

use crate::error::{QuotaError, Result};
use crate::image::types::{resource_version, IMAGE_STREAMS};
use crate::quota::{GroupResource, GroupVersionResource, RESOURCE_IMAGE_STREAMS};
use std::collections::HashSet;

/// A resource whose object count is also reported under an alias name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasEntry {
    /// Current, group-qualified identity of the counted resource
    pub resource: GroupVersionResource,
    /// Resource name the count is reported under
    pub alias: String,
}

impl AliasEntry {
    pub fn new(resource: GroupVersionResource, alias: impl Into<String>) -> Self {
        Self {
            resource,
            alias: alias.into(),
        }
    }

    pub fn current(&self) -> GroupResource {
        self.resource.group_resource()
    }

    pub fn legacy(&self) -> GroupResource {
        self.current().legacy()
    }
}

/// Immutable, ordered set of alias entries
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasTable {
    entries: Vec<AliasEntry>,
}

impl AliasTable {
    /// Build a table, rejecting empty or duplicate aliases and entries
    /// that are not group-qualified
    pub fn new(entries: Vec<AliasEntry>) -> Result<Self> {
        let mut seen = HashSet::new();

        for entry in &entries {
            if entry.alias.is_empty() {
                return Err(QuotaError::Configuration(format!(
                    "empty alias for {}",
                    entry.resource
                )));
            }
            if entry.resource.group_resource().is_legacy() {
                return Err(QuotaError::Configuration(format!(
                    "alias {} must name a group-qualified resource, got {}",
                    entry.alias, entry.resource
                )));
            }
            if !seen.insert(entry.alias.as_str()) {
                return Err(QuotaError::DuplicateAlias {
                    alias: entry.alias.clone(),
                });
            }
        }

        Ok(Self { entries })
    }

    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &AliasEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Find the entry for a resource, in either its current or legacy form
    pub fn lookup(&self, group_resource: &GroupResource) -> Option<&AliasEntry> {
        self.entries
            .iter()
            .find(|e| &e.current() == group_resource || &e.legacy() == group_resource)
    }
}

impl Default for AliasTable {
    /// Image streams, counted as `openshift.io/imagestreams`
    fn default() -> Self {
        Self {
            entries: vec![AliasEntry::new(
                resource_version(IMAGE_STREAMS),
                RESOURCE_IMAGE_STREAMS,
            )],
        }
    }
}

impl<'a> IntoIterator for &'a AliasTable {
    type Item = &'a AliasEntry;
    type IntoIter = std::slice::Iter<'a, AliasEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
