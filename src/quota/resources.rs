//! Resource lists and quantity arithmetic for object counts

use crate::error::{QuotaError, Result};
use k8s_openapi::api::core::v1::ResourceQuota;
use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use std::collections::BTreeMap;

/// Resource name to consumed quantity
pub type ResourceList = BTreeMap<String, Quantity>;

/// Quota resource name counting image streams
pub const RESOURCE_IMAGE_STREAMS: &str = "openshift.io/imagestreams";

/// Quantity for a whole number of objects
pub fn count(n: i64) -> Quantity {
    Quantity(n.to_string())
}

/// Parse an object-count quantity. Only plain integers are accepted.
pub fn parse_count(quantity: &Quantity) -> Result<i64> {
    quantity
        .0
        .trim()
        .parse::<i64>()
        .map_err(|_| QuotaError::InvalidQuantity(quantity.0.clone()))
}

/// Sum two resource lists
pub fn add(a: &ResourceList, b: &ResourceList) -> Result<ResourceList> {
    let mut result = a.clone();
    for (name, quantity) in b {
        let current = match result.get(name) {
            Some(q) => parse_count(q)?,
            None => 0,
        };
        result.insert(name.clone(), count(current + parse_count(quantity)?));
    }
    Ok(result)
}

/// Restrict a resource list to the given names
pub fn mask(list: ResourceList, names: &[String]) -> ResourceList {
    list.into_iter()
        .filter(|(name, _)| names.contains(name))
        .collect()
}

/// Names from `input` that appear in `tracked`
pub fn intersection(input: &[String], tracked: &[&str]) -> Vec<String> {
    input
        .iter()
        .filter(|name| tracked.contains(&name.as_str()))
        .cloned()
        .collect()
}

/// Resource names enforced by a quota (status.hard)
pub fn hard_resource_names(quota: &ResourceQuota) -> Vec<String> {
    quota
        .status
        .as_ref()
        .and_then(|s| s.hard.as_ref())
        .map(|hard| hard.keys().cloned().collect())
        .unwrap_or_default()
}

/// Number of scopes a quota is restricted to, from both `scopes` and `scopeSelector`
pub fn quota_scope_count(quota: &ResourceQuota) -> usize {
    let Some(spec) = quota.spec.as_ref() else {
        return 0;
    };

    let scopes = spec.scopes.as_ref().map(Vec::len).unwrap_or(0);
    let selectors = spec
        .scope_selector
        .as_ref()
        .and_then(|s| s.match_expressions.as_ref())
        .map(Vec::len)
        .unwrap_or(0);

    scopes + selectors
}
