//! Ordered evaluator registry handed to quota consumers

use crate::quota::identity::GroupResource;
use crate::quota::traits::Evaluator;
use std::sync::Arc;

/// Evaluators in registration order
#[derive(Debug, Clone, Default)]
pub struct Registry {
    evaluators: Vec<Arc<dyn Evaluator>>,
}

impl Registry {
    pub fn new(evaluators: Vec<Arc<dyn Evaluator>>) -> Self {
        Self { evaluators }
    }

    /// Look up the evaluator registered under an identity
    pub fn get(&self, group_resource: &GroupResource) -> Option<&Arc<dyn Evaluator>> {
        self.evaluators
            .iter()
            .find(|e| &e.group_resource() == group_resource)
    }

    /// Evaluators registered under an identity, in registration order
    pub fn all_for(&self, group_resource: &GroupResource) -> Vec<&Arc<dyn Evaluator>> {
        self.evaluators
            .iter()
            .filter(|e| &e.group_resource() == group_resource)
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn Evaluator>> {
        self.evaluators.iter()
    }

    /// Identities of all registered evaluators, in registration order
    pub fn group_resources(&self) -> Vec<GroupResource> {
        self.evaluators.iter().map(|e| e.group_resource()).collect()
    }

    pub fn len(&self) -> usize {
        self.evaluators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.evaluators.is_empty()
    }

    pub fn into_inner(self) -> Vec<Arc<dyn Evaluator>> {
        self.evaluators
    }
}

impl IntoIterator for Registry {
    type Item = Arc<dyn Evaluator>;
    type IntoIter = std::vec::IntoIter<Arc<dyn Evaluator>>;

    fn into_iter(self) -> Self::IntoIter {
        self.evaluators.into_iter()
    }
}
