//! Evaluator registries for the quota controller and the admission plugin

use crate::image::aliases::AliasTable;
use crate::image::{
    ImageStreamImportEvaluator, ImageStreamInformer, ImageStreamTagEvaluator,
    ImageStreamTagsGetter,
};
use crate::quota::{
    list_resource_using_lister_func, Evaluator, LegacyResourceEvaluator, ListerForResourceFunc,
    ObjectCountEvaluator, Registry,
};
use std::sync::Arc;
use tracing::{debug, info};

/// Which consumer a registry is built for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsumerMode {
    /// Background reconciliation: objects arrive under their current identity
    Replenishment,
    /// Synchronous admission: requests and quota rules may use either identity
    Admission,
}

impl ConsumerMode {
    /// Whether every evaluator is also registered under its legacy identity
    pub fn registers_legacy(self) -> bool {
        matches!(self, ConsumerMode::Admission)
    }
}

/// Build the evaluators for a consumer.
///
/// Specialized evaluators come first, then one count evaluator per alias
/// entry. In admission mode each specialized evaluator is registered a second
/// time under its legacy identity (sharing the same instance), and each alias
/// entry gets a second count evaluator for its legacy identity.
pub fn build_evaluators(
    mode: ConsumerMode,
    aliases: &AliasTable,
    lister_for: Option<ListerForResourceFunc>,
    informer: &dyn ImageStreamInformer,
    client: Arc<dyn ImageStreamTagsGetter>,
) -> Registry {
    let lister = informer.lister();

    let specialized: Vec<Arc<dyn Evaluator>> = vec![
        Arc::new(ImageStreamTagEvaluator::new(lister.clone(), client)),
        Arc::new(ImageStreamImportEvaluator::new(lister)),
    ];

    let mut result: Vec<Arc<dyn Evaluator>> = specialized.clone();

    if mode.registers_legacy() {
        for evaluator in specialized {
            result.push(Arc::new(LegacyResourceEvaluator::for_delegate(evaluator)));
        }
    }

    for entry in aliases {
        let list_func = list_resource_using_lister_func(lister_for.clone(), entry.resource.clone());
        result.push(Arc::new(ObjectCountEvaluator::new(
            entry.current(),
            list_func,
            entry.alias.clone(),
        )));
    }

    if mode.registers_legacy() {
        for entry in aliases {
            let list_func =
                list_resource_using_lister_func(lister_for.clone(), entry.resource.clone());
            result.push(Arc::new(ObjectCountEvaluator::new(
                entry.legacy(),
                list_func,
                entry.alias.clone(),
            )));
        }
    }

    for evaluator in &result {
        debug!(?mode, resource = %evaluator.group_resource(), "registered quota evaluator");
    }
    info!(?mode, evaluators = result.len(), "built image quota registry");

    Registry::new(result)
}

/// Evaluators for the resource quota controller, with the built-in alias table
pub fn new_replenishment_evaluators(
    lister_for: ListerForResourceFunc,
    informer: &dyn ImageStreamInformer,
    client: Arc<dyn ImageStreamTagsGetter>,
) -> Registry {
    new_replenishment_evaluators_with_aliases(&AliasTable::default(), lister_for, informer, client)
}

pub fn new_replenishment_evaluators_with_aliases(
    aliases: &AliasTable,
    lister_for: ListerForResourceFunc,
    informer: &dyn ImageStreamInformer,
    client: Arc<dyn ImageStreamTagsGetter>,
) -> Registry {
    build_evaluators(
        ConsumerMode::Replenishment,
        aliases,
        Some(lister_for),
        informer,
        client,
    )
}

/// Evaluators for the quota admission plugin, with the built-in alias table.
///
/// Admission only computes per-object usage, so the count evaluators carry
/// no lister; asking them for namespace usage fails with
/// [`QuotaError::ListerUnavailable`](crate::error::QuotaError::ListerUnavailable).
pub fn new_evaluators_for_admission(
    informer: &dyn ImageStreamInformer,
    client: Arc<dyn ImageStreamTagsGetter>,
) -> Registry {
    new_evaluators_for_admission_with_aliases(&AliasTable::default(), informer, client)
}

pub fn new_evaluators_for_admission_with_aliases(
    aliases: &AliasTable,
    informer: &dyn ImageStreamInformer,
    client: Arc<dyn ImageStreamTagsGetter>,
) -> Registry {
    build_evaluators(ConsumerMode::Admission, aliases, None, informer, client)
}
