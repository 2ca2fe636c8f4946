use std::collections::BTreeSet;
use std::sync::{Arc, RwLock};
use xm_kube::{
    CatalogError, MetricStatus, ResourceTypeCatalog, ResourceTypeDescriptor, SelectionSpec, SpecStore, StoreError,
};

use crate::{ObserverFactory, WatchRegistry, select_targets};

#[cfg(test)]
#[path = "./engine.tests.rs"]
mod engine_tests;

/// Possible errors from the reconcile pass.
#[derive(thiserror::Error, Debug)]
pub enum ReconcileError {
    /// Resource types cannot be listed and there is no earlier snapshot.
    #[error("cannot fetch resource types: {0}")]
    Catalog(#[from] CatalogError),

    /// Cleanup marker cannot be attached or removed.
    #[error("cannot update cleanup marker: {0}")]
    Finalizer(#[source] StoreError),
}

/// Result of a successful reconcile pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// Watches were synchronized with the spec.
    Reconciled { added: usize, removed: usize },

    /// Spec is being deleted, its watches were released.
    CleanedUp { released: usize },

    /// Spec is being deleted and there is nothing left to clean.
    Skipped,
}

/// Synchronizes watches held in the [`WatchRegistry`] with selection specs.
pub struct ReconcileEngine<C, S, F: ObserverFactory> {
    catalog: C,
    store: S,
    registry: Arc<WatchRegistry<F>>,
    metric_base_name: String,
    descriptors: RwLock<Option<Arc<[ResourceTypeDescriptor]>>>,
}

impl<C, S, F> ReconcileEngine<C, S, F>
where
    C: ResourceTypeCatalog,
    S: SpecStore,
    F: ObserverFactory,
{
    /// Creates new [`ReconcileEngine`] instance.\
    /// `metric_base_name` is recorded in the status of every reconciled spec.
    pub fn new(catalog: C, store: S, registry: Arc<WatchRegistry<F>>, metric_base_name: &str) -> Self {
        Self {
            catalog,
            store,
            registry,
            metric_base_name: metric_base_name.to_owned(),
            descriptors: RwLock::new(None),
        }
    }

    /// Returns registry managed by this engine.
    pub fn registry(&self) -> &Arc<WatchRegistry<F>> {
        &self.registry
    }

    /// Runs one reconcile pass for the `spec`.
    pub async fn reconcile(&self, spec: &SelectionSpec) -> Result<ReconcileOutcome, ReconcileError> {
        let consumer = spec.consumer_id();

        if spec.is_deleting {
            return self.cleanup(spec, &consumer).await;
        }

        if !spec.has_finalizer() {
            self.store
                .add_finalizer(spec)
                .await
                .map_err(ReconcileError::Finalizer)?;
            tracing::debug!("Cleanup marker attached to {}", spec);
        }

        let descriptors = self.get_descriptors().await?;
        let desired = select_targets(&spec.rules, &descriptors, spec.scope.namespace());

        let held = self.registry.consumer_metrics(&consumer).await;
        let mut added = 0;
        for (name, target) in desired.iter().filter(|(name, _)| !held.contains(*name)) {
            if self.registry.acquire(target, &consumer).await {
                tracing::debug!("Observer {} started for {}", name, spec);
            }

            added += 1;
        }

        let removed = held.iter().filter(|name| !desired.contains_key(*name)).count();
        let previous = held
            .into_iter()
            .chain(spec.status.metric_names().map(String::from))
            .collect::<BTreeSet<_>>();
        for name in previous.iter().filter(|name| !desired.contains_key(*name)) {
            self.registry.release(name, &consumer).await;
        }

        let status = MetricStatus {
            metric_base_name: Some(self.metric_base_name.clone()),
            watched_resources: Some(desired.values().map(|t| t.to_watched_resource()).collect()),
        };
        if status != spec.status
            && let Err(error) = self.store.replace_status(spec, &status).await
        {
            tracing::warn!("Cannot update status of {}: {}", spec, error);
        }

        if added > 0 || removed > 0 {
            tracing::info!("{} reconciled, {} watches added, {} removed", spec, added, removed);
        }

        Ok(ReconcileOutcome::Reconciled { added, removed })
    }

    async fn cleanup(&self, spec: &SelectionSpec, consumer: &str) -> Result<ReconcileOutcome, ReconcileError> {
        if !spec.has_finalizer() {
            return Ok(ReconcileOutcome::Skipped);
        }

        let held = self.registry.consumer_metrics(consumer).await;
        let released = held.len();
        let recorded = spec.status.metric_names().map(String::from);
        for name in held.into_iter().chain(recorded).collect::<BTreeSet<_>>() {
            self.registry.release(&name, consumer).await;
        }

        self.store
            .remove_finalizer(spec)
            .await
            .map_err(ReconcileError::Finalizer)?;
        tracing::info!("{} cleaned up, {} watches released", spec, released);

        Ok(ReconcileOutcome::CleanedUp { released })
    }

    /// Returns fresh resource type descriptors, falling back to the last fetched ones on failure.
    async fn get_descriptors(&self) -> Result<Arc<[ResourceTypeDescriptor]>, ReconcileError> {
        match self.catalog.list_descriptors().await {
            Ok(descriptors) => {
                let descriptors: Arc<[ResourceTypeDescriptor]> = descriptors.into();
                if let Ok(mut cached) = self.descriptors.write() {
                    *cached = Some(Arc::clone(&descriptors));
                }

                Ok(descriptors)
            },
            Err(error) => {
                let cached = self.descriptors.read().ok().and_then(|c| c.clone());
                match cached {
                    Some(descriptors) => {
                        tracing::warn!("{}, using last known resource types", error);
                        Ok(descriptors)
                    },
                    None => Err(error.into()),
                }
            },
        }
    }
}
