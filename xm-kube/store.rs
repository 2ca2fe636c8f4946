use serde_json::json;
use kube::api::{ApiResource, DynamicObject, Patch, PatchParams};
use kube::{Api, Client};
use std::future::Future;

use crate::{ClusterMetric, FINALIZER_NAME, Metric, MetricStatus, SelectionSpec, SpecScope};

/// Possible errors from persisting selection spec state.
#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    /// Patch request was rejected or failed.
    #[error("cannot patch {0}: {1}")]
    PatchFailed(String, #[source] kube::Error),

    /// Status cannot be serialized.
    #[error("cannot serialize status: {0}")]
    SerializationError(#[from] serde_json::Error),
}

/// Persists cleanup marker and status of selection specs.
pub trait SpecStore: Send + Sync {
    /// Attaches cleanup marker to the spec.
    fn add_finalizer(&self, spec: &SelectionSpec) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Removes cleanup marker from the spec.
    fn remove_finalizer(&self, spec: &SelectionSpec) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Replaces status of the spec.
    fn replace_status(
        &self,
        spec: &SelectionSpec,
        status: &MetricStatus,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;
}

/// [`SpecStore`] that patches [`Metric`] and [`ClusterMetric`] objects.
#[derive(Clone)]
pub struct KubeSpecStore {
    client: Client,
}

impl KubeSpecStore {
    /// Creates new [`KubeSpecStore`] instance.
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn get_api(&self, scope: &SpecScope) -> Api<DynamicObject> {
        match scope {
            SpecScope::Namespaced(namespace) => {
                Api::namespaced_with(self.client.clone(), namespace, &ApiResource::erase::<Metric>(&()))
            },
            SpecScope::Cluster => Api::all_with(self.client.clone(), &ApiResource::erase::<ClusterMetric>(&())),
        }
    }

    async fn patch_finalizers(&self, spec: &SelectionSpec, finalizers: Vec<String>) -> Result<(), StoreError> {
        // resourceVersion makes the patch fail on a concurrent change instead of dropping other finalizers
        let patch = json!({
            "metadata": {
                "finalizers": finalizers,
                "resourceVersion": spec.resource_version,
            }
        });

        self.get_api(&spec.scope)
            .patch(&spec.name, &PatchParams::default(), &Patch::Merge(&patch))
            .await
            .map_err(|error| StoreError::PatchFailed(spec.to_string(), error))?;

        Ok(())
    }
}

impl SpecStore for KubeSpecStore {
    async fn add_finalizer(&self, spec: &SelectionSpec) -> Result<(), StoreError> {
        if spec.has_finalizer() {
            return Ok(());
        }

        let mut finalizers = spec.finalizers.clone();
        finalizers.push(FINALIZER_NAME.to_owned());
        self.patch_finalizers(spec, finalizers).await
    }

    async fn remove_finalizer(&self, spec: &SelectionSpec) -> Result<(), StoreError> {
        if !spec.has_finalizer() {
            return Ok(());
        }

        let finalizers = spec
            .finalizers
            .iter()
            .filter(|f| *f != FINALIZER_NAME)
            .cloned()
            .collect();
        self.patch_finalizers(spec, finalizers).await
    }

    async fn replace_status(&self, spec: &SelectionSpec, status: &MetricStatus) -> Result<(), StoreError> {
        let patch = json!({ "status": serde_json::to_value(status)? });

        self.get_api(&spec.scope)
            .patch_status(&spec.name, &PatchParams::default(), &Patch::Merge(&patch))
            .await
            .map_err(|error| StoreError::PatchFailed(spec.to_string(), error))?;

        Ok(())
    }
}
