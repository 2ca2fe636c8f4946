use k8s_openapi::apiextensions_apiserver::pkg::apis::apiextensions::v1::CustomResourceDefinition;
use kube::api::ListParams;
use kube::{Api, Client};
use std::future::Future;

use crate::ResourceTypeDescriptor;

/// Possible errors from fetching resource type descriptors.
#[derive(thiserror::Error, Debug)]
pub enum CatalogError {
    /// Resource type definitions cannot be listed.
    #[error("cannot list resource type definitions: {0}")]
    ListFailed(#[from] kube::Error),
}

/// Source of resource type descriptors known to the cluster.
pub trait ResourceTypeCatalog: Send + Sync {
    /// Lists all known resource type descriptors.
    fn list_descriptors(&self) -> impl Future<Output = Result<Vec<ResourceTypeDescriptor>, CatalogError>> + Send;
}

/// Catalog backed by the `CustomResourceDefinition` API.
#[derive(Clone)]
pub struct CrdCatalog {
    client: Client,
}

impl CrdCatalog {
    /// Creates new [`CrdCatalog`] instance.
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

impl ResourceTypeCatalog for CrdCatalog {
    async fn list_descriptors(&self) -> Result<Vec<ResourceTypeDescriptor>, CatalogError> {
        let crds: Api<CustomResourceDefinition> = Api::all(self.client.clone());
        let list = crds.list(&ListParams::default()).await?;

        let descriptors = list
            .items
            .iter()
            .filter_map(ResourceTypeDescriptor::from_crd)
            .collect::<Vec<_>>();
        tracing::debug!("Fetched {} resource type descriptors", descriptors.len());

        Ok(descriptors)
    }
}
