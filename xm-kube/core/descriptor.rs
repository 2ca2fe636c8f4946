use k8s_openapi::apiextensions_apiserver::pkg::apis::apiextensions::v1::CustomResourceDefinition;
use kube::ResourceExt;

#[cfg(test)]
#[path = "./descriptor.tests.rs"]
mod descriptor_tests;

/// Scope of the resource type.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResourceScope {
    Cluster,
    Namespaced,
}

impl From<&str> for ResourceScope {
    fn from(value: &str) -> Self {
        if value == "Namespaced" {
            ResourceScope::Namespaced
        } else {
            ResourceScope::Cluster
        }
    }
}

/// Describes one resource type known to the cluster.
#[derive(Clone, Debug, PartialEq)]
pub struct ResourceTypeDescriptor {
    pub name: String,
    pub group: String,
    pub stored_version: String,
    pub plural: String,
    pub kind: String,
    pub scope: ResourceScope,
    pub categories: Vec<String>,
}

impl ResourceTypeDescriptor {
    /// Returns `true` if instances of this resource type live in namespaces.
    pub fn is_namespaced(&self) -> bool {
        self.scope == ResourceScope::Namespaced
    }

    /// Creates descriptor from the CRD object.\
    /// **Note** that it returns `None` if no version is marked as the storage version.
    pub fn from_crd(crd: &CustomResourceDefinition) -> Option<Self> {
        let stored_version = crd.spec.versions.iter().find(|v| v.storage)?;

        Some(Self {
            name: crd.name_any(),
            group: crd.spec.group.clone(),
            stored_version: stored_version.name.clone(),
            plural: crd.spec.names.plural.clone(),
            kind: crd.spec.names.kind.clone(),
            scope: crd.spec.scope.as_str().into(),
            categories: crd.spec.names.categories.clone().unwrap_or_default(),
        })
    }
}
