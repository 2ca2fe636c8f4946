use kube::api::ApiResource;
use std::fmt::Display;
use xm_common::{sanitize, sanitize_join};

use crate::{ResourceTypeDescriptor, WatchedResource};

#[cfg(test)]
#[path = "./target.tests.rs"]
mod target_tests;

/// Resource type version selected for observation, together with its derived metric name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WatchTarget {
    pub group: String,
    pub version: String,
    pub resource: String,
    pub kind: String,
    pub namespace: Option<String>,
    metric_name: String,
}

impl WatchTarget {
    /// Creates new cluster wide [`WatchTarget`] instance.
    pub fn new(group: &str, version: &str, resource: &str, kind: &str) -> Self {
        Self {
            group: group.to_owned(),
            version: version.to_owned(),
            resource: resource.to_owned(),
            kind: kind.to_owned(),
            namespace: None,
            metric_name: sanitize_join(&[group, kind, version]),
        }
    }

    /// Creates new [`WatchTarget`] for the descriptor's storage version.
    pub fn from_descriptor(descriptor: &ResourceTypeDescriptor) -> Self {
        Self::new(
            &descriptor.group,
            &descriptor.stored_version,
            &descriptor.plural,
            &descriptor.kind,
        )
    }

    /// Scopes target to the namespace, qualifying the metric name with it.
    pub fn in_namespace(mut self, namespace: Option<&str>) -> Self {
        self.namespace = namespace.map(String::from);
        self.metric_name = match namespace {
            Some(namespace) => sanitize(&format!("{}_{}", namespace, self.base_metric_name())),
            None => self.base_metric_name(),
        };

        self
    }

    /// Returns metric name, namespace qualified for namespaced targets.
    pub fn metric_name(&self) -> &str {
        &self.metric_name
    }

    /// Returns metric name without the namespace qualifier.
    pub fn base_metric_name(&self) -> String {
        sanitize_join(&[&self.group, &self.kind, &self.version])
    }

    /// Returns `group/version` string.
    pub fn api_version(&self) -> String {
        if self.group.is_empty() {
            self.version.clone()
        } else {
            format!("{}/{}", self.group, self.version)
        }
    }

    /// Returns [`ApiResource`] used to build dynamic API for this target.
    pub fn api_resource(&self) -> ApiResource {
        ApiResource {
            group: self.group.clone(),
            version: self.version.clone(),
            api_version: self.api_version(),
            kind: self.kind.clone(),
            plural: self.resource.clone(),
        }
    }

    /// Returns status entry describing this target.
    pub fn to_watched_resource(&self) -> WatchedResource {
        WatchedResource {
            group: self.group.clone(),
            version: self.version.clone(),
            kind: self.kind.clone(),
            namespace: self.namespace.clone(),
            metric_name: Some(self.metric_name.clone()),
        }
    }
}

impl Display for WatchTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.namespace {
            Some(namespace) => write!(f, "{}.{}/{} in {}", self.resource, self.group, self.version, namespace),
            None => write!(f, "{}.{}/{}", self.resource, self.group, self.version),
        }
    }
}
