use kube::ResourceExt;
use std::fmt::Display;

use super::{ClusterMetric, Metric, MetricSpec, MetricStatus};

#[cfg(test)]
#[path = "./selection.tests.rs"]
mod selection_tests;

pub const FINALIZER_NAME: &str = "metrics.crossplane.io/finalizer";

/// Scope of the selection spec.\
/// **Note** that namespaced specs only ever select namespaced resource types.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SpecScope {
    Cluster,
    Namespaced(String),
}

impl SpecScope {
    /// Returns namespace for the namespaced scope.
    pub fn namespace(&self) -> Option<&str> {
        match self {
            SpecScope::Cluster => None,
            SpecScope::Namespaced(namespace) => Some(namespace),
        }
    }
}

/// Scope independent view of a [`Metric`] or [`ClusterMetric`] object.
#[derive(Clone, Debug, PartialEq)]
pub struct SelectionSpec {
    pub name: String,
    pub scope: SpecScope,
    pub rules: MetricSpec,
    pub status: MetricStatus,
    pub finalizers: Vec<String>,
    pub resource_version: Option<String>,
    pub is_deleting: bool,
}

impl SelectionSpec {
    /// Creates new [`SelectionSpec`] instance with empty status.
    pub fn new(name: impl Into<String>, scope: SpecScope, rules: MetricSpec) -> Self {
        Self {
            name: name.into(),
            scope,
            rules,
            status: MetricStatus::default(),
            finalizers: Vec::new(),
            resource_version: None,
            is_deleting: false,
        }
    }

    /// Sets the observed status.
    pub fn with_status(mut self, status: MetricStatus) -> Self {
        self.status = status;
        self
    }

    /// Adds cleanup marker to the spec.
    pub fn with_finalizer(mut self) -> Self {
        if !self.has_finalizer() {
            self.finalizers.push(FINALIZER_NAME.to_owned());
        }

        self
    }

    /// Marks spec as requested for deletion.
    pub fn deleting(mut self) -> Self {
        self.is_deleting = true;
        self
    }

    /// Returns identity under which this spec consumes shared watches.
    pub fn consumer_id(&self) -> String {
        match &self.scope {
            SpecScope::Cluster => self.name.clone(),
            SpecScope::Namespaced(namespace) => format!("{}::{}", namespace, self.name),
        }
    }

    /// Returns `true` if the cleanup marker is attached.
    pub fn has_finalizer(&self) -> bool {
        self.finalizers.iter().any(|f| f == FINALIZER_NAME)
    }
}

impl Display for SelectionSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.scope {
            SpecScope::Cluster => write!(f, "ClusterMetric/{}", self.name),
            SpecScope::Namespaced(namespace) => write!(f, "Metric/{}/{}", namespace, self.name),
        }
    }
}

impl From<&Metric> for SelectionSpec {
    fn from(value: &Metric) -> Self {
        Self {
            name: value.name_any(),
            scope: SpecScope::Namespaced(value.namespace().unwrap_or_default()),
            rules: value.spec.clone(),
            status: value.status.clone().unwrap_or_default(),
            finalizers: value.finalizers().to_vec(),
            resource_version: value.resource_version(),
            is_deleting: value.metadata.deletion_timestamp.is_some(),
        }
    }
}

impl From<&ClusterMetric> for SelectionSpec {
    fn from(value: &ClusterMetric) -> Self {
        Self {
            name: value.name_any(),
            scope: SpecScope::Cluster,
            rules: value.spec.rules.clone(),
            status: value.status.clone().unwrap_or_default(),
            finalizers: value.finalizers().to_vec(),
            resource_version: value.resource_version(),
            is_deleting: value.metadata.deletion_timestamp.is_some(),
        }
    }
}
