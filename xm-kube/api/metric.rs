use kube::CustomResource;
use serde::{Deserialize, Serialize};

/// Decides if a single category is enough to select a resource type or all of them are needed.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MetricJoin {
    #[default]
    #[serde(rename = "AND")]
    And,

    #[serde(rename = "OR")]
    Or,
}

/// Selects resource types by the categories they declare.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct MetricCategory {
    #[serde(default)]
    pub values: Vec<String>,

    #[serde(default)]
    pub join: MetricJoin,
}

/// Selection rules shared by [`Metric`] and [`ClusterMetric`].
#[derive(CustomResource, Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[kube(
    group = "metrics.crossplane.io",
    version = "v1",
    kind = "Metric",
    namespaced,
    status = "MetricStatus",
    schema = "disabled"
)]
#[serde(rename_all = "camelCase")]
pub struct MetricSpec {
    /// Regular expression matched against resource type names.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub match_name: Option<String>,

    /// Resource type names that are always selected, unless excluded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_names: Option<Vec<String>>,

    /// Resource type names that are never selected by this spec.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude_names: Option<Vec<String>>,

    /// Evaluated only if `match_name` is not set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categories: Option<MetricCategory>,
}

/// Cluster scoped variant of the selection rules.
#[derive(CustomResource, Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[kube(
    group = "metrics.crossplane.io",
    version = "v1",
    kind = "ClusterMetric",
    status = "MetricStatus",
    schema = "disabled"
)]
pub struct ClusterMetricSpec {
    #[serde(flatten)]
    pub rules: MetricSpec,
}

/// Resource type currently observed on behalf of a selection spec.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WatchedResource {
    pub group: String,
    pub version: String,
    pub kind: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metric_name: Option<String>,
}

/// Observed state of the selection spec.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MetricStatus {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metric_base_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub watched_resources: Option<Vec<WatchedResource>>,
}

impl MetricStatus {
    /// Returns metric names recorded in the status.
    pub fn metric_names(&self) -> impl Iterator<Item = &str> {
        self.watched_resources
            .iter()
            .flatten()
            .filter_map(|r| r.metric_name.as_deref())
    }
}
