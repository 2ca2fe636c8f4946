use crate::MetricJoin;

use super::*;

const METRIC: &str = r#"
apiVersion: metrics.crossplane.io/v1
kind: Metric
metadata:
  name: cmetrica
  namespace: team-a
  resourceVersion: "42"
  finalizers:
    - metrics.crossplane.io/finalizer
spec:
  matchName: testa.cloud
  excludeNames:
    - namebs.testa.cloud
status:
  watchedResources:
    - group: testa.cloud
      version: v1
      kind: NameA
      metricName: team_a_testa_cloud_NameA_v1
"#;

const CLUSTER_METRIC: &str = r#"
apiVersion: metrics.crossplane.io/v1
kind: ClusterMetric
metadata:
  name: all-managed
  deletionTimestamp: "2024-01-01T00:00:00Z"
spec:
  categories:
    values:
      - crda
      - crdx
    join: OR
"#;

#[test]
fn from_metric_test() {
    let metric: Metric = serde_yaml::from_str(METRIC).unwrap();
    let spec = SelectionSpec::from(&metric);

    assert_eq!("cmetrica", spec.name);
    assert_eq!(SpecScope::Namespaced("team-a".to_owned()), spec.scope);
    assert_eq!("team-a::cmetrica", spec.consumer_id());
    assert_eq!(Some("testa.cloud"), spec.rules.match_name.as_deref());
    assert_eq!(Some(vec!["namebs.testa.cloud".to_owned()]), spec.rules.exclude_names);
    assert!(spec.has_finalizer());
    assert!(!spec.is_deleting);
    assert_eq!(Some("42"), spec.resource_version.as_deref());
    assert_eq!(
        vec!["team_a_testa_cloud_NameA_v1"],
        spec.status.metric_names().collect::<Vec<_>>()
    );
    assert_eq!("Metric/team-a/cmetrica", spec.to_string());
}

#[test]
fn from_cluster_metric_test() {
    let metric: ClusterMetric = serde_yaml::from_str(CLUSTER_METRIC).unwrap();
    let spec = SelectionSpec::from(&metric);

    assert_eq!(SpecScope::Cluster, spec.scope);
    assert_eq!("all-managed", spec.consumer_id());
    assert!(spec.is_deleting);
    assert!(!spec.has_finalizer());
    assert_eq!(0, spec.status.metric_names().count());

    let categories = spec.rules.categories.unwrap();
    assert_eq!(vec!["crda", "crdx"], categories.values);
    assert_eq!(MetricJoin::Or, categories.join);
}

#[test]
fn category_join_defaults_to_and_test() {
    let spec: MetricSpec = serde_yaml::from_str("categories:\n  values: [managed]\n").unwrap();
    assert_eq!(MetricJoin::And, spec.categories.unwrap().join);
}

#[test]
fn with_finalizer_is_idempotent_test() {
    let spec = SelectionSpec::new("a", SpecScope::Cluster, MetricSpec::default())
        .with_finalizer()
        .with_finalizer();

    assert_eq!(1, spec.finalizers.len());
    assert!(spec.has_finalizer());
}
