use std::sync::Arc;
use xm_kube::{MetricJoin, MetricSpec, SelectionSpec, SpecScope};

use crate::WatchRegistry;
use crate::test_utils::{CountingFactory, StubCatalog, StubStore, categories, descriptors, match_name};

use super::*;

type TestEngine = ReconcileEngine<StubCatalog, StubStore, CountingFactory>;

fn engine_with(catalog: StubCatalog, store: StubStore) -> TestEngine {
    let registry = Arc::new(WatchRegistry::new(CountingFactory::default()));
    ReconcileEngine::new(catalog, store, registry, "x_metric")
}

fn engine() -> TestEngine {
    engine_with(StubCatalog::new(descriptors()), StubStore::default())
}

fn cluster_spec(name: &str, rules: MetricSpec) -> SelectionSpec {
    SelectionSpec::new(name, SpecScope::Cluster, rules).with_finalizer()
}

fn namespaced_spec(namespace: &str, name: &str, rules: MetricSpec) -> SelectionSpec {
    SelectionSpec::new(name, SpecScope::Namespaced(namespace.to_owned()), rules).with_finalizer()
}

async fn held(engine: &TestEngine, spec: &SelectionSpec) -> Vec<String> {
    engine
        .registry()
        .consumer_metrics(&spec.consumer_id())
        .await
        .into_iter()
        .collect()
}

#[tokio::test]
async fn specs_share_observer_test() {
    let engine = engine();
    let by_name = cluster_spec("by-name", match_name("nameas"));
    let by_category = cluster_spec("by-category", categories(&["crda"], MetricJoin::And));

    engine.reconcile(&by_name).await.unwrap();
    engine.reconcile(&by_category).await.unwrap();

    let factory = engine.registry().factory();
    assert_eq!(1, factory.created("testa_cloud_NameA_v1"));
    assert_eq!(1, factory.total_created());

    let snapshot = engine.registry().snapshot().await;
    assert_eq!(1, snapshot.len());
    assert_eq!(2, snapshot[0].consumers.len());
}

#[tokio::test]
async fn observer_stops_after_last_spec_is_deleted_test() {
    let engine = engine();
    let first = cluster_spec("first", match_name("testa.cloud"));
    let second = cluster_spec("second", categories(&["crda"], MetricJoin::And));

    engine.reconcile(&first).await.unwrap();
    engine.reconcile(&second).await.unwrap();
    assert_eq!(2, engine.registry().len().await);

    let outcome = engine.reconcile(&first.clone().deleting()).await.unwrap();
    assert_eq!(ReconcileOutcome::CleanedUp { released: 2 }, outcome);
    assert_eq!(1, engine.registry().factory().stops());
    assert_eq!(vec!["testa_cloud_NameA_v1"], held(&engine, &second).await);

    engine.reconcile(&second.clone().deleting()).await.unwrap();
    assert_eq!(2, engine.registry().factory().stops());
    assert!(engine.registry().is_empty().await);
    assert_eq!(
        vec!["remove_finalizer first", "remove_finalizer second"],
        engine
            .store
            .calls()
            .into_iter()
            .filter(|c| c.starts_with("remove_finalizer"))
            .collect::<Vec<_>>()
    );
}

#[tokio::test]
async fn reconcile_is_idempotent_test() {
    let engine = engine();
    let spec = cluster_spec("spec", match_name("testb.cloud"));

    let first = engine.reconcile(&spec).await.unwrap();
    let second = engine.reconcile(&spec).await.unwrap();

    assert_eq!(ReconcileOutcome::Reconciled { added: 2, removed: 0 }, first);
    assert_eq!(ReconcileOutcome::Reconciled { added: 0, removed: 0 }, second);
    assert_eq!(2, engine.registry().factory().total_created());
    assert_eq!(0, engine.registry().factory().stops());

    let snapshot = engine.registry().snapshot().await;
    assert!(snapshot.iter().all(|e| e.consumers.get("spec") == Some(&1)));
}

#[tokio::test]
async fn reconcile_with_persisted_status_is_idempotent_test() {
    let engine = engine();
    let spec = cluster_spec("spec", match_name("testb.cloud"));

    engine.reconcile(&spec).await.unwrap();
    let status = engine.store.status(&spec).unwrap();
    let calls = engine.store.calls().len();

    let outcome = engine.reconcile(&spec.with_status(status)).await.unwrap();

    assert_eq!(ReconcileOutcome::Reconciled { added: 0, removed: 0 }, outcome);
    assert_eq!(calls, engine.store.calls().len());
}

#[tokio::test]
async fn finalizer_is_attached_before_acquire_test() {
    let engine = engine();
    let spec = SelectionSpec::new("spec", SpecScope::Cluster, match_name("nameas"));

    engine.reconcile(&spec).await.unwrap();

    assert_eq!(
        vec!["add_finalizer spec", "replace_status spec"],
        engine.store.calls()
    );
    assert_eq!(1, engine.registry().len().await);
}

#[tokio::test]
async fn finalizer_failure_aborts_pass_test() {
    let store = StubStore {
        fail_finalizer: true,
        ..Default::default()
    };
    let engine = engine_with(StubCatalog::new(descriptors()), store);
    let spec = SelectionSpec::new("spec", SpecScope::Cluster, match_name("nameas"));

    let result = engine.reconcile(&spec).await;

    assert!(matches!(result, Err(ReconcileError::Finalizer(_))));
    assert!(engine.registry().is_empty().await);
    assert_eq!(0, engine.catalog.calls.load(std::sync::atomic::Ordering::Relaxed));
}

#[tokio::test]
async fn deleting_without_finalizer_is_noop_test() {
    let engine = engine();
    let spec = SelectionSpec::new("spec", SpecScope::Cluster, match_name("nameas")).deleting();

    assert_eq!(ReconcileOutcome::Skipped, engine.reconcile(&spec).await.unwrap());
    assert!(engine.store.calls().is_empty());
}

#[tokio::test]
async fn changed_rules_swap_watches_test() {
    let engine = engine();
    let spec = cluster_spec("spec", match_name("testa.cloud"));
    engine.reconcile(&spec).await.unwrap();

    let mut changed = spec.clone();
    changed.rules = match_name("nameas|namecs");
    let outcome = engine.reconcile(&changed).await.unwrap();

    assert_eq!(ReconcileOutcome::Reconciled { added: 1, removed: 1 }, outcome);
    assert_eq!(
        vec!["testa_cloud_NameA_v1", "testb_cloud_NameC_v1"],
        held(&engine, &spec).await
    );
    assert_eq!(1, engine.registry().factory().stops());

    let status = engine.store.status(&spec).unwrap();
    assert_eq!(
        vec!["testa_cloud_NameA_v1", "testb_cloud_NameC_v1"],
        status.metric_names().collect::<Vec<_>>()
    );
    assert_eq!(Some("x_metric"), status.metric_base_name.as_deref());
}

#[tokio::test]
async fn catalog_failure_without_snapshot_leaves_registry_unchanged_test() {
    let engine = engine_with(StubCatalog::failing(), StubStore::default());
    let spec = cluster_spec("spec", match_name("testa.cloud"));

    let result = engine.reconcile(&spec).await;

    assert!(matches!(result, Err(ReconcileError::Catalog(_))));
    assert!(engine.registry().is_empty().await);
    assert!(engine.store.calls().is_empty());
}

#[tokio::test]
async fn catalog_failure_uses_last_snapshot_test() {
    let engine = engine();
    let first = cluster_spec("first", match_name("testa.cloud"));
    engine.reconcile(&first).await.unwrap();

    engine.catalog.set(None);
    let second = cluster_spec("second", match_name("testc.cloud"));
    let outcome = engine.reconcile(&second).await.unwrap();

    assert_eq!(ReconcileOutcome::Reconciled { added: 3, removed: 0 }, outcome);
    assert_eq!(5, engine.registry().len().await);
}

#[tokio::test]
async fn status_failure_is_not_fatal_test() {
    let store = StubStore {
        fail_status: true,
        ..Default::default()
    };
    let engine = engine_with(StubCatalog::new(descriptors()), store);
    let spec = cluster_spec("spec", match_name("testa.cloud"));

    let outcome = engine.reconcile(&spec).await.unwrap();

    assert_eq!(ReconcileOutcome::Reconciled { added: 2, removed: 0 }, outcome);
    assert_eq!(2, engine.registry().len().await);
}

#[tokio::test]
async fn recorded_status_is_released_after_restart_test() {
    let engine = engine();
    let previous = cluster_spec("other", match_name("testb.cloud"));
    engine.reconcile(&previous).await.unwrap();

    // status recorded by an earlier process, nothing is held in the fresh registry
    let old_status = MetricStatus {
        metric_base_name: Some("x_metric".to_owned()),
        watched_resources: Some(vec![
            xm_kube::WatchTarget::new("testb.cloud", "v1", "namecs", "NameC").to_watched_resource(),
        ]),
    };
    let spec = cluster_spec("spec", match_name("nameas")).with_status(old_status);

    let outcome = engine.reconcile(&spec).await.unwrap();

    assert_eq!(ReconcileOutcome::Reconciled { added: 1, removed: 0 }, outcome);
    assert_eq!(vec!["testa_cloud_NameA_v1"], held(&engine, &spec).await);
    assert_eq!(0, engine.registry().factory().stops());
    assert_eq!(
        vec!["testb_cloud_NameC_v1", "testb_cloud_NameD_v2"],
        held(&engine, &previous).await
    );
}

#[tokio::test]
async fn cleanup_counts_only_held_watches_test() {
    let engine = engine();
    let other = cluster_spec("other", match_name("testb.cloud"));
    engine.reconcile(&other).await.unwrap();

    let old_status = MetricStatus {
        metric_base_name: Some("x_metric".to_owned()),
        watched_resources: Some(vec![
            xm_kube::WatchTarget::new("testb.cloud", "v1", "namecs", "NameC").to_watched_resource(),
        ]),
    };
    let spec = cluster_spec("spec", match_name("nameas")).with_status(old_status);

    let outcome = engine.reconcile(&spec.deleting()).await.unwrap();

    assert_eq!(ReconcileOutcome::CleanedUp { released: 0 }, outcome);
    assert_eq!(0, engine.registry().factory().stops());
    assert_eq!(
        vec!["testb_cloud_NameC_v1", "testb_cloud_NameD_v2"],
        held(&engine, &other).await
    );
}

#[tokio::test]
async fn namespaced_spec_observes_namespaced_types_only_test() {
    let engine = engine();
    let spec = namespaced_spec("team-a", "spec", match_name("testc.cloud"));

    engine.reconcile(&spec).await.unwrap();

    assert_eq!(
        vec!["team_a_testc_cloud_NameE_v1", "team_a_testc_cloud_NameG_v1"],
        held(&engine, &spec).await
    );
    let status = engine.store.status(&spec).unwrap();
    assert!(
        status
            .watched_resources
            .unwrap()
            .iter()
            .all(|r| r.namespace.as_deref() == Some("team-a"))
    );
}

#[tokio::test]
async fn same_name_in_different_namespaces_test() {
    let engine = engine();
    let first = namespaced_spec("ns-1", "spec", match_name("nameas"));
    let second = namespaced_spec("ns-2", "spec", match_name("nameas"));

    engine.reconcile(&first).await.unwrap();
    engine.reconcile(&second).await.unwrap();

    assert_eq!(2, engine.registry().factory().total_created());
    assert_eq!(vec!["ns_1_testa_cloud_NameA_v1"], held(&engine, &first).await);
    assert_eq!(vec!["ns_2_testa_cloud_NameA_v1"], held(&engine, &second).await);
}
