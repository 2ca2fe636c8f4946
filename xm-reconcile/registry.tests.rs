use std::sync::Arc;
use xm_kube::WatchTarget;

use crate::test_utils::CountingFactory;

use super::*;

fn target(kind: &str, namespace: Option<&str>) -> WatchTarget {
    WatchTarget::new("testa.cloud", "v1", &format!("{}s", kind.to_lowercase()), kind).in_namespace(namespace)
}

#[tokio::test]
async fn acquire_creates_observer_once_test() {
    let registry = WatchRegistry::new(CountingFactory::default());
    let target = target("NameA", None);

    assert!(registry.acquire(&target, "spec-a").await);
    assert!(!registry.acquire(&target, "spec-b").await);
    assert!(!registry.acquire(&target, "spec-a").await);

    assert_eq!(1, registry.factory().created("testa_cloud_NameA_v1"));
    assert_eq!(1, registry.len().await);

    let snapshot = registry.snapshot().await;
    assert_eq!(1, snapshot.len());
    assert_eq!("testa_cloud_NameA_v1", snapshot[0].metric_name);
    assert_eq!(Some(&2), snapshot[0].consumers.get("spec-a"));
    assert_eq!(Some(&1), snapshot[0].consumers.get("spec-b"));
}

#[tokio::test]
async fn release_stops_observer_after_last_consumer_test() {
    let registry = WatchRegistry::new(CountingFactory::default());
    let target = target("NameA", None);
    registry.acquire(&target, "spec-a").await;
    registry.acquire(&target, "spec-b").await;

    assert!(!registry.release("testa_cloud_NameA_v1", "spec-a").await);
    assert_eq!(0, registry.factory().stops());
    assert_eq!(1, registry.len().await);

    assert!(registry.release("testa_cloud_NameA_v1", "spec-b").await);
    assert_eq!(1, registry.factory().stops());
    assert!(registry.is_empty().await);

    assert!(!registry.release("testa_cloud_NameA_v1", "spec-b").await);
    assert!(!registry.release("unknown", "spec-b").await);
    assert_eq!(1, registry.factory().stops());
}

#[tokio::test]
async fn reacquire_after_teardown_creates_new_observer_test() {
    let registry = WatchRegistry::new(CountingFactory::default());
    let target = target("NameA", None);

    registry.acquire(&target, "spec-a").await;
    registry.release("testa_cloud_NameA_v1", "spec-a").await;
    registry.acquire(&target, "spec-a").await;

    assert_eq!(2, registry.factory().created("testa_cloud_NameA_v1"));
    assert_eq!(1, registry.len().await);
}

#[tokio::test]
async fn namespaced_targets_are_separate_entries_test() {
    let registry = WatchRegistry::new(CountingFactory::default());

    registry.acquire(&target("NameA", Some("ns-1")), "ns-1::spec").await;
    registry.acquire(&target("NameA", Some("ns-2")), "ns-2::spec").await;
    registry.acquire(&target("NameA", None), "cluster-spec").await;

    assert_eq!(3, registry.factory().total_created());
    assert_eq!(
        vec!["ns_1_testa_cloud_NameA_v1", "ns_2_testa_cloud_NameA_v1", "testa_cloud_NameA_v1"],
        registry
            .observers()
            .await
            .iter()
            .map(|o| o.target.metric_name().to_owned())
            .collect::<Vec<_>>()
    );
}

#[tokio::test]
async fn consumer_metrics_test() {
    let registry = WatchRegistry::new(CountingFactory::default());
    registry.acquire(&target("NameA", None), "spec-a").await;
    registry.acquire(&target("NameB", None), "spec-a").await;
    registry.acquire(&target("NameB", None), "spec-b").await;

    assert_eq!(
        vec!["testa_cloud_NameA_v1", "testa_cloud_NameB_v1"],
        registry.consumer_metrics("spec-a").await.into_iter().collect::<Vec<_>>()
    );
    assert_eq!(
        vec!["testa_cloud_NameB_v1"],
        registry.consumer_metrics("spec-b").await.into_iter().collect::<Vec<_>>()
    );
    assert!(registry.consumer_metrics("spec-c").await.is_empty());
}

#[tokio::test]
async fn concurrent_acquire_creates_single_observer_test() {
    let registry = Arc::new(WatchRegistry::new(CountingFactory::default()));
    let target = target("NameA", None);

    let tasks = (0..16)
        .map(|i| {
            let registry = Arc::clone(&registry);
            let target = target.clone();
            tokio::spawn(async move { registry.acquire(&target, &format!("spec-{i}")).await })
        })
        .collect::<Vec<_>>();
    for task in tasks {
        task.await.unwrap();
    }

    assert_eq!(1, registry.factory().created("testa_cloud_NameA_v1"));
    assert_eq!(16, registry.snapshot().await[0].consumers.len());
}

#[tokio::test]
async fn stop_all_test() {
    let registry = WatchRegistry::new(CountingFactory::default());
    registry.acquire(&target("NameA", None), "spec-a").await;
    registry.acquire(&target("NameB", None), "spec-b").await;

    registry.stop_all().await;

    assert_eq!(2, registry.factory().stops());
    assert!(registry.is_empty().await);
}
