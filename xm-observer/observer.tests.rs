use kube::runtime::watcher::Event;
use std::sync::atomic::Ordering;
use tokio::runtime::Handle;
use xm_config::InfoMapping;

use crate::test_utils::{StubSource, count, object, ready_object, rendered, target, wait_until};

use super::*;

#[tokio::test]
async fn initial_list_seeds_store_test() {
    let source = StubSource::new(vec![object("a", Some("ns")), object("b", Some("ns"))], Vec::new());
    let observer = Observer::start(&Handle::current(), source, target(Some("ns")), Vec::new());

    wait_until(|| observer.state() == ObserverState::Syncing).await;

    let (identity, count) = observer.count_and_identity();
    assert_eq!(2, count);
    assert_eq!("ns_testa_cloud_NameA_v1", identity.metric_name());

    observer.stop().await;
}

#[tokio::test]
async fn watch_events_update_store_test() {
    let source = StubSource::new(
        vec![object("a", None)],
        vec![vec![
            Event::Init,
            Event::InitApply(object("a", None)),
            Event::InitApply(object("b", None)),
            Event::InitApply(object("c", None)),
            Event::InitDone,
            Event::Apply(object("d", None)),
            Event::Apply(ready_object("b", None)),
            Event::Delete(object("a", None)),
        ]],
    );
    let observer = Observer::start(&Handle::current(), source, target(None), Vec::new());

    wait_until(|| {
        let text = rendered(&observer);
        text.contains("{name=\"d\"}") && !text.contains("{name=\"a\"}")
    })
    .await;

    let text = rendered(&observer);
    assert_eq!(3, count(&observer));
    assert!(text.contains("testa_cloud_NameA_v1_ready{name=\"b\"} 1\n"));
    assert!(text.contains("testa_cloud_NameA_v1_ready{name=\"c\"} -1\n"));
    assert!(text.contains("testa_cloud_NameA_v1{name=\"d\"} 1\n"));
    assert!(text.ends_with("testa_cloud_NameA_v1_resource_count 3\n"));

    observer.stop().await;
}

#[tokio::test]
async fn relist_replaces_store_test() {
    let source = StubSource::new(
        vec![object("a", None), object("b", None)],
        vec![vec![Event::Init, Event::InitApply(object("c", None)), Event::InitDone]],
    );
    let observer = Observer::start(&Handle::current(), source, target(None), Vec::new());

    wait_until(|| count(&observer) == 1 && rendered(&observer).contains("{name=\"c\"}")).await;

    observer.stop().await;
}

#[tokio::test]
async fn list_failure_keeps_initializing_test() {
    let mut source = StubSource::new(Vec::new(), Vec::new());
    source.fail_list = true;
    let observer = Observer::start(&Handle::current(), source, target(None), Vec::new());

    tokio::time::sleep(std::time::Duration::from_millis(50)).await;

    assert_eq!(ObserverState::Initializing, observer.state());
    assert_eq!(0, count(&observer));

    observer.stop().await;
}

#[tokio::test]
async fn stop_is_idempotent_test() {
    let source = StubSource::new(vec![object("a", None)], Vec::new());
    let observer = Observer::start(&Handle::current(), source, target(None), Vec::new());

    wait_until(|| count(&observer) == 1).await;

    observer.stop().await;
    assert_eq!(ObserverState::Stopped, observer.state());
    assert!(observer.task.lock().unwrap().is_none());

    observer.stop().await;
    assert_eq!(ObserverState::Stopped, observer.state());
    assert_eq!(1, count(&observer));
}

#[tokio::test]
async fn info_mappings_are_rendered_test() {
    let source = StubSource::new(vec![object("a", None)], Vec::new());
    let mappings = vec![InfoMapping {
        field_path: "$.metadata.name".to_owned(),
        label: "object".to_owned(),
    }];
    let observer = Observer::start(&Handle::current(), source, target(None), mappings);

    wait_until(|| count(&observer) == 1).await;

    let text = rendered(&observer);
    assert!(text.contains("testa_cloud_NameA_v1_info{name=\"a\",object=\"a\"} 1\n"));

    observer.stop().await;
}

#[tokio::test]
async fn watch_starts_after_list_test() {
    let source = std::sync::Arc::new(StubSource::new(Vec::new(), Vec::new()));
    assert_eq!(0, source.watch_calls.load(Ordering::Relaxed));

    let observer = Observer::start(&Handle::current(), ArcSource(source.clone()), target(None), Vec::new());
    wait_until(|| source.watch_calls.load(Ordering::Relaxed) == 1).await;

    observer.stop().await;
}

struct ArcSource(std::sync::Arc<StubSource>);

impl xm_kube::InstanceSource for ArcSource {
    async fn list(&self) -> Result<Vec<kube::api::DynamicObject>, kube::Error> {
        self.0.list().await
    }

    fn watch(&self) -> xm_kube::InstanceStream {
        self.0.watch()
    }
}

#[tokio::test]
async fn watch_error_pauses_same_stream_test() {
    let mut source = StubSource::new(vec![object("a", None)], vec![vec![Event::Apply(object("b", None))]]);
    source.watch_errors = 1;
    let source = std::sync::Arc::new(source);
    let observer = Observer::start(&Handle::current(), ArcSource(source.clone()), target(None), Vec::new());

    wait_until(|| count(&observer) == 2).await;

    assert_eq!(1, source.watch_calls.load(Ordering::Relaxed));
    assert_eq!(ObserverState::Syncing, observer.state());

    observer.stop().await;
}

#[tokio::test]
async fn render_into_returns_rendered_count_test() {
    let source = StubSource::new(vec![object("a", None), object("b", None)], Vec::new());
    let observer = Observer::start(&Handle::current(), source, target(None), Vec::new());
    wait_until(|| count(&observer) == 2).await;

    let mut families = Vec::new();
    let rendered_count = observer.render_into(&mut families);

    assert_eq!(2, rendered_count);
    let resource_count = families.last().unwrap();
    assert_eq!("testa_cloud_NameA_v1_resource_count", resource_count.get_name());
    assert_eq!(2.0, resource_count.get_metric()[0].get_gauge().get_value());

    observer.stop().await;
}

#[tokio::test]
async fn collector_describes_all_families_test() {
    let observer = Observer::start(
        &Handle::current(),
        StubSource::new(vec![ready_object("a", Some("ns"))], Vec::new()),
        target(Some("ns")),
        Vec::new(),
    );
    wait_until(|| count(&observer) == 1).await;

    let names = observer.desc().iter().map(|d| d.fq_name.clone()).collect::<Vec<_>>();
    assert_eq!(9, names.len());
    assert_eq!("ns_testa_cloud_NameA_v1", names[0]);
    assert_eq!("ns_testa_cloud_NameA_v1_resource_count", names[8]);
    assert_eq!(
        vec!["name", "namespace"],
        observer.desc()[0].variable_labels
    );

    let collected = observer.collect().iter().map(|f| f.get_name().to_owned()).collect::<Vec<_>>();
    assert!(collected.contains(&"ns_testa_cloud_NameA_v1_ready_time".to_owned()));
    assert!(!collected.contains(&"ns_testa_cloud_NameA_v1_synced_time".to_owned()));

    observer.stop().await;
}
