use futures::StreamExt;
use kube::api::DynamicObject;
use std::time::Duration;
use tokio::runtime::Handle;
use xm_kube::{InstanceSource, InstanceStream, WatchTarget};

use super::*;

struct StaticSource;

impl MetricsSource for StaticSource {
    async fn render(&self, prefix: &str) -> String {
        format!("{prefix}_resources_count_total 3\n")
    }
}

#[tokio::test]
async fn metrics_route_renders_text_test() {
    let route = metrics_route(Arc::new(StaticSource), "x_metric".to_owned());

    let response = warp::test::request().method("GET").path("/metrics").reply(&route).await;

    assert_eq!(200, response.status());
    assert_eq!(
        Some(CONTENT_TYPE_TEXT),
        response.headers().get(CONTENT_TYPE).and_then(|v| v.to_str().ok())
    );
    assert_eq!("x_metric_resources_count_total 3\n", String::from_utf8_lossy(response.body()));
}

#[tokio::test]
async fn unknown_path_is_rejected_test() {
    let route = metrics_route(Arc::new(StaticSource), "x_metric".to_owned());

    let response = warp::test::request().method("GET").path("/other").reply(&route).await;

    assert_eq!(404, response.status());
}

#[tokio::test]
async fn post_is_rejected_test() {
    let route = metrics_route(Arc::new(StaticSource), "x_metric".to_owned());

    let response = warp::test::request().method("POST").path("/metrics").reply(&route).await;

    assert_eq!(405, response.status());
}

/// Serves a fixed list of instances and a watch stream that never yields.
struct ListedSource(Vec<DynamicObject>);

impl InstanceSource for ListedSource {
    async fn list(&self) -> Result<Vec<DynamicObject>, kube::Error> {
        Ok(self.0.clone())
    }

    fn watch(&self) -> InstanceStream {
        futures::stream::pending().boxed()
    }
}

struct ListedFactory;

impl ObserverFactory for ListedFactory {
    type Observer = Observer;

    fn create(&self, target: &WatchTarget) -> Self::Observer {
        let mut object = DynamicObject::new("obj-1", &target.api_resource());
        object.metadata.namespace = target.namespace.clone();
        Observer::start(&Handle::current(), ListedSource(vec![object]), target.clone(), Vec::new())
    }
}

async fn render_when(registry: &WatchRegistry<ListedFactory>, expected: &str) -> String {
    for _ in 0..500 {
        let text = registry.render("x_metric").await;
        if text.contains(expected) {
            return text;
        }

        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    panic!("rendered text does not contain {expected}");
}

#[tokio::test]
async fn released_watch_is_gone_from_output_test() {
    let registry = Arc::new(WatchRegistry::new(ListedFactory));
    let target = WatchTarget::new("testa.cloud", "v1", "nameas", "NameA");
    registry.acquire(&target, "first").await;
    registry.acquire(&target, "second").await;

    let text = render_when(&registry, "x_metric_resources_count_total 1\n").await;
    assert!(text.contains("testa_cloud_NameA_v1{name=\"obj-1\"} 1\n"));
    assert!(text.contains("testa_cloud_NameA_v1_resource_count 1\n"));

    registry.release(target.metric_name(), "first").await;
    let text = registry.render("x_metric").await;
    assert!(text.contains("testa_cloud_NameA_v1_resource_count 1\n"));

    registry.release(target.metric_name(), "second").await;
    let text = registry.render("x_metric").await;
    assert!(!text.contains("testa_cloud_NameA_v1"));
    assert!(text.ends_with("x_metric_resources_count_total 0\n"));
}

#[tokio::test]
async fn metrics_route_serves_registry_test() {
    let registry = Arc::new(WatchRegistry::new(ListedFactory));
    let target = WatchTarget::new("testa.cloud", "v1", "nameas", "NameA").in_namespace(Some("ns"));
    registry.acquire(&target, "ns::spec").await;
    render_when(&registry, "x_metric_resources_count_total 1\n").await;

    let route = metrics_route(Arc::clone(&registry), "x_metric".to_owned());
    let response = warp::test::request().method("GET").path("/metrics").reply(&route).await;

    let body = String::from_utf8_lossy(response.body()).into_owned();
    assert_eq!(200, response.status());
    assert!(body.contains("ns_testa_cloud_NameA_v1{name=\"obj-1\",namespace=\"ns\"} 1\n"));
    assert!(body.ends_with("x_metric_resources_count_total 1\n"));

    registry.stop_all().await;
}
