use tokio::runtime::Handle;

use crate::test_utils::{StubSource, count, object, target, wait_until};
use crate::{Observer, ObserverHandle};

use super::*;

#[tokio::test]
async fn render_aggregates_observers_test() {
    let cluster = Observer::start(
        &Handle::current(),
        StubSource::new(vec![object("a", None), object("b", None)], Vec::new()),
        target(None),
        Vec::new(),
    );
    let namespaced = Observer::start(
        &Handle::current(),
        StubSource::new(vec![object("c", Some("ns"))], Vec::new()),
        target(Some("ns")),
        Vec::new(),
    );

    wait_until(|| count(&cluster) == 2 && count(&namespaced) == 1).await;

    let text = render([&namespaced, &cluster], "x_metric").unwrap();

    assert!(text.contains("ns_testa_cloud_NameA_v1{name=\"c\",namespace=\"ns\"} 1\n"));
    assert!(text.contains("testa_cloud_NameA_v1_resource_count 2\n"));
    assert!(text.ends_with(
        "# HELP x_metric_resources_count_total A metric to count all resources\n\
         # TYPE x_metric_resources_count_total gauge\n\
         x_metric_resources_count_total 3\n"
    ));

    cluster.stop().await;
    namespaced.stop().await;
}

#[test]
fn render_without_observers_test() {
    let text = render(std::iter::empty(), "x_metric").unwrap();

    assert_eq!(
        "# HELP x_metric_resources_count_total A metric to count all resources\n\
         # TYPE x_metric_resources_count_total gauge\n\
         x_metric_resources_count_total 0\n",
        text
    );
}

#[test]
fn render_with_invalid_prefix_fails_test() {
    assert!(render(std::iter::empty(), "1-bad prefix").is_err());
}
