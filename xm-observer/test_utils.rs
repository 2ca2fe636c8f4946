use futures::StreamExt;
use futures::stream;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::Time;
use kube::api::{ApiResource, DynamicObject};
use kube::runtime::watcher::{self, Event};
use serde_json::{Value, json};
use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use xm_kube::{InstanceSource, InstanceStream, WatchTarget};

use crate::Observer;

pub fn target(namespace: Option<&str>) -> WatchTarget {
    WatchTarget::new("testa.cloud", "v1", "nameas", "NameA").in_namespace(namespace)
}

pub fn object(name: &str, namespace: Option<&str>) -> DynamicObject {
    let ar = ApiResource {
        group: "testa.cloud".to_owned(),
        version: "v1".to_owned(),
        api_version: "testa.cloud/v1".to_owned(),
        kind: "NameA".to_owned(),
        plural: "nameas".to_owned(),
    };
    let mut object = DynamicObject::new(name, &ar);
    object.metadata.namespace = namespace.map(String::from);
    object.metadata.creation_timestamp = "2024-01-01T00:00:00Z".parse().ok().map(Time);
    object
}

pub fn with_labels(mut object: DynamicObject, labels: &[(&str, &str)]) -> DynamicObject {
    object.metadata.labels = Some(labels.iter().map(|(k, v)| ((*k).to_owned(), (*v).to_owned())).collect());
    object
}

pub fn with_data(mut object: DynamicObject, data: Value) -> DynamicObject {
    object.data = data;
    object
}

pub fn ready_object(name: &str, namespace: Option<&str>) -> DynamicObject {
    with_data(
        object(name, namespace),
        json!({ "status": { "conditions": [
            { "type": "Ready", "status": "True", "lastTransitionTime": "2024-01-01T00:01:00Z" },
            { "type": "Synced", "status": "False" },
        ]}}),
    )
}

pub fn count(observer: &Observer) -> usize {
    observer.count_and_identity().1
}

pub fn rendered(observer: &Observer) -> String {
    let mut families = Vec::new();
    observer.render_into(&mut families);
    crate::encode(&families).unwrap()
}

/// [`InstanceSource`] that serves prepared list results and watch event batches.\
/// Each batch is preceded by `watch_errors` errors. Once all batches are consumed new watch streams never yield.
#[derive(Default)]
pub struct StubSource {
    pub listed: Vec<DynamicObject>,
    pub fail_list: bool,
    pub watch_errors: usize,
    pub batches: Mutex<VecDeque<Vec<Event<DynamicObject>>>>,
    pub watch_calls: AtomicUsize,
}

impl StubSource {
    pub fn new(listed: Vec<DynamicObject>, batches: Vec<Vec<Event<DynamicObject>>>) -> Self {
        Self {
            listed,
            fail_list: false,
            watch_errors: 0,
            batches: Mutex::new(batches.into()),
            watch_calls: AtomicUsize::new(0),
        }
    }
}

impl InstanceSource for StubSource {
    async fn list(&self) -> Result<Vec<DynamicObject>, kube::Error> {
        if self.fail_list {
            Err(serde_error())
        } else {
            Ok(self.listed.clone())
        }
    }

    fn watch(&self) -> InstanceStream {
        self.watch_calls.fetch_add(1, Ordering::Relaxed);
        match self.batches.lock().unwrap().pop_front() {
            Some(batch) => {
                let errors = (0..self.watch_errors).map(|_| Err(watcher::Error::WatchFailed(serde_error())));
                stream::iter(errors.chain(batch.into_iter().map(Ok)))
                    .chain(stream::pending())
                    .boxed()
            },
            None => stream::pending().boxed(),
        }
    }
}

fn serde_error() -> kube::Error {
    kube::Error::SerdeError(serde_json::from_str::<Value>("{").unwrap_err())
}

/// Waits until `condition` is met, panics after about five seconds.
pub async fn wait_until(condition: impl Fn() -> bool) {
    for _ in 0..500 {
        if condition() {
            return;
        }

        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    panic!("condition was not met in time");
}
