use futures::StreamExt;
use futures::stream::BoxStream;
use kube::api::{DynamicObject, ListParams};
use kube::runtime::watcher::{self, Event, watcher};
use kube::{Api, Client};
use std::future::Future;

use crate::WatchTarget;

pub type InstanceStream = BoxStream<'static, Result<Event<DynamicObject>, watcher::Error>>;

/// Lists and streams instances of one resource type.
pub trait InstanceSource: Send + Sync + 'static {
    /// Lists all current instances.
    fn list(&self) -> impl Future<Output = Result<Vec<DynamicObject>, kube::Error>> + Send;

    /// Returns list-then-watch stream of instance events.\
    /// **Note** that the stream keeps going after an error, pacing the retries is up to the consumer.
    fn watch(&self) -> InstanceStream;
}

/// [`InstanceSource`] backed by the dynamic Kubernetes API.
pub struct DynamicSource {
    client: Client,
    target: WatchTarget,
}

impl DynamicSource {
    /// Creates new [`DynamicSource`] instance for the target.
    pub fn new(client: Client, target: WatchTarget) -> Self {
        Self { client, target }
    }

    fn get_api(&self) -> Api<DynamicObject> {
        let ar = self.target.api_resource();
        match self.target.namespace.as_deref() {
            Some(namespace) => Api::namespaced_with(self.client.clone(), namespace, &ar),
            None => Api::all_with(self.client.clone(), &ar),
        }
    }
}

impl InstanceSource for DynamicSource {
    async fn list(&self) -> Result<Vec<DynamicObject>, kube::Error> {
        Ok(self.get_api().list(&ListParams::default()).await?.items)
    }

    fn watch(&self) -> InstanceStream {
        watcher(self.get_api(), watcher::Config::default()).boxed()
    }
}
