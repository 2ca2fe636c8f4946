use kube::Client;
use tokio::runtime::Handle;
use xm_config::InfoMapping;
use xm_kube::{DynamicSource, WatchTarget};
use xm_observer::{Observer, ObserverHandle};

/// Creates observers for the watch targets acquired in the registry.
pub trait ObserverFactory: Send + Sync + 'static {
    type Observer: ObserverHandle;

    /// Creates and starts observer for the `target`.
    fn create(&self, target: &WatchTarget) -> Self::Observer;
}

/// [`ObserverFactory`] that observes resources through the Kubernetes API.
pub struct KubeObserverFactory {
    client: Client,
    runtime: Handle,
    info_mappings: Vec<InfoMapping>,
}

impl KubeObserverFactory {
    /// Creates new [`KubeObserverFactory`] instance.
    pub fn new(client: Client, runtime: Handle, info_mappings: Vec<InfoMapping>) -> Self {
        Self {
            client,
            runtime,
            info_mappings,
        }
    }
}

impl ObserverFactory for KubeObserverFactory {
    type Observer = Observer;

    fn create(&self, target: &WatchTarget) -> Self::Observer {
        Observer::start(
            &self.runtime,
            DynamicSource::new(self.client.clone(), target.clone()),
            target.clone(),
            self.info_mappings.clone(),
        )
    }
}
