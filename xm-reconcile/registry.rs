use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tokio::sync::Mutex;
use xm_kube::WatchTarget;
use xm_observer::ObserverHandle;

use crate::{ObserverFactory, Removal, SharedWatch};

#[cfg(test)]
#[path = "./registry.tests.rs"]
mod registry_tests;

/// Read-only view of one registry entry.
pub struct WatchEntry<O> {
    pub metric_name: String,
    pub target: WatchTarget,
    pub observer: Arc<O>,
    pub consumers: BTreeMap<String, usize>,
}

/// Reference counted registry of shared observers, keyed by metric name.\
/// An entry exists only while at least one consumer holds it.
pub struct WatchRegistry<F: ObserverFactory> {
    factory: F,
    watches: Mutex<BTreeMap<String, SharedWatch<F::Observer>>>,
}

impl<F: ObserverFactory> WatchRegistry<F> {
    /// Creates new [`WatchRegistry`] instance.
    pub fn new(factory: F) -> Self {
        Self {
            factory,
            watches: Mutex::new(BTreeMap::new()),
        }
    }

    /// Returns factory used to create observers.
    pub fn factory(&self) -> &F {
        &self.factory
    }

    /// Adds `consumer` to the watch of the `target`'s metric name, creating the observer on first use.\
    /// Returns `true` if a new observer was created.
    pub async fn acquire(&self, target: &WatchTarget, consumer: &str) -> bool {
        let mut watches = self.watches.lock().await;
        if let Some(watch) = watches.get_mut(target.metric_name()) {
            if !watch.add(consumer) {
                tracing::debug!("{} already holds watch {}", consumer, target.metric_name());
            }

            return false;
        }

        let observer = self.factory.create(target);
        watches.insert(
            target.metric_name().to_owned(),
            SharedWatch::new(target.clone(), observer, consumer),
        );
        tracing::info!("Watch {} created for {}", target.metric_name(), consumer);

        true
    }

    /// Removes `consumer` from the watch of the `metric_name`.\
    /// Stops and removes the observer if it was the last consumer, returning `true` in that case.\
    /// **Note** that the registry stays locked until the observer is stopped.
    pub async fn release(&self, metric_name: &str, consumer: &str) -> bool {
        let mut watches = self.watches.lock().await;
        let Some(watch) = watches.get_mut(metric_name) else {
            return false;
        };

        match watch.remove(consumer) {
            Removal::Emptied => {
                if let Some(watch) = watches.remove(metric_name) {
                    watch.observer().stop().await;
                }

                tracing::info!("Watch {} released by its last consumer {}", metric_name, consumer);
                true
            },
            Removal::Retained | Removal::NotFound => false,
        }
    }

    /// Returns read-only view of all registry entries.
    pub async fn snapshot(&self) -> Vec<WatchEntry<F::Observer>> {
        self.watches
            .lock()
            .await
            .iter()
            .map(|(name, watch)| WatchEntry {
                metric_name: name.clone(),
                target: watch.target().clone(),
                observer: Arc::clone(watch.observer()),
                consumers: watch.consumers().clone(),
            })
            .collect()
    }

    /// Returns all live observers in metric name order.
    pub async fn observers(&self) -> Vec<Arc<F::Observer>> {
        self.watches
            .lock()
            .await
            .values()
            .map(|w| Arc::clone(w.observer()))
            .collect()
    }

    /// Returns metric names currently held by the `consumer`.
    pub async fn consumer_metrics(&self, consumer: &str) -> BTreeSet<String> {
        self.watches
            .lock()
            .await
            .iter()
            .filter(|(_, watch)| watch.has_consumer(consumer))
            .map(|(name, _)| name.clone())
            .collect()
    }

    pub async fn len(&self) -> usize {
        self.watches.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.watches.lock().await.is_empty()
    }

    /// Stops all observers and clears the registry.
    pub async fn stop_all(&self) {
        let mut watches = self.watches.lock().await;
        for (_, watch) in std::mem::take(&mut *watches) {
            watch.observer().stop().await;
        }
    }
}
