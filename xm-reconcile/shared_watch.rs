use std::collections::BTreeMap;
use std::sync::Arc;
use xm_kube::WatchTarget;

#[cfg(test)]
#[path = "./shared_watch.tests.rs"]
mod shared_watch_tests;

/// Result of removing a consumer from the [`SharedWatch`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Removal {
    /// Other consumers still hold the watch.
    Retained,

    /// Last consumer was removed, the watch is closed now.
    Emptied,

    /// Consumer was not registered or the watch is already closed.
    NotFound,
}

/// Observer shared by all consumers interested in the same metric name.\
/// Every consumer keeps its registration count, a repeated add only increases that count.
pub struct SharedWatch<O> {
    target: WatchTarget,
    observer: Arc<O>,
    consumers: BTreeMap<String, usize>,
    closed: bool,
}

impl<O> SharedWatch<O> {
    /// Creates new [`SharedWatch`] instance held by the first `consumer`.
    pub fn new(target: WatchTarget, observer: O, consumer: &str) -> Self {
        Self {
            target,
            observer: Arc::new(observer),
            consumers: BTreeMap::from([(consumer.to_owned(), 1)]),
            closed: false,
        }
    }

    /// Adds `consumer` to the watch.\
    /// Returns `true` if the consumer was not registered before.
    pub fn add(&mut self, consumer: &str) -> bool {
        let count = self.consumers.entry(consumer.to_owned()).or_default();
        *count += 1;
        *count == 1
    }

    /// Removes `consumer` from the watch, closing it when no consumers are left.
    pub fn remove(&mut self, consumer: &str) -> Removal {
        if self.closed || self.consumers.remove(consumer).is_none() {
            return Removal::NotFound;
        }

        if self.consumers.is_empty() {
            self.closed = true;
            Removal::Emptied
        } else {
            Removal::Retained
        }
    }

    /// Returns `true` if `consumer` holds this watch.
    pub fn has_consumer(&self, consumer: &str) -> bool {
        self.consumers.contains_key(consumer)
    }

    /// Returns consumers together with their registration counts.
    pub fn consumers(&self) -> &BTreeMap<String, usize> {
        &self.consumers
    }

    pub fn target(&self) -> &WatchTarget {
        &self.target
    }

    pub fn observer(&self) -> &Arc<O> {
        &self.observer
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }
}
