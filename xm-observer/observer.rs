use futures::StreamExt;
use kube::api::DynamicObject;
use kube::runtime::watcher::Event;
use prometheus::core::{Collector, Desc};
use prometheus::proto::MetricFamily;
use std::collections::BTreeMap;
use std::future::Future;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use xm_common::ResettableBackoff;
use xm_config::InfoMapping;
use xm_kube::{InstanceSource, WatchTarget, get_object_key};

use crate::{InstanceRecord, ObserverState, families};

#[cfg(test)]
#[path = "./observer.tests.rs"]
mod observer_tests;

/// Handle to a running observation that can be stopped.
pub trait ObserverHandle: Send + Sync + 'static {
    /// Stops observation and waits until it is finished.\
    /// **Note** that calling it more than once is a no-op.
    fn stop(&self) -> impl Future<Output = ()> + Send;
}

/// Live instances of the observed resource type, keyed by `namespace/name`.
#[derive(Default)]
struct InstanceStore {
    items: RwLock<BTreeMap<String, InstanceRecord>>,
}

impl InstanceStore {
    fn len(&self) -> usize {
        self.items.read().map(|items| items.len()).unwrap_or_default()
    }

    fn replace(&self, new_items: BTreeMap<String, InstanceRecord>) {
        if let Ok(mut items) = self.items.write() {
            *items = new_items;
        }
    }

    fn upsert(&self, key: String, record: InstanceRecord) {
        if let Ok(mut items) = self.items.write() {
            items.insert(key, record);
        }
    }

    fn remove(&self, key: &str) {
        if let Ok(mut items) = self.items.write() {
            items.remove(key);
        }
    }
}

/// Background observer of one resource type.\
/// It lists the instances first and then keeps them current from the watch stream.
pub struct Observer {
    target: WatchTarget,
    descs: Vec<Desc>,
    store: Arc<InstanceStore>,
    state: Arc<AtomicU8>,
    cancellation_token: CancellationToken,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl Observer {
    /// Creates new [`Observer`] instance and starts its background task on the `runtime`.
    pub fn start<S: InstanceSource>(
        runtime: &Handle,
        source: S,
        target: WatchTarget,
        info_mappings: Vec<InfoMapping>,
    ) -> Self {
        let store = Arc::new(InstanceStore::default());
        let state = Arc::new(AtomicU8::new(ObserverState::Initializing.into()));
        let cancellation_token = CancellationToken::new();

        let processor = EventsProcessor {
            target: target.to_string(),
            store: Arc::clone(&store),
            state: Arc::clone(&state),
            info_mappings,
            init_buffer: None,
        };
        let task = runtime.spawn(observe(source, processor, cancellation_token.clone()));
        tracing::info!("Observer for {} started", target);

        Self {
            descs: families::build_descs(target.metric_name(), target.namespace.is_some()),
            target,
            store,
            state,
            cancellation_token,
            task: Mutex::new(Some(task)),
        }
    }

    /// Returns observed target together with the live instance count.
    pub fn count_and_identity(&self) -> (WatchTarget, usize) {
        (self.target.clone(), self.store.len())
    }

    /// Returns current observer state.
    pub fn state(&self) -> ObserverState {
        self.state.load(Ordering::Relaxed).into()
    }

    /// Appends metric families of all live instances to the `sink`.\
    /// Returns the instance count the families were built from.
    pub fn render_into(&self, sink: &mut Vec<MetricFamily>) -> usize {
        let Ok(items) = self.store.items.read() else {
            return 0;
        };

        sink.extend(families::build_families(
            self.target.metric_name(),
            self.target.namespace.is_some(),
            &items,
        ));

        items.len()
    }

    /// Cancels the background task without waiting for it.
    pub fn cancel(&self) {
        self.cancellation_token.cancel();
        self.state.store(ObserverState::Stopped.into(), Ordering::Relaxed);
    }
}

impl Collector for Observer {
    fn desc(&self) -> Vec<&Desc> {
        self.descs.iter().collect()
    }

    fn collect(&self) -> Vec<MetricFamily> {
        let mut families = Vec::new();
        self.render_into(&mut families);
        families
    }
}

impl ObserverHandle for Observer {
    async fn stop(&self) {
        self.cancel();
        let task = self.task.lock().ok().and_then(|mut task| task.take());
        if task.is_some() {
            xm_common::tasks::wait_for_task(task, "observer").await;
            tracing::info!("Observer for {} stopped", self.target);
        }
    }
}

impl Drop for Observer {
    fn drop(&mut self) {
        self.cancel();
    }
}

async fn observe<S: InstanceSource>(source: S, mut processor: EventsProcessor, cancellation_token: CancellationToken) {
    tokio::select! {
        biased;
        () = cancellation_token.cancelled() => return,
        result = source.list() => match result {
            Ok(objects) => processor.seed(objects),
            Err(error) => tracing::warn!("Cannot list {}: {}", processor.target, error),
        },
    }

    let mut backoff = ResettableBackoff::default();
    while !cancellation_token.is_cancelled() {
        let mut watch = source.watch();

        loop {
            tokio::select! {
                biased;
                () = cancellation_token.cancelled() => return,
                event = watch.next() => match event {
                    Some(Ok(event)) => {
                        if !matches!(event, Event::Init) {
                            backoff.reset();
                        }

                        processor.process_event(event);
                    },
                    Some(Err(error)) => {
                        let delay = backoff.next_backoff();
                        tracing::warn!("Watch {}: {}, retrying in {:?}", processor.target, error, delay);
                        tokio::select! {
                            biased;
                            () = cancellation_token.cancelled() => return,
                            () = tokio::time::sleep(delay) => (),
                        }
                    },
                    None => break,
                },
            }
        }

        let delay = backoff.next_backoff();
        tracing::debug!("Watch stream for {} ended, restarting in {:?}", processor.target, delay);
        tokio::select! {
            biased;
            () = cancellation_token.cancelled() => return,
            () = tokio::time::sleep(delay) => (),
        }
    }
}

/// Applies instance events to the shared store.
struct EventsProcessor {
    target: String,
    store: Arc<InstanceStore>,
    state: Arc<AtomicU8>,
    info_mappings: Vec<InfoMapping>,
    init_buffer: Option<BTreeMap<String, InstanceRecord>>,
}

impl EventsProcessor {
    /// Replaces store content with the initial list result.
    fn seed(&mut self, objects: Vec<DynamicObject>) {
        let items = objects.iter().map(|o| self.to_entry(o)).collect();
        self.store.replace(items);
        self.set_syncing();
    }

    fn process_event(&mut self, event: Event<DynamicObject>) {
        match event {
            Event::Init => self.init_buffer = Some(BTreeMap::new()),
            Event::InitApply(object) => {
                let (key, record) = self.to_entry(&object);
                match self.init_buffer.as_mut() {
                    Some(buffer) => {
                        buffer.insert(key, record);
                    },
                    None => self.store.upsert(key, record),
                }
            },
            Event::InitDone => {
                if let Some(buffer) = self.init_buffer.take() {
                    self.store.replace(buffer);
                }

                self.set_syncing();
            },
            Event::Apply(object) => {
                let (key, record) = self.to_entry(&object);
                self.store.upsert(key, record);
            },
            Event::Delete(object) => self.store.remove(&get_object_key(&object)),
        }
    }

    fn to_entry(&self, object: &DynamicObject) -> (String, InstanceRecord) {
        (get_object_key(object), InstanceRecord::new(object, &self.info_mappings))
    }

    fn set_syncing(&self) {
        let _ = self.state.compare_exchange(
            ObserverState::Initializing.into(),
            ObserverState::Syncing.into(),
            Ordering::Relaxed,
            Ordering::Relaxed,
        );
    }
}
