use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use xm_kube::{
    CatalogError, MetricCategory, MetricJoin, MetricSpec, MetricStatus, ResourceScope, ResourceTypeCatalog,
    ResourceTypeDescriptor, SelectionSpec, SpecStore, StoreError, WatchTarget,
};
use xm_observer::ObserverHandle;

use crate::ObserverFactory;

fn unavailable() -> kube::Error {
    kube::Error::SerdeError(serde_json::from_str::<serde_json::Value>("{").unwrap_err())
}

fn descriptor(name: &str, version: &str, kind: &str, scope: ResourceScope, categories: &[&str]) -> ResourceTypeDescriptor {
    let (plural, group) = name.split_once('.').unwrap();
    ResourceTypeDescriptor {
        name: name.to_owned(),
        group: group.to_owned(),
        stored_version: version.to_owned(),
        plural: plural.to_owned(),
        kind: kind.to_owned(),
        scope,
        categories: categories.iter().map(|c| (*c).to_owned()).collect(),
    }
}

/// Resource types known to the test cluster.
pub fn descriptors() -> Vec<ResourceTypeDescriptor> {
    use ResourceScope::{Cluster, Namespaced};
    vec![
        descriptor("nameas.testa.cloud", "v1", "NameA", Namespaced, &["managed", "crda", "crdx"]),
        descriptor("namebs.testa.cloud", "v1beta1", "NameB", Namespaced, &["managed", "crdb"]),
        descriptor("namecs.testb.cloud", "v1", "NameC", Namespaced, &["managed", "crdc", "crdx"]),
        descriptor("nameds.testb.cloud", "v2", "NameD", Namespaced, &["managed", "crdd"]),
        descriptor("namees.testc.cloud", "v1", "NameE", Namespaced, &["managed", "crde"]),
        descriptor("namefs.testc.cloud", "v1", "NameF", Cluster, &["managed", "crdf"]),
        descriptor("namegs.testc.cloud", "v1", "NameG", Namespaced, &["managed", "crdg"]),
    ]
}

pub fn match_name(pattern: &str) -> MetricSpec {
    MetricSpec {
        match_name: Some(pattern.to_owned()),
        ..Default::default()
    }
}

pub fn categories(values: &[&str], join: MetricJoin) -> MetricSpec {
    MetricSpec {
        categories: Some(MetricCategory {
            values: values.iter().map(|v| (*v).to_owned()).collect(),
            join,
        }),
        ..Default::default()
    }
}

/// Catalog returning prepared descriptors, or an error when `None` is set.
pub struct StubCatalog {
    pub descriptors: Mutex<Option<Vec<ResourceTypeDescriptor>>>,
    pub calls: AtomicUsize,
}

impl StubCatalog {
    pub fn new(descriptors: Vec<ResourceTypeDescriptor>) -> Self {
        Self {
            descriptors: Mutex::new(Some(descriptors)),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            descriptors: Mutex::new(None),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn set(&self, descriptors: Option<Vec<ResourceTypeDescriptor>>) {
        *self.descriptors.lock().unwrap() = descriptors;
    }
}

impl ResourceTypeCatalog for StubCatalog {
    async fn list_descriptors(&self) -> Result<Vec<ResourceTypeDescriptor>, CatalogError> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        self.descriptors
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| CatalogError::ListFailed(unavailable()))
    }
}

/// Spec store that records every call.
#[derive(Default)]
pub struct StubStore {
    pub calls: Mutex<Vec<String>>,
    pub statuses: Mutex<BTreeMap<String, MetricStatus>>,
    pub fail_finalizer: bool,
    pub fail_status: bool,
}

impl StubStore {
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn status(&self, spec: &SelectionSpec) -> Option<MetricStatus> {
        self.statuses.lock().unwrap().get(&spec.consumer_id()).cloned()
    }

    fn record(&self, call: &str, spec: &SelectionSpec) {
        self.calls.lock().unwrap().push(format!("{call} {}", spec.consumer_id()));
    }
}

impl SpecStore for StubStore {
    async fn add_finalizer(&self, spec: &SelectionSpec) -> Result<(), StoreError> {
        self.record("add_finalizer", spec);
        if self.fail_finalizer {
            Err(StoreError::PatchFailed(spec.to_string(), unavailable()))
        } else {
            Ok(())
        }
    }

    async fn remove_finalizer(&self, spec: &SelectionSpec) -> Result<(), StoreError> {
        self.record("remove_finalizer", spec);
        Ok(())
    }

    async fn replace_status(&self, spec: &SelectionSpec, status: &MetricStatus) -> Result<(), StoreError> {
        self.record("replace_status", spec);
        if self.fail_status {
            return Err(StoreError::PatchFailed(spec.to_string(), unavailable()));
        }

        self.statuses
            .lock()
            .unwrap()
            .insert(spec.consumer_id(), status.clone());
        Ok(())
    }
}

/// Observer that only counts stop calls.
pub struct StubObserver {
    pub target: WatchTarget,
    pub stops: Arc<AtomicUsize>,
}

impl ObserverHandle for StubObserver {
    async fn stop(&self) {
        self.stops.fetch_add(1, Ordering::Relaxed);
    }
}

/// Factory that counts observer creations per metric name.
#[derive(Default)]
pub struct CountingFactory {
    pub created: Mutex<BTreeMap<String, usize>>,
    pub stops: Arc<AtomicUsize>,
}

impl CountingFactory {
    pub fn created(&self, metric_name: &str) -> usize {
        self.created.lock().unwrap().get(metric_name).copied().unwrap_or_default()
    }

    pub fn total_created(&self) -> usize {
        self.created.lock().unwrap().values().sum()
    }

    pub fn stops(&self) -> usize {
        self.stops.load(Ordering::Relaxed)
    }
}

impl ObserverFactory for CountingFactory {
    type Observer = StubObserver;

    fn create(&self, target: &WatchTarget) -> Self::Observer {
        *self
            .created
            .lock()
            .unwrap()
            .entry(target.metric_name().to_owned())
            .or_default() += 1;

        StubObserver {
            target: target.clone(),
            stops: Arc::clone(&self.stops),
        }
    }
}
