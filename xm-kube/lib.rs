pub use self::api::{
    ClusterMetric, ClusterMetricSpec, FINALIZER_NAME, Metric, MetricCategory, MetricJoin, MetricSpec, MetricStatus,
    SelectionSpec, SpecScope, WatchedResource,
};
pub use self::catalog::{CatalogError, CrdCatalog, ResourceTypeCatalog};
pub use self::core::{ResourceScope, ResourceTypeDescriptor, WatchTarget};
pub use self::instances::{DynamicSource, InstanceSource, InstanceStream};
pub use self::store::{KubeSpecStore, SpecStore, StoreError};
pub use self::utils::{ConditionValue, get_condition, get_creation_timestamp, get_object_key};

pub mod client;

mod api;
mod catalog;
mod core;
mod instances;
mod store;
mod utils;
