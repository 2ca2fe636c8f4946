pub use self::metric::{
    ClusterMetric, ClusterMetricSpec, Metric, MetricCategory, MetricJoin, MetricSpec, MetricStatus, WatchedResource,
};
pub use self::selection::{FINALIZER_NAME, SelectionSpec, SpecScope};

mod metric;
mod selection;
