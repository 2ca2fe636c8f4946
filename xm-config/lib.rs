pub use self::config::{
    APP_NAME, APP_VERSION, Config, DEFAULT_METRIC_PREFIX, InfoMapping, MetricsServer, Reconcile,
};
pub use self::errors::ConfigError;

mod config;
mod errors;
