use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs::File;
use tokio::io::AsyncReadExt;

use crate::ConfigError;

#[cfg(test)]
#[path = "./config.tests.rs"]
mod config_tests;

pub const APP_NAME: &str = "xmetrics";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");
pub const DEFAULT_METRIC_PREFIX: &str = "x_metric";

/// Metrics endpoint configuration.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct MetricsServer {
    #[serde(default = "default_address")]
    pub address: IpAddr,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Prefix of the global resources count gauge.
    #[serde(default = "default_prefix")]
    pub prefix: String,
}

impl Default for MetricsServer {
    fn default() -> Self {
        Self {
            address: default_address(),
            port: default_port(),
            prefix: default_prefix(),
        }
    }
}

impl MetricsServer {
    /// Returns socket address the metrics endpoint should bind to.
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.address, self.port)
    }
}

/// Reconciliation timing configuration.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Reconcile {
    /// Periodic re-run of every selection spec.
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,

    /// Retry delay after a failed reconciliation.
    #[serde(default = "default_error_requeue_secs")]
    pub error_requeue_secs: u64,
}

impl Default for Reconcile {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
            error_requeue_secs: default_error_requeue_secs(),
        }
    }
}

impl Reconcile {
    /// Returns periodic reconciliation interval.
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs.max(1))
    }

    /// Returns requeue delay used after errors.
    pub fn error_requeue(&self) -> Duration {
        Duration::from_secs(self.error_requeue_secs.max(1))
    }
}

/// Maps a field of the observed object to an `_info` gauge label.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct InfoMapping {
    /// JSON path to the field, e.g. `$.spec.forProvider.region`.
    pub field_path: String,
    pub label: String,
}

/// Application configuration.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub metrics: MetricsServer,

    #[serde(default)]
    pub reconcile: Reconcile,

    #[serde(default)]
    pub info_mappings: Vec<InfoMapping>,
}

fn default_address() -> IpAddr {
    IpAddr::V4(Ipv4Addr::UNSPECIFIED)
}

fn default_port() -> u16 {
    8080
}

fn default_prefix() -> String {
    DEFAULT_METRIC_PREFIX.to_owned()
}

fn default_interval_secs() -> u64 {
    300
}

fn default_error_requeue_secs() -> u64 {
    30
}

impl Config {
    /// Returns the default configuration path: `/etc/xmetrics/config.yaml`.
    pub fn default_path() -> PathBuf {
        PathBuf::from(format!("/etc/{APP_NAME}/config.yaml"))
    }

    /// Loads the configuration from a file.
    pub async fn load(path: &Path) -> Result<Self, ConfigError> {
        let mut file = File::open(path).await?;

        let mut config_str = String::new();
        file.read_to_string(&mut config_str).await?;

        Self::from_yaml(&config_str)
    }

    /// Parses the configuration from a YAML string.
    pub fn from_yaml(config_str: &str) -> Result<Self, ConfigError> {
        if config_str.trim().is_empty() {
            return Ok(Self::default());
        }

        Ok(serde_yaml::from_str::<Config>(config_str)?)
    }

    /// Loads the configuration from a file or returns the default one if the file cannot be used.
    pub async fn load_or_default(path: Option<&Path>) -> Self {
        let default_path = Self::default_path();
        let explicit = path.is_some();
        let path = path.unwrap_or(&default_path);

        match Self::load(path).await {
            Ok(config) => {
                tracing::info!("Configuration loaded from {}", path.display());
                config
            },
            Err(ConfigError::IoError(error)) if !explicit && error.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!("No configuration file at {}, using defaults", path.display());
                Self::default()
            },
            Err(error) => {
                tracing::error!("Cannot load config from {}: {}, using defaults", path.display(), error);
                Self::default()
            },
        }
    }
}
