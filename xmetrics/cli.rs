use clap::Parser;
use std::path::PathBuf;

/// Exposes gauges for custom resources selected by Metric and ClusterMetric objects.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Path to the configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Path to the kube config file.
    #[arg(long)]
    pub kube_config: Option<PathBuf>,

    /// Context to use, defined in kube config
    #[arg(long)]
    pub context: Option<String>,

    /// Port of the metrics endpoint, overrides the configured one
    #[arg(long, env = "XMETRICS_PORT")]
    pub metrics_port: Option<u16>,
}

impl Args {
    /// Returns metrics port or `default` if `--metrics-port` was not given.
    pub fn metrics_port(&self, default: u16) -> u16 {
        self.metrics_port.unwrap_or(default)
    }
}
