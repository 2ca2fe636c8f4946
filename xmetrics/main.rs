use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use tokio::runtime::{Builder, Handle};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use xm_common::tasks::wait_for_task;
use xm_config::{APP_NAME, APP_VERSION, Config};
use xm_kube::client::KubernetesClient;
use xm_kube::{CrdCatalog, KubeSpecStore};
use xm_reconcile::{KubeObserverFactory, ReconcileEngine, WatchRegistry};

pub mod cli;
pub mod controller;
pub mod server;

fn main() -> Result<()> {
    let args = cli::Args::parse();

    let _logging_guard = xm_common::logging::initialize(APP_NAME)?;
    info!("{} v{} started", APP_NAME, APP_VERSION);

    if let Err(error) = run_application(&args) {
        error!("{} v{} terminated with an error: {}", APP_NAME, APP_VERSION, error);
        Err(error)
    } else {
        info!("{} v{} stopped", APP_NAME, APP_VERSION);
        Ok(())
    }
}

fn run_application(args: &cli::Args) -> Result<()> {
    let rt = Builder::new_multi_thread().enable_all().build()?;
    rt.block_on(run(args, rt.handle().clone()))
}

async fn run(args: &cli::Args, runtime: Handle) -> Result<()> {
    let mut config = Config::load_or_default(args.config.as_deref()).await;
    config.metrics.port = args.metrics_port(config.metrics.port);

    let client = KubernetesClient::new(args.kube_config.as_deref(), args.context.as_deref()).await?;
    match client.k8s_version().await {
        Ok(version) => info!("Connected to Kubernetes {}", version),
        Err(error) => warn!("Cannot read Kubernetes version: {}", error),
    }

    let factory = KubeObserverFactory::new(client.get_client(), runtime, config.info_mappings.clone());
    let registry = Arc::new(WatchRegistry::new(factory));
    let engine = Arc::new(ReconcileEngine::new(
        CrdCatalog::new(client.get_client()),
        KubeSpecStore::new(client.get_client()),
        Arc::clone(&registry),
        &config.metrics.prefix,
    ));

    let cancellation_token = CancellationToken::new();
    let server = server::serve(
        Arc::clone(&registry),
        config.metrics.prefix.clone(),
        config.metrics.socket_addr(),
        cancellation_token.clone(),
    )?;
    let server = tokio::spawn(server);

    let context = Arc::new(controller::Context::new(engine, &config.reconcile));
    tokio::select! {
        () = controller::run(client.get_client(), context) => warn!("All controllers stopped, shutting down"),
        result = tokio::signal::ctrl_c() => match result {
            Ok(()) => info!("Shutdown requested"),
            Err(error) => error!("Cannot listen for the shutdown signal: {}", error),
        },
    }

    cancellation_token.cancel();
    wait_for_task(Some(server), "metrics server").await;
    registry.stop_all().await;

    Ok(())
}
