use futures::StreamExt;
use kube::runtime::controller::Action;
use kube::runtime::{Controller, watcher};
use kube::{Api, Client, Resource};
use serde::de::DeserializeOwned;
use std::fmt::Debug;
use std::sync::Arc;
use std::time::Duration;
use xm_config::Reconcile;
use xm_kube::{ClusterMetric, CrdCatalog, KubeSpecStore, Metric, SelectionSpec};
use xm_reconcile::{KubeObserverFactory, ReconcileEngine, ReconcileError, ReconcileOutcome};

pub type Engine = ReconcileEngine<CrdCatalog, KubeSpecStore, KubeObserverFactory>;

/// Possible errors from the controller reconcile function.
#[derive(thiserror::Error, Debug)]
pub enum ControllerError {
    /// Reconcile pass failed.
    #[error("{spec} not reconciled: {source}")]
    ReconcileFailed {
        spec: String,
        #[source]
        source: ReconcileError,
    },
}

/// Shared state of both controllers.
pub struct Context {
    engine: Arc<Engine>,
    interval: Duration,
    error_requeue: Duration,
}

impl Context {
    /// Creates new [`Context`] instance.
    pub fn new(engine: Arc<Engine>, config: &Reconcile) -> Self {
        Self {
            engine,
            interval: config.interval(),
            error_requeue: config.error_requeue(),
        }
    }
}

/// Runs controllers for [`Metric`] and [`ClusterMetric`] until both of them end.
pub async fn run(client: Client, context: Arc<Context>) {
    tokio::join!(
        run_controller(Api::<Metric>::all(client.clone()), Arc::clone(&context)),
        run_controller(Api::<ClusterMetric>::all(client), context),
    );
}

async fn run_controller<K>(api: Api<K>, context: Arc<Context>)
where
    K: Resource + Clone + DeserializeOwned + Debug + Send + Sync + 'static,
    K::DynamicType: Default + Eq + std::hash::Hash + Clone + Debug + Unpin,
    for<'a> SelectionSpec: From<&'a K>,
{
    let kind = K::kind(&K::DynamicType::default()).into_owned();
    tracing::info!("Starting {} controller", kind);

    Controller::new(api, watcher::Config::default())
        .run(reconcile::<K>, error_policy::<K>, context)
        .for_each(|result| async move {
            match result {
                Ok((object, _)) => tracing::trace!("Reconciled {}", object),
                Err(error) => tracing::warn!("Reconcile failed: {}", error),
            }
        })
        .await;

    tracing::warn!("{} controller stopped", kind);
}

async fn reconcile<K>(object: Arc<K>, context: Arc<Context>) -> Result<Action, ControllerError>
where
    for<'a> SelectionSpec: From<&'a K>,
{
    let spec = SelectionSpec::from(object.as_ref());
    match context.engine.reconcile(&spec).await {
        Ok(ReconcileOutcome::Reconciled { .. }) => Ok(Action::requeue(context.interval)),
        Ok(ReconcileOutcome::CleanedUp { .. } | ReconcileOutcome::Skipped) => Ok(Action::await_change()),
        Err(source) => Err(ControllerError::ReconcileFailed {
            spec: spec.to_string(),
            source,
        }),
    }
}

fn error_policy<K>(_object: Arc<K>, error: &ControllerError, context: Arc<Context>) -> Action {
    tracing::warn!("{}, retrying in {}s", error, context.error_requeue.as_secs());
    Action::requeue(context.error_requeue)
}
