use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use warp::http::header::CONTENT_TYPE;
use warp::{Filter, Reply};
use xm_observer::{Observer, render};
use xm_reconcile::{ObserverFactory, WatchRegistry};

#[cfg(test)]
#[path = "./server.tests.rs"]
mod server_tests;

pub const CONTENT_TYPE_TEXT: &str = "text/plain; version=0.0.4";

/// Source of the rendered exposition text.
pub trait MetricsSource: Send + Sync + 'static {
    /// Renders all families and the global resources count gauge.
    fn render(&self, prefix: &str) -> impl Future<Output = String> + Send;
}

impl<F> MetricsSource for WatchRegistry<F>
where
    F: ObserverFactory<Observer = Observer>,
{
    async fn render(&self, prefix: &str) -> String {
        let observers = self.observers().await;
        render(observers.iter().map(|o| o.as_ref()), prefix).unwrap_or_else(|error| {
            tracing::error!("Cannot render metrics: {}", error);
            String::new()
        })
    }
}

/// Builds `GET /metrics` route.
pub fn metrics_route<M: MetricsSource>(
    source: Arc<M>,
    prefix: String,
) -> impl Filter<Extract = (impl Reply,), Error = warp::Rejection> + Clone {
    let prefix = Arc::new(prefix);
    warp::get()
        .and(warp::path!("metrics"))
        .and(warp::any().map(move || Arc::clone(&source)))
        .and(warp::any().map(move || Arc::clone(&prefix)))
        .and_then(metrics_handler::<M>)
}

async fn metrics_handler<M: MetricsSource>(source: Arc<M>, prefix: Arc<String>) -> Result<impl Reply, Infallible> {
    let text = source.render(&prefix).await;
    Ok(warp::reply::with_header(text, CONTENT_TYPE, CONTENT_TYPE_TEXT))
}

/// Binds the metrics endpoint to `address` and serves it until `cancellation_token` is cancelled.
pub fn serve<M: MetricsSource>(
    source: Arc<M>,
    prefix: String,
    address: SocketAddr,
    cancellation_token: CancellationToken,
) -> anyhow::Result<impl Future<Output = ()>> {
    let route = metrics_route(source, prefix);
    let (bound, server) = warp::serve(route).try_bind_with_graceful_shutdown(address, async move {
        cancellation_token.cancelled().await;
    })?;
    tracing::info!("Metrics endpoint listening on http://{}/metrics", bound);

    Ok(server)
}
