use anyhow::Result;
use tracing_error::ErrorLayer;
use tracing_subscriber::{Layer, layer::SubscriberExt, util::SubscriberInitExt};

/// Initializes logging to the standard output and returns worker guard that will flush logs on drop.\
/// **Note** that `RUST_LOG` environment variable overrides the default filter.
pub fn initialize(app_name: &str) -> Result<tracing_appender::non_blocking::WorkerGuard> {
    let (non_blocking_appender, guard) = tracing_appender::non_blocking(std::io::stdout());

    let timer = time::format_description::parse("[year]-[month padding:zero]-[day padding:zero] [hour]:[minute]:[second]")?;
    let time_offset = time::UtcOffset::current_local_offset().unwrap_or(time::UtcOffset::UTC);
    let timer = tracing_subscriber::fmt::time::OffsetTime::new(time_offset, timer);

    let crate_name = app_name.replace('-', "_");
    let env = format!("warn,{crate_name}=info,xm_kube=info,xm_observer=info,xm_reconcile=info");
    let env_filter = tracing_subscriber::filter::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::filter::EnvFilter::new(env));

    #[cfg(debug_assertions)]
    let stdout_subscriber = tracing_subscriber::fmt::layer()
        .compact()
        .with_file(true)
        .with_line_number(true)
        .with_target(true)
        .with_thread_ids(true)
        .with_timer(timer)
        .with_ansi(false)
        .with_writer(non_blocking_appender)
        .with_filter(env_filter);

    #[cfg(not(debug_assertions))]
    let stdout_subscriber = tracing_subscriber::fmt::layer()
        .compact()
        .with_target(true)
        .with_timer(timer)
        .with_ansi(false)
        .with_writer(non_blocking_appender)
        .with_filter(env_filter);

    tracing_subscriber::registry()
        .with(stdout_subscriber)
        .with(ErrorLayer::default())
        .init();

    Ok(guard)
}
