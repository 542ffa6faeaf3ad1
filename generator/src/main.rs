//! k8s-event-generator binary
//!
//! ## Usage
//!
//! ```bash
//! # Post 10 events per second to the "logging" namespace, forever
//! cargo run
//!
//! # Print what would be sent, three loops of five events
//! DRY_RUN=true COUNT=5 MAX_LOOPS=3 cargo run
//! ```
//!
//! ## Environment Variables
//!
//! - `COUNT`: events per loop (default: 10)
//! - `SLEEP`: seconds between loops (default: 1)
//! - `MAX_LOOPS`: loops before exiting (default: run forever)
//! - `NAMESPACE`: target namespace (default: "logging")
//! - `INVOLVEDOBJECT`: `apiVersion,kind,name,uid,resourceVersion`
//! - `DRY_RUN`: print events instead of posting them
//! - `DRY_RUN_FORMAT`: "compact" (default) or "pretty"
//! - `METRICS_PORT`: serve `/metrics` and `/health` on this port
//! - `SEED`: fix the randomizer for reproducible event names
//! - `LOG_FORMAT`: "pretty" (default) or "json"
//! - `RUST_LOG`: log filter (default: "info")

use k8s_event_generator::metrics::Metrics;
use k8s_event_generator::metrics_server::MetricsServer;
use k8s_event_generator::{
    Config, EventSink, Generator, GeneratorConfig, KubeSink, LogFormat, StdoutSink,
};
use std::sync::Arc;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing(LogFormat::from_env()?);

    let config = Config::from_env();
    info!(
        namespace = %config.namespace,
        count = config.count,
        sleep_secs = config.sleep.as_secs(),
        max_loops = ?config.max_loops,
        involved_kind = %config.involved_object.kind,
        involved_name = %config.involved_object.name,
        dry_run = config.dry_run,
        dry_run_format = ?config.dry_run_format,
        "Starting k8s-event-generator"
    );

    let sink: Arc<dyn EventSink> = if config.dry_run {
        Arc::new(StdoutSink::with_format(config.dry_run_format))
    } else {
        let sink = KubeSink::new(config.namespace.clone())
            .await
            .map_err(|e| e.in_sink("kube"))?;
        Arc::new(sink)
    };

    let metrics_handle = match config.metrics_port {
        Some(port) => {
            Metrics::init()?;
            Some(MetricsServer::bind(port, Arc::clone(&sink)).await?.spawn())
        }
        None => None,
    };

    let mut generator = Generator::new(
        Arc::clone(&sink),
        GeneratorConfig::from(&config),
        config.seed,
    );
    let stats = generator.run_until(shutdown_signal()).await;

    if let Err(e) = sink.shutdown().await {
        tracing::error!(error = %e, sink = sink.name(), "Error during shutdown");
    }
    if let Some(handle) = metrics_handle {
        handle.abort();
    }

    info!(
        loops = stats.loops,
        created = stats.created,
        failed = stats.failed,
        "k8s-event-generator finished"
    );
    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter =
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = ?e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = ?e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
    }
}
