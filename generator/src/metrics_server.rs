//! HTTP server for the Prometheus endpoint
//!
//! Only started when `METRICS_PORT` is set. `/health` reflects the sink's
//! own health check, so a generator that cannot reach the API server shows
//! up as unhealthy.

use crate::error::Result;
use crate::sink::EventSink;
use axum::extract::State;
use axum::{Router, http::StatusCode, response::IntoResponse, routing::get};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tracing::{error, info};

/// Metrics HTTP server, bound but not yet serving
pub struct MetricsServer {
    listener: TcpListener,
    sink: Arc<dyn EventSink>,
}

impl MetricsServer {
    /// Bind on all interfaces. Port 0 picks a free port.
    pub async fn bind(port: u16, sink: Arc<dyn EventSink>) -> Result<Self> {
        let addr = SocketAddr::from(([0, 0, 0, 0], port));
        let listener = TcpListener::bind(addr).await?;
        Ok(Self { listener, sink })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Serve in the background until the handle is aborted
    pub fn spawn(self) -> JoinHandle<()> {
        let addr = self.listener.local_addr().ok();
        let app = router(self.sink);

        tokio::spawn(async move {
            info!(addr = ?addr, "Metrics server listening");
            if let Err(e) = axum::serve(self.listener, app).await {
                error!(error = %e, "Metrics server error");
            }
        })
    }
}

fn router(sink: Arc<dyn EventSink>) -> Router {
    Router::new()
        .route("/metrics", get(metrics_handler))
        .route("/health", get(health_handler))
        .with_state(sink)
}

async fn metrics_handler() -> impl IntoResponse {
    (
        StatusCode::OK,
        [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
        crate::metrics::gather(),
    )
}

async fn health_handler(State(sink): State<Arc<dyn EventSink>>) -> impl IntoResponse {
    if sink.health().await {
        (StatusCode::OK, "OK")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "sink unhealthy")
    }
}
