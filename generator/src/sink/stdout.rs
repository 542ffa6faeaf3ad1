//! Stdout sink for dry runs
//!
//! Prints events instead of posting them. Useful to check what a given
//! configuration would send without touching a cluster.

use crate::config::DryRunFormat;
use crate::error::SinkError;
use crate::sink::EventSink;
use async_trait::async_trait;
use k8s_openapi::api::core::v1::Event;
use std::io::Write;
use std::sync::atomic::{AtomicU64, Ordering};

/// Stdout sink - prints events for dry runs
pub struct StdoutSink {
    /// Print the full event as JSON
    pretty: bool,
    /// Count of events printed
    submitted_count: AtomicU64,
}

impl StdoutSink {
    /// One line per event
    pub fn new() -> Self {
        Self {
            pretty: false,
            submitted_count: AtomicU64::new(0),
        }
    }

    /// Full JSON per event
    pub fn pretty() -> Self {
        Self {
            pretty: true,
            submitted_count: AtomicU64::new(0),
        }
    }

    /// Sink for the configured dry-run format
    pub fn with_format(format: DryRunFormat) -> Self {
        match format {
            DryRunFormat::Compact => Self::new(),
            DryRunFormat::Pretty => Self::pretty(),
        }
    }

    /// Get total events printed
    pub fn submitted_count(&self) -> u64 {
        self.submitted_count.load(Ordering::Relaxed)
    }

    fn render(&self, event: &Event) -> Result<String, SinkError> {
        if self.pretty {
            return serde_json::to_string_pretty(event)
                .map_err(|e| SinkError::Submit(format!("serialize event: {e}")));
        }

        let involved = &event.involved_object;
        Ok(format!(
            "[{}] {}/{} {} -> {}/{} ({})",
            event.type_.as_deref().unwrap_or_default(),
            event.metadata.namespace.as_deref().unwrap_or_default(),
            event.metadata.name.as_deref().unwrap_or_default(),
            event.reason.as_deref().unwrap_or_default(),
            involved.kind.as_deref().unwrap_or_default(),
            involved.name.as_deref().unwrap_or_default(),
            event.message.as_deref().unwrap_or_default(),
        ))
    }
}

impl Default for StdoutSink {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventSink for StdoutSink {
    fn name(&self) -> &'static str {
        "stdout"
    }

    async fn submit(&self, event: &Event) -> Result<(), SinkError> {
        let line = self.render(event)?;
        writeln!(std::io::stdout().lock(), "{line}")
            .map_err(|e| SinkError::Submit(format!("write stdout: {e}")))?;

        self.submitted_count.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    async fn health(&self) -> bool {
        true
    }

    async fn shutdown(&self) -> Result<(), SinkError> {
        std::io::stdout()
            .flush()
            .map_err(|e| SinkError::Shutdown(format!("flush stdout: {e}")))?;
        tracing::info!(printed = self.submitted_count(), "stdout sink shutdown");
        Ok(())
    }
}
