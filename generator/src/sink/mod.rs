//! Event sinks
//!
//! A sink is where generated events go: the cluster's Event API, stdout in
//! dry-run mode, or memory in tests. The generator only ever talks to the
//! [`EventSink`] trait.

pub mod k8s;
pub mod memory;
pub mod stdout;

use crate::error::SinkError;
use async_trait::async_trait;
use k8s_openapi::api::core::v1::Event;

pub use k8s::KubeSink;
pub use memory::MemorySink;
pub use stdout::StdoutSink;

/// Sink trait - receives generated Events
///
/// # Example
///
/// ```ignore
/// struct CountingSink(AtomicU64);
///
/// #[async_trait]
/// impl EventSink for CountingSink {
///     fn name(&self) -> &'static str { "counting" }
///
///     async fn submit(&self, _event: &Event) -> Result<(), SinkError> {
///         self.0.fetch_add(1, Ordering::Relaxed);
///         Ok(())
///     }
///
///     async fn health(&self) -> bool { true }
/// }
/// ```
#[async_trait]
pub trait EventSink: Send + Sync {
    /// Sink name for identification and logging
    fn name(&self) -> &'static str;

    /// Submit a single event
    async fn submit(&self, event: &Event) -> Result<(), SinkError>;

    /// Returns true if the destination is reachable and accepting events.
    async fn health(&self) -> bool;

    /// Called once the generator has stopped
    async fn shutdown(&self) -> Result<(), SinkError> {
        Ok(())
    }
}
