//! In-memory sink
//!
//! Keeps every submitted event. Stands in for the cluster in tests and can
//! be told to reject submissions.

use crate::error::SinkError;
use crate::sink::EventSink;
use async_trait::async_trait;
use k8s_openapi::api::core::v1::Event;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

/// Sink that stores events in memory
#[derive(Default)]
pub struct MemorySink {
    events: Mutex<Vec<Event>>,
    /// Reject this many submissions before accepting again
    failures_remaining: AtomicU64,
    rejected: AtomicU64,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject the next `count` submissions
    pub fn failing(count: u64) -> Self {
        Self {
            failures_remaining: AtomicU64::new(count),
            ..Self::default()
        }
    }

    /// Snapshot of accepted events, in submission order
    pub fn events(&self) -> Vec<Event> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    /// Accepted events in one namespace
    pub fn list(&self, namespace: &str) -> Vec<Event> {
        self.events()
            .into_iter()
            .filter(|e| e.metadata.namespace.as_deref() == Some(namespace))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.events.lock().map(|events| events.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of submissions rejected so far
    pub fn rejected(&self) -> u64 {
        self.rejected.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EventSink for MemorySink {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn submit(&self, event: &Event) -> Result<(), SinkError> {
        if self
            .failures_remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
        {
            self.rejected.fetch_add(1, Ordering::SeqCst);
            return Err(SinkError::Submit("simulated failure".into()));
        }

        let mut events = self
            .events
            .lock()
            .map_err(|_| SinkError::Submit("event store poisoned".into()))?;

        // Names are unique per namespace, as on the API server
        let taken = events.iter().any(|e| {
            e.metadata.namespace == event.metadata.namespace && e.metadata.name == event.metadata.name
        });
        if taken {
            return Err(SinkError::Submit(format!(
                "event {} already exists",
                event.metadata.name.as_deref().unwrap_or_default()
            )));
        }

        events.push(event.clone());
        Ok(())
    }

    async fn health(&self) -> bool {
        self.events.lock().is_ok()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

    fn named(namespace: &str, name: &str) -> Event {
        Event {
            metadata: ObjectMeta {
                name: Some(name.into()),
                namespace: Some(namespace.into()),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_stores_and_lists() {
        let sink = MemorySink::new();
        sink.submit(&named("a", "e1")).await.unwrap();
        sink.submit(&named("b", "e1")).await.unwrap();
        sink.submit(&named("a", "e2")).await.unwrap();

        assert_eq!(sink.len(), 3);
        assert_eq!(sink.list("a").len(), 2);
        assert_eq!(sink.list("c").len(), 0);
    }

    #[tokio::test]
    async fn test_rejects_duplicate_name() {
        let sink = MemorySink::new();
        sink.submit(&named("a", "e1")).await.unwrap();
        assert!(sink.submit(&named("a", "e1")).await.is_err());
        assert_eq!(sink.len(), 1);
    }

    #[tokio::test]
    async fn test_failing_then_accepting() {
        let sink = MemorySink::failing(2);
        assert!(sink.submit(&named("a", "e1")).await.is_err());
        assert!(sink.submit(&named("a", "e1")).await.is_err());
        sink.submit(&named("a", "e1")).await.unwrap();

        assert_eq!(sink.rejected(), 2);
        assert_eq!(sink.len(), 1);
        assert!(sink.health().await);
    }
}
