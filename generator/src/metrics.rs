//! Prometheus metrics for the event generator

use crate::error::{GeneratorError, Result};
use prometheus::{
    CounterVec, Encoder, Histogram, IntCounter, TextEncoder, register_counter_vec,
    register_histogram, register_int_counter,
};
use std::sync::{Mutex, OnceLock};

/// Global metrics instance
static METRICS: OnceLock<Metrics> = OnceLock::new();

/// Serializes registration against the global registry
static INIT_LOCK: Mutex<()> = Mutex::new(());

/// All generator metrics
pub struct Metrics {
    /// Events accepted by the sink (by namespace)
    pub events_created: CounterVec,

    /// Events the sink rejected (by namespace)
    pub events_failed: CounterVec,

    /// Loops run to completion
    pub loops_completed: IntCounter,

    /// Time spent in a single submit call
    pub submit_latency: Histogram,
}

impl Metrics {
    /// Initialize metrics (call once at startup)
    pub fn init() -> Result<&'static Metrics> {
        if let Some(metrics) = METRICS.get() {
            return Ok(metrics);
        }

        let _guard = INIT_LOCK
            .lock()
            .map_err(|_| GeneratorError::Metrics("init lock poisoned".to_string()))?;
        // Another caller may have registered while we waited
        if let Some(metrics) = METRICS.get() {
            return Ok(metrics);
        }

        let metrics = Metrics {
            events_created: register_counter_vec!(
                "k8s_event_generator_events_created_total",
                "Total events accepted by the sink",
                &["namespace"]
            )
            .map_err(|e| GeneratorError::Metrics(format!("events_created: {e}")))?,

            events_failed: register_counter_vec!(
                "k8s_event_generator_events_failed_total",
                "Total events the sink rejected",
                &["namespace"]
            )
            .map_err(|e| GeneratorError::Metrics(format!("events_failed: {e}")))?,

            loops_completed: register_int_counter!(
                "k8s_event_generator_loops_completed_total",
                "Total generator loops completed"
            )
            .map_err(|e| GeneratorError::Metrics(format!("loops_completed: {e}")))?,

            submit_latency: register_histogram!(
                "k8s_event_generator_submit_latency_seconds",
                "Latency of a single event submission",
                vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5]
            )
            .map_err(|e| GeneratorError::Metrics(format!("submit_latency: {e}")))?,
        };

        let _ = METRICS.set(metrics);

        METRICS
            .get()
            .ok_or_else(|| GeneratorError::Metrics("Failed to initialize metrics".to_string()))
    }

    /// Returns None if metrics haven't been initialized yet.
    pub fn get() -> Option<&'static Metrics> {
        METRICS.get()
    }

    pub fn record_created(&self, namespace: &str) {
        self.events_created.with_label_values(&[namespace]).inc();
    }

    pub fn record_failed(&self, namespace: &str) {
        self.events_failed.with_label_values(&[namespace]).inc();
    }

    pub fn record_loop(&self) {
        self.loops_completed.inc();
    }

    pub fn record_latency(&self, seconds: f64) {
        self.submit_latency.observe(seconds);
    }
}

/// Gather all metrics and encode as Prometheus text format
pub fn gather() -> String {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    if encoder.encode(&metric_families, &mut buffer).is_ok() {
        String::from_utf8(buffer).unwrap_or_default()
    } else {
        String::new()
    }
}

/// Record a submission outcome if metrics are initialized
pub fn try_record_submit(namespace: &str, ok: bool, seconds: f64) {
    if let Some(m) = Metrics::get() {
        if ok {
            m.record_created(namespace);
        } else {
            m.record_failed(namespace);
        }
        m.record_latency(seconds);
    }
}

/// Record a completed loop if metrics are initialized
pub fn try_record_loop() {
    if let Some(m) = Metrics::get() {
        m.record_loop();
    }
}
