//! k8s-event-generator - synthetic load for the Kubernetes Event API
//!
//! Fabricates `core/v1` Events about a configurable involved object and
//! posts them to a namespace on a fixed cadence, to exercise event
//! collectors and other downstream consumers.
//!
//! # Architecture
//!
//! ```text
//! Config (env) ──► Generator loop ──► build_event ──► EventSink (kube | stdout | memory)
//! ```

#![deny(unsafe_code)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![warn(clippy::panic)]

pub mod config;
pub mod error;
pub mod event;
pub mod generator;
pub mod metrics;
pub mod metrics_server;
pub mod sink;

pub use config::{Config, DryRunFormat, InvolvedObject, LogFormat};
pub use error::{GeneratorError, Result, SinkError};
pub use event::build_event;
pub use generator::{Generator, GeneratorConfig, RunStats};
pub use sink::{EventSink, KubeSink, MemorySink, StdoutSink};
