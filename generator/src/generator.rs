//! The generator loop
//!
//! Each loop builds `count` events and hands them to the sink one by one,
//! then sleeps. A rejected event is logged and counted; nothing is retried.

use crate::config::{Config, InvolvedObject};
use crate::event::build_event;
use crate::metrics;
use crate::sink::EventSink;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, error, info};

/// What a run does; the workload part of [`Config`]
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    pub count: u64,
    pub sleep: Duration,
    /// None runs until the shutdown future resolves
    pub max_loops: Option<u64>,
    pub namespace: String,
    pub involved_object: InvolvedObject,
}

impl From<&Config> for GeneratorConfig {
    fn from(config: &Config) -> Self {
        Self {
            count: config.count,
            sleep: config.sleep,
            max_loops: config.max_loops,
            namespace: config.namespace.clone(),
            involved_object: config.involved_object.clone(),
        }
    }
}

/// Totals for a finished run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    /// Loops run to completion, failed submissions included
    pub loops: u64,
    pub created: u64,
    pub failed: u64,
}

pub struct Generator {
    sink: Arc<dyn EventSink>,
    config: GeneratorConfig,
    rng: StdRng,
}

impl Generator {
    /// `seed` fixes event names; without it the randomizer is seeded from the OS.
    pub fn new(sink: Arc<dyn EventSink>, config: GeneratorConfig, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self { sink, config, rng }
    }

    /// Run until `max_loops` is reached
    pub async fn run(&mut self) -> RunStats {
        self.run_until(std::future::pending()).await
    }

    /// Run until `max_loops` is reached or `shutdown` resolves.
    ///
    /// Shutdown is observed while submitting and while sleeping; an
    /// in-flight submission is abandoned.
    pub async fn run_until<F>(&mut self, shutdown: F) -> RunStats
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        let mut stats = RunStats::default();

        info!(
            sink = self.sink.name(),
            namespace = %self.config.namespace,
            count = self.config.count,
            sleep_secs = self.config.sleep.as_secs_f64(),
            max_loops = ?self.config.max_loops,
            "generator started"
        );

        'run: loop {
            if self.config.max_loops.is_some_and(|max| stats.loops >= max) {
                break;
            }

            for seq in 1..=self.config.count {
                let event = build_event(
                    seq,
                    &mut self.rng,
                    &self.config.namespace,
                    &self.config.involved_object,
                );
                let name = event.metadata.name.clone().unwrap_or_default();
                let started = Instant::now();

                let outcome = tokio::select! {
                    biased;
                    _ = &mut shutdown => break 'run,
                    outcome = self.sink.submit(&event) => outcome,
                };
                let elapsed = started.elapsed().as_secs_f64();

                match &outcome {
                    Ok(()) => {
                        stats.created += 1;
                        debug!(name = %name, seq, "event submitted");
                    }
                    Err(e) => {
                        stats.failed += 1;
                        error!(
                            sink = self.sink.name(),
                            name = %name,
                            error = %e,
                            "failed to submit event"
                        );
                    }
                }
                metrics::try_record_submit(&self.config.namespace, outcome.is_ok(), elapsed);
            }

            stats.loops += 1;
            metrics::try_record_loop();
            info!(
                loop_number = stats.loops,
                created = stats.created,
                failed = stats.failed,
                "loop complete"
            );

            if self.config.max_loops.is_some_and(|max| stats.loops >= max) {
                break;
            }

            tokio::select! {
                biased;
                _ = &mut shutdown => break 'run,
                _ = tokio::time::sleep(self.config.sleep) => {}
            }
        }

        info!(
            loops = stats.loops,
            created = stats.created,
            failed = stats.failed,
            "generator stopped"
        );
        stats
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::sink::MemorySink;

    fn config(count: u64, max_loops: Option<u64>) -> GeneratorConfig {
        GeneratorConfig {
            count,
            sleep: Duration::from_secs(1),
            max_loops,
            namespace: "test-namespace".into(),
            involved_object: InvolvedObject {
                api_version: "v1".into(),
                kind: "Pod".into(),
                name: "test-pod".into(),
                uid: "uid-123".into(),
                resource_version: "version-1".into(),
            },
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_loop_creates_count_events() {
        let sink = Arc::new(MemorySink::new());
        let mut generator = Generator::new(sink.clone(), config(3, Some(1)), Some(42));

        let stats = generator.run().await;

        assert_eq!(stats, RunStats { loops: 1, created: 3, failed: 0 });
        let events = sink.list("test-namespace");
        assert_eq!(events.len(), 3);
        for event in events {
            assert_eq!(event.involved_object.kind.as_deref(), Some("Pod"));
            assert_eq!(event.type_.as_deref(), Some("Normal"));
            assert_eq!(event.reason.as_deref(), Some("Completed"));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_multiple_loops() {
        let sink = Arc::new(MemorySink::new());
        let mut generator = Generator::new(sink.clone(), config(2, Some(3)), Some(1));

        let stats = generator.run().await;

        assert_eq!(stats.loops, 3);
        assert_eq!(stats.created, 6);
        assert_eq!(sink.len(), 6);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failures_do_not_stop_the_loop() {
        let sink = Arc::new(MemorySink::failing(2));
        let mut generator = Generator::new(sink.clone(), config(3, Some(1)), Some(1));

        let stats = generator.run().await;

        assert_eq!(stats, RunStats { loops: 1, created: 1, failed: 2 });
        assert_eq!(sink.rejected(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_sleep_after_last_loop() {
        let sink = Arc::new(MemorySink::new());
        let mut cfg = config(1, Some(3));
        cfg.sleep = Duration::from_secs(10);
        let mut generator = Generator::new(sink, cfg, Some(1));

        let start = Instant::now();
        generator.run().await;

        assert_eq!(start.elapsed(), Duration::from_secs(20));
    }

    #[tokio::test(start_paused = true)]
    async fn test_unbounded_run_stops_on_shutdown() {
        let sink = Arc::new(MemorySink::new());
        let mut generator = Generator::new(sink.clone(), config(1, None), Some(1));

        let stats = generator
            .run_until(tokio::time::sleep(Duration::from_millis(5500)))
            .await;

        // loops start at t = 0, 1, 2, 3, 4, 5
        assert_eq!(stats.loops, 6);
        assert_eq!(sink.len(), 6);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_count_still_loops() {
        let sink = Arc::new(MemorySink::new());
        let mut generator = Generator::new(sink.clone(), config(0, Some(2)), Some(1));

        let stats = generator.run().await;

        assert_eq!(stats.loops, 2);
        assert!(sink.is_empty());
    }

    #[test]
    fn test_from_config() {
        let config = Config {
            count: 4,
            max_loops: Some(9),
            ..Config::default()
        };
        let generator_config = GeneratorConfig::from(&config);
        assert_eq!(generator_config.count, 4);
        assert_eq!(generator_config.max_loops, Some(9));
        assert_eq!(generator_config.namespace, "logging");
    }
}
