//! Configuration for the event generator
//!
//! Everything is read from environment variables. Workload settings never
//! fail startup: a value that is empty, unparsable, zero or negative falls
//! back to its default and a warning is logged.

use crate::error::{GeneratorError, Result};
use std::env;
use std::time::Duration;
use tracing::warn;

/// Events submitted per loop when `COUNT` is not usable
pub const DEFAULT_COUNT: u64 = 10;

/// Seconds between loops when `SLEEP` is not usable
pub const DEFAULT_SLEEP_SECS: u64 = 1;

/// `MAX_LOOPS` default; zero means run until stopped
pub const DEFAULT_MAX_LOOPS: u64 = 0;

/// Namespace events land in when `NAMESPACE` is unset or empty
pub const DEFAULT_NAMESPACE: &str = "logging";

/// Variable lookup used by the readers below.
///
/// Production code passes [`process_env`]; tests pass a closure over a map.
pub type Lookup<'a> = &'a dyn Fn(&str) -> Option<String>;

/// Lookup backed by the process environment
pub fn process_env(key: &str) -> Option<String> {
    env::var(key).ok()
}

/// The object every generated event points at
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvolvedObject {
    pub api_version: String,
    pub kind: String,
    pub name: String,
    pub uid: String,
    pub resource_version: String,
}

impl Default for InvolvedObject {
    fn default() -> Self {
        Self {
            api_version: "integreatly.org/v1alpha1".into(),
            kind: "GrafanaDashboard".into(),
            name: "graylog-grafana-dashboard-vm".into(),
            uid: "04e98ff7-7471-451f-a9cf-4bcad4a1bd41".into(),
            resource_version: "1".into(),
        }
    }
}

impl InvolvedObject {
    /// Parse `apiVersion,kind,name,uid,resourceVersion`.
    ///
    /// Exactly five non-empty fields are required. Fields are kept verbatim.
    pub fn parse(raw: &str) -> Option<Self> {
        let fields: Vec<&str> = raw.split(',').collect();
        let [api_version, kind, name, uid, resource_version] = fields.as_slice() else {
            return None;
        };
        if fields.iter().any(|f| f.is_empty()) {
            return None;
        }

        Some(Self {
            api_version: (*api_version).to_string(),
            kind: (*kind).to_string(),
            name: (*name).to_string(),
            uid: (*uid).to_string(),
            resource_version: (*resource_version).to_string(),
        })
    }
}

/// Read a strictly positive integer, or `default`
pub fn read_positive(lookup: Lookup<'_>, key: &str, default: u64) -> u64 {
    let Some(raw) = lookup(key).filter(|v| !v.is_empty()) else {
        return default;
    };

    match raw.parse::<i64>() {
        Ok(value) if value > 0 => value as u64,
        Ok(value) => {
            warn!(key, value, default, "non-positive value, using default");
            default
        }
        Err(e) => {
            warn!(key, value = %raw, default, error = %e, "invalid integer, using default");
            default
        }
    }
}

/// Read a non-empty string, or `default`
pub fn read_string(lookup: Lookup<'_>, key: &str, default: &str) -> String {
    lookup(key)
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

/// Read a comma-separated involved object reference, or `default`
pub fn read_involved_object(lookup: Lookup<'_>, key: &str, default: InvolvedObject) -> InvolvedObject {
    let Some(raw) = lookup(key).filter(|v| !v.is_empty()) else {
        return default;
    };

    InvolvedObject::parse(&raw).unwrap_or_else(|| {
        warn!(
            key,
            value = %raw,
            "expected apiVersion,kind,name,uid,resourceVersion; using default"
        );
        default
    })
}

fn read_bool(lookup: Lookup<'_>, key: &str) -> bool {
    let Some(raw) = lookup(key) else {
        return false;
    };
    match raw.to_lowercase().as_str() {
        "1" | "true" | "yes" => true,
        "" | "0" | "false" | "no" => false,
        other => {
            warn!(key, value = other, "invalid boolean, using false");
            false
        }
    }
}

fn read_optional<T: std::str::FromStr>(lookup: Lookup<'_>, key: &str) -> Option<T>
where
    T::Err: std::fmt::Display,
{
    let raw = lookup(key).filter(|v| !v.is_empty())?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(key, value = %raw, error = %e, "invalid value, ignoring");
            None
        }
    }
}

/// Main configuration for the generator
#[derive(Debug, Clone)]
pub struct Config {
    /// Events submitted per loop
    pub count: u64,

    /// Pause between loops
    pub sleep: Duration,

    /// Number of loops; None runs until stopped
    pub max_loops: Option<u64>,

    /// Namespace events are created in
    pub namespace: String,

    /// Object the events refer to
    pub involved_object: InvolvedObject,

    /// Print events instead of posting them
    pub dry_run: bool,

    /// How dry-run events are printed
    pub dry_run_format: DryRunFormat,

    /// Port for the Prometheus endpoint; None disables it
    pub metrics_port: Option<u16>,

    /// Fixed randomizer seed
    pub seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            count: DEFAULT_COUNT,
            sleep: Duration::from_secs(DEFAULT_SLEEP_SECS),
            max_loops: None,
            namespace: DEFAULT_NAMESPACE.to_string(),
            involved_object: InvolvedObject::default(),
            dry_run: false,
            dry_run_format: DryRunFormat::default(),
            metrics_port: None,
            seed: None,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(&process_env)
    }

    /// Load configuration through an arbitrary lookup
    pub fn from_lookup(lookup: Lookup<'_>) -> Self {
        let max_loops = read_positive(lookup, "MAX_LOOPS", DEFAULT_MAX_LOOPS);

        Self {
            count: read_positive(lookup, "COUNT", DEFAULT_COUNT),
            sleep: Duration::from_secs(read_positive(lookup, "SLEEP", DEFAULT_SLEEP_SECS)),
            max_loops: (max_loops > 0).then_some(max_loops),
            namespace: read_string(lookup, "NAMESPACE", DEFAULT_NAMESPACE),
            involved_object: read_involved_object(
                lookup,
                "INVOLVEDOBJECT",
                InvolvedObject::default(),
            ),
            dry_run: read_bool(lookup, "DRY_RUN"),
            dry_run_format: DryRunFormat::from_lookup(lookup),
            metrics_port: read_optional::<u16>(lookup, "METRICS_PORT").filter(|p| *p != 0),
            seed: read_optional(lookup, "SEED"),
        }
    }
}

/// Dry-run output: one line per event, or the full event as JSON
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DryRunFormat {
    #[default]
    Compact,
    Pretty,
}

impl DryRunFormat {
    /// Read `DRY_RUN_FORMAT`, falling back to compact
    pub fn from_lookup(lookup: Lookup<'_>) -> Self {
        let Some(raw) = lookup("DRY_RUN_FORMAT").filter(|v| !v.is_empty()) else {
            return DryRunFormat::default();
        };
        match raw.to_lowercase().as_str() {
            "compact" => DryRunFormat::Compact,
            "pretty" | "json" => DryRunFormat::Pretty,
            other => {
                warn!(key = "DRY_RUN_FORMAT", value = other, "expected 'compact' or 'pretty', using compact");
                DryRunFormat::Compact
            }
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    Json,
    #[default]
    Pretty,
}

impl LogFormat {
    /// Read `LOG_FORMAT`. Read before tracing is installed, so bad values are errors.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(&process_env)
    }

    pub fn from_lookup(lookup: Lookup<'_>) -> Result<Self> {
        match lookup("LOG_FORMAT") {
            None => Ok(LogFormat::default()),
            Some(format) => match format.to_lowercase().as_str() {
                "json" => Ok(LogFormat::Json),
                "pretty" | "" => Ok(LogFormat::Pretty),
                other => Err(GeneratorError::Config(format!(
                    "invalid LOG_FORMAT: {other} (expected 'json' or 'pretty')"
                ))),
            },
        }
    }
}
