//! Error types for the event generator

use thiserror::Error;

/// Result type alias for generator operations
pub type Result<T> = std::result::Result<T, GeneratorError>;

/// Main error type for the generator
#[derive(Error, Debug)]
pub enum GeneratorError {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Sink error
    #[error("sink '{sink}' error: {message}")]
    Sink { sink: String, message: String },

    /// Metrics error
    #[error("metrics error: {0}")]
    Metrics(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Error type for sink operations
#[derive(Error, Debug)]
pub enum SinkError {
    /// Could not reach the destination
    #[error("connection error: {0}")]
    Connection(String),

    /// Submitting an event failed
    #[error("submit failed: {0}")]
    Submit(String),

    /// Shutdown error
    #[error("shutdown error: {0}")]
    Shutdown(String),
}

impl SinkError {
    /// Attach the sink name, producing a top-level error
    pub fn in_sink(self, sink: &str) -> GeneratorError {
        GeneratorError::Sink {
            sink: sink.to_string(),
            message: self.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_error_in_sink() {
        let err = SinkError::Connection("failed to connect".to_string()).in_sink("kube");
        assert!(matches!(err, GeneratorError::Sink { ref sink, .. } if sink == "kube"));
    }

    #[test]
    fn test_sink_error_keeps_name() {
        let err = SinkError::Submit("409 conflict".to_string()).in_sink("kube");
        assert_eq!(err.to_string(), "sink 'kube' error: submit failed: 409 conflict");
    }
}
