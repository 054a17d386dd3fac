//! Error types for evigraph-engine.

use std::path::PathBuf;
use thiserror::Error;

use evigraph_core::GraphError;

/// Result type alias for engine operations that can end a run.
pub type Result<T> = std::result::Result<T, EngineError>;

/// Failure fetching one entity's neighborhood.
///
/// Never aborts a record: the orchestrator turns it into an empty
/// contribution and a [`crate::fetch::FetchOutcome`].
#[derive(Error, Debug)]
pub enum FetchError {
    /// Connection refused, timeout, TLS, or any other transport failure.
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The endpoint answered with a non-success status.
    #[error("Endpoint returned HTTP {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Leading part of the response body.
        body: String,
    },

    /// The response body was not a SPARQL JSON result.
    #[error("Malformed response: {message}")]
    Malformed {
        /// Description of what could not be decoded.
        message: String,
    },
}

impl FetchError {
    /// Whether the failure is in the data rather than the transport.
    pub fn is_malformed(&self) -> bool {
        matches!(self, FetchError::Malformed { .. })
    }
}

/// Failure resolving an external identifier.
#[derive(Error, Debug)]
pub enum ResolveError {
    /// The lookup query itself failed.
    #[error("Lookup for {id} failed: {source}")]
    Lookup {
        /// External identifier being resolved.
        id: String,
        /// Underlying query failure.
        #[source]
        source: FetchError,
    },
}

/// Failure processing one record. Logged by the driver; the record is omitted.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// The record body in the input file had the wrong shape.
    #[error("Malformed record {key}: {reason}")]
    MalformedRecord {
        /// Record key.
        key: String,
        /// Decode error for the body.
        reason: String,
    },

    /// A graph algorithm rejected its input.
    #[error("Graph error: {0}")]
    Graph(#[from] GraphError),

    /// The blocking graph task panicked or was cancelled.
    #[error("Graph task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Invalid engine configuration. Raised once by `EngineConfig::validate`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A numeric setting must be positive.
    #[error("{field} must be greater than zero")]
    Zero {
        /// Dotted name of the setting.
        field: &'static str,
    },

    /// The endpoint URL is unusable.
    #[error("Invalid endpoint URL '{url}': {reason}")]
    InvalidEndpoint {
        /// Offending URL.
        url: String,
        /// Why it was rejected.
        reason: String,
    },

    /// The predicate blocklist is invalid.
    #[error("Invalid predicate blocklist: {0}")]
    Blocklist(#[from] GraphError),
}

/// Failure writing a checkpoint artifact.
#[derive(Error, Debug)]
pub enum CheckpointError {
    /// Directory creation, write, or rename failed.
    #[error("Failed to write checkpoint {path}: {source}")]
    Io {
        /// Target artifact path.
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The accumulator could not be encoded.
    #[error("Failed to encode checkpoint {path}: {source}")]
    Encode {
        /// Target artifact path.
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Errors that end a batch run.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Checkpoint error: {0}")]
    Checkpoint(#[from] CheckpointError),

    /// Input file could not be read.
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Input file is not valid JSON of the expected shape.
    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The HTTP client could not be constructed.
    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = FetchError::Status {
            status: 503,
            body: "busy".to_string(),
        };
        assert_eq!(err.to_string(), "Endpoint returned HTTP 503: busy");
        assert!(!err.is_malformed());

        let err = FetchError::Malformed {
            message: "missing results".to_string(),
        };
        assert!(err.is_malformed());

        let err = ConfigError::Zero {
            field: "fetch.concurrency",
        };
        assert_eq!(err.to_string(), "fetch.concurrency must be greater than zero");

        let err = PipelineError::from(GraphError::EmptyGraph);
        assert!(err.to_string().contains("no nodes"));
    }
}
