//! Error types for evigraph-core.

use thiserror::Error;

/// Result type alias for evigraph-core operations.
pub type Result<T> = std::result::Result<T, GraphError>;

/// Errors raised by the graph algorithms.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    /// The operation needs at least one node.
    #[error("Graph has no nodes")]
    EmptyGraph,

    /// A predicate blocklist entry was empty or whitespace.
    #[error("Invalid blocklist entry at position {index}: entries must be non-empty")]
    EmptyBlocklistEntry {
        /// Position of the offending entry.
        index: usize,
    },

    /// A prefix declaration could not be used.
    #[error("Invalid prefix declaration: {message}")]
    InvalidPrefix {
        /// Description of the problem.
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(GraphError::EmptyGraph.to_string(), "Graph has no nodes");

        let err = GraphError::EmptyBlocklistEntry { index: 3 };
        assert!(err.to_string().contains("position 3"));

        let err = GraphError::InvalidPrefix {
            message: "missing namespace".to_string(),
        };
        assert!(err.to_string().contains("missing namespace"));
    }
}
