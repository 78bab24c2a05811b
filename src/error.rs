//! Error types for the benchmark harness.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading inputs, building, or querying.
///
/// Every failure is terminal for the run; only the command dispatch in
/// `main` turns one of these into a process exit code.
#[derive(Debug, Error)]
pub enum HarnessError {
    /// File cannot be opened or read.
    #[error("unable to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A record in an input file does not match the expected layout.
    #[error("malformed {what} in {path}: {detail}")]
    Parse {
        what: &'static str,
        path: PathBuf,
        detail: String,
    },

    /// Paired datasets disagree on length (vectors/attributes,
    /// queries/ranges, queries/groundtruth).
    #[error("{what} count mismatch: {left} vs {right}")]
    CountMismatch {
        what: &'static str,
        left: usize,
        right: usize,
    },

    /// Vector dimensionality does not match the index.
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    Dimension { expected: usize, actual: usize },

    /// The partitioner was handed an empty attribute set.
    #[error("cannot compute slot ranges: attribute set is empty")]
    EmptyAttributes,

    /// Bad magic bytes, version, or payload in a persisted index.
    #[error("index format error: {0}")]
    Format(String),

    /// Mutation attempted on an index loaded read-only.
    #[error("index is read-only")]
    ReadOnly,

    /// Command-line arguments parsed but carry an invalid value.
    #[error("{0}")]
    Usage(String),

    /// Other error (for extensibility).
    #[error("{0}")]
    Other(String),
}

/// Result type used throughout the harness.
pub type Result<T> = std::result::Result<T, HarnessError>;
