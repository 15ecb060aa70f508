//! Error types for eal-scorer.
//!
//! Only fatal conditions are errors. Alignment ambiguity, alignment failure,
//! and unmapped ontology vocabulary are recovered where they happen and are
//! counted and logged instead.

use std::path::Path;
use thiserror::Error;

/// Result type for scorer operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for scorer operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Gold annotation is internally inconsistent.
    #[error("Corrupt input: {0}")]
    CorruptInput(String),

    /// Gold linking references an atom the system side never produced.
    #[error("Linking precondition violated: {0}")]
    LinkingPrecondition(String),

    /// A sink was asked to finish before it inspected anything.
    #[error("{0}: finish called before any item was inspected")]
    FinishBeforeInspect(String),

    /// Invalid input provided.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to write a report artifact.
    #[error("Failed to write {path}: {source}")]
    Write {
        /// Artifact path.
        path: String,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML deserialization error.
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl Error {
    /// Create a corrupt input error.
    pub fn corrupt_input(msg: impl Into<String>) -> Self {
        Error::CorruptInput(msg.into())
    }

    /// Create a linking precondition error.
    pub fn linking_precondition(msg: impl Into<String>) -> Self {
        Error::LinkingPrecondition(msg.into())
    }

    /// Create a finish-before-inspect error for the named sink.
    pub fn finish_before_inspect(sink: impl Into<String>) -> Self {
        Error::FinishBeforeInspect(sink.into())
    }

    /// Create an invalid input error.
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Error::InvalidInput(msg.into())
    }

    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }

    /// Wrap an IO error raised while writing `path`.
    pub fn write(path: &Path, source: std::io::Error) -> Self {
        Error::Write {
            path: path.display().to_string(),
            source,
        }
    }
}
