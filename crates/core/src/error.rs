//! Error types for the graphhook domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error variant.

use std::path::PathBuf;
use thiserror::Error;

/// The top-level error type for all graphhook operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Retrieval errors ---
    #[error("Retrieval error: {0}")]
    Retrieval(#[from] RetrievalError),

    // --- Transcript errors ---
    #[error("Transcript error: {0}")]
    Transcript(#[from] TranscriptReadError),

    // --- Reconciliation errors ---
    #[error("Reconciliation error: {0}")]
    Reconciliation(#[from] ReconciliationError),

    // --- State store errors ---
    #[error("State error: {0}")]
    State(#[from] StateError),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },

    // --- Filesystem ---
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

/// The knowledge-graph oracle could not be reached or answered with garbage.
#[derive(Debug, Clone, Error)]
pub enum RetrievalError {
    #[error("Search request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Malformed search response: {0}")]
    Decode(String),

    #[error("Invalid {kind} limit: must be greater than zero")]
    InvalidLimit { kind: &'static str },
}

/// The conversation log could not be read.
#[derive(Debug, Error)]
pub enum TranscriptReadError {
    #[error("Transcript not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Failed to read transcript at {}: {reason}", .path.display())]
    Io { path: PathBuf, reason: String },

    #[error("Malformed transcript record on line {line}: {reason}")]
    Malformed { line: usize, reason: String },
}

/// An invariant of the ranked-set model was violated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReconciliationError {
    #[error("Duplicate id in ranked result set: {0}")]
    DuplicateId(String),

    #[error("Invalid target for {what}: {reason}")]
    InvalidTarget { what: &'static str, reason: String },
}

#[derive(Debug, Error)]
pub enum StateError {
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Corrupt value for state key '{key}': {value:?}")]
    Corrupt { key: String, value: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retrieval_error_displays_correctly() {
        let err = Error::Retrieval(RetrievalError::ApiError {
            status_code: 503,
            message: "graph database offline".into(),
        });
        assert!(err.to_string().contains("503"));
        assert!(err.to_string().contains("graph database offline"));
    }

    #[test]
    fn transcript_error_includes_path() {
        let err = Error::Transcript(TranscriptReadError::NotFound(PathBuf::from(
            "/tmp/session.jsonl",
        )));
        assert!(err.to_string().contains("/tmp/session.jsonl"));
    }

    #[test]
    fn invalid_limit_names_the_kind() {
        let err = RetrievalError::InvalidLimit { kind: "edge" };
        assert!(err.to_string().contains("edge"));
    }
}
