// crates/taometer-core/src/error.rs

use thiserror::Error;

/// Workspace-wide error types for taometer.
#[derive(Debug, Error)]
pub enum TaometerError {
    /// Configuration error (invalid interval name, bad argument, wrong
    /// entry point for the requested network). Fails before any remote I/O.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Remote query error (transport failure, RPC-level rejection, missing
    /// result). Per-event occurrences are absorbed into `Fetched::Failed`;
    /// this variant surfaces only when a run-gating lookup fails.
    #[error("Query error: {0}")]
    Query(String),

    /// Structural invariant violation (e.g. empty subnet list in root mode).
    /// Always aborts the run.
    #[error("Invariant violation: {0}")]
    Invariant(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for TaometerError {
    fn from(e: serde_json::Error) -> Self {
        TaometerError::Serialization(e.to_string())
    }
}
