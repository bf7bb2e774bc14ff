//! Error types for the aggregation engine and the credential store.

use thiserror::Error;

/// Hard failures of an aggregation request.
///
/// Per-credential problems (transport errors, bad HTTP statuses, malformed
/// payloads) are never errors; they are carried as
/// [`crate::usage::FetchOutcome::Failure`] entries inside the snapshot.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AggregateError {
    /// The credential registry is empty; there is nothing to aggregate.
    #[error("no credentials configured")]
    NoCredentials,
}

/// Errors reported by the credential store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Credential id was empty or whitespace-only.
    #[error("credential id must not be empty")]
    EmptyId,

    /// Credential secret was empty.
    #[error("credential secret must not be empty")]
    EmptySecret,

    /// A credential with this id is already registered.
    #[error("credential '{0}' already exists")]
    Duplicate(String),

    /// No credential with this id is registered.
    #[error("credential '{0}' not found")]
    NotFound(String),

    /// The backing file could not be read or written.
    #[error("failed to access credential file: {0}")]
    Io(#[from] std::io::Error),

    /// The backing file exists but does not parse.
    #[error("credential file is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}
