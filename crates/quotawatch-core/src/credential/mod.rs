//! Credential model, display-safe masking, and the pluggable registry.

mod mask;
mod store;

pub use mask::mask;
pub use store::{CredentialStore, FileStore, MemoryStore};

use serde::{Deserialize, Serialize};

/// An identifier/secret pair used to authenticate against the upstream
/// usage endpoint.
///
/// Owned by the credential store; the aggregation engine only ever borrows a
/// read-only snapshot and never mutates a credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    /// Caller-assigned unique identifier
    pub id: String,
    /// Opaque bearer token for the upstream API
    pub secret: String,
}

impl Credential {
    /// Create a new credential
    pub fn new(id: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            secret: secret.into(),
        }
    }

    /// Display-safe form of the secret
    pub fn masked_secret(&self) -> String {
        mask(&self.secret)
    }
}
