//! Pluggable credential registry.
//!
//! The aggregation engine only depends on [`CredentialStore::list_all`]; the
//! CRUD surface is used by the web API. Stores hand out owned snapshots, so a
//! credential added while an aggregation cycle is in flight simply shows up
//! in the next cycle.

use std::path::{Path, PathBuf};

use parking_lot::RwLock;
use tracing::debug;

use super::Credential;
use crate::error::StoreError;

/// Durable registry of credentials.
///
/// Implementations must be safe to share across the web handlers and the
/// aggregation engine. Insertion order is preserved — snapshot outcomes are
/// reported in registry order.
pub trait CredentialStore: Send + Sync {
    /// Owned snapshot of every registered credential, in insertion order
    fn list_all(&self) -> Result<Vec<Credential>, StoreError>;

    /// Whether a credential with this id is registered
    fn exists(&self, id: &str) -> bool;

    /// Register a new credential
    fn add(&self, id: &str, secret: &str) -> Result<(), StoreError>;

    /// Remove a credential by id
    fn remove(&self, id: &str) -> Result<(), StoreError>;
}

/// Reject empty ids and secrets before they reach a backing store
fn validate_entry(id: &str, secret: &str) -> Result<(), StoreError> {
    if id.trim().is_empty() {
        return Err(StoreError::EmptyId);
    }
    if secret.is_empty() {
        return Err(StoreError::EmptySecret);
    }
    Ok(())
}

/// JSON-file-backed credential store.
///
/// The whole registry is a single JSON array on disk, rewritten on every
/// mutation. Registries are expected to stay small (tens of credentials),
/// so the rewrite is not a bottleneck.
pub struct FileStore {
    path: PathBuf,
    entries: RwLock<Vec<Credential>>,
}

impl FileStore {
    /// Open a store at `path`, loading existing entries.
    ///
    /// A missing file is an empty registry, not an error.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let entries = if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            serde_json::from_str(&content)?
        } else {
            Vec::new()
        };
        debug!(
            "credential store opened at {:?} ({} entries)",
            path,
            entries.len()
        );
        Ok(Self {
            path,
            entries: RwLock::new(entries),
        })
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the current entries to disk
    fn persist(&self, entries: &[Credential]) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(entries)?;
        std::fs::write(&self.path, content)?;
        Ok(())
    }
}

impl CredentialStore for FileStore {
    fn list_all(&self) -> Result<Vec<Credential>, StoreError> {
        Ok(self.entries.read().clone())
    }

    fn exists(&self, id: &str) -> bool {
        self.entries.read().iter().any(|c| c.id == id)
    }

    fn add(&self, id: &str, secret: &str) -> Result<(), StoreError> {
        validate_entry(id, secret)?;
        let mut entries = self.entries.write();
        if entries.iter().any(|c| c.id == id) {
            return Err(StoreError::Duplicate(id.to_string()));
        }
        entries.push(Credential::new(id, secret));
        self.persist(&entries)?;
        debug!("credential '{}' added ({} total)", id, entries.len());
        Ok(())
    }

    fn remove(&self, id: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|c| c.id != id);
        if entries.len() == before {
            return Err(StoreError::NotFound(id.to_string()));
        }
        self.persist(&entries)?;
        debug!("credential '{}' removed ({} total)", id, entries.len());
        Ok(())
    }
}

/// In-memory credential store for tests and ephemeral runs
#[derive(Default)]
pub struct MemoryStore {
    entries: RwLock<Vec<Credential>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with `credentials`
    pub fn with_credentials(credentials: Vec<Credential>) -> Self {
        Self {
            entries: RwLock::new(credentials),
        }
    }
}

impl CredentialStore for MemoryStore {
    fn list_all(&self) -> Result<Vec<Credential>, StoreError> {
        Ok(self.entries.read().clone())
    }

    fn exists(&self, id: &str) -> bool {
        self.entries.read().iter().any(|c| c.id == id)
    }

    fn add(&self, id: &str, secret: &str) -> Result<(), StoreError> {
        validate_entry(id, secret)?;
        let mut entries = self.entries.write();
        if entries.iter().any(|c| c.id == id) {
            return Err(StoreError::Duplicate(id.to_string()));
        }
        entries.push(Credential::new(id, secret));
        Ok(())
    }

    fn remove(&self, id: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|c| c.id != id);
        if entries.len() == before {
            return Err(StoreError::NotFound(id.to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_memory_store_crud() {
        let store = MemoryStore::new();
        assert!(store.list_all().unwrap().is_empty());

        store.add("alpha", "sk-alpha-secret").unwrap();
        store.add("beta", "sk-beta-secret").unwrap();
        assert!(store.exists("alpha"));
        assert!(!store.exists("gamma"));

        let all = store.list_all().unwrap();
        assert_eq!(all.len(), 2);
        // Insertion order preserved
        assert_eq!(all[0].id, "alpha");
        assert_eq!(all[1].id, "beta");

        store.remove("alpha").unwrap();
        assert!(!store.exists("alpha"));
        assert_eq!(store.list_all().unwrap().len(), 1);
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let store = MemoryStore::new();
        store.add("alpha", "secret-1").unwrap();
        let err = store.add("alpha", "secret-2").unwrap_err();
        assert!(matches!(err, StoreError::Duplicate(id) if id == "alpha"));
    }

    #[test]
    fn test_empty_fields_rejected() {
        let store = MemoryStore::new();
        assert!(matches!(store.add("", "secret"), Err(StoreError::EmptyId)));
        assert!(matches!(
            store.add("   ", "secret"),
            Err(StoreError::EmptyId)
        ));
        assert!(matches!(
            store.add("alpha", ""),
            Err(StoreError::EmptySecret)
        ));
    }

    #[test]
    fn test_remove_missing() {
        let store = MemoryStore::new();
        let err = store.remove("ghost").unwrap_err();
        assert!(matches!(err, StoreError::NotFound(id) if id == "ghost"));
    }

    #[test]
    fn test_file_store_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials.json");

        let store = FileStore::open(&path).unwrap();
        store.add("alpha", "sk-alpha-secret").unwrap();
        store.add("beta", "sk-beta-secret").unwrap();
        drop(store);

        // Reopen and verify persistence
        let store = FileStore::open(&path).unwrap();
        let all = store.list_all().unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].id, "alpha");
        assert_eq!(all[0].secret, "sk-alpha-secret");
    }

    #[test]
    fn test_file_store_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path().join("nope.json")).unwrap();
        assert!(store.list_all().unwrap().is_empty());
    }

    #[test]
    fn test_file_store_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            FileStore::open(&path),
            Err(StoreError::Corrupt(_))
        ));
    }
}
