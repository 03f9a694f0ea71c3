//! Persistent store adapter
//!
//! Reads and writes the single serialized settings record. Everything here is
//! best-effort: a cold start, a corrupt record or an unwritable store never
//! reaches the caller as an error, it is logged and the in-memory settings
//! stay authoritative.

mod backend;
mod writer;

pub use backend::{FileBackend, MemoryBackend, StorageBackend};
pub use writer::BackgroundWriter;

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::config::Configuration;
use crate::constants::storage;
use crate::error::StoreError;

/// Sink for accepted settings snapshots. Must not block the caller for long.
pub trait Persist: Send {
    fn persist(&self, config: &Configuration);
}

/// Adapter between the settings record and a storage backend
#[derive(Clone)]
pub struct PersistentStore {
    backend: Arc<dyn StorageBackend>,
    key: String,
}

impl PersistentStore {
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        Self::with_key(backend, storage::SETTINGS_KEY)
    }

    pub fn with_key(backend: Arc<dyn StorageBackend>, key: impl Into<String>) -> Self {
        Self { backend, key: key.into() }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Read and parse the stored record, surfacing every failure
    pub fn try_load(&self) -> Result<Option<Configuration>, StoreError> {
        let Some(blob) = self.backend.read(&self.key)? else {
            return Ok(None);
        };
        Ok(Some(serde_json::from_str(&blob)?))
    }

    /// Stored settings, or `None` on a cold start or when the record cannot be used
    pub fn load(&self) -> Option<Configuration> {
        match self.try_load() {
            Ok(Some(config)) => {
                info!(key = %self.key, version = config.version, "Loaded stored settings");
                Some(config)
            }
            Ok(None) => {
                info!(key = %self.key, "No stored settings, using defaults");
                None
            }
            Err(err) => {
                warn!(key = %self.key, error = %err, "Ignoring stored settings, using defaults");
                None
            }
        }
    }

    pub fn try_save(&self, config: &Configuration) -> Result<(), StoreError> {
        let blob = serde_json::to_string_pretty(config)?;
        self.backend.write(&self.key, &blob)
    }

    /// Write the record; failures are logged and dropped
    pub fn save(&self, config: &Configuration) {
        match self.try_save(config) {
            Ok(()) => debug!(key = %self.key, version = config.version, "Persisted settings"),
            Err(err) => warn!(
                key = %self.key,
                version = config.version,
                error = %err,
                "Failed to persist settings; changes will not survive a reload"
            ),
        }
    }
}

impl Persist for PersistentStore {
    fn persist(&self, config: &Configuration) {
        self.save(config);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ColorMode, Direction, SideNavState};

    fn memory_store() -> (Arc<MemoryBackend>, PersistentStore) {
        let backend = Arc::new(MemoryBackend::new());
        let store = PersistentStore::new(backend.clone());
        (backend, store)
    }

    #[test]
    fn test_cold_start_loads_absent() {
        let (_, store) = memory_store();
        assert!(store.load().is_none());
        assert!(store.try_load().unwrap().is_none());
    }

    #[test]
    fn test_corrupt_blob_loads_absent() {
        let (backend, store) = memory_store();
        backend.insert_raw(storage::SETTINGS_KEY, "{ not json");

        assert!(store.load().is_none());
        assert!(matches!(store.try_load(), Err(StoreError::CorruptPersistedState(_))));
    }

    #[test]
    fn test_schema_violation_loads_absent() {
        let (backend, store) = memory_store();
        backend.insert_raw(storage::SETTINGS_KEY, r#"{"direction":"diagonal","version":2}"#);
        assert!(store.load().is_none());

        backend.insert_raw(storage::SETTINGS_KEY, "[1, 2, 3]");
        assert!(store.load().is_none());
    }

    #[test]
    fn test_save_then_load_is_idempotent() {
        let (_, store) = memory_store();
        let config = Configuration {
            color_mode: ColorMode::Dark,
            direction: Direction::Rtl,
            side_nav_state: SideNavState::Collapsed,
            version: 12,
            ..Configuration::default()
        };

        store.save(&config);
        let loaded = store.load().unwrap();
        assert_eq!(loaded, config);

        store.save(&loaded);
        assert_eq!(store.load().unwrap(), loaded);
    }

    #[test]
    fn test_save_failure_is_swallowed() {
        let (backend, store) = memory_store();
        backend.set_writable(false);

        store.save(&Configuration::default());
        assert!(matches!(
            store.try_save(&Configuration::default()),
            Err(StoreError::PersistenceUnavailable(_))
        ));
        assert!(store.load().is_none());
    }

    #[test]
    fn test_file_store_round_trip_uses_well_known_key() {
        let dir = tempfile::tempdir().unwrap();
        let backend = Arc::new(FileBackend::new(dir.path()));
        let store = PersistentStore::new(backend.clone());

        let config = Configuration { color_mode: ColorMode::Dark, version: 1, ..Configuration::default() };
        store.save(&config);

        assert!(backend.path_for(storage::SETTINGS_KEY).exists());
        assert_eq!(store.load(), Some(config));
    }
}
