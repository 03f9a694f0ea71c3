//! Durable key/value backends for the settings record

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};

use tracing::debug;

use crate::constants::storage;
use crate::error::StoreError;

/// Swappable storage behind the settings adapter
pub trait StorageBackend: Send + Sync {
    /// Raw blob stored under `key`, `None` when nothing was ever written
    fn read(&self, key: &str) -> Result<Option<String>, StoreError>;

    fn write(&self, key: &str, blob: &str) -> Result<(), StoreError>;
}

/// One JSON file per key inside a directory
#[derive(Debug, Clone)]
pub struct FileBackend {
    dir: PathBuf,
}

impl FileBackend {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Backend rooted at the platform config directory
    pub fn in_config_dir() -> Self {
        Self::new(Self::default_dir())
    }

    pub fn default_dir() -> PathBuf {
        let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push(storage::APP_DIR);
        path
    }

    pub fn dir(&self) -> &PathBuf {
        &self.dir
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.{}", storage::FILE_EXTENSION))
    }
}

impl StorageBackend for FileBackend {
    fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn write(&self, key: &str, blob: &str) -> Result<(), StoreError> {
        fs::create_dir_all(&self.dir)?;

        // Write-then-rename so a crash mid-write never leaves a truncated record
        let path = self.path_for(key);
        let staging = path.with_extension(format!("{}.tmp", storage::FILE_EXTENSION));
        fs::write(&staging, blob)?;
        fs::rename(&staging, &path)?;

        debug!(path = %path.display(), bytes = blob.len(), "Wrote settings file");
        Ok(())
    }
}

/// In-process store. Used for server-side rendering, tests and sessions where
/// durable storage is disabled.
#[derive(Debug)]
pub struct MemoryBackend {
    entries: Mutex<HashMap<String, String>>,
    writable: AtomicBool,
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            writable: AtomicBool::new(true),
        }
    }
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a raw blob, bypassing serialization
    pub fn insert_raw(&self, key: &str, blob: impl Into<String>) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), blob.into());
    }

    pub fn get_raw(&self, key: &str) -> Option<String> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    /// Simulate a store that rejects writes (quota exceeded, storage disabled)
    #[cfg(test)]
    pub fn set_writable(&self, writable: bool) {
        self.writable.store(writable, Ordering::SeqCst);
    }
}

impl StorageBackend for MemoryBackend {
    fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.get_raw(key))
    }

    fn write(&self, key: &str, blob: &str) -> Result<(), StoreError> {
        if !self.writable.load(Ordering::SeqCst) {
            return Err(io::Error::new(io::ErrorKind::PermissionDenied, "storage disabled").into());
        }
        self.insert_raw(key, blob);
        Ok(())
    }
}
