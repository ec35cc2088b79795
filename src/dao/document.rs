//! Atomic JSON document persistence.
//!
//! Each [`DocumentStore`] owns one file. Saves write a temporary sibling and
//! rename it over the canonical path, so readers never observe a half-written
//! document. Every store in the process shares one write lock; concurrent
//! saves are serialized rather than interleaved.

use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
    sync::Arc,
};

use serde::{Serialize, de::DeserializeOwned};
use tokio::{fs, sync::Mutex};
use tracing::warn;

use super::storage::{StorageError, StorageResult};

/// Lock shared by every [`DocumentStore`] in the process.
pub type WriteLock = Arc<Mutex<()>>;

/// Create the process-wide write lock handed to each store.
pub fn write_lock() -> WriteLock {
    Arc::new(Mutex::new(()))
}

/// Stores one JSON document at a fixed path with atomic replacement.
#[derive(Clone)]
pub struct DocumentStore {
    path: PathBuf,
    lock: WriteLock,
}

impl DocumentStore {
    /// Create a store for the document at `path`, sharing `lock` with the
    /// other stores in the process.
    pub fn new(path: impl Into<PathBuf>, lock: WriteLock) -> Self {
        Self {
            path: path.into(),
            lock,
        }
    }

    /// Path of the canonical document.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the document, returning the type's default when the file does not
    /// exist. An unreadable or unparseable file is logged and also yields the
    /// default so a corrupt document never prevents startup.
    pub async fn load<T>(&self) -> T
    where
        T: DeserializeOwned + Default,
    {
        let contents = match fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(err) if err.kind() == ErrorKind::NotFound => return T::default(),
            Err(err) => {
                warn!(path = %self.path.display(), error = %err, "failed to read document; starting from default");
                return T::default();
            }
        };

        match serde_json::from_str(&contents) {
            Ok(document) => document,
            Err(err) => {
                warn!(path = %self.path.display(), error = %err, "failed to parse document; starting from default");
                T::default()
            }
        }
    }

    /// Persist the document atomically: serialize, write `<path>.tmp`, then
    /// rename over the canonical path. Serialized against every other save in
    /// the process.
    pub async fn save<T>(&self, document: &T) -> StorageResult<()>
    where
        T: Serialize + ?Sized,
    {
        let contents =
            serde_json::to_string_pretty(document).map_err(|source| StorageError::Serialize {
                path: self.path.clone(),
                source,
            })?;

        let _guard = self.lock.lock().await;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .await
                    .map_err(|source| StorageError::Io {
                        path: self.path.clone(),
                        source,
                    })?;
            }
        }

        let tmp = self.temp_path();
        fs::write(&tmp, contents)
            .await
            .map_err(|source| StorageError::Io {
                path: tmp.clone(),
                source,
            })?;
        fs::rename(&tmp, &self.path)
            .await
            .map_err(|source| StorageError::Io {
                path: self.path.clone(),
                source,
            })
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(".tmp");
        PathBuf::from(name)
    }
}
