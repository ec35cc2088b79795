use std::{io, path::PathBuf};

use thiserror::Error;

/// Result alias for persistence operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Error raised by the document store.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Reading or writing the backing file failed.
    #[error("i/o failure on `{}`", .path.display())]
    Io {
        /// Path of the document that could not be written.
        path: PathBuf,
        /// Underlying filesystem error.
        #[source]
        source: io::Error,
    },
    /// A document could not be serialized to JSON.
    #[error("failed to serialize document for `{}`", .path.display())]
    Serialize {
        /// Path of the document that could not be serialized.
        path: PathBuf,
        /// Underlying serializer error.
        #[source]
        source: serde_json::Error,
    },
}
