//! Storage abstraction for persisting drawings.
//!
//! Only the drawing's structure is stored: strokes, style and identity.
//! Undo history is never persisted.

mod memory;

#[cfg(not(target_arch = "wasm32"))]
mod file;

pub use memory::MemoryStorage;

#[cfg(not(target_arch = "wasm32"))]
pub use file::FileStorage;

use crate::drawing::Drawing;
use thiserror::Error;

/// Storage errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Drawing not found: {0}")]
    NotFound(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("IO error: {0}")]
    Io(String),
    #[error("Storage error: {0}")]
    Other(String),
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::Serialization(err.to_string())
    }
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for drawing storage backends.
///
/// Operations are synchronous; hosts that need background saves run them
/// on their own thread, which is why implementations must be `Send + Sync`.
pub trait Storage: Send + Sync {
    /// Save a drawing under `id`, replacing any previous version.
    fn save(&self, id: &str, drawing: &Drawing) -> StorageResult<()>;

    /// Load a drawing.
    fn load(&self, id: &str) -> StorageResult<Drawing>;

    /// Delete a drawing. Deleting a missing drawing is not an error.
    fn delete(&self, id: &str) -> StorageResult<()>;

    /// List all drawing IDs.
    fn list(&self) -> StorageResult<Vec<String>>;

    /// Check if a drawing exists.
    fn exists(&self, id: &str) -> StorageResult<bool>;
}
