//! In-memory storage implementation.

use super::{Storage, StorageError, StorageResult};
use crate::drawing::Drawing;
use std::collections::HashMap;
use std::sync::RwLock;

/// In-memory storage for testing and ephemeral use.
///
/// Drawings are kept as serialized JSON, so a loaded drawing behaves exactly
/// like one read from disk: same strokes, empty history.
#[derive(Default)]
pub struct MemoryStorage {
    drawings: RwLock<HashMap<String, String>>,
}

impl MemoryStorage {
    /// Create a new empty memory storage.
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock_error(err: impl std::fmt::Display) -> StorageError {
    StorageError::Other(format!("Lock error: {}", err))
}

impl Storage for MemoryStorage {
    fn save(&self, id: &str, drawing: &Drawing) -> StorageResult<()> {
        let json = drawing.to_json()?;
        let mut drawings = self.drawings.write().map_err(lock_error)?;
        drawings.insert(id.to_string(), json);
        Ok(())
    }

    fn load(&self, id: &str) -> StorageResult<Drawing> {
        let drawings = self.drawings.read().map_err(lock_error)?;
        let json = drawings
            .get(id)
            .ok_or_else(|| StorageError::NotFound(id.to_string()))?;
        Ok(Drawing::from_json(json)?)
    }

    fn delete(&self, id: &str) -> StorageResult<()> {
        let mut drawings = self.drawings.write().map_err(lock_error)?;
        drawings.remove(id);
        Ok(())
    }

    fn list(&self) -> StorageResult<Vec<String>> {
        let drawings = self.drawings.read().map_err(lock_error)?;
        Ok(drawings.keys().cloned().collect())
    }

    fn exists(&self, id: &str) -> StorageResult<bool> {
        let drawings = self.drawings.read().map_err(lock_error)?;
        Ok(drawings.contains_key(id))
    }
}
