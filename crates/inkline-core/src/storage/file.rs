//! File-based storage implementation for native platforms.

use super::{Storage, StorageError, StorageResult};
use crate::drawing::Drawing;
use std::fs;
use std::path::{Path, PathBuf};

/// File-based storage for native platforms.
///
/// Stores each drawing as a JSON file in a specified directory.
pub struct FileStorage {
    /// Base directory for drawing storage.
    base_path: PathBuf,
}

impl FileStorage {
    /// Create a new file storage with the given base directory.
    ///
    /// Creates the directory if it doesn't exist.
    pub fn new(base_path: PathBuf) -> StorageResult<Self> {
        if !base_path.exists() {
            fs::create_dir_all(&base_path).map_err(|e| {
                StorageError::Io(format!("Failed to create storage directory: {}", e))
            })?;
        }
        Ok(Self { base_path })
    }

    /// Create file storage in the default location.
    ///
    /// On Unix: `~/.local/share/inkline/drawings/`
    /// On Windows: `%LOCALAPPDATA%\inkline\drawings\`
    pub fn default_location() -> StorageResult<Self> {
        let base = dirs::data_local_dir()
            .or_else(dirs::home_dir)
            .ok_or_else(|| StorageError::Io("Could not determine home directory".to_string()))?;

        Self::new(base.join("inkline").join("drawings"))
    }

    /// Get the file path for a drawing ID.
    fn drawing_path(&self, id: &str) -> PathBuf {
        let safe_id: String = id
            .chars()
            .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.base_path.join(format!("{}.json", safe_id))
    }

    /// Get the base path.
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }
}

impl Storage for FileStorage {
    fn save(&self, id: &str, drawing: &Drawing) -> StorageResult<()> {
        let path = self.drawing_path(id);
        let json = drawing.to_json()?;

        fs::write(&path, json).map_err(|e| {
            StorageError::Io(format!("Failed to write {}: {}", path.display(), e))
        })?;
        log::info!("Saved drawing {} ({} strokes) to {}", id, drawing.len(), path.display());
        Ok(())
    }

    fn load(&self, id: &str) -> StorageResult<Drawing> {
        let path = self.drawing_path(id);
        if !path.exists() {
            return Err(StorageError::NotFound(id.to_string()));
        }

        let json = fs::read_to_string(&path).map_err(|e| {
            StorageError::Io(format!("Failed to read {}: {}", path.display(), e))
        })?;

        let drawing = Drawing::from_json(&json).map_err(|e| {
            log::warn!("Discarding unreadable drawing {}: {}", path.display(), e);
            StorageError::Serialization(format!("Failed to parse {}: {}", path.display(), e))
        })?;
        log::info!("Loaded drawing {} ({} strokes)", id, drawing.len());
        Ok(drawing)
    }

    fn delete(&self, id: &str) -> StorageResult<()> {
        let path = self.drawing_path(id);
        if path.exists() {
            fs::remove_file(&path).map_err(|e| {
                StorageError::Io(format!("Failed to delete {}: {}", path.display(), e))
            })?;
        }
        Ok(())
    }

    fn list(&self) -> StorageResult<Vec<String>> {
        if !self.base_path.exists() {
            return Ok(vec![]);
        }

        let entries = fs::read_dir(&self.base_path)
            .map_err(|e| StorageError::Io(format!("Failed to read directory: {}", e)))?;

        let ids = entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
            .filter_map(|path| path.file_stem().and_then(|s| s.to_str()).map(str::to_string))
            .collect();
        Ok(ids)
    }

    fn exists(&self, id: &str) -> StorageResult<bool> {
        Ok(self.drawing_path(id).exists())
    }
}
