//! Whole-file writer: temp file, fsync, rename.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::FetchError;

use super::temp_path;

/// Writes one artifact through `<final>.part` so readers never see a torn file.
pub struct StorageWriter {
    file: File,
    temp_path: PathBuf,
    final_path: PathBuf,
}

impl StorageWriter {
    /// Create (or truncate) the temp file next to `final_path`.
    pub fn create(final_path: &Path) -> Result<Self, FetchError> {
        let temp_path = temp_path(final_path);
        let file = File::options()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&temp_path)
            .map_err(|e| FetchError::storage(&temp_path, e))?;
        Ok(StorageWriter {
            file,
            temp_path,
            final_path: final_path.to_path_buf(),
        })
    }

    pub fn write_all(&mut self, data: &[u8]) -> Result<(), FetchError> {
        self.file
            .write_all(data)
            .map_err(|e| FetchError::storage(&self.temp_path, e))
    }

    /// Path to the current temp file.
    pub fn temp_path(&self) -> &Path {
        &self.temp_path
    }

    /// Sync and atomically rename the temp file over the final path. On
    /// failure the temp file is removed.
    pub fn finalize(self) -> Result<PathBuf, FetchError> {
        if let Err(e) = self.file.sync_all() {
            let err = FetchError::storage(&self.temp_path, e);
            self.discard();
            return Err(err);
        }
        drop(self.file);
        if let Err(e) = std::fs::rename(&self.temp_path, &self.final_path) {
            let _ = std::fs::remove_file(&self.temp_path);
            return Err(FetchError::storage(&self.final_path, e));
        }
        Ok(self.final_path)
    }

    /// Drop the temp file without touching the final path.
    pub fn discard(self) {
        drop(self.file);
        if let Err(e) = std::fs::remove_file(&self.temp_path) {
            tracing::debug!(path = %self.temp_path.display(), "temp file not removed: {}", e);
        }
    }
}
