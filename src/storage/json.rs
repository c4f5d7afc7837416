//! JSON file storage implementation
//!
//! This module provides a file-based implementation of the StateStore trait.

use crate::state::CrawlState;
use crate::storage::traits::{StateStore, StorageError, StorageResult};
use std::path::{Path, PathBuf};

/// File name of the crawl state inside the save directory
pub const STATE_FILE_NAME: &str = "crawler_progress.json";

/// Crawl state kept in a single JSON file
///
/// Saves go through a sibling temp file and a rename, so an interrupted write leaves the
/// previous state intact.
#[derive(Debug, Clone)]
pub struct JsonStateStore {
    path: PathBuf,
}

impl JsonStateStore {
    /// Creates a store for `<save_dir>/crawler_progress.json`
    pub fn in_directory(save_dir: &Path) -> Self {
        Self::at(save_dir.join(STATE_FILE_NAME))
    }

    /// Creates a store backed by an explicit file
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> StorageResult<PathBuf> {
        let name = self
            .path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| StorageError::InvalidPath(self.path.display().to_string()))?;
        Ok(self.path.with_file_name(format!("{}.tmp", name)))
    }
}

impl StateStore for JsonStateStore {
    fn load(&self) -> StorageResult<Option<CrawlState>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&self.path)?;
        let state: CrawlState = serde_json::from_str(&content)?;
        tracing::debug!(
            "Loaded crawl state from {}: last id {}, {} discovered",
            self.path.display(),
            state.last_processed_id,
            state.discovered_count()
        );
        Ok(Some(state))
    }

    fn save(&mut self, state: &CrawlState) -> StorageResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let temp = self.temp_path()?;
        let json = serde_json::to_string_pretty(state)?;
        std::fs::write(&temp, json)?;
        std::fs::rename(&temp, &self.path)?;

        tracing::debug!(
            "Saved crawl state: last id {}, {} discovered",
            state.last_processed_id,
            state.discovered_count()
        );
        Ok(())
    }

    fn clear(&mut self) -> StorageResult<()> {
        if self.path.exists() {
            std::fs::remove_file(&self.path)?;
            tracing::info!("Cleared crawl state at {}", self.path.display());
        }
        Ok(())
    }
}
