//! Storage traits and error types
//!
//! This module defines the trait interface for crawl-state backends and
//! associated error types.

use crate::state::CrawlState;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid state path: {0}")]
    InvalidPath(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for crawl-state backends
///
/// The discovery engine is the only writer. A persisted state is overwritten as a whole on
/// every save.
pub trait StateStore: Send {
    /// Loads the persisted state
    ///
    /// # Returns
    ///
    /// * `Ok(Some(CrawlState))` - A previous run left state behind
    /// * `Ok(None)` - Nothing has been persisted yet
    /// * `Err(StorageError)` - The state exists but could not be read
    fn load(&self) -> StorageResult<Option<CrawlState>>;

    /// Persists the state, replacing whatever was stored before
    fn save(&mut self, state: &CrawlState) -> StorageResult<()>;

    /// Removes any persisted state
    fn clear(&mut self) -> StorageResult<()>;
}
