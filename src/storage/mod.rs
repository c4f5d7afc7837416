//! Storage module for persisting the resumable discovery state
//!
//! The discovery phase writes its `CrawlState` through a `StateStore`; the default backend
//! is a JSON file in the save directory.

mod json;
mod traits;

pub use json::{JsonStateStore, STATE_FILE_NAME};
pub use traits::{StateStore, StorageError, StorageResult};
