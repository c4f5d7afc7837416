//! Output handler traits and types
//!
//! This module defines the trait interface for result sinks and the data structures
//! they serialize.

use crate::extract::FirmRecord;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to write spreadsheet: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// A URL the extraction phase could not fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedUrl {
    /// The profile URL
    pub url: String,

    /// Transport error description
    pub error: String,
}

impl FailedUrl {
    pub fn new(url: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            error: error.into(),
        }
    }
}

/// Files produced by one write
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenFiles {
    /// The dataset, always written
    pub records: PathBuf,

    /// The failure list, only written when failures exist
    pub failures: Option<PathBuf>,
}

/// Trait for result sinks
pub trait ResultSink: Send + Sync {
    /// Writes the final dataset and, if non-empty, the failure list
    fn write(&self, records: &[FirmRecord], failures: &[FailedUrl]) -> OutputResult<WrittenFiles>;

    /// Writes an interim checkpoint of a batch still in progress
    fn write_interim(
        &self,
        records: &[FirmRecord],
        failures: &[FailedUrl],
    ) -> OutputResult<WrittenFiles>;
}
