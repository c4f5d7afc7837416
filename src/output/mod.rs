//! Output module for harvest results and run metrics
//!
//! This module handles:
//! - Writing extracted records and failed URLs as spreadsheets
//! - Collecting request metrics for both phases

pub mod stats;
mod traits;
mod xlsx;

pub use stats::{print_metrics, MetricsCollector, RunMetrics};
pub use traits::{FailedUrl, OutputError, OutputResult, ResultSink, WrittenFiles};
pub use xlsx::{record_header, record_row, XlsxWriter};
