//! Extraction of firm records from profile pages
//!
//! - `record`: the fixed `FirmRecord` schema and its columns
//! - `rules`: the declarative field rules and their interpreter
//! - `engine`: the batch loop over confirmed URLs

mod engine;
mod record;
pub mod rules;

pub use engine::{ExtractionEngine, ExtractionReport};
pub use record::{Field, FirmRecord};
pub use rules::Extractor;
