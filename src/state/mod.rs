//! State module for tracking harvest progress
//!
//! # Components
//!
//! - `CrawlState`: the resumable discovery state (last processed identifier and confirmed URLs)
//! - `PhaseState`: the lifecycle of a discovery or extraction phase

mod crawl_state;
mod phase_state;

pub use crawl_state::CrawlState;
pub use phase_state::PhaseState;
