//! Resumable discovery state

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Progress of the discovery phase
///
/// Serialized as `{"last_id": N, "discovered_urls": [...]}`. The discovered set only grows,
/// and `last_processed_id` never moves backwards within a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrawlState {
    #[serde(rename = "last_id")]
    pub last_processed_id: u64,

    #[serde(rename = "discovered_urls", default)]
    pub discovered: BTreeSet<String>,
}

impl CrawlState {
    /// Creates the state for a run starting at `start`
    pub fn fresh(start: u64) -> Self {
        Self {
            last_processed_id: start,
            discovered: BTreeSet::new(),
        }
    }

    /// Marks `id` as processed
    ///
    /// Returns false if `id` lies behind the current position, which leaves the state
    /// unchanged.
    pub fn advance(&mut self, id: u64) -> bool {
        if id < self.last_processed_id {
            return false;
        }
        self.last_processed_id = id;
        true
    }

    /// Adds a confirmed profile URL; returns true if it was new
    pub fn confirm(&mut self, url: impl Into<String>) -> bool {
        self.discovered.insert(url.into())
    }

    /// Returns the confirmed URLs in sorted order
    pub fn discovered_urls(&self) -> Vec<String> {
        self.discovered.iter().cloned().collect()
    }

    pub fn discovered_count(&self) -> usize {
        self.discovered.len()
    }
}
