//! URL handling for Firm-Harvest
//!
//! Candidate pages are addressed by substituting a numeric identifier into a URL template.

mod template;

pub use template::{TargetTemplate, ID_PLACEHOLDER};
