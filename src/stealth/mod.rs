//! Stealth layer: aggressiveness profiles, request pacing and browser headers
//!
//! - `StealthLevel` / `StealthProfile`: the four built-in levels and custom profiles
//! - `StealthScheduler`: inter-request delays, work/rest cycling and header rotation
//! - `headers`: the user-agent pool and browser header sets

pub mod headers;
mod profile;
mod scheduler;

pub use profile::{StealthLevel, StealthProfile};
pub use scheduler::StealthScheduler;
