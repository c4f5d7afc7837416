//! Integration tests for Firm-Harvest
//!
//! These tests use wiremock to stand in for the profile directory and run both phases
//! end-to-end with a 1 ms time unit.

mod common;
mod crawl_tests;
mod extract_tests;
mod pipeline_tests;
