//! Integration tests for the floodwatch monitor.
//!
//! This crate contains the cross-module test suites:
//!
//! - `pipeline_tests`: End-to-end ingestion → evaluation → subscriber delivery
//! - `retention_tests`: Event and alert retention behavior through the public API
//! - `reporting_tests`: Session/task status, aggregate stats, and the text report
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test --package tests
//! ```

#[cfg(test)]
mod pipeline_tests;

#[cfg(test)]
mod retention_tests;

#[cfg(test)]
mod reporting_tests;
