//! Conformance harness for printf-rs.
//!
//! This crate provides:
//! - Fixtures: JSON cases pairing a template and arguments with the expected
//!   output bytes and return value
//! - Runner/verify: execute fixtures against the engine and diff the results
//! - Reports: markdown + JSON conformance summaries
//! - Structured logging: JSONL records, schema validation, artifact index

#![forbid(unsafe_code)]

pub mod config;
pub mod diff;
pub mod error;
pub mod fixtures;
pub mod report;
pub mod runner;
pub mod structured_log;
pub mod verify;

pub use config::HarnessConfig;
pub use error::HarnessError;
pub use fixtures::{FixtureArg, FixtureCase, FixtureSet};
pub use report::ConformanceReport;
pub use runner::TestRunner;
pub use verify::{VerificationResult, VerificationSummary};
