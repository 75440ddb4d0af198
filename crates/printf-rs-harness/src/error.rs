//! Harness error type.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("fixture {}: {source}", .path.display())]
    Fixture {
        path: PathBuf,
        #[source]
        source: Box<HarnessError>,
    },
    #[error("invalid argument '{raw}': {reason}")]
    InvalidArg { raw: String, reason: String },
    #[error("no fixture JSON files found in {}", .0.display())]
    NoFixtures(PathBuf),
    #[error("conformance verification failed: {failed} of {total} cases")]
    VerificationFailed { failed: usize, total: usize },
    #[error("log validation failed: {errors} error(s) in {lines} line(s)")]
    LogValidation { errors: usize, lines: usize },
}

impl HarnessError {
    pub(crate) fn invalid_arg(raw: &str, reason: impl Into<String>) -> Self {
        Self::InvalidArg {
            raw: raw.to_string(),
            reason: reason.into(),
        }
    }
}
