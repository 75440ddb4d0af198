//! Verification results and their summary.

use serde::{Deserialize, Serialize};

/// Result of verifying a single fixture case.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationResult {
    pub case_name: String,
    /// POSIX/C section reference.
    pub spec_section: String,
    pub template: String,
    /// Output and return value both matched.
    pub passed: bool,
    pub expected: String,
    /// Bytes the engine wrote, lossily decoded.
    pub actual: String,
    pub expected_return: i32,
    pub actual_return: i32,
    /// Wall time of the engine call.
    pub latency_ns: u64,
    /// Diff or error note if the case failed.
    pub diff: Option<String>,
    /// Set when the case could not be run at all (e.g. an argument the
    /// engine cannot represent).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub harness_error: Option<String>,
}

/// Aggregate verification summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationSummary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub results: Vec<VerificationResult>,
}

impl VerificationSummary {
    /// Build a summary from a list of results.
    #[must_use]
    pub fn from_results(results: Vec<VerificationResult>) -> Self {
        let total = results.len();
        let passed = results.iter().filter(|r| r.passed).count();
        Self {
            total,
            passed,
            failed: total - passed,
            results,
        }
    }

    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.failed == 0
    }

    pub fn failures(&self) -> impl Iterator<Item = &VerificationResult> {
        self.results.iter().filter(|r| !r.passed)
    }
}
