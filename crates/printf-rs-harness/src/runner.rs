//! Test execution engine.

use std::io;
use std::time::Instant;

use printf_rs_core::stdio::{format_to, to_c_return};

use crate::diff;
use crate::fixtures::{FixtureCase, FixtureSet};
use crate::structured_log::{LogEmitter, LogEntry, LogLevel, Outcome};
use crate::verify::VerificationResult;

/// Runs fixture sets against the engine and collects verification results.
pub struct TestRunner {
    /// Name of the test campaign.
    pub campaign: String,
}

impl TestRunner {
    #[must_use]
    pub fn new(campaign: impl Into<String>) -> Self {
        Self {
            campaign: campaign.into(),
        }
    }

    /// Run all fixtures in a set and return results.
    #[must_use]
    pub fn run(&self, fixture_set: &FixtureSet) -> Vec<VerificationResult> {
        fixture_set.cases.iter().map(execute_case).collect()
    }

    /// Like [`TestRunner::run`], logging one `case_result` entry per case
    /// plus `set_start` / `set_end` markers.
    pub fn run_logged(
        &self,
        fixture_set: &FixtureSet,
        log: &mut LogEmitter,
    ) -> io::Result<Vec<VerificationResult>> {
        log.emit_entry(
            LogEntry::new("", LogLevel::Info, "set_start")
                .with_campaign(&self.campaign)
                .with_details(serde_json::json!({
                    "family": fixture_set.family,
                    "version": fixture_set.version,
                    "cases": fixture_set.cases.len(),
                })),
        )?;

        let mut results = Vec::with_capacity(fixture_set.cases.len());
        for case in &fixture_set.cases {
            let result = execute_case(case);
            log.emit_entry(case_entry(&self.campaign, &result))?;
            results.push(result);
        }

        let failed = results.iter().filter(|r| !r.passed).count();
        let level = if failed == 0 {
            LogLevel::Info
        } else {
            LogLevel::Warn
        };
        log.emit_entry(
            LogEntry::new("", level, "set_end")
                .with_campaign(&self.campaign)
                .with_details(serde_json::json!({
                    "family": fixture_set.family,
                    "passed": results.len() - failed,
                    "failed": failed,
                })),
        )?;
        Ok(results)
    }
}

fn case_entry(campaign: &str, result: &VerificationResult) -> LogEntry {
    let (level, outcome) = if result.harness_error.is_some() {
        (LogLevel::Error, Outcome::Error)
    } else if result.passed {
        (LogLevel::Debug, Outcome::Pass)
    } else {
        (LogLevel::Error, Outcome::Fail)
    };
    let mut entry = LogEntry::new("", level, "case_result")
        .with_campaign(campaign)
        .with_case(&result.case_name, &result.template)
        .with_outcome(outcome)
        .with_returns(result.actual_return, result.expected_return)
        .with_latency_ns(result.latency_ns);
    if let Some(diff) = &result.diff {
        entry = entry.with_details(serde_json::json!({ "diff": diff }));
    }
    if let Some(err) = &result.harness_error {
        entry = entry.with_details(serde_json::json!({ "harness_error": err }));
    }
    entry
}

/// Run one case: output and return value must both match.
///
/// Bytes written before an engine error count as output, as they would on
/// a real descriptor.
fn execute_case(case: &FixtureCase) -> VerificationResult {
    let mut result = VerificationResult {
        case_name: case.name.clone(),
        spec_section: case.spec_section.clone(),
        template: case.template.clone(),
        passed: false,
        expected: case.expected_output.clone(),
        actual: String::new(),
        expected_return: case.expected_return,
        actual_return: -1,
        latency_ns: 0,
        diff: None,
        harness_error: None,
    };

    let args = match case.format_args() {
        Ok(args) => args,
        Err(err) => {
            result.harness_error = Some(err.to_string());
            return result;
        }
    };

    let mut buf = Vec::new();
    let start = Instant::now();
    let outcome = format_to(&mut buf, case.template.as_bytes(), &args);
    result.latency_ns = u64::try_from(start.elapsed().as_nanos()).unwrap_or(u64::MAX);

    let error_note = outcome.as_ref().err().map(|e| format!("engine error: {e}"));
    result.actual_return = to_c_return(outcome);
    result.actual = String::from_utf8_lossy(&buf).into_owned();

    let output_ok = result.actual == case.expected_output;
    let return_ok = result.actual_return == case.expected_return;
    result.passed = output_ok && return_ok;

    let mut notes = Vec::new();
    if !output_ok {
        notes.push(diff::render_diff(&case.expected_output, &result.actual));
    }
    if !return_ok {
        notes.push(diff::render_return_mismatch(
            case.expected_return,
            result.actual_return,
        ));
        notes.extend(error_note);
    }
    if !notes.is_empty() {
        result.diff = Some(notes.join("\n"));
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structured_log::validate_log_line;

    fn fixture() -> FixtureSet {
        FixtureSet::from_json(
            r#"{
                "version":"v1",
                "family":"printf/smoke",
                "captured_at":"2026-10-19T00:00:00Z",
                "cases":[
                    {"name":"width","spec_section":"width","template":"%5d","args":[{"kind":"int","value":42}],"expected_output":"   42","expected_return":5},
                    {"name":"null_str","spec_section":"s","template":"%s","args":[{"kind":"null"}],"expected_output":"(null)","expected_return":6},
                    {"name":"incomplete","spec_section":"malformed","template":"ab%","expected_output":"ab","expected_return":-1}
                ]
            }"#,
        )
        .expect("valid fixture json")
    }

    #[test]
    fn runner_executes_all_cases() {
        let results = TestRunner::new("smoke").run(&fixture());
        assert_eq!(results.len(), 3);
        assert!(results.iter().all(|r| r.passed), "{results:#?}");
    }

    #[test]
    fn wrong_expectation_fails_with_diff() {
        let mut set = fixture();
        set.cases[0].expected_output = "42".to_string();
        set.cases[0].expected_return = 2;
        let results = TestRunner::new("smoke").run(&set);
        assert!(!results[0].passed);
        let diff = results[0].diff.as_deref().unwrap();
        assert!(diff.contains("@@ line 1 @@"));
        assert!(diff.contains("return: expected 2, got 5"));
    }

    #[test]
    fn engine_error_is_noted_on_return_mismatch() {
        let mut set = fixture();
        set.cases[2].expected_return = 2;
        let results = TestRunner::new("smoke").run(&set);
        let diff = results[2].diff.as_deref().unwrap();
        assert!(diff.contains("engine error"));
    }

    #[test]
    fn unrepresentable_argument_is_logged_as_error() {
        let mut set = fixture();
        set.cases[0].args = vec![crate::fixtures::FixtureArg::Char('é')];
        let mut log = LogEmitter::to_buffer("smoke", "run-2");
        let results = TestRunner::new("smoke").run_logged(&set, &mut log).unwrap();
        assert!(!results[0].passed);
        assert!(results[0].harness_error.as_deref().unwrap().contains("not a byte"));

        let text = String::from_utf8(log.buffer_contents().unwrap().to_vec()).unwrap();
        let first_case = validate_log_line(text.lines().nth(1).unwrap(), 2).unwrap();
        assert_eq!(first_case.outcome, Some(Outcome::Error));
        assert_eq!(first_case.level, LogLevel::Error);
    }

    #[test]
    fn logged_run_emits_valid_lines() {
        let mut log = LogEmitter::to_buffer("smoke", "run-1");
        let results = TestRunner::new("smoke")
            .run_logged(&fixture(), &mut log)
            .unwrap();
        assert_eq!(results.len(), 3);

        let text = String::from_utf8(log.buffer_contents().unwrap().to_vec()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 5);
        for (i, line) in lines.iter().enumerate() {
            let entry = validate_log_line(line, i + 1).unwrap();
            assert_eq!(entry.campaign.as_deref(), Some("smoke"));
        }
        assert!(lines[0].contains("\"set_start\""));
        assert!(lines[4].contains("\"set_end\""));
    }
}
