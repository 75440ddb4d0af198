//! Report generation for conformance results.

use serde::{Deserialize, Serialize};

use crate::verify::VerificationSummary;

/// A conformance report over one verification run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConformanceReport {
    pub title: String,
    /// Campaign / run label.
    pub campaign: String,
    /// Timestamp (UTC).
    pub timestamp: String,
    pub summary: VerificationSummary,
}

impl ConformanceReport {
    /// Render the report as markdown.
    #[must_use]
    pub fn to_markdown(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("# {}\n\n", self.title));
        out.push_str(&format!("- Campaign: {}\n", self.campaign));
        out.push_str(&format!("- Timestamp: {}\n", self.timestamp));
        out.push_str(&format!("- Total: {}\n", self.summary.total));
        out.push_str(&format!("- Passed: {}\n", self.summary.passed));
        out.push_str(&format!("- Failed: {}\n\n", self.summary.failed));

        out.push_str("| Case | Spec | Template | Return | Status |\n");
        out.push_str("|------|------|----------|--------|--------|\n");
        for r in &self.summary.results {
            let status = if r.passed { "PASS" } else { "FAIL" };
            out.push_str(&format!(
                "| {} | {} | `{}` | {}/{} | {} |\n",
                r.case_name,
                r.spec_section,
                md_escape(&r.template),
                r.actual_return,
                r.expected_return,
                status
            ));
        }

        let failures: Vec<_> = self.summary.failures().collect();
        if !failures.is_empty() {
            out.push_str("\n## Failures\n");
            for r in failures {
                out.push_str(&format!("\n### {}\n\n```\n", r.case_name));
                out.push_str(
                    r.diff
                        .as_deref()
                        .or(r.harness_error.as_deref())
                        .unwrap_or("(no diff)"),
                );
                if !out.ends_with('\n') {
                    out.push('\n');
                }
                out.push_str("```\n");
            }
        }
        out
    }

    /// Render the report as JSON.
    #[must_use]
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|e| format!("{{\"error\": \"{e}\"}}"))
    }
}

/// Make a template safe inside a markdown table cell.
fn md_escape(s: &str) -> String {
    s.replace('|', "\\|").replace('\n', "\\n").replace('`', "'")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::verify::VerificationResult;

    fn report(passed: bool) -> ConformanceReport {
        ConformanceReport {
            title: String::from("printf-rs Conformance Report"),
            campaign: String::from("unit"),
            timestamp: String::from("2026-10-19T00:00:00.000Z"),
            summary: VerificationSummary::from_results(vec![VerificationResult {
                case_name: "pipe".to_string(),
                spec_section: "width".to_string(),
                template: "%-5d|\n".to_string(),
                passed,
                expected: "42   |\n".to_string(),
                actual: "42   |\n".to_string(),
                expected_return: 7,
                actual_return: if passed { 7 } else { -1 },
                latency_ns: 10,
                diff: (!passed).then(|| "return: expected 7, got -1".to_string()),
                harness_error: None,
            }]),
        }
    }

    #[test]
    fn markdown_escapes_table_cells() {
        let md = report(true).to_markdown();
        assert!(md.contains("`%-5d\\|\\n`"));
        assert!(md.contains("| 7/7 | PASS |"));
        assert!(!md.contains("## Failures"));
    }

    #[test]
    fn markdown_lists_failures() {
        let md = report(false).to_markdown();
        assert!(md.contains("## Failures"));
        assert!(md.contains("return: expected 7, got -1"));
    }

    #[test]
    fn json_roundtrips() {
        let json = report(true).to_json();
        let parsed: ConformanceReport = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.summary.total, 1);
    }
}
