//! CLI entrypoint for the printf-rs conformance harness.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use printf_rs_abi::{count_printf_args, format_and_print};
use printf_rs_core::stdio::FormatArg;
use printf_rs_harness::structured_log::{self, ArtifactIndex, LogEmitter, LogEntry, LogLevel};
use printf_rs_harness::{
    ConformanceReport, FixtureArg, FixtureSet, HarnessConfig, HarnessError, TestRunner,
    VerificationSummary, fixtures,
};

/// Conformance tooling for printf-rs.
#[derive(Debug, Parser)]
#[command(name = "printf-rs-harness")]
#[command(about = "Conformance testing harness for printf-rs")]
struct Cli {
    /// JSONL log path (falls back to PRINTF_RS_LOG).
    #[arg(long, global = true)]
    log: Option<PathBuf>,
    /// Minimum log level (falls back to PRINTF_RS_LOG_LEVEL, default info).
    #[arg(long, global = true)]
    log_level: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Format one template to stdout and report the return value on stderr.
    Run {
        /// Format template. Backslash escapes (\n, \t, \\, \0, \xHH) are decoded.
        #[arg(long)]
        format: String,
        /// Argument as kind:value (int, uint, char, str, null, ptr). Repeatable.
        #[arg(long = "arg")]
        args: Vec<String>,
    },
    /// Verify the engine against fixture files.
    Verify {
        /// Directory containing fixture JSON files.
        #[arg(long)]
        fixture: PathBuf,
        /// Output report path (markdown; JSON and artifact index written alongside).
        #[arg(long)]
        report: Option<PathBuf>,
    },
    /// Validate a JSONL log file against the log schema.
    ValidateLog {
        #[arg(long)]
        path: PathBuf,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = HarnessConfig::resolve(cli.log, cli.log_level.as_deref());

    match cli.command {
        Command::Run { format, args } => {
            let parsed = args
                .iter()
                .map(|raw| raw.parse::<FixtureArg>())
                .collect::<Result<Vec<_>, _>>()?;
            let format_args = parsed
                .iter()
                .map(FixtureArg::to_format_arg)
                .collect::<Result<Vec<FormatArg<'_>>, _>>()?;
            let template = unescape(&format);
            let needed = count_printf_args(&template);
            if needed != format_args.len() {
                eprintln!(
                    "warning: template consumes {needed} argument(s), {} supplied",
                    format_args.len()
                );
            }
            let rc = format_and_print(&template, &format_args);
            eprintln!("return={rc}");
        }
        Command::Verify { fixture, report } => verify(&config, &fixture, report.as_deref())?,
        Command::ValidateLog { path } => {
            let (lines, errors) = structured_log::validate_log_file(&path)?;
            for err in &errors {
                eprintln!("{err}");
            }
            eprintln!(
                "Validated {} line(s) in {}: {} error(s)",
                lines,
                path.display(),
                errors.len()
            );
            if !errors.is_empty() {
                return Err(HarnessError::LogValidation {
                    errors: errors.len(),
                    lines,
                }
                .into());
            }
        }
    }

    Ok(())
}

fn verify(config: &HarnessConfig, fixture: &Path, report: Option<&Path>) -> Result<(), HarnessError> {
    eprintln!("Verifying against fixtures in {}", fixture.display());
    let mut fixture_sets = Vec::new();
    for path in fixtures::fixture_paths(fixture)? {
        match FixtureSet::from_file(&path) {
            Ok(set) => fixture_sets.push(set),
            Err(err) => eprintln!("Skipping {err}"),
        }
    }
    if fixture_sets.is_empty() {
        return Err(HarnessError::NoFixtures(fixture.to_path_buf()));
    }

    let run_id = format!("run-{}", std::process::id());
    let mut log = match &config.log_path {
        Some(path) => Some(
            LogEmitter::to_file(path, "fixture-verify", &run_id)?.with_min_level(config.log_level),
        ),
        None => None,
    };

    let runner = TestRunner::new("fixture-verify");
    let mut results = Vec::new();
    for set in &fixture_sets {
        match log.as_mut() {
            Some(log) => results.extend(runner.run_logged(set, log)?),
            None => results.extend(runner.run(set)),
        }
    }

    let summary = VerificationSummary::from_results(results);
    let report_doc = ConformanceReport {
        title: String::from("printf-rs Conformance Report"),
        campaign: runner.campaign.clone(),
        timestamp: structured_log::now_utc(),
        summary,
    };

    eprintln!(
        "Verification complete: total={}, passed={}, failed={}",
        report_doc.summary.total, report_doc.summary.passed, report_doc.summary.failed
    );
    for failure in report_doc.summary.failures() {
        eprintln!("FAIL {}: {}", failure.case_name, failure.template);
    }

    let mut index = ArtifactIndex::new(&run_id);
    if let Some(report_path) = report {
        eprintln!("Writing report to {}", report_path.display());
        let markdown = report_doc.to_markdown();
        let json = report_doc.to_json();
        std::fs::write(report_path, &markdown)?;
        let json_path = report_path.with_extension("json");
        std::fs::write(&json_path, &json)?;
        index.add_bytes(report_path.display().to_string(), "report_md", markdown.as_bytes());
        index.add_bytes(json_path.display().to_string(), "report_json", json.as_bytes());
    }

    if let Some(log) = log.as_mut() {
        let refs = index.artifacts.iter().map(|a| a.path.clone()).collect();
        log.emit_entry(
            LogEntry::new("", LogLevel::Info, "verify_complete")
                .with_artifacts(refs)
                .with_details(serde_json::json!({
                    "total": report_doc.summary.total,
                    "passed": report_doc.summary.passed,
                    "failed": report_doc.summary.failed,
                })),
        )?;
        log.flush()?;
    }

    if let Some(report_path) = report {
        if let Some(log_path) = &config.log_path {
            index.add_file(log_path, "log_jsonl")?;
        }
        let index_path = report_path.with_extension("artifacts.json");
        std::fs::write(&index_path, index.to_json()?)?;
        eprintln!("Wrote artifact index to {}", index_path.display());
    }

    if !report_doc.summary.all_passed() {
        return Err(HarnessError::VerificationFailed {
            failed: report_doc.summary.failed,
            total: report_doc.summary.total,
        });
    }
    Ok(())
}

/// Decode C-style backslash escapes so templates can carry newlines and NULs.
fn unescape(raw: &str) -> Vec<u8> {
    let bytes = raw.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] != b'\\' || i + 1 == bytes.len() {
            out.push(bytes[i]);
            i += 1;
            continue;
        }
        let (decoded, used) = match bytes[i + 1] {
            b'n' => (b'\n', 2),
            b't' => (b'\t', 2),
            b'r' => (b'\r', 2),
            b'0' => (0, 2),
            b'\\' => (b'\\', 2),
            b'x' => match bytes
                .get(i + 2..i + 4)
                .and_then(|h| std::str::from_utf8(h).ok())
                .and_then(|h| u8::from_str_radix(h, 16).ok())
            {
                Some(b) => (b, 4),
                None => (b'\\', 1),
            },
            _ => (b'\\', 1),
        };
        out.push(decoded);
        i += used;
    }
    out
}
