//! Harness configuration.
//!
//! CLI flags win; otherwise values come from the environment:
//! - `PRINTF_RS_LOG`: path of the JSONL log written while verifying.
//! - `PRINTF_RS_LOG_LEVEL`: minimum level recorded (`trace` .. `fatal`,
//!   default `info`). Unknown values fall back to the default.
//!
//! The formatting engine itself reads no configuration.

use std::path::PathBuf;
use std::sync::OnceLock;

use crate::structured_log::LogLevel;

pub const LOG_PATH_ENV: &str = "PRINTF_RS_LOG";
pub const LOG_LEVEL_ENV: &str = "PRINTF_RS_LOG_LEVEL";

static ENV_LOG_LEVEL: OnceLock<LogLevel> = OnceLock::new();

/// Level from `PRINTF_RS_LOG_LEVEL` (read on first call, cached thereafter).
#[must_use]
pub fn env_log_level() -> LogLevel {
    *ENV_LOG_LEVEL.get_or_init(|| {
        std::env::var(LOG_LEVEL_ENV)
            .map(|v| LogLevel::from_str_loose(&v))
            .unwrap_or_default()
    })
}

/// Resolved harness settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HarnessConfig {
    /// Where JSONL log lines go; `None` disables structured logging.
    pub log_path: Option<PathBuf>,
    /// Entries below this level are dropped.
    pub log_level: LogLevel,
}

impl HarnessConfig {
    /// Merge CLI values with the environment.
    #[must_use]
    pub fn resolve(log_path: Option<PathBuf>, log_level: Option<&str>) -> Self {
        let log_path = log_path.or_else(|| {
            std::env::var_os(LOG_PATH_ENV)
                .filter(|v| !v.is_empty())
                .map(PathBuf::from)
        });
        let log_level = log_level.map_or_else(env_log_level, LogLevel::from_str_loose);
        Self {
            log_path,
            log_level,
        }
    }
}
