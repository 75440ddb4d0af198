//! Fixture loading and argument decoding.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use printf_rs_core::stdio::FormatArg;
use serde::{Deserialize, Serialize};

use crate::error::HarnessError;

/// One argument of a fixture case.
///
/// Serialized as `{"kind": "...", "value": ...}`; `null` carries no value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum FixtureArg {
    Int(i64),
    Uint(u64),
    Char(char),
    Str(String),
    /// Null string pointer.
    Null,
    Ptr(usize),
}

impl FixtureArg {
    /// Borrow as an engine argument.
    pub fn to_format_arg(&self) -> Result<FormatArg<'_>, HarnessError> {
        Ok(match self {
            Self::Int(v) => FormatArg::SignedInt(*v),
            Self::Uint(v) => FormatArg::UnsignedInt(*v),
            Self::Char(c) => FormatArg::Char(
                u8::try_from(*c)
                    .map_err(|_| HarnessError::invalid_arg(&c.to_string(), "char is not a byte"))?,
            ),
            Self::Str(s) => FormatArg::Str(Some(s.as_bytes())),
            Self::Null => FormatArg::Str(None),
            Self::Ptr(p) => FormatArg::Pointer(*p),
        })
    }
}

/// Parses the CLI form `kind:value` (`null` takes no value).
///
/// Integers accept a `0x` prefix and `_` separators.
impl FromStr for FixtureArg {
    type Err = HarnessError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let (kind, value) = raw.split_once(':').unwrap_or((raw, ""));
        match kind.to_ascii_lowercase().as_str() {
            "int" | "i" => parse_int(value)
                .map(Self::Int)
                .ok_or_else(|| HarnessError::invalid_arg(raw, "expected a signed integer")),
            "uint" | "u" => parse_uint(value)
                .map(Self::Uint)
                .ok_or_else(|| HarnessError::invalid_arg(raw, "expected an unsigned integer")),
            "ptr" | "p" => parse_uint(value)
                .and_then(|v| usize::try_from(v).ok())
                .map(Self::Ptr)
                .ok_or_else(|| HarnessError::invalid_arg(raw, "expected an address")),
            "char" | "c" => {
                let mut chars = value.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) if c.is_ascii() => Ok(Self::Char(c)),
                    _ => Err(HarnessError::invalid_arg(raw, "expected one ASCII character")),
                }
            }
            "str" | "s" => Ok(Self::Str(value.to_string())),
            "null" => Ok(Self::Null),
            _ => Err(HarnessError::invalid_arg(
                raw,
                "unknown kind, expected int|uint|char|str|null|ptr",
            )),
        }
    }
}

fn parse_uint(s: &str) -> Option<u64> {
    let s = s.trim().replace('_', "");
    match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16).ok(),
        None => s.parse().ok(),
    }
}

fn parse_int(s: &str) -> Option<i64> {
    let s = s.trim();
    match s.strip_prefix('-') {
        Some(rest) => {
            let magnitude = parse_uint(rest)?;
            0i64.checked_sub_unsigned(magnitude)
        }
        None => parse_uint(s).and_then(|v| i64::try_from(v).ok()),
    }
}

/// A single fixture test case.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixtureCase {
    /// Case identifier.
    pub name: String,
    /// POSIX/C section or behavior the case pins down.
    pub spec_section: String,
    /// Format template.
    pub template: String,
    #[serde(default)]
    pub args: Vec<FixtureArg>,
    /// Expected output bytes, decoded as UTF-8.
    pub expected_output: String,
    /// Expected C-style return value.
    pub expected_return: i32,
}

impl FixtureCase {
    /// Convert all arguments for one engine call.
    pub fn format_args(&self) -> Result<Vec<FormatArg<'_>>, HarnessError> {
        self.args.iter().map(FixtureArg::to_format_arg).collect()
    }
}

/// A collection of fixture cases for one conversion family.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixtureSet {
    /// Schema version.
    pub version: String,
    /// Family name (e.g. `printf/core`).
    pub family: String,
    /// UTC timestamp of capture.
    pub captured_at: String,
    pub cases: Vec<FixtureCase>,
}

impl FixtureSet {
    /// Load fixture set from JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serialize fixture set to JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Load fixture set from a file path.
    pub fn from_file(path: &Path) -> Result<Self, HarnessError> {
        let load = || -> Result<Self, HarnessError> {
            let content = std::fs::read_to_string(path)?;
            Ok(Self::from_json(&content)?)
        };
        load().map_err(|err| HarnessError::Fixture {
            path: path.to_path_buf(),
            source: Box::new(err),
        })
    }
}

/// Sorted `*.json` paths directly inside `dir`.
pub fn fixture_paths(dir: &Path) -> Result<Vec<PathBuf>, HarnessError> {
    let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|entry| entry.path()))
        .filter(|path| path.extension().and_then(|s| s.to_str()) == Some("json"))
        .collect();
    paths.sort();
    Ok(paths)
}
