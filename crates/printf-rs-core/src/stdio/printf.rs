//! printf formatting engine.
//!
//! Clean-room implementation of the printf format string interpreter.
//! Parses format directives and streams rendered arguments to a
//! [`Write`] sink with width/precision/flag support.
//!
//! Reference: POSIX.1-2024 fprintf, ISO C11 7.21.6.1
//!
//! Malformed directives: an unknown conversion letter copies the directive
//! text through verbatim and consumes no argument; a template that ends
//! inside a directive aborts the call with
//! [`FormatError::IncompleteDirective`].

use std::io::Write;

use super::args::{ArgCursor, FormatArg};
use super::convert::{ConversionTable, standard_table};
use super::error::FormatError;
use super::numeric::emit;

/// Largest width, precision or total a call may produce (`INT_MAX`).
pub const MAX_FIELD: usize = i32::MAX as usize;

// ---------------------------------------------------------------------------
// Format spec types
// ---------------------------------------------------------------------------

/// Flags parsed from a printf format directive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FormatFlags {
    pub left_justify: bool, // '-'
    pub force_sign: bool,   // '+'
    pub space_sign: bool,   // ' '
    pub alt_form: bool,     // '#'
    pub zero_pad: bool,     // '0'
}

/// Width specification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Width {
    None,
    Fixed(usize),
    FromArg, // '*'
}

/// Precision specification. `None` is the "unspecified" state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Precision {
    None,
    Fixed(usize),
    FromArg, // '.*'
}

/// Length modifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LengthMod {
    None,
    Hh, // 'hh'
    H,  // 'h'
    L,  // 'l'
    Ll, // 'll'
    Z,  // 'z'
    T,  // 't'
    J,  // 'j'
}

impl LengthMod {
    /// Truncate a signed slot to the modifier's width and sign-extend it back.
    #[must_use]
    pub const fn narrow_signed(self, raw: i64) -> i64 {
        match self {
            Self::Hh => raw as i8 as i64,
            Self::H => raw as i16 as i64,
            Self::None => raw as i32 as i64,
            Self::L | Self::Ll | Self::Z | Self::T | Self::J => raw,
        }
    }

    /// Truncate an unsigned slot to the modifier's width.
    #[must_use]
    pub const fn narrow_unsigned(self, raw: u64) -> u64 {
        match self {
            Self::Hh => raw as u8 as u64,
            Self::H => raw as u16 as u64,
            Self::None => raw as u32 as u64,
            Self::L | Self::Ll | Self::Z | Self::T | Self::J => raw,
        }
    }

    /// Bit-width class: `hh` < `h` < every 64-bit modifier.
    const fn rank(self) -> u8 {
        match self {
            Self::Hh => 0,
            Self::H => 1,
            Self::None => 2,
            Self::L | Self::Ll | Self::Z | Self::T | Self::J => 3,
        }
    }
}

/// Read one length modifier token at the start of `fmt`.
fn length_token(fmt: &[u8]) -> Option<(LengthMod, usize)> {
    let doubled = fmt.get(1) == fmt.first();
    match fmt.first()? {
        b'h' if doubled => Some((LengthMod::Hh, 2)),
        b'h' => Some((LengthMod::H, 1)),
        b'l' if doubled => Some((LengthMod::Ll, 2)),
        b'l' => Some((LengthMod::L, 1)),
        b'z' => Some((LengthMod::Z, 1)),
        b't' => Some((LengthMod::T, 1)),
        b'j' => Some((LengthMod::J, 1)),
        _ => None,
    }
}

/// A parsed printf format specifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatSpec {
    pub flags: FormatFlags,
    pub width: Width,
    pub precision: Precision,
    pub length: LengthMod,
    pub conversion: u8,
}

// ---------------------------------------------------------------------------
// Segment: parsed pieces of a format string
// ---------------------------------------------------------------------------

/// A segment of a parsed format string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatSegment<'a> {
    /// Literal bytes to emit verbatim.
    Literal(&'a [u8]),
    /// A complete `%` directive. `text` is the raw directive including `%`.
    Directive {
        spec: FormatSpec,
        text: &'a [u8],
        offset: usize,
    },
    /// The template ended inside the directive starting at `offset`.
    Incomplete { offset: usize },
}

// ---------------------------------------------------------------------------
// Parser
// ---------------------------------------------------------------------------

/// Parse a single format specifier starting after the '%' character.
///
/// `fmt` points to the first byte AFTER '%'. Returns `(spec, bytes_consumed)`
/// where `bytes_consumed` counts from `fmt[0]`. Returns `None` if the input
/// runs out before a conversion byte. Any byte that is not a flag, digit,
/// `*`, `.` or length letter becomes the conversion; whether it names a
/// handler is decided at dispatch.
#[must_use]
pub fn parse_format_spec(fmt: &[u8]) -> Option<(FormatSpec, usize)> {
    let mut pos = 0;
    let len = fmt.len();

    // --- flags ---
    let mut flags = FormatFlags::default();
    while pos < len {
        match fmt[pos] {
            b'-' => flags.left_justify = true,
            b'+' => flags.force_sign = true,
            b' ' => flags.space_sign = true,
            b'#' => flags.alt_form = true,
            b'0' => flags.zero_pad = true,
            _ => break,
        }
        pos += 1;
    }
    // POSIX: '+' overrides ' '; '-' overrides '0'.
    if flags.force_sign {
        flags.space_sign = false;
    }
    if flags.left_justify {
        flags.zero_pad = false;
    }

    // --- width ---
    let width = if pos < len && fmt[pos] == b'*' {
        pos += 1;
        Width::FromArg
    } else {
        let start = pos;
        while pos < len && fmt[pos].is_ascii_digit() {
            pos += 1;
        }
        if pos > start {
            Width::Fixed(parse_decimal(&fmt[start..pos]))
        } else {
            Width::None
        }
    };

    // --- precision ---
    let precision = if pos < len && fmt[pos] == b'.' {
        pos += 1;
        if pos < len && fmt[pos] == b'*' {
            pos += 1;
            Precision::FromArg
        } else {
            let start = pos;
            while pos < len && fmt[pos].is_ascii_digit() {
                pos += 1;
            }
            Precision::Fixed(if pos > start {
                parse_decimal(&fmt[start..pos])
            } else {
                0
            })
        }
    } else {
        Precision::None
    };

    // --- length modifiers (repeatable; the widest one wins) ---
    let mut widest: Option<LengthMod> = None;
    while let Some((token, used)) = length_token(&fmt[pos..]) {
        pos += used;
        if widest.is_none_or(|w| token.rank() > w.rank()) {
            widest = Some(token);
        }
    }
    let length = widest.unwrap_or(LengthMod::None);

    // --- conversion specifier ---
    if pos >= len {
        return None;
    }
    let conversion = fmt[pos];
    pos += 1;

    Some((
        FormatSpec {
            flags,
            width,
            precision,
            length,
            conversion,
        },
        pos,
    ))
}

/// Lazy iterator over the segments of a format template.
///
/// The template ends at its first NUL byte, as a C string would.
/// After an [`FormatSegment::Incomplete`] the iterator is exhausted.
#[derive(Debug, Clone)]
pub struct FormatSegments<'a> {
    fmt: &'a [u8],
    pos: usize,
}

impl<'a> FormatSegments<'a> {
    #[must_use]
    pub fn new(fmt: &'a [u8]) -> Self {
        let end = fmt.iter().position(|&b| b == 0).unwrap_or(fmt.len());
        Self {
            fmt: &fmt[..end],
            pos: 0,
        }
    }
}

impl<'a> Iterator for FormatSegments<'a> {
    type Item = FormatSegment<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let len = self.fmt.len();
        if self.pos >= len {
            return None;
        }

        let start = self.pos;
        if self.fmt[start] != b'%' {
            // Literal run up to the next '%' or end of string.
            let run = self.fmt[start..]
                .iter()
                .position(|&b| b == b'%')
                .unwrap_or(len - start);
            self.pos += run;
            return Some(FormatSegment::Literal(&self.fmt[start..start + run]));
        }

        match parse_format_spec(&self.fmt[start + 1..]) {
            Some((spec, consumed)) => {
                self.pos = start + 1 + consumed;
                Some(FormatSegment::Directive {
                    spec,
                    text: &self.fmt[start..self.pos],
                    offset: start,
                })
            }
            None => {
                self.pos = len;
                Some(FormatSegment::Incomplete { offset: start })
            }
        }
    }
}

/// Collect every segment of a printf format string.
///
/// Yields `FormatSegment::Literal` for literal runs and
/// `FormatSegment::Directive` for each `%`-directive, `%%` included.
#[must_use]
pub fn parse_format_string(fmt: &[u8]) -> Vec<FormatSegment<'_>> {
    FormatSegments::new(fmt).collect()
}

// ---------------------------------------------------------------------------
// Interpreter
// ---------------------------------------------------------------------------

/// Interpret `template` with the standard conversion table.
pub fn format_to(
    out: &mut dyn Write,
    template: &[u8],
    args: &[FormatArg<'_>],
) -> Result<usize, FormatError> {
    format_with(standard_table(), out, template, args)
}

/// Interpret `template` against `args`, writing to `out`.
///
/// Literal runs are written as they are found and each handler writes its
/// own output, so a failing sink stops the call with whatever was already
/// written left in place. Returns the total number of bytes written.
pub fn format_with(
    table: &ConversionTable,
    out: &mut dyn Write,
    template: &[u8],
    args: &[FormatArg<'_>],
) -> Result<usize, FormatError> {
    let mut cursor = ArgCursor::new(args);
    let mut total = 0usize;

    for segment in FormatSegments::new(template) {
        let written = match segment {
            FormatSegment::Literal(bytes) => emit(out, bytes)?,
            FormatSegment::Directive { spec, text, .. } => match table.get(spec.conversion) {
                Some(handler) => {
                    let resolved = resolve_spec(spec, &mut cursor)?;
                    handler.convert(&resolved, &mut cursor, out)?
                }
                None => emit(out, text)?,
            },
            FormatSegment::Incomplete { offset } => {
                return Err(FormatError::IncompleteDirective { offset });
            }
        };
        total = total
            .checked_add(written)
            .filter(|&t| t <= MAX_FIELD)
            .ok_or(FormatError::Overflow)?;
    }
    Ok(total)
}

/// Render into a fresh byte vector.
pub fn sprintf(template: &[u8], args: &[FormatArg<'_>]) -> Result<Vec<u8>, FormatError> {
    let mut buf = Vec::with_capacity(template.len() + 16);
    format_to(&mut buf, template, args)?;
    Ok(buf)
}

/// Map a formatting result to the C return convention.
#[must_use]
pub fn to_c_return(result: Result<usize, FormatError>) -> i32 {
    match result {
        Ok(n) => i32::try_from(n).unwrap_or(FormatError::SENTINEL),
        Err(err) => err.as_sentinel(),
    }
}

/// Replace `*` width/precision with values pulled from the argument list.
///
/// A negative width means left-justify with its magnitude; a negative
/// precision means "unspecified".
fn resolve_spec(mut spec: FormatSpec, args: &mut ArgCursor<'_>) -> Result<FormatSpec, FormatError> {
    if spec.width == Width::FromArg {
        let w = i64::from(args.next_signed(b'*')? as i32);
        if w < 0 {
            spec.flags.left_justify = true;
            spec.flags.zero_pad = false;
        }
        spec.width = Width::Fixed(w.unsigned_abs() as usize);
    }
    if spec.precision == Precision::FromArg {
        let p = i64::from(args.next_signed(b'*')? as i32);
        spec.precision = if p < 0 {
            Precision::None
        } else {
            Precision::Fixed(p as usize)
        };
    }
    let too_wide = matches!(spec.width, Width::Fixed(w) if w > MAX_FIELD)
        || matches!(spec.precision, Precision::Fixed(p) if p > MAX_FIELD);
    if too_wide {
        return Err(FormatError::Overflow);
    }
    Ok(spec)
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn parse_decimal(digits: &[u8]) -> usize {
    let mut result = 0_usize;
    for &d in digits {
        result = result
            .saturating_mul(10)
            .saturating_add((d - b'0') as usize);
    }
    result
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
