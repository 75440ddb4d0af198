//! Digit rendering and the padding routines shared by all handlers.
//!
//! Everything here writes straight to the sink in bounded chunks; nothing
//! is staged in a heap buffer.

use std::io::Write;

use super::error::FormatError;
use super::printf::{FormatSpec, Precision, Width};

/// Capacity of the scratch digit buffer: one byte per bit of the widest
/// supported integer, which covers base 2 and therefore every larger radix.
pub const DIGIT_CAPACITY: usize = u64::BITS as usize;

const fn max_digits(radix: u64) -> usize {
    let mut value = u64::MAX;
    let mut count = 0;
    while value > 0 {
        value /= radix;
        count += 1;
    }
    count
}

const _: () = assert!(max_digits(2) <= DIGIT_CAPACITY);
const _: () = assert!(max_digits(8) <= DIGIT_CAPACITY);
const _: () = assert!(max_digits(10) <= DIGIT_CAPACITY);

/// Scratch buffer holding the magnitude digits of one integer.
///
/// Digits are produced least-significant-first from the end of the array;
/// `start` marks the most significant digit. The sign never lives here.
#[derive(Debug, Clone)]
pub struct DigitBuf {
    bytes: [u8; DIGIT_CAPACITY],
    start: usize,
}

impl DigitBuf {
    /// Render `value` in `radix` (2..=16). Zero renders as a single `0`.
    #[must_use]
    pub fn render(mut value: u64, radix: u64, uppercase: bool) -> Self {
        debug_assert!((2..=16).contains(&radix));
        let mut bytes = [0u8; DIGIT_CAPACITY];
        let mut pos = DIGIT_CAPACITY;
        let alpha = if uppercase { b'A' } else { b'a' };
        loop {
            pos -= 1;
            let digit = (value % radix) as u8;
            bytes[pos] = if digit < 10 {
                b'0' + digit
            } else {
                alpha + (digit - 10)
            };
            value /= radix;
            if value == 0 {
                break;
            }
        }
        Self { bytes, start: pos }
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[self.start..]
    }

    #[must_use]
    pub fn len(&self) -> usize {
        DIGIT_CAPACITY - self.start
    }

    /// Always false: a rendered buffer holds at least one digit.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True when the rendered value is zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.as_bytes() == b"0"
    }
}

/// Padding byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fill {
    Space,
    Zero,
}

const SPACES: [u8; 64] = [b' '; 64];
const ZEROS: [u8; 64] = [b'0'; 64];

/// Write `bytes` and return how many were written.
pub fn emit(out: &mut dyn Write, bytes: &[u8]) -> Result<usize, FormatError> {
    if !bytes.is_empty() {
        out.write_all(bytes)?;
    }
    Ok(bytes.len())
}

/// Write `count` copies of the fill byte.
pub fn pad(out: &mut dyn Write, fill: Fill, count: usize) -> Result<usize, FormatError> {
    let chunk: &[u8] = match fill {
        Fill::Space => &SPACES,
        Fill::Zero => &ZEROS,
    };
    let mut left = count;
    while left > 0 {
        let n = left.min(chunk.len());
        out.write_all(&chunk[..n])?;
        left -= n;
    }
    Ok(count)
}

/// Resolved field width (0 when none was given).
#[must_use]
pub fn field_width(spec: &FormatSpec) -> usize {
    match spec.width {
        Width::Fixed(w) => w,
        _ => 0,
    }
}

/// Space-pad `body` to the field width.
///
/// Left-justify puts the body first. Returns the width when padding
/// happened, otherwise the body length.
pub fn write_padded(
    out: &mut dyn Write,
    body: &[u8],
    width: usize,
    left_justify: bool,
) -> Result<usize, FormatError> {
    let pad_total = width.saturating_sub(body.len());
    let mut written = 0;
    if !left_justify {
        written += pad(out, Fill::Space, pad_total)?;
    }
    written += emit(out, body)?;
    if left_justify {
        written += pad(out, Fill::Space, pad_total)?;
    }
    Ok(written)
}

/// Emit an integer: sign, prefix, zero/space padding, precision digits.
///
/// - precision is the minimum digit count; precision 0 with a zero value
///   prints no digits at all
/// - the `0` flag pads with zeros between sign/prefix and digits, but only
///   when no precision was given
/// - left-justify pads with trailing spaces
pub fn write_number(
    out: &mut dyn Write,
    spec: &FormatSpec,
    sign: Option<u8>,
    prefix: &[u8],
    digits: &DigitBuf,
) -> Result<usize, FormatError> {
    let precision = match spec.precision {
        Precision::Fixed(p) => Some(p),
        _ => None,
    };
    let body: &[u8] = if digits.is_zero() && precision == Some(0) {
        b""
    } else {
        digits.as_bytes()
    };
    let zero_fill = precision.map_or(0, |p| p.saturating_sub(body.len()));
    let content = usize::from(sign.is_some()) + prefix.len() + zero_fill + body.len();
    let pad_total = field_width(spec).saturating_sub(content);
    let zero_pad = spec.flags.zero_pad && !spec.flags.left_justify && precision.is_none();

    let mut written = 0;
    if !spec.flags.left_justify && !zero_pad {
        written += pad(out, Fill::Space, pad_total)?;
    }
    if let Some(s) = sign {
        written += emit(out, &[s])?;
    }
    written += emit(out, prefix)?;
    if zero_pad {
        written += pad(out, Fill::Zero, pad_total)?;
    }
    written += pad(out, Fill::Zero, zero_fill)?;
    written += emit(out, body)?;
    if spec.flags.left_justify {
        written += pad(out, Fill::Space, pad_total)?;
    }
    Ok(written)
}
