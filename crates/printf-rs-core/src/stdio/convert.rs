//! Conversion handlers and the letter-to-handler dispatch table.
//!
//! Every handler consumes exactly the arguments its conversion needs, writes
//! its rendering to the sink, and returns the number of bytes written
//! (padding included).

use std::fmt;
use std::io::Write;
use std::sync::OnceLock;

use super::args::ArgCursor;
use super::error::FormatError;
use super::numeric::{DigitBuf, emit, field_width, write_number, write_padded};
use super::printf::{FormatSpec, Precision};

/// Substitution text for a null `%s` argument.
const NULL_STR: &[u8] = b"(null)";
/// Replaces [`NULL_STR`] when the precision is wide enough to hold it.
const NULL_STR_BLANK: &[u8] = b"      ";
/// Rendering of a null `%p` argument.
const NULL_PTR: &[u8] = b"(nil)";

/// A conversion handler: consume arguments, render, report bytes written.
pub trait Conversion {
    fn convert(
        &self,
        spec: &FormatSpec,
        args: &mut ArgCursor<'_>,
        out: &mut dyn Write,
    ) -> Result<usize, FormatError>;
}

impl<F> Conversion for F
where
    F: Fn(&FormatSpec, &mut ArgCursor<'_>, &mut dyn Write) -> Result<usize, FormatError>,
{
    fn convert(
        &self,
        spec: &FormatSpec,
        args: &mut ArgCursor<'_>,
        out: &mut dyn Write,
    ) -> Result<usize, FormatError> {
        self(spec, args, out)
    }
}

type BoxedConversion = Box<dyn Conversion + Send + Sync>;

/// Dispatch table keyed by ASCII conversion byte.
pub struct ConversionTable {
    slots: [Option<BoxedConversion>; 128],
}

impl ConversionTable {
    /// A table with no handlers: every directive passes through as text.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            slots: std::array::from_fn(|_| None),
        }
    }

    /// The built-in conversions: `c s % d i b u o x X p`.
    #[must_use]
    pub fn standard() -> Self {
        let mut table = Self::empty();
        table.register(b'c', convert_char);
        table.register(b's', convert_str);
        table.register(b'%', convert_percent);
        table.register(b'd', convert_signed);
        table.register(b'i', convert_signed);
        table.register(b'b', convert_binary);
        table.register(b'u', convert_unsigned);
        table.register(b'o', convert_unsigned);
        table.register(b'x', convert_unsigned);
        table.register(b'X', convert_unsigned);
        table.register(b'p', convert_pointer);
        table
    }

    /// Install `handler` for `conversion`, replacing any previous one.
    ///
    /// Returns `false` (and installs nothing) for bytes the directive parser
    /// consumes before the conversion position: flags, digits, `*`, `.`,
    /// length letters, and anything outside ASCII.
    pub fn register(
        &mut self,
        conversion: u8,
        handler: impl Conversion + Send + Sync + 'static,
    ) -> bool {
        if !is_registrable(conversion) {
            return false;
        }
        self.slots[usize::from(conversion)] = Some(Box::new(handler));
        true
    }

    /// Remove the handler for `conversion`, if any.
    pub fn unregister(&mut self, conversion: u8) {
        if let Some(slot) = self.slots.get_mut(usize::from(conversion)) {
            *slot = None;
        }
    }

    #[must_use]
    pub fn get(&self, conversion: u8) -> Option<&(dyn Conversion + Send + Sync)> {
        self.slots
            .get(usize::from(conversion))
            .and_then(|slot| slot.as_deref())
    }

    #[must_use]
    pub fn is_registered(&self, conversion: u8) -> bool {
        self.get(conversion).is_some()
    }

    /// Registered conversion bytes in ascending order.
    pub fn conversions(&self) -> impl Iterator<Item = u8> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.is_some())
            .map(|(i, _)| i as u8)
    }
}

impl Default for ConversionTable {
    fn default() -> Self {
        Self::standard()
    }
}

impl fmt::Debug for ConversionTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionTable")
            .field(
                "conversions",
                &self.conversions().map(char::from).collect::<String>(),
            )
            .finish()
    }
}

/// Shared instance of [`ConversionTable::standard`].
pub fn standard_table() -> &'static ConversionTable {
    static TABLE: OnceLock<ConversionTable> = OnceLock::new();
    TABLE.get_or_init(ConversionTable::standard)
}

fn is_registrable(conversion: u8) -> bool {
    conversion.is_ascii()
        && conversion != 0
        && !conversion.is_ascii_digit()
        && !matches!(
            conversion,
            b'-' | b'+' | b' ' | b'#' | b'*' | b'.' | b'h' | b'l' | b'z' | b't' | b'j'
        )
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// `%c`: one byte, space-padded to the field width.
pub fn convert_char(
    spec: &FormatSpec,
    args: &mut ArgCursor<'_>,
    out: &mut dyn Write,
) -> Result<usize, FormatError> {
    let c = args.next_byte(spec.conversion)?;
    write_padded(out, &[c], field_width(spec), spec.flags.left_justify)
}

/// `%s`: bytes up to the first NUL, truncated to the precision.
///
/// A null argument prints `(null)`, or six spaces when the precision is at
/// least six.
pub fn convert_str(
    spec: &FormatSpec,
    args: &mut ArgCursor<'_>,
    out: &mut dyn Write,
) -> Result<usize, FormatError> {
    let text = match args.next_str(spec.conversion)? {
        Some(s) => &s[..s.iter().position(|&b| b == 0).unwrap_or(s.len())],
        None => match spec.precision {
            Precision::Fixed(p) if p >= NULL_STR.len() => NULL_STR_BLANK,
            _ => NULL_STR,
        },
    };
    let len = match spec.precision {
        Precision::Fixed(p) => text.len().min(p),
        _ => text.len(),
    };
    write_padded(out, &text[..len], field_width(spec), spec.flags.left_justify)
}

/// `%%`: a single `%`; qualifiers and arguments are ignored.
pub fn convert_percent(
    _spec: &FormatSpec,
    _args: &mut ArgCursor<'_>,
    out: &mut dyn Write,
) -> Result<usize, FormatError> {
    emit(out, b"%")
}

/// `%d` / `%i`: signed decimal at the width the length modifier selects.
pub fn convert_signed(
    spec: &FormatSpec,
    args: &mut ArgCursor<'_>,
    out: &mut dyn Write,
) -> Result<usize, FormatError> {
    let value = spec.length.narrow_signed(args.next_signed(spec.conversion)?);
    // unsigned_abs keeps the minimum value representable.
    let digits = DigitBuf::render(value.unsigned_abs(), 10, false);
    let sign = if value < 0 {
        Some(b'-')
    } else if spec.flags.force_sign {
        Some(b'+')
    } else if spec.flags.space_sign {
        Some(b' ')
    } else {
        None
    };
    write_number(out, spec, sign, b"", &digits)
}

/// `%u`, `%o`, `%x`, `%X`: unsigned in base 10, 8 or 16.
pub fn convert_unsigned(
    spec: &FormatSpec,
    args: &mut ArgCursor<'_>,
    out: &mut dyn Write,
) -> Result<usize, FormatError> {
    let value = spec
        .length
        .narrow_unsigned(args.next_unsigned(spec.conversion)?);
    let (radix, uppercase) = int_base(spec.conversion);
    let digits = DigitBuf::render(value, radix, uppercase);
    let prefix = alt_prefix(spec, value, digits.len());
    write_number(out, spec, None, prefix, &digits)
}

/// `%b`: the low 32 bits in binary, most significant first, no leading
/// zeros. Width, precision and flags are ignored.
pub fn convert_binary(
    spec: &FormatSpec,
    args: &mut ArgCursor<'_>,
    out: &mut dyn Write,
) -> Result<usize, FormatError> {
    let value = args.next_unsigned(spec.conversion)? as u32;
    let mut digits = [0u8; 32];
    let mut count = 0;
    let mut seen = 0;
    for bit in (0..u32::BITS).rev() {
        let d = (value >> bit) & 1;
        seen |= d;
        if seen != 0 || bit == 0 {
            digits[count] = b'0' + d as u8;
            count += 1;
        }
    }
    emit(out, &digits[..count])
}

/// `%p`: `0x` followed by lowercase hex, or `(nil)` for null.
pub fn convert_pointer(
    spec: &FormatSpec,
    args: &mut ArgCursor<'_>,
    out: &mut dyn Write,
) -> Result<usize, FormatError> {
    let addr = args.next_pointer(spec.conversion)?;
    if addr == 0 {
        return write_padded(out, NULL_PTR, field_width(spec), spec.flags.left_justify);
    }
    let digits = DigitBuf::render(addr as u64, 16, false);
    write_number(out, spec, None, b"0x", &digits)
}

fn int_base(conversion: u8) -> (u64, bool) {
    match conversion {
        b'o' => (8, false),
        b'x' => (16, false),
        b'X' => (16, true),
        _ => (10, false),
    }
}

/// Alternate-form prefix for unsigned conversions.
///
/// Hex gets `0x`/`0X` for non-zero values. Octal gets a `0` only when the
/// rendered digits would not already start with one.
fn alt_prefix(spec: &FormatSpec, value: u64, digit_count: usize) -> &'static [u8] {
    if !spec.flags.alt_form {
        return b"";
    }
    match spec.conversion {
        b'x' if value != 0 => b"0x",
        b'X' if value != 0 => b"0X",
        b'o' => {
            let precision = match spec.precision {
                Precision::Fixed(p) => Some(p),
                _ => None,
            };
            let leading_zero = if value == 0 {
                precision != Some(0)
            } else {
                precision.is_some_and(|p| p > digit_count)
            };
            if leading_zero { b"" } else { b"0" }
        }
        _ => b"",
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stdio::args::FormatArg;
    use crate::stdio::printf::{FormatFlags, LengthMod, Width};

    fn spec(conversion: u8) -> FormatSpec {
        FormatSpec {
            flags: FormatFlags::default(),
            width: Width::None,
            precision: Precision::None,
            length: LengthMod::None,
            conversion,
        }
    }

    fn run(
        handler: impl Conversion,
        spec: &FormatSpec,
        args: &[FormatArg<'_>],
    ) -> (Vec<u8>, usize) {
        let mut cursor = ArgCursor::new(args);
        let mut buf = Vec::new();
        let n = handler.convert(spec, &mut cursor, &mut buf).unwrap();
        assert_eq!(n, buf.len(), "handler count must equal bytes written");
        (buf, n)
    }

    #[test]
    fn test_format_char() {
        let s = FormatSpec {
            width: Width::Fixed(5),
            ..spec(b'c')
        };
        let (buf, n) = run(convert_char, &s, &[FormatArg::from(b'A')]);
        assert_eq!(&buf, b"    A");
        assert_eq!(n, 5);
    }

    #[test]
    fn test_format_char_left_justify() {
        let s = FormatSpec {
            flags: FormatFlags {
                left_justify: true,
                ..Default::default()
            },
            width: Width::Fixed(3),
            ..spec(b'c')
        };
        let (buf, _) = run(convert_char, &s, &[FormatArg::from(i32::from(b'z'))]);
        assert_eq!(&buf, b"z  ");
    }

    #[test]
    fn test_format_str_basic() {
        let (buf, n) = run(convert_str, &spec(b's'), &[FormatArg::from("hello")]);
        assert_eq!(&buf, b"hello");
        assert_eq!(n, 5);
    }

    #[test]
    fn test_format_str_precision_truncate() {
        let s = FormatSpec {
            precision: Precision::Fixed(3),
            ..spec(b's')
        };
        let (buf, _) = run(convert_str, &s, &[FormatArg::from("hello")]);
        assert_eq!(&buf, b"hel");
    }

    #[test]
    fn test_format_str_stops_at_nul() {
        let (buf, n) = run(convert_str, &spec(b's'), &[FormatArg::from(&b"ab\0cd"[..])]);
        assert_eq!(&buf, b"ab");
        assert_eq!(n, 2);
    }

    #[test]
    fn test_format_str_null() {
        let (buf, n) = run(convert_str, &spec(b's'), &[FormatArg::Str(None)]);
        assert_eq!(&buf, b"(null)");
        assert_eq!(n, 6);
    }

    #[test]
    fn test_format_str_null_with_wide_precision_is_blank() {
        for p in [6, 7, 100] {
            let s = FormatSpec {
                precision: Precision::Fixed(p),
                ..spec(b's')
            };
            let (buf, n) = run(convert_str, &s, &[FormatArg::Str(None)]);
            assert_eq!(&buf, b"      ");
            assert_eq!(n, 6);
        }
    }

    #[test]
    fn test_format_str_null_with_short_precision_truncates() {
        let s = FormatSpec {
            precision: Precision::Fixed(3),
            ..spec(b's')
        };
        let (buf, _) = run(convert_str, &s, &[FormatArg::Str(None)]);
        assert_eq!(&buf, b"(nu");
    }

    #[test]
    fn test_format_str_width_returns_width() {
        let s = FormatSpec {
            flags: FormatFlags {
                left_justify: true,
                ..Default::default()
            },
            width: Width::Fixed(8),
            ..spec(b's')
        };
        let (buf, n) = run(convert_str, &s, &[FormatArg::from("abc")]);
        assert_eq!(&buf, b"abc     ");
        assert_eq!(n, 8);
    }

    #[test]
    fn test_percent_writes_one_byte() {
        let s = FormatSpec {
            width: Width::Fixed(5),
            ..spec(b'%')
        };
        let (buf, n) = run(convert_percent, &s, &[]);
        assert_eq!(&buf, b"%");
        assert_eq!(n, 1);
    }

    #[test]
    fn test_format_signed_basic() {
        let (buf, _) = run(convert_signed, &spec(b'd'), &[FormatArg::from(42)]);
        assert_eq!(&buf, b"42");
    }

    #[test]
    fn test_format_signed_negative() {
        let (buf, _) = run(convert_signed, &spec(b'd'), &[FormatArg::from(-123)]);
        assert_eq!(&buf, b"-123");
    }

    #[test]
    fn test_format_signed_zero() {
        let (buf, n) = run(convert_signed, &spec(b'd'), &[FormatArg::from(0)]);
        assert_eq!(&buf, b"0");
        assert_eq!(n, 1);
    }

    #[test]
    fn test_format_signed_width_pad() {
        let s = FormatSpec {
            width: Width::Fixed(8),
            ..spec(b'd')
        };
        let (buf, _) = run(convert_signed, &s, &[FormatArg::from(42)]);
        assert_eq!(&buf, b"      42");
    }

    #[test]
    fn test_format_signed_zero_pad() {
        let s = FormatSpec {
            flags: FormatFlags {
                zero_pad: true,
                ..Default::default()
            },
            width: Width::Fixed(8),
            ..spec(b'd')
        };
        let (buf, _) = run(convert_signed, &s, &[FormatArg::from(-42)]);
        assert_eq!(&buf, b"-0000042");
    }

    #[test]
    fn test_format_signed_precision_min_digits() {
        let s = FormatSpec {
            width: Width::Fixed(7),
            precision: Precision::Fixed(4),
            ..spec(b'd')
        };
        let (buf, _) = run(convert_signed, &s, &[FormatArg::from(-42)]);
        assert_eq!(&buf, b"  -0042");
    }

    #[test]
    fn test_precision_zero_int() {
        let s = FormatSpec {
            precision: Precision::Fixed(0),
            ..spec(b'd')
        };
        let (buf, n) = run(convert_signed, &s, &[FormatArg::from(0)]);
        assert_eq!(&buf, b""); // POSIX: precision 0 with value 0 produces no digits
        assert_eq!(n, 0);
    }

    #[test]
    fn test_force_sign() {
        let s = FormatSpec {
            flags: FormatFlags {
                force_sign: true,
                ..Default::default()
            },
            ..spec(b'd')
        };
        let (buf, _) = run(convert_signed, &s, &[FormatArg::from(42)]);
        assert_eq!(&buf, b"+42");
    }

    #[test]
    fn test_space_sign() {
        let s = FormatSpec {
            flags: FormatFlags {
                space_sign: true,
                ..Default::default()
            },
            ..spec(b'i')
        };
        let (buf, _) = run(convert_signed, &s, &[FormatArg::from(42)]);
        assert_eq!(&buf, b" 42");
    }

    #[test]
    fn test_default_length_truncates_to_int() {
        let (buf, _) = run(
            convert_signed,
            &spec(b'd'),
            &[FormatArg::from(0x1_0000_0005_i64)],
        );
        assert_eq!(&buf, b"5");
    }

    #[test]
    fn test_short_modifier_sign_extends() {
        let s = FormatSpec {
            length: LengthMod::H,
            ..spec(b'd')
        };
        let (buf, _) = run(convert_signed, &s, &[FormatArg::from(0xffff)]);
        assert_eq!(&buf, b"-1");
    }

    #[test]
    fn test_minimum_values_per_length() {
        let cases: [(LengthMod, i64, &[u8]); 4] = [
            (LengthMod::Hh, i64::from(i8::MIN), b"-128"),
            (LengthMod::H, i64::from(i16::MIN), b"-32768"),
            (LengthMod::None, i64::from(i32::MIN), b"-2147483648"),
            (LengthMod::L, i64::MIN, b"-9223372036854775808"),
        ];
        for (length, value, expected) in cases {
            let s = FormatSpec {
                length,
                ..spec(b'd')
            };
            let (buf, n) = run(convert_signed, &s, &[FormatArg::from(value)]);
            assert_eq!(buf, expected);
            assert_eq!(n, expected.len());
        }
    }

    #[test]
    fn test_format_unsigned_hex() {
        let s = FormatSpec {
            flags: FormatFlags {
                alt_form: true,
                ..Default::default()
            },
            ..spec(b'x')
        };
        let (buf, _) = run(convert_unsigned, &s, &[FormatArg::from(255u32)]);
        assert_eq!(&buf, b"0xff");
    }

    #[test]
    fn test_format_unsigned_hex_upper_zero_has_no_prefix() {
        let s = FormatSpec {
            flags: FormatFlags {
                alt_form: true,
                ..Default::default()
            },
            ..spec(b'X')
        };
        let (buf, _) = run(convert_unsigned, &s, &[FormatArg::from(0u32)]);
        assert_eq!(&buf, b"0");
    }

    #[test]
    fn test_format_unsigned_octal() {
        let s = FormatSpec {
            flags: FormatFlags {
                alt_form: true,
                ..Default::default()
            },
            ..spec(b'o')
        };
        let (buf, _) = run(convert_unsigned, &s, &[FormatArg::from(8u32)]);
        assert_eq!(&buf, b"010");
    }

    #[test]
    fn test_format_unsigned_octal_alt_zero_precision_zero() {
        let s = FormatSpec {
            flags: FormatFlags {
                alt_form: true,
                ..Default::default()
            },
            precision: Precision::Fixed(0),
            ..spec(b'o')
        };
        let (buf, _) = run(convert_unsigned, &s, &[FormatArg::from(0u32)]);
        assert_eq!(&buf, b"0");
    }

    #[test]
    fn test_format_unsigned_negative_wraps() {
        let (buf, _) = run(convert_unsigned, &spec(b'u'), &[FormatArg::from(-1)]);
        assert_eq!(&buf, b"4294967295");
    }

    #[test]
    fn test_format_unsigned_ignores_plus() {
        let s = FormatSpec {
            flags: FormatFlags {
                force_sign: true,
                ..Default::default()
            },
            ..spec(b'u')
        };
        let (buf, _) = run(convert_unsigned, &s, &[FormatArg::from(3u32)]);
        assert_eq!(&buf, b"3");
    }

    #[test]
    fn test_binary_values() {
        let cases: [(u32, &[u8]); 5] = [
            (0, b"0"),
            (1, b"1"),
            (5, b"101"),
            (98, b"1100010"),
            (u32::MAX, b"11111111111111111111111111111111"),
        ];
        for (value, expected) in cases {
            let (buf, n) = run(convert_binary, &spec(b'b'), &[FormatArg::from(value)]);
            assert_eq!(buf, expected);
            assert_eq!(n, expected.len());
        }
    }

    #[test]
    fn test_binary_ignores_width_and_flags() {
        let s = FormatSpec {
            flags: FormatFlags {
                zero_pad: true,
                force_sign: true,
                ..Default::default()
            },
            width: Width::Fixed(10),
            precision: Precision::Fixed(8),
            ..spec(b'b')
        };
        let (buf, _) = run(convert_binary, &s, &[FormatArg::from(5u32)]);
        assert_eq!(&buf, b"101");
    }

    #[test]
    fn test_binary_takes_low_32_bits() {
        let (buf, _) = run(
            convert_binary,
            &spec(b'b'),
            &[FormatArg::from(0x1_0000_0002_u64)],
        );
        assert_eq!(&buf, b"10");
    }

    #[test]
    fn test_format_pointer_null() {
        let (buf, _) = run(convert_pointer, &spec(b'p'), &[FormatArg::Pointer(0)]);
        assert_eq!(&buf, b"(nil)");
    }

    #[test]
    fn test_format_pointer_nonzero() {
        let (buf, _) = run(convert_pointer, &spec(b'p'), &[FormatArg::Pointer(0xDEAD)]);
        assert_eq!(&buf, b"0xdead");
    }

    #[test]
    fn test_standard_table_contents() {
        let table = ConversionTable::standard();
        let letters: Vec<u8> = table.conversions().collect();
        assert_eq!(letters, b"%Xbcdiopsux".to_vec());
        assert!(!table.is_registered(b'f'));
    }

    #[test]
    fn test_register_rejects_parser_bytes() {
        let mut table = ConversionTable::empty();
        for b in [b'-', b'0', b'9', b'*', b'.', b'h', b'l', 0xC3] {
            assert!(!table.register(b, convert_percent));
        }
        assert!(table.register(b'r', convert_percent));
        assert!(table.is_registered(b'r'));
        table.unregister(b'r');
        assert!(!table.is_registered(b'r'));
    }
}
