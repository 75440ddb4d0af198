//! ABI layer for the printf family.
//!
//! C callers hand over their variadic arguments as an array of `u64` slots
//! (the variadic ABI promotes everything narrower to register width). Slots
//! are decoded into [`FormatArg`]s by walking the template the same way the
//! engine will, then the safe engine renders them.

use std::ffi::{CStr, c_char, c_int};
use std::io::{self, Write};

use printf_rs_core::stdio::{
    FormatArg, FormatError, FormatSegment, FormatSegments, Precision, Width, format_to,
    standard_table, to_c_return,
};

use crate::io_abi::FdSink;

// ---------------------------------------------------------------------------
// Slot decoding
// ---------------------------------------------------------------------------

/// Count how many argument slots `template` consumes.
///
/// Directives without a handler consume nothing; counting stops at an
/// incomplete trailing directive.
#[must_use]
pub fn count_printf_args(template: &[u8]) -> usize {
    let table = standard_table();
    let mut needed = 0usize;
    for seg in FormatSegments::new(template) {
        let FormatSegment::Directive { spec, .. } = seg else {
            continue;
        };
        if !table.is_registered(spec.conversion) {
            continue;
        }
        needed += usize::from(spec.width == Width::FromArg);
        needed += usize::from(spec.precision == Precision::FromArg);
        if spec.conversion != b'%' {
            needed += 1;
        }
    }
    needed
}

/// Decode raw slots into typed arguments, guided by `template`.
///
/// `*` slots become signed ints, `%s` slots become C strings (null allowed),
/// `%p` slots become addresses, `%c` the low byte, `%d`/`%i` signed and every
/// other conversion unsigned. Decoding stops early when the slots run out;
/// the engine then reports the missing argument.
///
/// # Safety
///
/// Every slot consumed by a `%s` directive must be null or point to a
/// NUL-terminated string that stays valid for `'a`.
pub unsafe fn decode_slots<'a>(template: &[u8], slots: &[u64]) -> Vec<FormatArg<'a>> {
    let table = standard_table();
    let mut args = Vec::with_capacity(count_printf_args(template).min(slots.len()));
    let mut raw = slots.iter().copied();
    for seg in FormatSegments::new(template) {
        let FormatSegment::Directive { spec, .. } = seg else {
            continue;
        };
        if !table.is_registered(spec.conversion) {
            continue;
        }
        let stars = usize::from(spec.width == Width::FromArg)
            + usize::from(spec.precision == Precision::FromArg);
        for _ in 0..stars {
            let Some(v) = raw.next() else {
                return args;
            };
            args.push(FormatArg::SignedInt(v as i64));
        }
        if spec.conversion == b'%' {
            continue;
        }
        let Some(v) = raw.next() else {
            return args;
        };
        args.push(match spec.conversion {
            // SAFETY: forwarded from the caller's contract on %s slots.
            b's' => unsafe { c_str_arg(v) },
            b'p' => FormatArg::Pointer(v as usize),
            b'c' => FormatArg::Char(v as u8),
            b'd' | b'i' => FormatArg::SignedInt(v as i64),
            _ => FormatArg::UnsignedInt(v),
        });
    }
    args
}

/// `slot` must be null or address a NUL-terminated string live for `'a`.
unsafe fn c_str_arg<'a>(slot: u64) -> FormatArg<'a> {
    let ptr = slot as usize as *const c_char;
    if ptr.is_null() {
        return FormatArg::Str(None);
    }
    // SAFETY: caller guarantees a live NUL-terminated string.
    FormatArg::Str(Some(unsafe { CStr::from_ptr(ptr) }.to_bytes()))
}

/// `args` must address `nargs` readable slots when `nargs > 0`.
unsafe fn slot_slice<'a>(args: *const u64, nargs: usize) -> Option<&'a [u64]> {
    if nargs == 0 {
        return Some(&[]);
    }
    if args.is_null() {
        return None;
    }
    // SAFETY: caller guarantees `nargs` readable slots at `args`.
    Some(unsafe { std::slice::from_raw_parts(args, nargs) })
}

// ---------------------------------------------------------------------------
// Safe entry points
// ---------------------------------------------------------------------------

/// Print to standard output and return the C-style result.
///
/// Each literal run and each conversion is one `write(2)` on fd 1; nothing
/// is buffered, and a failed write (including a closed fd 1) gives `-1`.
pub fn format_and_print(template: &[u8], args: &[FormatArg<'_>]) -> c_int {
    dprintf(libc::STDOUT_FILENO, template, args)
}

/// `printf` under its C name; same as [`format_and_print`].
pub fn printf(template: &[u8], args: &[FormatArg<'_>]) -> c_int {
    format_and_print(template, args)
}

/// Print to `fd` with no buffering. Returns bytes written or `-1`.
pub fn dprintf(fd: c_int, template: &[u8], args: &[FormatArg<'_>]) -> c_int {
    to_c_return(format_to(&mut FdSink::new(fd), template, args))
}

/// Fixed-size destination for `snprintf`.
///
/// Keeps the first `dst.len() - 1` bytes and silently drops the rest so the
/// engine still counts the full rendering.
struct TruncatingSink<'a> {
    dst: &'a mut [u8],
    filled: usize,
}

impl<'a> TruncatingSink<'a> {
    fn new(dst: &'a mut [u8]) -> Self {
        Self { dst, filled: 0 }
    }

    /// NUL-terminate what was kept.
    fn terminate(self) {
        if let Some(last) = self.dst.len().checked_sub(1) {
            self.dst[self.filled.min(last)] = 0;
        }
    }
}

impl Write for TruncatingSink<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let room = self.dst.len().saturating_sub(1).saturating_sub(self.filled);
        let n = room.min(buf.len());
        self.dst[self.filled..self.filled + n].copy_from_slice(&buf[..n]);
        self.filled += n;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Render into `dst`, truncating to `dst.len() - 1` bytes plus a NUL.
///
/// Returns the length the full rendering would have had, or `-1`.
pub fn snprintf(dst: &mut [u8], template: &[u8], args: &[FormatArg<'_>]) -> c_int {
    let mut sink = TruncatingSink::new(dst);
    let result = format_to(&mut sink, template, args);
    sink.terminate();
    to_c_return(result)
}

// ---------------------------------------------------------------------------
// extern "C" entry points
// ---------------------------------------------------------------------------

/// `printf` with an explicit slot array.
///
/// # Safety
///
/// `format` must be null or a NUL-terminated string. `args` must point to
/// `nargs` readable slots (it may be null when `nargs` is 0), and every slot
/// consumed by `%s` must be null or a NUL-terminated string.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn printf_rs_printf(
    format: *const c_char,
    args: *const u64,
    nargs: usize,
) -> c_int {
    // SAFETY: same contract, forwarded unchanged.
    unsafe { printf_rs_dprintf(libc::STDOUT_FILENO, format, args, nargs) }
}

/// `dprintf` with an explicit slot array.
///
/// # Safety
///
/// Same contract as [`printf_rs_printf`].
#[unsafe(no_mangle)]
pub unsafe extern "C" fn printf_rs_dprintf(
    fd: c_int,
    format: *const c_char,
    args: *const u64,
    nargs: usize,
) -> c_int {
    if format.is_null() {
        return FormatError::SENTINEL;
    }
    // SAFETY: caller guarantees `nargs` readable slots at `args`.
    let Some(slots) = (unsafe { slot_slice(args, nargs) }) else {
        return FormatError::SENTINEL;
    };
    // SAFETY: `format` is non-null and NUL-terminated per the caller contract.
    let template = unsafe { CStr::from_ptr(format) }.to_bytes();
    // SAFETY: `%s` slots are null or live C strings per the caller contract.
    let decoded = unsafe { decode_slots(template, slots) };
    dprintf(fd, template, &decoded)
}

/// `snprintf` with an explicit slot array.
///
/// Writes at most `size - 1` bytes plus a NUL into `buf` and returns the
/// untruncated length. `buf` may be null when `size` is 0.
///
/// # Safety
///
/// `buf` must be writable for `size` bytes; otherwise as [`printf_rs_printf`].
#[unsafe(no_mangle)]
pub unsafe extern "C" fn printf_rs_snprintf(
    buf: *mut c_char,
    size: usize,
    format: *const c_char,
    args: *const u64,
    nargs: usize,
) -> c_int {
    if format.is_null() || (buf.is_null() && size > 0) {
        return FormatError::SENTINEL;
    }
    // SAFETY: caller guarantees `nargs` readable slots at `args`.
    let Some(slots) = (unsafe { slot_slice(args, nargs) }) else {
        return FormatError::SENTINEL;
    };
    // SAFETY: `format` is non-null and NUL-terminated per the caller contract.
    let template = unsafe { CStr::from_ptr(format) }.to_bytes();
    // SAFETY: `%s` slots are null or live C strings per the caller contract.
    let decoded = unsafe { decode_slots(template, slots) };
    let dst: &mut [u8] = if size == 0 {
        &mut []
    } else {
        // SAFETY: caller guarantees `size` writable bytes at `buf`.
        unsafe { std::slice::from_raw_parts_mut(buf.cast::<u8>(), size) }
    };
    snprintf(dst, template, &decoded)
}
