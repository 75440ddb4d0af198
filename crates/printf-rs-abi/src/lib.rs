//! # printf-rs-abi
//!
//! extern "C" boundary layer for printf-rs.
//!
//! This crate produces a `cdylib` exposing `printf_rs_printf`,
//! `printf_rs_dprintf` and `printf_rs_snprintf`. C callers pass the variadic
//! arguments as an array of 64-bit slots; each slot is reinterpreted
//! according to the directive that consumes it before the safe engine in
//! `printf-rs-core` runs.
//!
//! ```text
//! C caller -> ABI entry (this crate) -> slot decoding -> core engine -> fd sink
//! ```

pub mod io_abi;
pub mod stdio_abi;

pub use io_abi::FdSink;
pub use stdio_abi::{
    count_printf_args, dprintf, format_and_print, printf, printf_rs_dprintf, printf_rs_printf,
    printf_rs_snprintf, snprintf,
};

#[doc(hidden)]
pub use printf_rs_core;

/// Format a template with arguments and print it to standard output.
///
/// Arguments are converted with `FormatArg::from`, so integers, string
/// slices, byte slices and `Option<&str>` (for null strings) can be passed
/// directly. Evaluates to the C-style return value: bytes written, or `-1`
/// on error.
///
/// ```
/// let n = printf_rs_abi::printf!("%-5d|%s\n", 42, "ok");
/// assert_eq!(n, 9);
/// ```
#[macro_export]
macro_rules! printf {
    ($fmt:expr $(, $arg:expr)* $(,)?) => {
        $crate::format_and_print(
            ::core::convert::AsRef::<[u8]>::as_ref($fmt),
            &[$($crate::printf_rs_core::stdio::FormatArg::from($arg)),*],
        )
    };
}
