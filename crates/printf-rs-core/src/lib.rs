//! # printf-rs-core
//!
//! Safe Rust implementation of the C `printf` format interpreter.
//!
//! The engine scans a format template, parses each `%` directive into a
//! [`stdio::FormatSpec`], and dispatches it to a conversion handler looked up
//! in a [`stdio::ConversionTable`]. Output goes to any [`std::io::Write`]
//! sink, one write per literal run or handler, and every call returns the
//! exact number of bytes written. No `unsafe` code is permitted at the crate
//! level; printing straight to a file descriptor lives in `printf-rs-abi`.

#![deny(unsafe_code)]

pub mod stdio;

/// Format a template with arguments into a `Vec<u8>`.
///
/// Evaluates to `Result<Vec<u8>, FormatError>`.
#[macro_export]
macro_rules! sprintf {
    ($fmt:expr $(, $arg:expr)* $(,)?) => {
        $crate::stdio::sprintf(
            ::core::convert::AsRef::<[u8]>::as_ref($fmt),
            &[$($crate::stdio::FormatArg::from($arg)),*],
        )
    };
}
