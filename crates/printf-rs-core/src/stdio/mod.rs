//! Standard I/O formatted output.
//!
//! Implements the `<stdio.h>` printf family on top of explicit sinks:
//! directive parsing, argument extraction, per-conversion handlers, and the
//! interpreter that ties them together.

pub mod args;
pub mod convert;
pub mod error;
pub mod numeric;
pub mod printf;

pub use args::{ArgCursor, FormatArg};
pub use convert::{Conversion, ConversionTable, standard_table};
pub use error::FormatError;
pub use printf::{
    FormatFlags, FormatSegment, FormatSegments, FormatSpec, LengthMod, Precision, Width, format_to,
    format_with, parse_format_spec, parse_format_string, sprintf, to_c_return,
};
