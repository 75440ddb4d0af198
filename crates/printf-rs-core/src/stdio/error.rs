//! Errors raised while interpreting a format template.

use std::io;

use thiserror::Error;

/// Why a formatting call stopped early.
///
/// Every variant aborts the call. Bytes already handed to the sink before
/// the failure stay written.
#[derive(Debug, Error)]
pub enum FormatError {
    /// The sink rejected a write.
    #[error("output write failed: {0}")]
    Io(#[from] io::Error),
    /// The template ended inside a `%` directive.
    #[error("template ends inside the directive starting at byte {offset}")]
    IncompleteDirective { offset: usize },
    /// A directive needed an argument past the end of the list.
    #[error("directive needs argument #{index} but only {available} were supplied")]
    MissingArgument { index: usize, available: usize },
    /// The argument at `index` has a kind the conversion cannot render.
    #[error("argument #{index} cannot be rendered by `%{conversion}`")]
    ArgumentMismatch { index: usize, conversion: char },
    /// A width, precision, or the running total went past `INT_MAX`.
    #[error("output length exceeds INT_MAX")]
    Overflow,
}

impl FormatError {
    /// C-style return value reported for any failed call.
    pub const SENTINEL: i32 = -1;

    #[must_use]
    pub fn as_sentinel(&self) -> i32 {
        Self::SENTINEL
    }
}
