//! Typed stand-ins for C variadic arguments.
//!
//! A C caller pushes machine-word slots and the callee reinterprets each one
//! according to the directive that consumes it. [`FormatArg`] keeps the kind
//! the Rust caller supplied; [`ArgCursor`] hands arguments out in order and
//! applies the same reinterpretation rules a `va_arg` would: any integer kind
//! can feed any integer conversion, but strings only feed `%s` and `%p`.

use super::error::FormatError;

/// Typed argument value for safe formatting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatArg<'a> {
    SignedInt(i64),
    UnsignedInt(u64),
    Char(u8),
    /// String bytes, read up to the first NUL. `None` models a null pointer.
    Str(Option<&'a [u8]>),
    Pointer(usize),
}

macro_rules! signed_from {
    ($($ty:ty),*) => {$(
        impl From<$ty> for FormatArg<'_> {
            fn from(value: $ty) -> Self {
                FormatArg::SignedInt(value as i64)
            }
        }
    )*};
}

macro_rules! unsigned_from {
    ($($ty:ty),*) => {$(
        impl From<$ty> for FormatArg<'_> {
            fn from(value: $ty) -> Self {
                FormatArg::UnsignedInt(value as u64)
            }
        }
    )*};
}

signed_from!(i8, i16, i32, i64, isize);
unsigned_from!(u16, u32, u64, usize);

impl From<u8> for FormatArg<'_> {
    fn from(value: u8) -> Self {
        FormatArg::Char(value)
    }
}

impl<'a> From<&'a str> for FormatArg<'a> {
    fn from(value: &'a str) -> Self {
        FormatArg::Str(Some(value.as_bytes()))
    }
}

impl<'a> From<&'a [u8]> for FormatArg<'a> {
    fn from(value: &'a [u8]) -> Self {
        FormatArg::Str(Some(value))
    }
}

impl<'a> From<Option<&'a str>> for FormatArg<'a> {
    fn from(value: Option<&'a str>) -> Self {
        FormatArg::Str(value.map(str::as_bytes))
    }
}

/// Shared argument cursor threaded through the interpreter and handlers.
///
/// Each `next_*` call consumes exactly one argument.
#[derive(Debug, Clone)]
pub struct ArgCursor<'a> {
    args: &'a [FormatArg<'a>],
    next: usize,
}

impl<'a> ArgCursor<'a> {
    #[must_use]
    pub fn new(args: &'a [FormatArg<'a>]) -> Self {
        Self { args, next: 0 }
    }

    /// Number of arguments consumed so far.
    #[must_use]
    pub fn consumed(&self) -> usize {
        self.next
    }

    /// Number of arguments still available.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.args.len() - self.next
    }

    /// Take the next argument as-is.
    pub fn next_arg(&mut self) -> Result<FormatArg<'a>, FormatError> {
        let arg = self
            .args
            .get(self.next)
            .copied()
            .ok_or(FormatError::MissingArgument {
                index: self.next,
                available: self.args.len(),
            })?;
        self.next += 1;
        Ok(arg)
    }

    /// Take the next argument as a signed 64-bit slot.
    pub fn next_signed(&mut self, conversion: u8) -> Result<i64, FormatError> {
        let index = self.next;
        match self.next_arg()? {
            FormatArg::SignedInt(v) => Ok(v),
            FormatArg::UnsignedInt(v) => Ok(v as i64),
            FormatArg::Char(c) => Ok(i64::from(c)),
            FormatArg::Pointer(p) => Ok(p as i64),
            FormatArg::Str(_) => Err(mismatch(index, conversion)),
        }
    }

    /// Take the next argument as an unsigned 64-bit slot.
    pub fn next_unsigned(&mut self, conversion: u8) -> Result<u64, FormatError> {
        let index = self.next;
        match self.next_arg()? {
            FormatArg::SignedInt(v) => Ok(v as u64),
            FormatArg::UnsignedInt(v) => Ok(v),
            FormatArg::Char(c) => Ok(u64::from(c)),
            FormatArg::Pointer(p) => Ok(p as u64),
            FormatArg::Str(_) => Err(mismatch(index, conversion)),
        }
    }

    /// Take the next argument as a single byte (the low byte of an integer).
    pub fn next_byte(&mut self, conversion: u8) -> Result<u8, FormatError> {
        let index = self.next;
        match self.next_arg()? {
            FormatArg::Char(c) => Ok(c),
            FormatArg::SignedInt(v) => Ok(v as u8),
            FormatArg::UnsignedInt(v) => Ok(v as u8),
            FormatArg::Pointer(_) | FormatArg::Str(_) => Err(mismatch(index, conversion)),
        }
    }

    /// Take the next argument as a string; `None` is a null pointer.
    pub fn next_str(&mut self, conversion: u8) -> Result<Option<&'a [u8]>, FormatError> {
        let index = self.next;
        match self.next_arg()? {
            FormatArg::Str(s) => Ok(s),
            FormatArg::Pointer(0) => Ok(None),
            _ => Err(mismatch(index, conversion)),
        }
    }

    /// Take the next argument as an address.
    pub fn next_pointer(&mut self, conversion: u8) -> Result<usize, FormatError> {
        let index = self.next;
        match self.next_arg()? {
            FormatArg::Pointer(p) => Ok(p),
            FormatArg::UnsignedInt(v) => Ok(v as usize),
            FormatArg::SignedInt(v) => Ok(v as usize),
            FormatArg::Str(None) => Ok(0),
            FormatArg::Str(Some(s)) => Ok(s.as_ptr() as usize),
            FormatArg::Char(_) => Err(mismatch(index, conversion)),
        }
    }
}

fn mismatch(index: usize, conversion: u8) -> FormatError {
    FormatError::ArgumentMismatch {
        index,
        conversion: char::from(conversion),
    }
}
