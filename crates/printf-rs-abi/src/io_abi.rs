//! Unbuffered file-descriptor sink.
//!
//! Every `write` on the sink is one `write(2)` loop on the descriptor, so the
//! engine's per-literal and per-handler writes reach the fd immediately.

use std::ffi::c_int;
use std::io::{self, Write};

/// `io::Write` over a raw descriptor. The descriptor is borrowed, never closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FdSink {
    fd: c_int,
}

impl FdSink {
    #[must_use]
    pub const fn new(fd: c_int) -> Self {
        Self { fd }
    }

    #[must_use]
    pub const fn stdout() -> Self {
        Self::new(libc::STDOUT_FILENO)
    }

    #[must_use]
    pub const fn fd(&self) -> c_int {
        self.fd
    }
}

impl Write for FdSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        loop {
            // SAFETY: buf is a live slice; the kernel reads at most buf.len() bytes.
            let rc = unsafe { libc::write(self.fd, buf.as_ptr().cast(), buf.len()) };
            if rc >= 0 {
                return Ok(rc as usize);
            }
            let err = io::Error::last_os_error();
            if err.kind() != io::ErrorKind::Interrupted {
                return Err(err);
            }
        }
    }

    /// Short writes are retried until the whole buffer is out.
    fn write_all(&mut self, mut buf: &[u8]) -> io::Result<()> {
        while !buf.is_empty() {
            match self.write(buf)? {
                0 => return Err(io::Error::from(io::ErrorKind::WriteZero)),
                n => buf = &buf[n..],
            }
        }
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
