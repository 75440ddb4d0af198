#![no_main]
use std::io::{self, Write};

use libfuzzer_sys::fuzz_target;
use printf_rs_core::stdio::{FormatArg, FormatError, format_to};

/// Sink capped at 1 MiB so huge widths fail fast instead of exhausting memory.
struct CappedSink {
    written: usize,
}

const CAP: usize = 1 << 20;

impl Write for CappedSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.written + buf.len() > CAP {
            return Err(io::Error::other("fuzz sink full"));
        }
        self.written += buf.len();
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

// First byte picks how many of the trailing 8-byte chunks become arguments;
// the rest up to the argument area is the template.
fuzz_target!(|data: &[u8]| {
    let Some((&n, rest)) = data.split_first() else {
        return;
    };
    let nargs = usize::from(n % 8).min(rest.len() / 8);
    let (template, arg_bytes) = rest.split_at(rest.len() - nargs * 8);

    let args: Vec<FormatArg<'_>> = arg_bytes
        .chunks_exact(8)
        .map(|chunk| {
            let mut raw = [0u8; 8];
            raw.copy_from_slice(chunk);
            let v = u64::from_le_bytes(raw);
            match v % 5 {
                0 => FormatArg::SignedInt(v as i64),
                1 => FormatArg::UnsignedInt(v),
                2 => FormatArg::Char(chunk[1]),
                3 => FormatArg::Str(if chunk[1] & 1 == 0 { None } else { Some(&chunk[2..]) }),
                _ => FormatArg::Pointer(v as usize),
            }
        })
        .collect();

    let mut sink = CappedSink { written: 0 };
    match format_to(&mut sink, template, &args) {
        Ok(n) => assert_eq!(n, sink.written),
        Err(FormatError::Io(_)) => assert!(sink.written <= CAP),
        Err(_) => {}
    }
});
