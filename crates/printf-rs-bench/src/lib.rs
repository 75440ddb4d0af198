//! Shared workloads for the printf-rs benchmarks.

use std::io::{self, Write};

use printf_rs_core::stdio::FormatArg;

/// A named template plus the arguments it consumes.
pub struct Workload {
    pub name: &'static str,
    pub template: &'static [u8],
    pub args: Vec<FormatArg<'static>>,
}

/// Representative templates, from pure literal text to mixed conversions.
#[must_use]
pub fn workloads() -> Vec<Workload> {
    vec![
        Workload {
            name: "literal",
            template: b"the quick brown fox jumps over the lazy dog\n",
            args: Vec::new(),
        },
        Workload {
            name: "int",
            template: b"%d",
            args: vec![FormatArg::from(-1_234_567_i32)],
        },
        Workload {
            name: "padded_hex",
            template: b"%#018lx",
            args: vec![FormatArg::from(0xdead_beef_u64)],
        },
        Workload {
            name: "string",
            template: b"[%-24s]",
            args: vec![FormatArg::from("benchmark")],
        },
        Workload {
            name: "mixed",
            template: b"%s:%d: %c %5.2s %u %x %p %b %%\n",
            args: vec![
                FormatArg::from("src/main.rs"),
                FormatArg::from(42_i32),
                FormatArg::from(b'E'),
                FormatArg::from("warning"),
                FormatArg::from(7_u32),
                FormatArg::from(255_u32),
                FormatArg::Pointer(0x7fff_0000),
                FormatArg::from(10_u32),
            ],
        },
    ]
}

/// Sink that discards bytes and only counts them.
#[derive(Debug, Default)]
pub struct CountingSink {
    pub bytes: usize,
}

impl Write for CountingSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.bytes += buf.len();
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use printf_rs_core::stdio::format_to;

    #[test]
    fn every_workload_formats() {
        for w in workloads() {
            let mut sink = CountingSink::default();
            let n = format_to(&mut sink, w.template, &w.args)
                .unwrap_or_else(|e| panic!("{} failed: {e}", w.name));
            assert_eq!(n, sink.bytes, "{}", w.name);
        }
    }
}
