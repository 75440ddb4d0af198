//! Integration tests for the extern "C" printf entry points.

use std::ffi::{CString, c_char, c_int};
use std::ptr;

use printf_rs_abi::{printf_rs_dprintf, printf_rs_printf, printf_rs_snprintf};

struct Pipe {
    rd: c_int,
    wr: c_int,
}

impl Pipe {
    fn new() -> Self {
        let mut fds = [0 as c_int; 2];
        // SAFETY: fds has room for both descriptors.
        let rc = unsafe { libc::pipe(fds.as_mut_ptr()) };
        assert_eq!(rc, 0, "pipe() failed");
        Self {
            rd: fds[0],
            wr: fds[1],
        }
    }

    /// Close the write end and drain everything written so far.
    fn finish(self) -> Vec<u8> {
        // SAFETY: wr is owned by this Pipe and closed once.
        unsafe { libc::close(self.wr) };
        let mut out = Vec::new();
        let mut chunk = [0u8; 512];
        loop {
            // SAFETY: chunk is writable for its full length.
            let n = unsafe { libc::read(self.rd, chunk.as_mut_ptr().cast(), chunk.len()) };
            if n <= 0 {
                break;
            }
            out.extend_from_slice(&chunk[..n as usize]);
        }
        // SAFETY: rd is owned by this Pipe and closed once.
        unsafe { libc::close(self.rd) };
        out
    }
}

fn slot_of(s: &CString) -> u64 {
    s.as_ptr() as usize as u64
}

fn dprintf(template: &str, slots: &[u64]) -> (Vec<u8>, c_int) {
    let pipe = Pipe::new();
    let fmt = CString::new(template).unwrap();
    // SAFETY: fmt is NUL-terminated, slots is a live array, string slots
    // point at CStrings owned by the caller.
    let rc = unsafe { printf_rs_dprintf(pipe.wr, fmt.as_ptr(), slots.as_ptr(), slots.len()) };
    (pipe.finish(), rc)
}

fn snprintf(size: usize, template: &str, slots: &[u64]) -> (Vec<u8>, c_int) {
    let mut buf = vec![0x7Fu8; size];
    let fmt = CString::new(template).unwrap();
    let dst = if size == 0 {
        ptr::null_mut()
    } else {
        buf.as_mut_ptr().cast::<c_char>()
    };
    // SAFETY: buf holds `size` bytes; fmt and slots are live.
    let rc = unsafe { printf_rs_snprintf(dst, size, fmt.as_ptr(), slots.as_ptr(), slots.len()) };
    (buf, rc)
}

#[test]
fn dprintf_writes_rendered_bytes_to_fd() {
    let name = CString::new("world").unwrap();
    let (out, rc) = dprintf("hello %s, %d%%\n", &[slot_of(&name), 99]);
    assert_eq!(out, b"hello world, 99%\n");
    assert_eq!(rc, out.len() as c_int);
}

#[test]
fn string_slot_may_be_null() {
    let (out, rc) = dprintf("[%s][%.6s]", &[0, 0]);
    assert_eq!(out, b"[(null)][      ]");
    assert_eq!(rc, 16);
}

#[test]
fn slots_are_truncated_per_length_modifier() {
    let minus_one = u64::MAX;
    let (out, _) = dprintf("%hhd %hd %d %ld", &[minus_one, minus_one, minus_one, minus_one]);
    assert_eq!(out, b"-1 -1 -1 -1");

    let (out, _) = dprintf("%hhu %hu %u", &[minus_one, minus_one, minus_one]);
    assert_eq!(out, b"255 65535 4294967295");
}

#[test]
fn star_slots_come_before_the_value() {
    let word = CString::new("abcdef").unwrap();
    let (out, rc) = dprintf("<%*.*s>", &[(-6i64) as u64, 3, slot_of(&word)]);
    assert_eq!(out, b"<abc   >");
    assert_eq!(rc, 8);
}

#[test]
fn binary_char_and_pointer_slots() {
    let (out, _) = dprintf("%b %c %p %p", &[10, u64::from(b'R'), 0, 0x1f]);
    assert_eq!(out, b"1010 R (nil) 0x1f");
}

#[test]
fn missing_slot_fails_after_partial_output() {
    let (out, rc) = dprintf("a=%d b=%d", &[1]);
    assert_eq!(out, b"a=1 b=");
    assert_eq!(rc, -1);
}

#[test]
fn incomplete_directive_fails() {
    let (out, rc) = dprintf("ok %5", &[]);
    assert_eq!(out, b"ok ");
    assert_eq!(rc, -1);
}

#[test]
fn closed_descriptor_fails() {
    let fmt = CString::new("x").unwrap();
    // SAFETY: fmt is NUL-terminated; no slots are read.
    let rc = unsafe { printf_rs_dprintf(-1, fmt.as_ptr(), ptr::null(), 0) };
    assert_eq!(rc, -1);
}

#[test]
fn null_format_is_rejected() {
    // SAFETY: null format is checked before anything is read.
    let rc = unsafe { printf_rs_printf(ptr::null(), ptr::null(), 0) };
    assert_eq!(rc, -1);
}

#[test]
fn null_slot_array_with_nonzero_count_is_rejected() {
    let fmt = CString::new("%d").unwrap();
    // SAFETY: the null args pointer is checked before use.
    let rc = unsafe { printf_rs_printf(fmt.as_ptr(), ptr::null(), 1) };
    assert_eq!(rc, -1);
}

#[test]
fn snprintf_fits() {
    let (buf, rc) = snprintf(16, "%05d|%x", &[42, 255]);
    assert_eq!(rc, 8);
    assert_eq!(&buf[..9], b"00042|ff\0");
}

#[test]
fn snprintf_truncates_and_reports_full_length() {
    let word = CString::new("truncate me").unwrap();
    let (buf, rc) = snprintf(5, "%s", &[slot_of(&word)]);
    assert_eq!(rc, 11);
    assert_eq!(buf, b"trun\0");
}

#[test]
fn snprintf_with_zero_size_only_measures() {
    let (_, rc) = snprintf(0, "%10s", &[0]);
    assert_eq!(rc, 10);
}
