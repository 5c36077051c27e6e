// CLASSIFICATION: COMMUNITY
// Filename: dump.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-16

//! Hex-dump line formatting.
//!
//! A body line is `0x<offset>: <hex bytes> | <text>`, where each byte is two
//! lowercase hex digits followed by a space and the text column renders
//! printable ASCII verbatim and everything else as `.`. Both columns are
//! sized from the bytes on that line, so a short final line is simply
//! shorter.

use std::fmt::Write;

/// Cut mark opening a dump body.
pub const DUMP_BEGIN: &str = "---8<---[ dump begins ]---8<---";
/// Cut mark closing a dump body.
pub const DUMP_END: &str = "---8<---[  dump ends  ]---8<---";
/// Body prefix shared by every line of a dump record.
pub const DUMP_PREFIX: &str = "DUMP: ";

/// `b` if printable ASCII (0x20..=0x7e), otherwise `.`.
pub fn printable(b: u8) -> char {
    if (0x20..=0x7e).contains(&b) {
        b as char
    } else {
        '.'
    }
}

/// Format one dump body line for `chunk` starting at byte `offset`.
pub fn format_line(offset: usize, chunk: &[u8]) -> String {
    let mut out = String::with_capacity(10 + chunk.len() * 4);
    let _ = write!(out, "0x{offset:04x}: ");
    for b in chunk {
        let _ = write!(out, "{b:02x} ");
    }
    out.push_str("| ");
    out.extend(chunk.iter().map(|&b| printable(b)));
    out
}

/// Lazily formatted body lines of a buffer, `width` bytes per line.
#[derive(Debug, Clone)]
pub struct HexLines<'a> {
    data: &'a [u8],
    width: usize,
    offset: usize,
}

impl<'a> HexLines<'a> {
    /// `width` of zero is treated as one byte per line.
    pub fn new(data: &'a [u8], width: usize) -> Self {
        Self {
            data,
            width: width.max(1),
            offset: 0,
        }
    }
}

impl Iterator for HexLines<'_> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        if self.offset >= self.data.len() {
            return None;
        }
        let end = (self.offset + self.width).min(self.data.len());
        let line = format_line(self.offset, &self.data[self.offset..end]);
        self.offset = end;
        Some(line)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.data.len().saturating_sub(self.offset).div_ceil(self.width);
        (left, Some(left))
    }
}

impl ExactSizeIterator for HexLines<'_> {}

/// Things that can be handed to a dump as a byte buffer.
///
/// `Option` models the null buffer: `None` dumps as zero bytes at address 0.
pub trait DumpSource {
    fn dump_bytes(&self) -> Option<&[u8]>;
}

impl DumpSource for [u8] {
    fn dump_bytes(&self) -> Option<&[u8]> {
        Some(self)
    }
}

impl<const N: usize> DumpSource for [u8; N] {
    fn dump_bytes(&self) -> Option<&[u8]> {
        Some(self)
    }
}

impl DumpSource for Vec<u8> {
    fn dump_bytes(&self) -> Option<&[u8]> {
        Some(self)
    }
}

impl DumpSource for str {
    fn dump_bytes(&self) -> Option<&[u8]> {
        Some(self.as_bytes())
    }
}

impl DumpSource for String {
    fn dump_bytes(&self) -> Option<&[u8]> {
        Some(self.as_bytes())
    }
}

impl<T: DumpSource + ?Sized> DumpSource for &T {
    fn dump_bytes(&self) -> Option<&[u8]> {
        (**self).dump_bytes()
    }
}

impl<T: DumpSource> DumpSource for Option<T> {
    fn dump_bytes(&self) -> Option<&[u8]> {
        self.as_ref().and_then(|b| b.dump_bytes())
    }
}

/// Address shown in a dump or lines header; `0x0` for the null buffer.
pub fn address_of(buf: Option<&[u8]>) -> usize {
    buf.map_or(0, |b| b.as_ptr() as usize)
}

// ───────────────────────────── tests ─────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_line_sized_to_content() {
        assert_eq!(format_line(0, b"AB"), "0x0000: 41 42 | AB");
    }

    #[test]
    fn unprintables_become_dots() {
        assert_eq!(format_line(0x10, &[0x00, 0x7f, b' ', b'~']), "0x0010: 00 7f 20 7e | .. ~");
    }

    #[test]
    fn lines_split_at_width() {
        let data: Vec<u8> = (0u8..20).collect();
        let lines: Vec<_> = HexLines::new(&data, 8).collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[1].starts_with("0x0008: 08 09"));
        assert_eq!(lines[2], "0x0010: 10 11 12 13 | ....");
    }

    #[test]
    fn offsets_grow_past_four_digits() {
        let data = vec![0u8; 0x10001];
        let last = HexLines::new(&data, 16).last().unwrap();
        assert_eq!(last, "0x10000: 00 | .");
    }

    #[test]
    fn size_hint_is_exact() {
        let data = [0u8; 33];
        assert_eq!(HexLines::new(&data, 16).len(), 3);
        assert_eq!(HexLines::new(&[], 16).len(), 0);
    }

    #[test]
    fn null_source_has_no_bytes() {
        let none: Option<&[u8]> = None;
        assert_eq!(none.dump_bytes(), None);
        assert_eq!(address_of(None), 0);
        assert_eq!("hi".dump_bytes(), Some(&b"hi"[..]));
    }
}
