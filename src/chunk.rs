// CLASSIFICATION: COMMUNITY
// Filename: chunk.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-16

//! Delimiter-based splitting of text buffers.

/// Default chunk delimiter.
pub const NEWLINE: u8 = b'\n';

/// Length of `buf` up to the first nul byte or `max_len`, whichever is first.
pub fn scan_len(buf: &[u8], max_len: usize) -> usize {
    let limit = max_len.min(buf.len());
    buf[..limit].iter().position(|&b| b == 0).unwrap_or(limit)
}

/// External cursor over delimiter-separated chunks of a buffer.
///
/// Empty chunks between consecutive delimiters are produced; a trailing
/// delimiter does not start a final empty chunk. A fresh cursor restarts
/// from the beginning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineCursor {
    pos: usize,
    delim: u8,
}

impl Default for LineCursor {
    fn default() -> Self {
        Self::new()
    }
}

impl LineCursor {
    pub fn new() -> Self {
        Self::with_delimiter(NEWLINE)
    }

    pub fn with_delimiter(delim: u8) -> Self {
        Self { pos: 0, delim }
    }

    /// Byte offset of the next chunk.
    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn reset(&mut self) {
        self.pos = 0;
    }

    /// Advance past the next chunk of `buf` and return it.
    pub fn next_chunk<'a>(&mut self, buf: &'a [u8]) -> Option<&'a [u8]> {
        let rest = buf.get(self.pos..).filter(|r| !r.is_empty())?;
        match rest.iter().position(|&b| b == self.delim) {
            Some(idx) => {
                self.pos += idx + 1;
                Some(&rest[..idx])
            }
            None => {
                self.pos = buf.len();
                Some(rest)
            }
        }
    }
}

/// Iterator over the chunks of a nul-terminated or length-bounded buffer.
#[derive(Debug, Clone)]
pub struct Chunks<'a> {
    buf: &'a [u8],
    cursor: LineCursor,
}

impl<'a> Chunks<'a> {
    /// Chunks of `buf`, stopping at the first nul or at `max_len`.
    pub fn new(buf: &'a [u8], max_len: usize) -> Self {
        Self::with_delimiter(buf, max_len, NEWLINE)
    }

    pub fn with_delimiter(buf: &'a [u8], max_len: usize, delim: u8) -> Self {
        Self {
            buf: &buf[..scan_len(buf, max_len)],
            cursor: LineCursor::with_delimiter(delim),
        }
    }

    /// The portion of the buffer that will be split.
    pub fn scanned(&self) -> &'a [u8] {
        self.buf
    }
}

impl<'a> Iterator for Chunks<'a> {
    type Item = &'a [u8];

    fn next(&mut self) -> Option<&'a [u8]> {
        self.cursor.next_chunk(self.buf)
    }
}
