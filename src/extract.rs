// CLASSIFICATION: COMMUNITY
// Filename: extract.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-16

//! Recover dumped buffers from a log.
//!
//! Dump records from one call site share the same file, line and function,
//! so each origin is tracked independently and dumps from different sites
//! may interleave freely. Per origin the extractor moves
//! `Idle -> Ready` on a size header, `Ready -> Data` on the begin cut mark,
//! stays in `Data` while body lines arrive, and returns to `Idle` on the end
//! cut mark, yielding the collected bytes. A body line at an unexpected
//! offset or a short dump drops the partial data with a warning.

use std::collections::HashMap;
use std::io::BufRead;

use serde::Serialize;
use thiserror::Error;

use crate::config::DEFAULT_TAG;
use crate::dump::{DUMP_BEGIN, DUMP_END, DUMP_PREFIX};
use crate::record::ParsedRecord;

// Header lengths come from untrusted logs; the end mark checks the real size.
const MAX_PREALLOC: usize = 64 * 1024;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("read failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed dump line: {0}")]
    Malformed(String),
}

/// Call site a dump came from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Origin {
    pub file: String,
    pub line: u32,
    pub func: String,
}

/// One recovered buffer with the log lines it spanned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractedDump {
    #[serde(flatten)]
    pub origin: Origin,
    /// Log line of the size header.
    pub start: usize,
    /// Log line of the end cut mark.
    pub end: usize,
    /// Address reported in the size header.
    pub addr: u64,
    pub len: usize,
    #[serde(skip)]
    pub data: Vec<u8>,
}

impl ExtractedDump {
    pub fn file_name(&self) -> String {
        format!("PKDUMP-line-{:08}-to-{:08}.bin", self.start, self.end)
    }
}

/// Size header body: `<len> bytes @ <addr>`.
pub fn parse_header(msg: &str) -> Option<(usize, u64)> {
    let (len, addr) = msg.split_once(" bytes @ ")?;
    let len = len.parse().ok()?;
    let digits = addr.strip_prefix("0x").unwrap_or(addr);
    let addr = u64::from_str_radix(digits, 16).ok()?;
    Some((len, addr))
}

/// Body line: `0x<offset>: <hex bytes> | <text>`.
pub fn parse_data_line(msg: &str) -> Result<(usize, Vec<u8>), ExtractError> {
    let malformed = || ExtractError::Malformed(msg.to_owned());
    let (offset, rest) = msg.split_once(": ").ok_or_else(malformed)?;
    let offset = offset.strip_prefix("0x").ok_or_else(malformed)?;
    let offset = usize::from_str_radix(offset, 16).map_err(|_| malformed())?;
    let (hex_col, _text) = rest.split_once('|').ok_or_else(malformed)?;

    let mut digits = String::with_capacity(hex_col.len());
    for tok in hex_col.split_whitespace() {
        if tok.len() != 2 {
            return Err(malformed());
        }
        digits.push_str(tok);
    }
    if digits.is_empty() {
        return Err(malformed());
    }
    let bytes = hex::decode(&digits).map_err(|_| malformed())?;
    Ok((offset, bytes))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Idle,
    Ready,
    Data,
}

#[derive(Debug)]
struct Partial {
    state: State,
    start: usize,
    len: usize,
    addr: u64,
    body: Vec<u8>,
}

impl Partial {
    fn idle() -> Self {
        Self {
            state: State::Idle,
            start: 0,
            len: 0,
            addr: 0,
            body: Vec::new(),
        }
    }
}

/// Line-by-line dump recovery.
#[derive(Debug)]
pub struct DumpExtractor {
    tag: String,
    partial: HashMap<Origin, Partial>,
    sync_losses: usize,
}

impl Default for DumpExtractor {
    fn default() -> Self {
        Self::new(DEFAULT_TAG)
    }
}

impl DumpExtractor {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            partial: HashMap::new(),
            sync_losses: 0,
        }
    }

    /// Dumps currently in progress.
    pub fn pending(&self) -> usize {
        self.partial.len()
    }

    /// Dumps abandoned because their body was out of sync.
    pub fn sync_losses(&self) -> usize {
        self.sync_losses
    }

    /// Consume log line `lineno`; returns a dump when its end mark is seen.
    pub fn feed(&mut self, lineno: usize, text: &str) -> Option<ExtractedDump> {
        let rec = ParsedRecord::parse(&self.tag, text)?;
        let msg = rec.body.strip_prefix(DUMP_PREFIX)?;
        let origin = Origin {
            file: rec.file.to_owned(),
            line: rec.line,
            func: rec.function.to_owned(),
        };

        let mut partial = self.partial.remove(&origin).unwrap_or_else(Partial::idle);
        let mut done = None;
        match partial.state {
            State::Idle => {
                if let Some((len, addr)) = parse_header(msg) {
                    if len > 0 {
                        partial = Partial {
                            state: State::Ready,
                            start: lineno,
                            len,
                            addr,
                            body: Vec::with_capacity(len.min(MAX_PREALLOC)),
                        };
                    }
                }
            }
            State::Ready => {
                if msg == DUMP_BEGIN {
                    partial.state = State::Data;
                }
            }
            State::Data if msg == DUMP_END => {
                if partial.body.len() == partial.len {
                    done = Some(ExtractedDump {
                        origin: origin.clone(),
                        start: partial.start,
                        end: lineno,
                        addr: partial.addr,
                        len: partial.len,
                        data: std::mem::take(&mut partial.body),
                    });
                } else {
                    self.lose_sync(lineno, &origin);
                }
                partial = Partial::idle();
            }
            State::Data => match parse_data_line(msg) {
                Ok((offset, bytes)) if offset == partial.body.len() => {
                    partial.body.extend_from_slice(&bytes);
                }
                Ok(_) => {
                    self.lose_sync(lineno, &origin);
                    partial = Partial::idle();
                }
                Err(err) => log::debug!("line {lineno}: {err}"),
            },
        }

        if partial.state != State::Idle {
            self.partial.insert(origin, partial);
        }
        done
    }

    fn lose_sync(&mut self, lineno: usize, origin: &Origin) {
        self.sync_losses += 1;
        log::warn!(
            "sync lost on line {lineno} for {}:{} {}()... data may be missing",
            origin.file,
            origin.line,
            origin.func
        );
    }

    /// Run every line of `reader` through the extractor.
    ///
    /// Lines are numbered from 1; invalid UTF-8 is replaced rather than
    /// rejected.
    pub fn extract_all<R: BufRead>(&mut self, reader: R) -> Result<Vec<ExtractedDump>, ExtractError> {
        let mut found = Vec::new();
        for (idx, raw) in reader.split(b'\n').enumerate() {
            let raw = raw?;
            let text = String::from_utf8_lossy(&raw);
            let text = text.trim_end_matches(['\r', '\n']);
            if let Some(dump) = self.feed(idx + 1, text) {
                found.push(dump);
            }
        }
        Ok(found)
    }
}

/// Criteria for which recovered dumps to keep.
#[derive(Debug, Clone, Default)]
pub struct Filter {
    pub file: Option<String>,
    pub line: Option<u32>,
    pub func: Option<String>,
    pub min_size: Option<usize>,
    pub max_size: Option<usize>,
}

impl Filter {
    /// Why `dump` should be skipped, or `None` to keep it.
    pub fn skip_reason(&self, dump: &ExtractedDump) -> Option<&'static str> {
        if self.file.as_deref().is_some_and(|f| f != dump.origin.file) {
            Some("file doesn't match")
        } else if self.line.is_some_and(|l| l != dump.origin.line) {
            Some("line doesn't match")
        } else if self.func.as_deref().is_some_and(|f| f != dump.origin.func) {
            Some("func doesn't match")
        } else if self.min_size.is_some_and(|m| dump.data.len() < m) {
            Some("too small")
        } else if self.max_size.is_some_and(|m| dump.data.len() > m) {
            Some("too big")
        } else {
            None
        }
    }
}
