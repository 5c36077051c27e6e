// CLASSIFICATION: COMMUNITY
// Filename: sink.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-16

//! Output sinks for rendered records.
//!
//! Every write is one complete line taken under the sink's lock, so lines
//! from concurrent callers never tear. Multi-line records (dumps, line
//! blocks) are written line by line and may interleave with other threads.
//! Write failures are ignored.

use std::fmt;
use std::io::{self, Write};
use std::str::FromStr;
use std::sync::{Arc, Mutex};

use crate::config::ConfigError;

type SharedWriter = Arc<Mutex<Box<dyn Write + Send>>>;

/// Destination for rendered lines.
#[derive(Clone)]
pub enum Sink {
    Stderr,
    Stdout,
    /// Route each line as one record through the `log` facade.
    Log(log::Level),
    /// Any caller-supplied writer, e.g. an opened log file.
    Writer(SharedWriter),
    /// Keep lines in memory.
    Capture(Capture),
}

impl Sink {
    pub fn writer<W: Write + Send + 'static>(w: W) -> Self {
        Sink::Writer(Arc::new(Mutex::new(Box::new(w))))
    }

    /// A capturing sink plus the handle used to read back its lines.
    pub fn capture() -> (Sink, Capture) {
        let capture = Capture::default();
        (Sink::Capture(capture.clone()), capture)
    }

    pub fn write_line(&self, line: &str) {
        match self {
            Sink::Stderr => {
                let _ = writeln!(io::stderr().lock(), "{line}");
            }
            Sink::Stdout => {
                let _ = writeln!(io::stdout().lock(), "{line}");
            }
            Sink::Log(level) => log::log!(target: "pk", *level, "{line}"),
            Sink::Writer(w) => {
                let mut w = w.lock().unwrap_or_else(|e| e.into_inner());
                let _ = writeln!(w, "{line}");
                let _ = w.flush();
            }
            Sink::Capture(c) => c.push(line),
        }
    }
}

impl fmt::Debug for Sink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sink::Stderr => f.write_str("Stderr"),
            Sink::Stdout => f.write_str("Stdout"),
            Sink::Log(level) => f.debug_tuple("Log").field(level).finish(),
            Sink::Writer(_) => f.write_str("Writer(..)"),
            Sink::Capture(c) => f.debug_tuple("Capture").field(&c.len()).finish(),
        }
    }
}

impl FromStr for Sink {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "stderr" => Ok(Sink::Stderr),
            "stdout" => Ok(Sink::Stdout),
            "log" => Ok(Sink::Log(log::Level::Info)),
            other => Err(ConfigError::UnknownSink(other.to_owned())),
        }
    }
}

/// Shared in-memory line buffer behind [`Sink::Capture`].
#[derive(Clone, Default)]
pub struct Capture {
    lines: Arc<Mutex<Vec<String>>>,
}

impl Capture {
    fn push(&self, line: &str) {
        self.lines
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(line.to_owned());
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Return and clear everything captured so far.
    pub fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.lines.lock().unwrap_or_else(|e| e.into_inner()))
    }

    pub fn len(&self) -> usize {
        self.lines.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
