// CLASSIFICATION: COMMUNITY
// Filename: config.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-16

//! Formatter configuration.
//!
//! A [`Config`] is built once at start-up, either programmatically or from
//! the `PK_*` environment variables, and then shared with the formatter.

use std::env;

use thiserror::Error;

use crate::sink::Sink;
use crate::time::ClockSource;

/// Tag prefixed to every record unless overridden.
pub const DEFAULT_TAG: &str = "ATTIE";
/// Bytes per hex-dump line unless overridden.
pub const DEFAULT_DUMP_WIDTH: usize = 16;
/// Largest accepted dump width. Widths above 64 make for unwieldy lines.
pub const MAX_DUMP_WIDTH: usize = 256;

pub const ENV_TAG: &str = "PK_TAG";
pub const ENV_DUMP_WIDTH: &str = "PK_DUMP_WIDTH";
pub const ENV_CLOCK: &str = "PK_CLOCK";
pub const ENV_SINK: &str = "PK_SINK";

/// Errors produced while building or installing a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("dump width {0} outside 1..=256")]
    InvalidWidth(usize),
    #[error("invalid value {value:?} for {var}")]
    InvalidValue { var: &'static str, value: String },
    #[error("unknown clock source {0:?}")]
    UnknownClock(String),
    #[error("unknown output sink {0:?}")]
    UnknownSink(String),
    #[error("diagnostic formatter already installed")]
    AlreadyInstalled,
}

/// Tag, dump width, output sink and clock used by a formatter.
#[derive(Clone, Debug)]
pub struct Config {
    tag: String,
    dump_width: usize,
    sink: Sink,
    clock: ClockSource,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tag: DEFAULT_TAG.to_owned(),
            dump_width: DEFAULT_DUMP_WIDTH,
            sink: Sink::Stderr,
            clock: ClockSource::default(),
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults overridden by `PK_TAG`, `PK_DUMP_WIDTH`, `PK_CLOCK` and
    /// `PK_SINK` where set.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut cfg = Self::default();
        if let Ok(tag) = env::var(ENV_TAG) {
            cfg.tag = tag;
        }
        if let Ok(raw) = env::var(ENV_DUMP_WIDTH) {
            let width = raw
                .trim()
                .parse::<usize>()
                .map_err(|_| ConfigError::InvalidValue {
                    var: ENV_DUMP_WIDTH,
                    value: raw.clone(),
                })?;
            cfg = cfg.with_dump_width(width)?;
        }
        if let Ok(raw) = env::var(ENV_CLOCK) {
            cfg.clock = raw.parse()?;
        }
        if let Ok(raw) = env::var(ENV_SINK) {
            cfg.sink = raw.parse()?;
        }
        Ok(cfg)
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = tag.into();
        self
    }

    /// Set bytes per dump line; must be within `1..=MAX_DUMP_WIDTH`.
    pub fn with_dump_width(mut self, width: usize) -> Result<Self, ConfigError> {
        if width == 0 || width > MAX_DUMP_WIDTH {
            return Err(ConfigError::InvalidWidth(width));
        }
        self.dump_width = width;
        Ok(self)
    }

    pub fn with_sink(mut self, sink: Sink) -> Self {
        self.sink = sink;
        self
    }

    pub fn with_clock(mut self, clock: ClockSource) -> Self {
        self.clock = clock;
        self
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn dump_width(&self) -> usize {
        self.dump_width
    }

    pub fn sink(&self) -> &Sink {
        &self.sink
    }

    pub fn clock(&self) -> ClockSource {
        self.clock
    }
}
