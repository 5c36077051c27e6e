// CLASSIFICATION: COMMUNITY
// Filename: lib.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-16

//! Ad-hoc diagnostic prints for developers.
//!
//! Records are single text lines of the form
//! `<tag>: <file>:<line> <function>(): <body>`, written to a configurable
//! sink. On top of plain messages the crate renders variable/value pairs,
//! errno descriptions, elapsed-time measurements, hex dumps and numbered
//! text blocks. Dumps are bracketed by `---8<---` cut marks so they can be
//! recovered from a log with [`extract`] or the `pk-extract` tool.
//!
//! ```no_run
//! pk::install(pk::Config::new().with_tag("PK-EXAMPLE")).ok();
//! let i = 42;
//! pk::pkv!("{}", i);
//! let t = pk::pkt_start!();
//! pk::pkt_diff!(t, "that was fast!");
//! ```

use once_cell::sync::OnceCell;

/// Delimiter-based splitting of text buffers
pub mod chunk;

/// Formatter configuration and `PK_*` environment overrides
pub mod config;

/// Hex-dump line formatting
pub mod dump;

/// OS error descriptions
pub mod errno;

/// Recovery of dumped buffers from log files
pub mod extract;

/// Record rendering
pub mod formatter;

/// Call-site macros
mod macros;

/// Record preamble and line shape
pub mod record;

/// Output sinks
pub mod sink;

/// Timestamps, intervals and clocks
pub mod time;

pub use config::{Config, ConfigError};
pub use formatter::DiagnosticFormatter;
pub use record::Location;
pub use sink::{Capture, Sink};
pub use time::{ClockSource, TimeTracker, Timestamp};

static GLOBAL: OnceCell<DiagnosticFormatter> = OnceCell::new();

/// Install the process-wide formatter used by the `pk*!` macros.
///
/// May succeed only once, and only before any macro has run.
pub fn install(config: Config) -> Result<&'static DiagnosticFormatter, ConfigError> {
    GLOBAL
        .set(DiagnosticFormatter::new(config))
        .map_err(|_| ConfigError::AlreadyInstalled)?;
    Ok(global())
}

/// The process-wide formatter, built from the environment on first use if
/// [`install`] was never called.
pub fn global() -> &'static DiagnosticFormatter {
    GLOBAL.get_or_init(|| {
        let config = Config::from_env().unwrap_or_else(|err| {
            log::warn!("pk: {err}; using defaults");
            Config::default()
        });
        DiagnosticFormatter::new(config)
    })
}
