// CLASSIFICATION: COMMUNITY
// Filename: formatter.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-16

//! Diagnostic record rendering.
//!
//! [`DiagnosticFormatter`] turns call-site data into record lines and writes
//! them to the configured sink. Nothing here fails into the caller: clock
//! failures and backwards intervals become diagnostic lines of their own and
//! the operation carries on with a zero value.

use std::fmt::{self, Display};
use std::sync::Arc;

use crate::chunk::Chunks;
use crate::config::Config;
use crate::dump::{self, HexLines, DUMP_BEGIN, DUMP_END, DUMP_PREFIX};
use crate::errno;
use crate::record::{self, Location};
use crate::time::{self, Clock, TimeError, TimeTracker, Timestamp};

/// Cut mark opening a lines body.
pub const LINES_BEGIN: &str = "---8<---[ lines begin ]---8<---";
/// Cut mark closing a lines body.
pub const LINES_END: &str = "---8<---[  lines end  ]---8<---";
/// Body prefix shared by every line of a lines record.
pub const LINES_PREFIX: &str = "LINES: ";

/// Renders records for one configuration.
#[derive(Debug, Clone)]
pub struct DiagnosticFormatter {
    config: Arc<Config>,
    tracker: TimeTracker,
}

impl DiagnosticFormatter {
    pub fn new(config: Config) -> Self {
        Self::from_shared(Arc::new(config))
    }

    /// Share one configuration between several formatters.
    pub fn from_shared(config: Arc<Config>) -> Self {
        let tracker = TimeTracker::new(config.clock());
        Self { config, tracker }
    }

    /// Use `clock` instead of the configured system clock.
    pub fn with_clock(config: Config, clock: Arc<dyn Clock>) -> Self {
        Self {
            config: Arc::new(config),
            tracker: TimeTracker::with_clock(clock),
        }
    }

    fn write(&self, loc: &Location, body: &str) {
        let line = record::render(self.config.tag(), loc, body);
        self.config.sink().write_line(&line);
    }

    /// One plain record; an empty body renders the bare preamble.
    pub fn emit(&self, loc: &Location, body: &str) {
        self.write(loc, body);
    }

    pub fn emit_fmt(&self, loc: &Location, args: fmt::Arguments<'_>) {
        match args.as_str() {
            Some(s) => self.write(loc, s),
            None => self.write(loc, &args.to_string()),
        }
    }

    /// `name: value` pairs joined by `",  "`, in input order.
    pub fn emit_kv<N, V, I>(&self, loc: &Location, pairs: I)
    where
        N: Display,
        V: Display,
        I: IntoIterator<Item = (N, V)>,
    {
        self.write(loc, &record::render_kv(pairs));
    }

    /// `message` followed by `: <code> / <description>`.
    pub fn emit_errno(&self, loc: &Location, message: &str, code: i32) {
        let desc = errno::describe(code);
        if message.is_empty() {
            self.write(loc, &format!("{code} / {desc}"));
        } else {
            self.write(loc, &format!("{message}: {code} / {desc}"));
        }
    }

    /// [`emit_errno`](Self::emit_errno) with the thread's last OS error.
    pub fn emit_last_errno(&self, loc: &Location, message: &str) {
        let code = errno::last_errno();
        self.emit_errno(loc, message, code);
    }

    /// Hex dump of `buffer`.
    ///
    /// Two header lines are always written. The cut marks and body follow
    /// only when the buffer holds at least one byte.
    pub fn emit_dump(&self, loc: &Location, message: &str, buffer: Option<&[u8]>) {
        let data = buffer.unwrap_or_default();
        self.write(loc, &format!("{DUMP_PREFIX}{message}"));
        self.write(
            loc,
            &format!(
                "{DUMP_PREFIX}{} bytes @ {:#x}",
                data.len(),
                dump::address_of(buffer)
            ),
        );
        if data.is_empty() {
            return;
        }
        self.write(loc, &format!("{DUMP_PREFIX}{DUMP_BEGIN}"));
        for line in HexLines::new(data, self.config.dump_width()) {
            self.write(loc, &format!("{DUMP_PREFIX}{line}"));
        }
        self.write(loc, &format!("{DUMP_PREFIX}{DUMP_END}"));
    }

    /// Numbered newline-separated chunks of `text`, stopping at the first
    /// nul or at `max_len`.
    pub fn emit_lines(&self, loc: &Location, message: &str, text: &[u8], max_len: usize) {
        let chunks = Chunks::new(text, max_len);
        let scanned = chunks.scanned();
        self.write(loc, &format!("{LINES_PREFIX}{message}"));
        self.write(
            loc,
            &format!(
                "{LINES_PREFIX}{} bytes @ {:#x}",
                scanned.len(),
                dump::address_of(Some(text))
            ),
        );
        if scanned.is_empty() {
            return;
        }
        self.write(loc, &format!("{LINES_PREFIX}{LINES_BEGIN}"));
        for (idx, chunk) in chunks.enumerate() {
            let chunk = String::from_utf8_lossy(chunk);
            self.write(loc, &format!("{LINES_PREFIX}{idx:05}: {chunk}"));
        }
        self.write(loc, &format!("{LINES_PREFIX}{LINES_END}"));
    }

    /// Read the clock, reporting a failed read as a record of its own.
    pub fn now(&self, loc: &Location) -> Timestamp {
        self.tracker
            .try_now()
            .unwrap_or_else(|err| self.report(loc, &TimeError::from(err)))
    }

    fn report(&self, loc: &Location, err: &TimeError) -> Timestamp {
        log::warn!("{err}");
        self.write(loc, &err.to_string());
        Timestamp::ZERO
    }

    /// Time since `start`. A failed clock read is reported alone, without
    /// also blaming `start` for a backwards interval.
    fn interval(&self, loc: &Location, start: Timestamp) -> Timestamp {
        match self.tracker.try_now() {
            Ok(now) => time::diff(start, now).unwrap_or_else(|err| self.report(loc, &err)),
            Err(err) => self.report(loc, &TimeError::from(err)),
        }
    }

    fn write_with(&self, loc: &Location, head: &str, body: &str) {
        if body.is_empty() {
            self.write(loc, head);
        } else {
            self.write(loc, &format!("{head}: {body}"));
        }
    }

    /// A timestamp record, `<secs>.<nanos>[: body]`.
    pub fn emit_stamp(&self, loc: &Location, ts: Timestamp, body: &str) {
        self.write_with(loc, &ts.to_string(), body);
    }

    /// Time since `start`, `+<interval>[: body]`. Returns the interval.
    pub fn emit_diff(&self, loc: &Location, start: Timestamp, body: &str) -> Timestamp {
        let interval = self.interval(loc, start);
        self.write_with(loc, &format!("+{interval}"), body);
        interval
    }

    /// Add the time since `start` into `acc` without writing a record.
    pub fn accumulate(&self, loc: &Location, start: Timestamp, acc: &mut Timestamp) -> Timestamp {
        let interval = self.interval(loc, start);
        *acc = acc.saturating_add(interval);
        *acc
    }

    /// Accumulate and report `+<interval> / <total>[: body]`.
    pub fn emit_acc(
        &self,
        loc: &Location,
        start: Timestamp,
        acc: &mut Timestamp,
        body: &str,
    ) -> Timestamp {
        let interval = self.interval(loc, start);
        *acc = acc.saturating_add(interval);
        self.write_with(loc, &format!("+{interval} / {acc}"), body);
        *acc
    }

    /// Rate of `count` events since `start`, `+<interval> / <rate> Hz[: body]`.
    ///
    /// A zero interval reports an infinite rate.
    pub fn emit_rate(&self, loc: &Location, start: Timestamp, count: u64, body: &str) -> f64 {
        let interval = self.interval(loc, start);
        let hz = time::rate(Timestamp::ZERO, interval, count).unwrap_or(f64::INFINITY);
        self.write_with(loc, &format!("+{interval} / {hz:.3} Hz"), body);
        hz
    }
}

// ───────────────────────────── tests ─────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::{Capture, Sink};
    use crate::time::ManualClock;

    const LOC: Location = Location::new("example.rs", 50, "example");

    fn formatter() -> (DiagnosticFormatter, Capture, Arc<ManualClock>) {
        let (sink, cap) = Sink::capture();
        let clock = Arc::new(ManualClock::new(Timestamp::new(100, 0)));
        let fmt = DiagnosticFormatter::with_clock(Config::new().with_sink(sink), clock.clone());
        (fmt, cap, clock)
    }

    #[test]
    fn plain_and_formatted() {
        let (fmt, cap, _) = formatter();
        fmt.emit(&LOC, "");
        fmt.emit(&LOC, "test message");
        fmt.emit_fmt(&LOC, format_args!("'i' has the value {}", 42));
        assert_eq!(
            cap.take(),
            vec![
                "ATTIE: example.rs:50 example()",
                "ATTIE: example.rs:50 example(): test message",
                "ATTIE: example.rs:50 example(): 'i' has the value 42",
            ]
        );
    }

    #[test]
    fn kv_pairs() {
        let (fmt, cap, _) = formatter();
        fmt.emit_kv(&LOC, [("i", "42"), ("s", "[hi]")]);
        assert_eq!(cap.take(), vec!["ATTIE: example.rs:50 example(): i: 42,  s: [hi]"]);
    }

    #[test]
    fn errno_suffix() {
        let (fmt, cap, _) = formatter();
        fmt.emit_errno(&LOC, "uhoh", libc::EINVAL);
        assert_eq!(
            cap.take(),
            vec![format!(
                "ATTIE: example.rs:50 example(): uhoh: {} / Invalid argument",
                libc::EINVAL
            )]
        );
    }

    #[test]
    fn last_errno_after_failed_syscall() {
        let (fmt, cap, _) = formatter();
        // SAFETY: closing an invalid descriptor only sets errno.
        let rc = unsafe { libc::close(-1) };
        assert_eq!(rc, -1);
        fmt.emit_last_errno(&LOC, "close");
        assert_eq!(
            cap.take(),
            vec![format!(
                "ATTIE: example.rs:50 example(): close: {} / Bad file descriptor",
                libc::EBADF
            )]
        );
    }

    #[test]
    fn null_dump_is_headers_only() {
        let (fmt, cap, _) = formatter();
        fmt.emit_dump(&LOC, "this has no data or length", None);
        assert_eq!(
            cap.take(),
            vec![
                "ATTIE: example.rs:50 example(): DUMP: this has no data or length",
                "ATTIE: example.rs:50 example(): DUMP: 0 bytes @ 0x0",
            ]
        );
    }

    #[test]
    fn empty_non_null_dump_is_headers_only() {
        let (fmt, cap, _) = formatter();
        fmt.emit_dump(&LOC, "empty", Some(&b""[..]));
        let lines = cap.take();
        assert_eq!(lines.len(), 2);
        assert!(lines[1].contains("DUMP: 0 bytes @ 0x"));
    }

    #[test]
    fn two_byte_dump() {
        let (fmt, cap, _) = formatter();
        fmt.emit_dump(&LOC, "ab", Some(&b"AB"[..]));
        let lines = cap.take();
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[2], "ATTIE: example.rs:50 example(): DUMP: ---8<---[ dump begins ]---8<---");
        assert_eq!(lines[3], "ATTIE: example.rs:50 example(): DUMP: 0x0000: 41 42 | AB");
        assert_eq!(lines[4], "ATTIE: example.rs:50 example(): DUMP: ---8<---[  dump ends  ]---8<---");
    }

    #[test]
    fn dump_uses_configured_width() {
        let (sink, cap) = Sink::capture();
        let fmt = DiagnosticFormatter::new(
            Config::new().with_sink(sink).with_dump_width(4).unwrap(),
        );
        fmt.emit_dump(&LOC, "w", Some(&b"0123456789"[..]));
        let lines = cap.take();
        // header, header, begin, 3 body lines, end
        assert_eq!(lines.len(), 7);
        assert!(lines[5].ends_with("DUMP: 0x0008: 38 39 | 89"));
    }

    #[test]
    fn lines_block() {
        let (fmt, cap, _) = formatter();
        fmt.emit_lines(&LOC, "multi", b"a\n\nb", 4);
        let lines = cap.take();
        let bodies: Vec<_> = lines
            .iter()
            .map(|l| l.strip_prefix("ATTIE: example.rs:50 example(): ").unwrap())
            .collect();
        assert_eq!(bodies[0], "LINES: multi");
        assert!(bodies[1].starts_with("LINES: 4 bytes @ 0x"));
        assert_eq!(
            &bodies[2..],
            &[
                "LINES: ---8<---[ lines begin ]---8<---",
                "LINES: 00000: a",
                "LINES: 00001: ",
                "LINES: 00002: b",
                "LINES: ---8<---[  lines end  ]---8<---",
            ]
        );
    }

    #[test]
    fn empty_lines_is_headers_only() {
        let (fmt, cap, _) = formatter();
        fmt.emit_lines(&LOC, "none", b"text", 0);
        fmt.emit_lines(&LOC, "none", b"", 10);
        assert_eq!(cap.take().len(), 4);
    }

    #[test]
    fn diff_acc_and_rate() {
        let (fmt, cap, clock) = formatter();
        let start = fmt.now(&LOC);
        clock.advance(Timestamp::new(1, 500));
        let d = fmt.emit_diff(&LOC, start, "that was fast!");
        assert_eq!(d, Timestamp::new(1, 500));

        let mut acc = Timestamp::new(0, 999_999_600);
        fmt.emit_acc(&LOC, start, &mut acc, "");
        assert_eq!(acc, Timestamp::new(2, 100));

        let start = fmt.now(&LOC);
        clock.advance(Timestamp::new(1, 0));
        let hz = fmt.emit_rate(&LOC, start, 10, "ten");
        assert_eq!(hz, 10.0);

        assert_eq!(
            cap.take(),
            vec![
                "ATTIE: example.rs:50 example(): +1.000000500: that was fast!",
                "ATTIE: example.rs:50 example(): +1.000000500 / 2.000000100",
                "ATTIE: example.rs:50 example(): +1.000000000 / 10.000 Hz: ten",
            ]
        );
    }

    #[test]
    fn zero_interval_rate_is_infinite() {
        let (fmt, cap, _) = formatter();
        let start = fmt.now(&LOC);
        assert_eq!(fmt.emit_rate(&LOC, start, 3, ""), f64::INFINITY);
        assert_eq!(cap.take(), vec!["ATTIE: example.rs:50 example(): +0.000000000 / inf Hz"]);
    }

    #[test]
    fn backwards_interval_reported_and_zeroed() {
        let (fmt, cap, _) = formatter();
        let future = Timestamp::new(500, 0);
        let mut acc = Timestamp::new(3, 0);
        assert_eq!(fmt.accumulate(&LOC, future, &mut acc), Timestamp::new(3, 0));
        let lines = cap.take();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("invalid interval"));
    }

    #[test]
    fn clock_failure_is_self_reported() {
        let (fmt, cap, clock) = formatter();
        let start = fmt.now(&LOC);
        clock.fail_with(libc::EIO);
        assert_eq!(fmt.now(&LOC), Timestamp::ZERO);
        let lines = cap.take();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("manual clock read failed"));

        assert_eq!(fmt.emit_diff(&LOC, start, "x"), Timestamp::ZERO);
        assert_eq!(
            cap.take(),
            vec![
                format!("ATTIE: example.rs:50 example(): manual clock read failed (errno {})", libc::EIO),
                "ATTIE: example.rs:50 example(): +0.000000000: x".to_owned(),
            ]
        );

        let mut acc = Timestamp::new(2, 0);
        fmt.emit_acc(&LOC, start, &mut acc, "");
        assert_eq!(acc, Timestamp::new(2, 0));
        let lines = cap.take();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with(&format!("manual clock read failed (errno {})", libc::EIO)));
        assert!(lines.iter().all(|l| !l.contains("invalid interval")));
    }

    #[test]
    fn stamp_with_and_without_body() {
        let (fmt, cap, _) = formatter();
        let ts = Timestamp::new(1_700_000_000, 42);
        fmt.emit_stamp(&LOC, ts, "");
        fmt.emit_stamp(&LOC, ts, "static message");
        assert_eq!(
            cap.take(),
            vec![
                "ATTIE: example.rs:50 example(): 1700000000.000000042",
                "ATTIE: example.rs:50 example(): 1700000000.000000042: static message",
            ]
        );
    }
}
