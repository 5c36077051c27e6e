// CLASSIFICATION: COMMUNITY
// Filename: time.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-16

//! Timestamp arithmetic and clock access.
//!
//! A [`Timestamp`] is a seconds + nanoseconds pair that is always kept in
//! normalized form (`nanos < 1_000_000_000`). Differences borrow a whole
//! second when the nanosecond field would underflow and sums carry one when
//! it overflows, so repeated accumulation of sub-intervals never drifts.
//!
//! Clock reads go through [`Clock`]. The default implementation is
//! [`ClockSource`], which calls `clock_gettime(2)` for either the monotonic
//! or the realtime clock. [`ManualClock`] is a settable clock for tests and
//! replay tooling.

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::{Arc, Mutex};

use thiserror::Error;

use crate::config::ConfigError;

/// Nanoseconds in one second.
pub const NANOS_PER_SEC: u32 = 1_000_000_000;

/// Normalized seconds + nanoseconds pair.
///
/// Also used to represent intervals and running accumulators; an interval is
/// simply the timestamp-shaped difference of two readings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp {
    secs: i64,
    nanos: u32,
}

impl Timestamp {
    /// The zero timestamp, also the reset value of an accumulator.
    pub const ZERO: Timestamp = Timestamp { secs: 0, nanos: 0 };

    /// Build a timestamp, carrying excess nanoseconds into `secs`.
    pub fn new(secs: i64, nanos: u32) -> Self {
        let carry = i64::from(nanos / NANOS_PER_SEC);
        Self {
            secs: secs.saturating_add(carry),
            nanos: nanos % NANOS_PER_SEC,
        }
    }

    pub fn secs(&self) -> i64 {
        self.secs
    }

    pub fn nanos(&self) -> u32 {
        self.nanos
    }

    /// Seconds as a float, `secs + nanos / 1e9`.
    pub fn as_secs_f64(&self) -> f64 {
        self.secs as f64 + f64::from(self.nanos) / f64::from(NANOS_PER_SEC)
    }

    /// Carry-correct addition; `None` when the seconds field overflows.
    pub fn checked_add(self, rhs: Timestamp) -> Option<Timestamp> {
        let mut secs = self.secs.checked_add(rhs.secs)?;
        let mut nanos = self.nanos + rhs.nanos;
        if nanos >= NANOS_PER_SEC {
            secs = secs.checked_add(1)?;
            nanos -= NANOS_PER_SEC;
        }
        Some(Timestamp { secs, nanos })
    }

    /// Carry-correct addition clamped at the largest representable value.
    pub fn saturating_add(self, rhs: Timestamp) -> Timestamp {
        self.checked_add(rhs).unwrap_or(Timestamp {
            secs: i64::MAX,
            nanos: NANOS_PER_SEC - 1,
        })
    }

    /// `now - start`, clamped to zero when `now` precedes `start`.
    pub fn saturating_diff(start: Timestamp, now: Timestamp) -> Timestamp {
        diff(start, now).unwrap_or(Timestamp::ZERO)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:09}", self.secs, self.nanos)
    }
}

/// Errors from interval arithmetic.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TimeError {
    #[error("invalid interval: now {now} precedes start {start}")]
    InvalidInterval { start: Timestamp, now: Timestamp },
    #[error("interval between {start} and {now} overflows")]
    Overflow { start: Timestamp, now: Timestamp },
    #[error(transparent)]
    Clock(#[from] ClockError),
}

/// Failure reading the underlying clock.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ClockError {
    #[error("{clock} clock read failed (errno {errno})")]
    Read { clock: &'static str, errno: i32 },
}

/// `now - start` with nanosecond borrow.
///
/// `now < start` is reported as [`TimeError::InvalidInterval`] rather than
/// producing a negative interval.
pub fn diff(start: Timestamp, now: Timestamp) -> Result<Timestamp, TimeError> {
    if now < start {
        return Err(TimeError::InvalidInterval { start, now });
    }
    let mut secs = now
        .secs
        .checked_sub(start.secs)
        .ok_or(TimeError::Overflow { start, now })?;
    let nanos = if now.nanos < start.nanos {
        secs -= 1;
        now.nanos + NANOS_PER_SEC - start.nanos
    } else {
        now.nanos - start.nanos
    };
    Ok(Timestamp { secs, nanos })
}

/// Events per second over `[start, now]`.
///
/// A zero-length interval yields `f64::INFINITY`.
pub fn rate(start: Timestamp, now: Timestamp, count: u64) -> Result<f64, TimeError> {
    let elapsed = diff(start, now)?.as_secs_f64();
    if elapsed == 0.0 {
        return Ok(f64::INFINITY);
    }
    Ok(count as f64 / elapsed)
}

/// Anything that can produce the current time.
pub trait Clock: Send + Sync {
    fn read(&self) -> Result<Timestamp, ClockError>;
}

/// Which system clock to read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ClockSource {
    /// `CLOCK_MONOTONIC`; unaffected by wall-clock adjustments.
    #[default]
    Monotonic,
    /// `CLOCK_REALTIME`; seconds since the Unix epoch.
    Realtime,
}

impl ClockSource {
    pub fn name(&self) -> &'static str {
        match self {
            ClockSource::Monotonic => "monotonic",
            ClockSource::Realtime => "realtime",
        }
    }

    fn clock_id(&self) -> libc::clockid_t {
        match self {
            ClockSource::Monotonic => libc::CLOCK_MONOTONIC,
            ClockSource::Realtime => libc::CLOCK_REALTIME,
        }
    }

    /// Read this clock via `clock_gettime(2)`.
    pub fn gettime(&self) -> Result<Timestamp, ClockError> {
        // SAFETY: `timespec` is plain old data; all-zero is a valid value.
        let mut ts: libc::timespec = unsafe { std::mem::zeroed() };
        // SAFETY: `ts` is a valid, exclusively borrowed timespec for the call.
        let rc = unsafe { libc::clock_gettime(self.clock_id(), &mut ts) };
        if rc != 0 {
            return Err(ClockError::Read {
                clock: self.name(),
                errno: crate::errno::last_errno(),
            });
        }
        Ok(Timestamp::new(ts.tv_sec as i64, ts.tv_nsec as u32))
    }
}

impl Clock for ClockSource {
    fn read(&self) -> Result<Timestamp, ClockError> {
        self.gettime()
    }
}

impl FromStr for ClockSource {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "monotonic" => Ok(ClockSource::Monotonic),
            "realtime" => Ok(ClockSource::Realtime),
            other => Err(ConfigError::UnknownClock(other.to_owned())),
        }
    }
}

impl fmt::Display for ClockSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A clock that only moves when told to.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Mutex<Timestamp>,
    errno: AtomicI32,
}

impl ManualClock {
    pub fn new(start: Timestamp) -> Self {
        Self {
            now: Mutex::new(start),
            errno: AtomicI32::new(0),
        }
    }

    pub fn set(&self, ts: Timestamp) {
        *self.now.lock().unwrap_or_else(|e| e.into_inner()) = ts;
    }

    pub fn advance(&self, by: Timestamp) {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *now = now.saturating_add(by);
    }

    /// Make subsequent reads fail with `errno`; `0` restores normal reads.
    pub fn fail_with(&self, errno: i32) {
        self.errno.store(errno, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn read(&self) -> Result<Timestamp, ClockError> {
        let errno = self.errno.load(Ordering::SeqCst);
        if errno != 0 {
            return Err(ClockError::Read {
                clock: "manual",
                errno,
            });
        }
        Ok(*self.now.lock().unwrap_or_else(|e| e.into_inner()))
    }
}

/// Captures timestamps and maintains accumulators against one [`Clock`].
#[derive(Clone)]
pub struct TimeTracker {
    clock: Arc<dyn Clock>,
}

impl TimeTracker {
    pub fn new(source: ClockSource) -> Self {
        Self {
            clock: Arc::new(source),
        }
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }

    pub fn try_now(&self) -> Result<Timestamp, ClockError> {
        self.clock.read()
    }

    /// Current time, or [`Timestamp::ZERO`] if the clock cannot be read.
    ///
    /// A failed read only goes to the `log` facade. Use
    /// [`DiagnosticFormatter::now`](crate::DiagnosticFormatter::now) to have
    /// it written to the record sink as well.
    pub fn now(&self) -> Timestamp {
        self.try_now().unwrap_or_else(|err| {
            log::warn!("{err}");
            Timestamp::ZERO
        })
    }

    /// Add `now() - start` into `acc` and return the new total.
    ///
    /// A failed clock read or an interval that runs backwards contributes
    /// nothing.
    pub fn accumulate(&self, start: Timestamp, acc: &mut Timestamp) -> Timestamp {
        match self.try_now().map_err(TimeError::from).and_then(|now| diff(start, now)) {
            Ok(interval) => *acc = acc.saturating_add(interval),
            Err(err) => log::warn!("accumulate: {err}"),
        }
        *acc
    }
}

impl Default for TimeTracker {
    fn default() -> Self {
        Self::new(ClockSource::default())
    }
}

impl fmt::Debug for TimeTracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimeTracker").finish_non_exhaustive()
    }
}

// ───────────────────────────── tests ─────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    fn ts(secs: i64, nanos: u32) -> Timestamp {
        Timestamp::new(secs, nanos)
    }

    #[test]
    fn new_normalizes_nanos() {
        assert_eq!(ts(1, 2_500_000_000), ts(3, 500_000_000));
        assert_eq!(ts(0, 999_999_999).nanos(), 999_999_999);
    }

    #[test]
    fn diff_borrows_a_second() {
        let d = diff(ts(10, 900_000_000), ts(12, 100_000_000)).unwrap();
        assert_eq!(d, ts(1, 200_000_000));
    }

    #[test]
    fn diff_rejects_backwards_interval() {
        let err = diff(ts(5, 0), ts(4, 999_999_999)).unwrap_err();
        assert!(matches!(err, TimeError::InvalidInterval { .. }));
        assert_eq!(Timestamp::saturating_diff(ts(5, 0), ts(4, 0)), Timestamp::ZERO);
    }

    #[test]
    fn add_diff_round_trips() {
        let pairs = [
            (ts(0, 0), ts(0, 1)),
            (ts(3, 999_999_999), ts(4, 0)),
            (ts(-2, 500), ts(7, 400)),
            (ts(100, 123_456_789), ts(100, 123_456_789)),
        ];
        for (a, b) in pairs {
            let d = diff(a, b).unwrap();
            assert_eq!(a.checked_add(d), Some(b), "{a} + {d}");
        }
    }

    #[test]
    fn add_carries() {
        let sum = ts(1, 600_000_000).checked_add(ts(2, 700_000_000)).unwrap();
        assert_eq!(sum, ts(4, 300_000_000));
        assert_eq!(ts(i64::MAX, 1).checked_add(ts(0, NANOS_PER_SEC - 1)), None);
    }

    #[test]
    fn rate_over_one_second() {
        let r = rate(ts(7, 250), ts(8, 250), 10).unwrap();
        assert_eq!(r, 10.0);
    }

    #[test]
    fn rate_zero_interval_is_infinite() {
        assert_eq!(rate(ts(1, 1), ts(1, 1), 3).unwrap(), f64::INFINITY);
    }

    #[test]
    fn display_pads_nanos() {
        assert_eq!(ts(12, 3400).to_string(), "12.000003400");
    }

    #[test]
    fn accumulate_sums_halves() {
        let clock = Arc::new(ManualClock::new(ts(50, 0)));
        let tracker = TimeTracker::with_clock(clock.clone());

        let mut acc = Timestamp::ZERO;
        let first = tracker.now();
        clock.advance(ts(0, 700_000_000));
        tracker.accumulate(first, &mut acc);

        let gap_start = tracker.now();
        clock.advance(ts(5, 900_000_000));
        let gap = diff(gap_start, tracker.now()).unwrap();

        let second = tracker.now();
        clock.advance(ts(1, 600_000_000));
        let total = tracker.accumulate(second, &mut acc);
        let end = tracker.now();

        let whole = diff(first, end).unwrap();
        assert_eq!(total.checked_add(gap), Some(whole));
        assert_eq!(total, ts(2, 300_000_000));
        assert_eq!(acc, total);
    }

    #[test]
    fn failed_clock_reads_zero() {
        let clock = Arc::new(ManualClock::new(ts(9, 0)));
        clock.fail_with(libc::EINVAL);
        let tracker = TimeTracker::with_clock(clock.clone());
        assert_eq!(tracker.now(), Timestamp::ZERO);
        assert_eq!(
            tracker.try_now(),
            Err(ClockError::Read {
                clock: "manual",
                errno: libc::EINVAL
            })
        );
        clock.fail_with(0);
        assert_eq!(tracker.now(), ts(9, 0));
    }

    #[test]
    fn system_clocks_are_readable() {
        let a = ClockSource::Monotonic.gettime().unwrap();
        let b = ClockSource::Monotonic.gettime().unwrap();
        assert!(b >= a);
        assert!(ClockSource::Realtime.gettime().unwrap().secs() > 0);
    }

    #[test]
    fn clock_source_parses() {
        assert_eq!("Realtime".parse::<ClockSource>().unwrap(), ClockSource::Realtime);
        assert!("tai".parse::<ClockSource>().is_err());
    }
}
