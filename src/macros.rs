// CLASSIFICATION: COMMUNITY
// Filename: macros.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-16

// Call-site macros over the process-wide formatter.
// Each captures file, line and enclosing function, then forwards to the
// matching `DiagnosticFormatter` method.

/// Bare record: `<tag>: <file>:<line> <function>()`.
#[macro_export]
macro_rules! pk {
    () => {
        $crate::global().emit(&$crate::location!(), "")
    };
}

/// Record with a static string, which is not treated as a format string.
#[macro_export]
macro_rules! pks {
    ($s:expr $(,)?) => {
        $crate::global().emit(
            &$crate::location!(),
            ::core::convert::AsRef::<str>::as_ref(&$s),
        )
    };
}

/// Record with a `format!`-style body.
#[macro_export]
macro_rules! pkf {
    ($($arg:tt)+) => {
        $crate::global().emit_fmt(&$crate::location!(), ::core::format_args!($($arg)+))
    };
}

/// One or more `name: value` pairs, each given as a format and a variable.
///
/// `pkv!("{}", i, "[{}]", s)` renders `i: 42,  s: [hi]`.
#[macro_export]
macro_rules! pkv {
    ($($fmt:literal, $var:expr),+ $(,)?) => {
        $crate::global().emit_kv(
            &$crate::location!(),
            [$((::core::stringify!($var), ::std::format!($fmt, $var))),+],
        )
    };
}

/// A single `name: [value]` pair, bracketed to expose whitespace.
#[macro_export]
macro_rules! pkvb {
    ($fmt:literal, $var:expr $(,)?) => {
        $crate::global().emit_kv(
            &$crate::location!(),
            [(
                ::core::stringify!($var),
                ::std::format!("[{}]", ::std::format!($fmt, $var)),
            )],
        )
    };
}

/// Record with the thread's last OS error appended as `: <code> / <description>`.
#[macro_export]
macro_rules! pke {
    ($($arg:tt)+) => {{
        let __pk_errno = $crate::errno::last_errno();
        $crate::global().emit_errno(
            &$crate::location!(),
            &::std::format!($($arg)+),
            __pk_errno,
        )
    }};
}

/// Current time from the configured clock; produces no output.
#[macro_export]
macro_rules! pkt_start {
    () => {
        $crate::global().now(&$crate::location!())
    };
}

/// Record carrying the current time.
#[macro_export]
macro_rules! pkt_stamp {
    () => {{
        let __pk_fmt = $crate::global();
        let __pk_loc = $crate::location!();
        let __pk_now = __pk_fmt.now(&__pk_loc);
        __pk_fmt.emit_stamp(&__pk_loc, __pk_now, "")
    }};
    ($($arg:tt)+) => {{
        let __pk_fmt = $crate::global();
        let __pk_loc = $crate::location!();
        let __pk_now = __pk_fmt.now(&__pk_loc);
        __pk_fmt.emit_stamp(&__pk_loc, __pk_now, &::std::format!($($arg)+))
    }};
}

/// Record carrying the time elapsed since `start`.
#[macro_export]
macro_rules! pkt_diff {
    ($start:expr $(,)?) => {
        $crate::global().emit_diff(&$crate::location!(), $start, "")
    };
    ($start:expr, $($arg:tt)+) => {
        $crate::global().emit_diff(&$crate::location!(), $start, &::std::format!($($arg)+))
    };
}

/// Add the time since `start` into the accumulator `acc` and report both.
#[macro_export]
macro_rules! pkt_acc {
    ($start:expr, $acc:expr $(,)?) => {
        $crate::global().emit_acc(&$crate::location!(), $start, &mut $acc, "")
    };
    ($start:expr, $acc:expr, $($arg:tt)+) => {
        $crate::global().emit_acc(
            &$crate::location!(),
            $start,
            &mut $acc,
            &::std::format!($($arg)+),
        )
    };
}

/// Add the time since `start` into `acc` without output.
#[macro_export]
macro_rules! pkt_accumulate {
    ($start:expr, $acc:expr $(,)?) => {
        $crate::global().accumulate(&$crate::location!(), $start, &mut $acc)
    };
}

/// Record carrying the rate of `count` events since `start`.
#[macro_export]
macro_rules! pkt_rate {
    ($start:expr, $count:expr $(,)?) => {
        $crate::global().emit_rate(&$crate::location!(), $start, $count, "")
    };
    ($start:expr, $count:expr, $($arg:tt)+) => {
        $crate::global().emit_rate(
            &$crate::location!(),
            $start,
            $count,
            &::std::format!($($arg)+),
        )
    };
}

/// Record carrying a timestamp obtained elsewhere.
#[macro_export]
macro_rules! pkt_raw {
    ($ts:expr $(,)?) => {
        $crate::global().emit_stamp(&$crate::location!(), $ts, "")
    };
    ($ts:expr, $($arg:tt)+) => {
        $crate::global().emit_stamp(&$crate::location!(), $ts, &::std::format!($($arg)+))
    };
}

/// Hex dump of a buffer; pass `None` for the null buffer.
#[macro_export]
macro_rules! pkdump {
    (None, $($arg:tt)+) => {
        $crate::global().emit_dump(&$crate::location!(), &::std::format!($($arg)+), None)
    };
    ($buf:expr, $($arg:tt)+) => {
        $crate::global().emit_dump(
            &$crate::location!(),
            &::std::format!($($arg)+),
            $crate::dump::DumpSource::dump_bytes(&$buf),
        )
    };
}

/// Numbered block of the newline-separated lines in `text`, up to `max_len`
/// bytes or the first nul.
#[macro_export]
macro_rules! pklines {
    ($text:expr, $max_len:expr, $($arg:tt)+) => {
        $crate::global().emit_lines(
            &$crate::location!(),
            &::std::format!($($arg)+),
            ::core::convert::AsRef::<[u8]>::as_ref(&$text),
            $max_len,
        )
    };
}
