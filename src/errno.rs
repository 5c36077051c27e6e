// CLASSIFICATION: COMMUNITY
// Filename: errno.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-16

//! OS error codes and their descriptions.

use std::io;

/// Substituted when the description lookup yields nothing.
pub const UNKNOWN_ERROR: &str = "Unknown error";

/// The calling thread's last OS error code, `0` if none.
pub fn last_errno() -> i32 {
    io::Error::last_os_error().raw_os_error().unwrap_or(0)
}

/// Describe `code` using the reentrant `strerror_r`.
#[cfg(unix)]
pub fn describe(code: i32) -> String {
    use std::ffi::CStr;

    let mut buf = [0 as libc::c_char; 256];
    // SAFETY: `buf` is valid for writes of `buf.len()` bytes and the XSI
    // `strerror_r` always nul-terminates within that bound on success.
    let rc = unsafe { libc::strerror_r(code, buf.as_mut_ptr(), buf.len()) };
    if rc != 0 {
        return UNKNOWN_ERROR.to_owned();
    }
    // SAFETY: nul-terminated on success, see above.
    let msg = unsafe { CStr::from_ptr(buf.as_ptr()) }.to_string_lossy();
    non_empty(msg.trim())
}

#[cfg(not(unix))]
pub fn describe(code: i32) -> String {
    let msg = io::Error::from_raw_os_error(code).to_string();
    let msg = msg.split(" (os error").next().unwrap_or_default();
    non_empty(msg.trim())
}

fn non_empty(msg: &str) -> String {
    if msg.is_empty() {
        UNKNOWN_ERROR.to_owned()
    } else {
        msg.to_owned()
    }
}

// ───────────────────────────── tests ─────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_code() {
        assert_eq!(describe(libc::EINVAL), "Invalid argument");
    }

    #[test]
    fn empty_falls_back() {
        assert_eq!(non_empty(""), UNKNOWN_ERROR);
        assert!(!describe(-1).is_empty());
    }

    #[test]
    fn describe_is_thread_safe() {
        let handles: Vec<_> = (0..4)
            .map(|_| std::thread::spawn(|| describe(libc::ENOENT)))
            .collect();
        for h in handles {
            assert_eq!(h.join().unwrap(), "No such file or directory");
        }
    }
}
