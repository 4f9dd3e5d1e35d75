//! Warning-line rendering for per-cycle failures.
//!
//! Failure lines go to stdout like ordinary status lines so a status-bar
//! consumer displays them. A trust violation gets a louder marker than
//! an ordinary connection or command failure.

use dockmon_core::monitor::PollError;

const RED_BOLD: &str = "\x1b[1;31m";
const RESET: &str = "\x1b[0m";

/// Renders a per-cycle failure as a single visible line
#[must_use]
pub fn poll_failure_line(err: &PollError, color: bool) -> String {
    let body = if err.is_trust_violation() {
        format!("\u{203c} TRUST VIOLATION: {err}")
    } else {
        format!("\u{26a0} {err}")
    };

    if color {
        format!("{RED_BOLD}{body}{RESET}")
    } else {
        body
    }
}
