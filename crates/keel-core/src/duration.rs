//! Duration strings used by every scheduler knob.
//!
//! Accepted forms are a non-negative integer followed by an optional unit:
//! `ms`, `s`, `m` or `h`. A bare integer is seconds.

use std::time::Duration;

use crate::error::{KeelError, Result};

/// Parses `"250ms"`, `"5s"`, `"15m"`, `"2h"` or `"10"` (seconds).
///
/// # Examples
///
/// ```rust
/// use std::time::Duration;
/// use keel_core::duration::parse_duration;
///
/// assert_eq!(parse_duration("15m").unwrap(), Duration::from_secs(900));
/// assert_eq!(parse_duration("250ms").unwrap(), Duration::from_millis(250));
/// assert_eq!(parse_duration("7").unwrap(), Duration::from_secs(7));
/// ```
pub fn parse_duration(input: &str) -> Result<Duration> {
    let normalized = input.trim().to_ascii_lowercase();
    let (digits, unit_ms): (&str, u64) = if let Some(n) = normalized.strip_suffix("ms") {
        (n, 1)
    } else if let Some(n) = normalized.strip_suffix('s') {
        (n, 1_000)
    } else if let Some(n) = normalized.strip_suffix('m') {
        (n, 60_000)
    } else if let Some(n) = normalized.strip_suffix('h') {
        (n, 3_600_000)
    } else {
        (normalized.as_str(), 1_000)
    };

    let invalid = |reason: &str| {
        KeelError::invalid_input("duration").with_reason(format!("'{input}': {reason}"))
    };

    let value: u64 = digits
        .trim()
        .parse()
        .map_err(|_| invalid("expected an integer with an optional ms/s/m/h suffix"))?;
    let millis = value
        .checked_mul(unit_ms)
        .ok_or_else(|| invalid("value is too large"))?;
    Ok(Duration::from_millis(millis))
}
