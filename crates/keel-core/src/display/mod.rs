//! Markdown formatting for plans, reports and operation outcomes.
//!
//! Domain models implement [`std::fmt::Display`] directly (see [`models`]);
//! engine reports and operation wrappers live in [`reports`]. Everything is
//! formatted as markdown so the CLI can render it richly or print it as is.
//!
//! ```rust
//! use keel_core::{display::OperationResult, models::{Payload, Plan}};
//!
//! let plan = Plan::new("p1", "t1", None, Payload::default());
//! let output = OperationResult::created(&plan).to_string();
//! assert!(output.contains("Created plan p1"));
//! assert!(output.contains("- Stage: PHRASE (2/7)"));
//! ```

use std::fmt;

use jiff::{tz::TimeZone, Timestamp};

pub mod models;
pub mod reports;

pub use reports::OperationResult;

/// Formats a timestamp in the system timezone as `YYYY-MM-DD HH:MM:SS TZ`.
pub struct LocalDateTime<'a>(pub &'a Timestamp);

impl fmt::Display for LocalDateTime<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            self.0
                .to_zoned(TimeZone::system())
                .strftime("%Y-%m-%d %H:%M:%S %Z")
        )
    }
}
