//! Wall-clock source for the date/time tool.
//!
//! ```rust
//! use chrono::{TimeZone, Utc};
//! use pservices::{Clock, FixedClock};
//!
//! let clock = FixedClock::new(Utc.with_ymd_and_hms(2026, 10, 14, 4, 0, 0).unwrap(), chrono_tz::Asia::Kolkata);
//! assert_eq!(clock.current_datetime(), "2026-10-14 09:30:00 (IST)");
//! ```

use chrono::{DateTime, Utc};
use chrono_tz::Tz;

pub const DEFAULT_TIMEZONE: Tz = chrono_tz::Asia::Kolkata;
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S (%Z)";

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Tz>;

    /// Current time rendered as `YYYY-MM-DD HH:MM:SS (ZONE)`.
    fn current_datetime(&self) -> String {
        self.now().format(DATETIME_FORMAT).to_string()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    timezone: Tz,
}

impl SystemClock {
    pub fn new(timezone: Tz) -> Self {
        Self { timezone }
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEZONE)
    }
}

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Tz> {
        Utc::now().with_timezone(&self.timezone)
    }
}

/// Clock pinned to one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    instant: DateTime<Utc>,
    timezone: Tz,
}

impl FixedClock {
    pub fn new(instant: DateTime<Utc>, timezone: Tz) -> Self {
        Self { instant, timezone }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Tz> {
        self.instant.with_timezone(&self.timezone)
    }
}
