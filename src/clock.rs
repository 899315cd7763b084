use chrono::{DateTime, Utc};

/// Source of the current instant used to anchor request windows.
///
/// Every request window is computed relative to `now()`, so swapping the
/// clock makes window arithmetic deterministic.
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use entsoe_grid::clock::{Clock, FixedClock};
///
/// let at = Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap();
/// let clock = FixedClock::new(at);
/// assert_eq!(clock.now(), at);
/// ```
pub trait Clock {
    /// Returns the current instant in UTC.
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock frozen at one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    at: DateTime<Utc>,
}

impl FixedClock {
    /// Creates a clock that always reports `at`.
    ///
    /// # Arguments
    ///
    /// * `at` - The instant returned by every call to `now()`
    pub fn new(at: DateTime<Utc>) -> Self {
        Self { at }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.at
    }
}
