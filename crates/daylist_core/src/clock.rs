//! Wall clock seam.
//!
//! Store code never reads the system time directly; it asks a `Clock`, so
//! tests can pin "now" and "today".

use chrono::{DateTime, Local, NaiveDate, Utc};

/// Source of the current instant and local calendar date.
pub trait Clock {
    /// Current instant, used for ids and `created_at`.
    fn now(&self) -> DateTime<Utc>;
    /// Current real-world date in the user's local time zone.
    fn today(&self) -> NaiveDate;
}

/// Clock backed by the operating system.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Clock frozen at a given instant and local date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock {
    pub now: DateTime<Utc>,
    pub today: NaiveDate,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>, today: NaiveDate) -> Self {
        Self { now, today }
    }

    /// Uses the UTC date of `now` as today.
    pub fn at(now: DateTime<Utc>) -> Self {
        Self::new(now, now.date_naive())
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.now
    }

    fn today(&self) -> NaiveDate {
        self.today
    }
}
