//! Calendar month arithmetic.
//!
//! # Responsibility
//! - Represent the month displayed by a calendar view.
//! - Build the fixed 6x7 month grid with per-cell classification.
//!
//! # Invariants
//! - Months are zero-based (`0` = January) at the API boundary.
//! - Every `YearMonth` has a full 42-day grid inside the representable date
//!   range; construction and navigation clamp to `earliest()..=latest()`.
//! - Navigation rolls over year boundaries.

mod grid;

pub use grid::{build_month_grid, grid_start, CalendarCell, MonthGrid, GRID_CELLS};

use chrono::{Datelike, Months, NaiveDate, Weekday};
use grid::window_fits;
use std::fmt::{Display, Formatter};

/// A calendar month, stored as its first day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    first: NaiveDate,
}

impl YearMonth {
    /// Builds a month from a year and zero-based month.
    ///
    /// Returns `None` when `month0 > 11` or the month's grid would leave the
    /// representable date range.
    pub fn new(year: i32, month0: u32) -> Option<Self> {
        let first = NaiveDate::from_ymd_opt(year, month0.checked_add(1)?, 1)?;
        window_fits(first).then_some(Self { first })
    }

    /// Month containing `date`, clamped to `earliest()..=latest()`.
    pub fn containing(date: NaiveDate) -> Self {
        let first = date.with_day(1).unwrap_or(date);
        if window_fits(first) {
            return Self { first };
        }
        let earliest = Self::earliest();
        if first < earliest.first {
            earliest
        } else {
            Self::latest()
        }
    }

    /// First month whose whole grid is representable.
    pub fn earliest() -> Self {
        let mut first = NaiveDate::MIN.with_day(1).unwrap_or(NaiveDate::MIN);
        while !window_fits(first) {
            match first.checked_add_months(Months::new(1)) {
                Some(next) => first = next,
                None => break,
            }
        }
        Self { first }
    }

    /// Last month whose whole grid is representable.
    pub fn latest() -> Self {
        let mut first = NaiveDate::MAX.with_day(1).unwrap_or(NaiveDate::MAX);
        while !window_fits(first) {
            match first.checked_sub_months(Months::new(1)) {
                Some(previous) => first = previous,
                None => break,
            }
        }
        Self { first }
    }

    pub fn year(self) -> i32 {
        self.first.year()
    }

    /// Zero-based month.
    pub fn month0(self) -> u32 {
        self.first.month0()
    }

    pub fn first_day(self) -> NaiveDate {
        self.first
    }

    /// Weekday on which the first day of the month falls.
    pub fn first_weekday(self) -> Weekday {
        self.first.weekday()
    }

    pub fn contains(self, date: NaiveDate) -> bool {
        date.year() == self.year() && date.month0() == self.month0()
    }

    /// Moves by `delta` months, rolling across years and saturating at
    /// `earliest()`/`latest()`.
    pub fn shift(self, delta: i32) -> Self {
        let months = Months::new(delta.unsigned_abs());
        let shifted = if delta >= 0 {
            self.first.checked_add_months(months)
        } else {
            self.first.checked_sub_months(months)
        };
        match shifted.filter(|first| window_fits(*first)) {
            Some(first) => Self { first },
            None if delta >= 0 => Self::latest(),
            None => Self::earliest(),
        }
    }

    pub fn next(self) -> Self {
        self.shift(1)
    }

    pub fn previous(self) -> Self {
        self.shift(-1)
    }
}

impl Display for YearMonth {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year(), self.month0() + 1)
    }
}
