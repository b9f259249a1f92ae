use super::YearMonth;
use chrono::{Datelike, Days, NaiveDate};

/// Cells in a month grid: six weeks of seven days.
pub const GRID_CELLS: usize = 42;

/// One day cell in a month grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarCell {
    pub date: NaiveDate,
    /// False for spill-over days of the previous/next month.
    pub in_current_month: bool,
    pub is_today: bool,
    pub is_selected: bool,
    pub has_tasks: bool,
}

/// Month grid starting on the Sunday on or before the first of the month.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthGrid {
    pub month: YearMonth,
    pub cells: Vec<CalendarCell>,
}

impl MonthGrid {
    /// Rows of seven cells, Sunday first.
    pub fn weeks(&self) -> impl Iterator<Item = &[CalendarCell]> {
        self.cells.chunks(7)
    }

    pub fn cell(&self, date: NaiveDate) -> Option<&CalendarCell> {
        self.cells.iter().find(|cell| cell.date == date)
    }
}

/// First date shown in the grid of `month`.
pub fn grid_start(month: YearMonth) -> NaiveDate {
    let first = month.first_day();
    window_start(first).unwrap_or(first)
}

fn window_start(first: NaiveDate) -> Option<NaiveDate> {
    let lead = u64::from(first.weekday().num_days_from_sunday());
    first.checked_sub_days(Days::new(lead))
}

/// Whether the whole grid for the month starting at `first` is representable.
pub(super) fn window_fits(first: NaiveDate) -> bool {
    window_start(first)
        .and_then(|start| start.checked_add_days(Days::new(GRID_CELLS as u64 - 1)))
        .is_some()
}

/// Builds the 42-cell grid for `month`.
///
/// `has_tasks` is asked once per cell.
pub fn build_month_grid(
    month: YearMonth,
    today: NaiveDate,
    selected: NaiveDate,
    has_tasks: impl Fn(NaiveDate) -> bool,
) -> MonthGrid {
    let cells = grid_start(month)
        .iter_days()
        .take(GRID_CELLS)
        .map(|date| CalendarCell {
            date,
            in_current_month: month.contains(date),
            is_today: date == today,
            is_selected: date == selected,
            has_tasks: has_tasks(date),
        })
        .collect();

    MonthGrid { month, cells }
}
