use chrono::{Datelike, NaiveDate, TimeZone, Utc, Weekday};
use daylist_core::db::open_db_in_memory;
use daylist_core::{
    CreateTaskRequest, FixedClock, SqliteSnapshotRepository, StatusFilter, TaskStore, YearMonth,
    GRID_CELLS,
};

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn clock() -> FixedClock {
    FixedClock::new(
        Utc.with_ymd_and_hms(2024, 12, 31, 23, 30, 0).unwrap(),
        ymd(2024, 12, 31),
    )
}

#[test]
fn store_opens_on_today_with_all_filter() {
    let mut conn = open_db_in_memory().unwrap();
    let repo = SqliteSnapshotRepository::try_new(&mut conn).unwrap();
    let store = TaskStore::open_with_clock(repo, clock()).unwrap();

    assert_eq!(store.selected_date(), ymd(2024, 12, 31));
    assert_eq!(store.status_filter(), StatusFilter::All);
    assert_eq!(store.displayed_month(), YearMonth::new(2024, 11).unwrap());
}

#[test]
fn month_navigation_wraps_years_and_keeps_selection() {
    let mut conn = open_db_in_memory().unwrap();
    let repo = SqliteSnapshotRepository::try_new(&mut conn).unwrap();
    let mut store = TaskStore::open_with_clock(repo, clock()).unwrap();

    let next = store.change_month(1);
    assert_eq!((next.year(), next.month0()), (2025, 0));
    let back = store.change_month(-2);
    assert_eq!((back.year(), back.month0()), (2024, 10));
    assert_eq!(store.selected_date(), ymd(2024, 12, 31));

    store.select_date(ymd(2025, 6, 1));
    assert_eq!(store.displayed_month(), back);
}

#[test]
fn month_grid_marks_today_selection_and_task_days() {
    let mut conn = open_db_in_memory().unwrap();
    let repo = SqliteSnapshotRepository::try_new(&mut conn).unwrap();
    let mut store = TaskStore::open_with_clock(repo, clock()).unwrap();

    store
        .create_task(CreateTaskRequest::new("holiday prep").on(ymd(2024, 12, 24)))
        .unwrap();
    store
        .create_task(CreateTaskRequest::new("new year").on(ymd(2025, 1, 1)))
        .unwrap();
    store.select_date(ymd(2024, 12, 10));

    let grid = store.month_grid();
    assert_eq!(grid.cells.len(), GRID_CELLS);
    assert_eq!(grid.cells[0].date, ymd(2024, 12, 1));
    assert_eq!(grid.cells[0].date.weekday(), Weekday::Sun);

    let today = grid.cell(ymd(2024, 12, 31)).unwrap();
    assert!(today.is_today && today.in_current_month);
    assert!(grid.cell(ymd(2024, 12, 10)).unwrap().is_selected);
    assert!(grid.cell(ymd(2024, 12, 24)).unwrap().has_tasks);

    let spill = grid.cell(ymd(2025, 1, 1)).unwrap();
    assert!(!spill.in_current_month);
    assert!(spill.has_tasks);
    assert_eq!(grid.cells.iter().filter(|c| c.is_today).count(), 1);
}

#[test]
fn grids_always_have_42_cells_starting_sunday() {
    let mut conn = open_db_in_memory().unwrap();
    let repo = SqliteSnapshotRepository::try_new(&mut conn).unwrap();
    let mut store = TaskStore::open_with_clock(repo, clock()).unwrap();

    for _ in 0..36 {
        let grid = store.month_grid();
        assert_eq!(grid.cells.len(), GRID_CELLS);
        assert_eq!(grid.cells[0].date.weekday(), Weekday::Sun);
        assert!(grid.cells[0].date <= grid.month.first_day());
        store.change_month(1);
    }
}
