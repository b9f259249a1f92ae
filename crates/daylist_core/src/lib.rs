//! Core domain logic for Daylist, a date-organized task list.
//! This crate is the single source of truth for task and category invariants.

pub mod calendar;
pub mod clock;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use calendar::{build_month_grid, CalendarCell, MonthGrid, YearMonth, GRID_CELLS};
pub use clock::{Clock, FixedClock, SystemClock};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::category::{default_categories, Category};
pub use model::id::{CategoryId, TaskId};
pub use model::task::{StatusFilter, Task};
pub use model::ModelValidationError;
pub use repo::snapshot_repo::{
    LoadedSlots, RepoError, RepoResult, Slot, SnapshotRepository, SqliteSnapshotRepository,
    StoreSnapshot,
};
pub use service::query::{filter_by_date, filter_by_status, TaskCounts};
pub use service::task_store::{CreateTaskRequest, StoreError, StoreResult, TaskStore};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
