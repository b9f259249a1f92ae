//! Task store: the single owner of tasks, categories and view state.
//!
//! # Responsibility
//! - Load slots, seed defaults and backfill uncategorized legacy tasks.
//! - Enforce task/category invariants on every mutation.
//! - Write the full snapshot through to the repository after each mutation.
//! - Serve the date/status filtered views and the calendar grid.
//!
//! # Invariants
//! - Category names are unique ignoring case.
//! - Deleting a category orphans its tasks; tasks are never cascade-deleted.
//! - Renaming a category refreshes `category_name` on tasks that reference it.
//! - In-memory state changes only after the snapshot write succeeded.

use crate::calendar::{build_month_grid, MonthGrid, YearMonth};
use crate::clock::{Clock, SystemClock};
use crate::model::category::{default_categories, validate_color, Category};
use crate::model::id::{allocate_id, CategoryId, TaskId};
use crate::model::task::{StatusFilter, Task};
use crate::model::ModelValidationError;
use crate::repo::snapshot_repo::{LoadedSlots, RepoError, SnapshotRepository, StoreSnapshot};
use crate::service::query::{counts_on, filter_by_date, filter_by_status, has_tasks_on, TaskCounts};
use chrono::NaiveDate;
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

pub type StoreResult<T> = Result<T, StoreError>;

/// Rejection or failure reported by store operations.
///
/// Every variant except `Repo` is a validation rejection that left the store
/// unchanged.
#[derive(Debug)]
pub enum StoreError {
    EmptyTaskText,
    EmptyCategoryName,
    /// Another category already uses this name (ignoring case).
    DuplicateCategoryName(String),
    InvalidColor(String),
    TaskNotFound(TaskId),
    CategoryNotFound(CategoryId),
    /// A stored id is already `i64::MAX`, so no larger id exists.
    IdSpaceExhausted,
    /// Snapshot load/save failure.
    Repo(RepoError),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTaskText => write!(f, "task text cannot be empty"),
            Self::EmptyCategoryName => write!(f, "category name cannot be empty"),
            Self::DuplicateCategoryName(name) => {
                write!(f, "category name already exists: `{name}`")
            }
            Self::InvalidColor(color) => write!(f, "invalid category color `{color}`"),
            Self::TaskNotFound(id) => write!(f, "task not found: {id}"),
            Self::CategoryNotFound(id) => write!(f, "category not found: {id}"),
            Self::IdSpaceExhausted => write!(f, "no unused id is left above the stored maximum"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for StoreError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<ModelValidationError> for StoreError {
    fn from(value: ModelValidationError) -> Self {
        match value {
            ModelValidationError::EmptyTaskText => Self::EmptyTaskText,
            ModelValidationError::EmptyCategoryName => Self::EmptyCategoryName,
            ModelValidationError::InvalidColor(color) => Self::InvalidColor(color),
        }
    }
}

/// Input for `TaskStore::create_task`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTaskRequest {
    /// Trimmed before storing; must not be blank.
    pub text: String,
    /// Defaults to the store's selected date.
    pub date: Option<NaiveDate>,
    /// Ignored when it does not resolve to an existing category.
    pub category_id: Option<CategoryId>,
}

impl CreateTaskRequest {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            date: None,
            category_id: None,
        }
    }

    pub fn on(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    pub fn in_category(mut self, category_id: CategoryId) -> Self {
        self.category_id = Some(category_id);
        self
    }
}

/// In-memory task list with write-through persistence.
pub struct TaskStore<R: SnapshotRepository, C: Clock = SystemClock> {
    repo: R,
    clock: C,
    tasks: Vec<Task>,
    categories: Vec<Category>,
    selected_date: NaiveDate,
    status_filter: StatusFilter,
    displayed_month: YearMonth,
}

impl<R: SnapshotRepository> TaskStore<R, SystemClock> {
    /// Opens the store using the system clock.
    pub fn open(repo: R) -> StoreResult<Self> {
        Self::open_with_clock(repo, SystemClock)
    }
}

impl<R: SnapshotRepository, C: Clock> TaskStore<R, C> {
    /// Loads both slots, seeds missing categories, migrates legacy tasks and
    /// persists the result.
    ///
    /// # Side effects
    /// - Always writes one snapshot, even when nothing was migrated.
    /// - Emits a `store_open` event with record counts.
    pub fn open_with_clock(mut repo: R, clock: C) -> StoreResult<Self> {
        let started_at = Instant::now();
        let LoadedSlots { tasks, categories } = repo.load_slots()?;
        let seeded = categories.is_none();
        let categories = categories.unwrap_or_else(default_categories);
        let mut tasks = tasks.unwrap_or_default();

        let migrated = migrate_uncategorized(&mut tasks, &categories);
        repo.save_snapshot(&StoreSnapshot {
            tasks: &tasks,
            categories: &categories,
        })?;

        info!(
            "event=store_open module=store status=ok tasks={} categories={} seeded={} migrated={} duration_ms={}",
            tasks.len(),
            categories.len(),
            seeded,
            migrated,
            started_at.elapsed().as_millis()
        );

        let today = clock.today();
        Ok(Self {
            repo,
            clock,
            tasks,
            categories,
            selected_date: today,
            status_filter: StatusFilter::All,
            displayed_month: YearMonth::containing(today),
        })
    }

    // ---- categories -------------------------------------------------------

    /// Creates a category with a trimmed, case-insensitively unique name.
    pub fn create_category(&mut self, name: &str, color: &str) -> StoreResult<Category> {
        let name = name.trim();
        if name.is_empty() {
            return Err(reject("category_create", StoreError::EmptyCategoryName));
        }
        if self.categories.iter().any(|c| c.name_matches(name)) {
            return Err(reject(
                "category_create",
                StoreError::DuplicateCategoryName(name.to_string()),
            ));
        }
        validate_color(color).map_err(|err| reject("category_create", err.into()))?;

        let id = allocate_id(self.now_ms(), self.categories.iter().map(|c| c.id))
            .ok_or_else(|| reject("category_create", StoreError::IdSpaceExhausted))?;
        let category = Category::new(id, name, color);
        let mut categories = self.categories.clone();
        categories.push(category.clone());
        self.commit(None, Some(categories))?;

        info!("event=category_create module=store status=ok category_id={id}");
        Ok(category)
    }

    /// Renames a category and refreshes the name snapshot on its tasks.
    ///
    /// Color is left unchanged. Re-casing a category's own name is allowed.
    pub fn rename_category(&mut self, id: CategoryId, new_name: &str) -> StoreResult<Category> {
        let index = self
            .category_index(id)
            .ok_or_else(|| reject("category_rename", StoreError::CategoryNotFound(id)))?;
        let new_name = new_name.trim();
        if new_name.is_empty() {
            return Err(reject("category_rename", StoreError::EmptyCategoryName));
        }
        if self
            .categories
            .iter()
            .any(|c| c.id != id && c.name_matches(new_name))
        {
            return Err(reject(
                "category_rename",
                StoreError::DuplicateCategoryName(new_name.to_string()),
            ));
        }

        let mut categories = self.categories.clone();
        categories[index].name = new_name.to_string();
        let mut tasks = self.tasks.clone();
        let mut cascaded = 0usize;
        for task in tasks.iter_mut().filter(|task| task.belongs_to(id)) {
            task.category_name = Some(new_name.to_string());
            cascaded += 1;
        }
        let renamed = categories[index].clone();
        self.commit(Some(tasks), Some(categories))?;

        info!(
            "event=category_rename module=store status=ok category_id={id} cascaded_tasks={cascaded}"
        );
        Ok(renamed)
    }

    /// Deletes a category and strips it from every task that references it.
    ///
    /// Returns the number of orphaned tasks.
    pub fn delete_category(&mut self, id: CategoryId) -> StoreResult<usize> {
        if self.category_index(id).is_none() {
            return Err(reject("category_delete", StoreError::CategoryNotFound(id)));
        }

        let mut tasks = self.tasks.clone();
        let mut orphaned = 0usize;
        for task in tasks.iter_mut().filter(|task| task.belongs_to(id)) {
            task.clear_category();
            orphaned += 1;
        }
        let categories = self
            .categories
            .iter()
            .filter(|c| c.id != id)
            .cloned()
            .collect();
        self.commit(Some(tasks), Some(categories))?;

        info!(
            "event=category_delete module=store status=ok category_id={id} orphaned_tasks={orphaned}"
        );
        Ok(orphaned)
    }

    // ---- tasks ------------------------------------------------------------

    /// Creates a task on the requested (or selected) date.
    pub fn create_task(&mut self, request: CreateTaskRequest) -> StoreResult<Task> {
        let text = request.text.trim();
        if text.is_empty() {
            return Err(reject("task_create", StoreError::EmptyTaskText));
        }

        let now = self.clock.now();
        let id = allocate_id(now.timestamp_millis(), self.tasks.iter().map(|t| t.id))
            .ok_or_else(|| reject("task_create", StoreError::IdSpaceExhausted))?;
        let date = request.date.unwrap_or(self.selected_date);
        let mut task = Task::new(id, text, date, now);
        if let Some(category) = request.category_id.and_then(|cid| self.category(cid)) {
            task.assign_category(category);
        }

        let mut tasks = self.tasks.clone();
        tasks.push(task.clone());
        self.commit(Some(tasks), None)?;

        info!(
            "event=task_create module=store status=ok task_id={id} date={date} categorized={}",
            task.category_id.is_some()
        );
        Ok(task)
    }

    /// Removes a task and returns it.
    pub fn delete_task(&mut self, id: TaskId) -> StoreResult<Task> {
        let index = self
            .task_index(id)
            .ok_or_else(|| reject("task_delete", StoreError::TaskNotFound(id)))?;
        let mut tasks = self.tasks.clone();
        let removed = tasks.remove(index);
        self.commit(Some(tasks), None)?;

        info!("event=task_delete module=store status=ok task_id={id}");
        Ok(removed)
    }

    /// Flips `completed` and returns the new value.
    pub fn toggle_task(&mut self, id: TaskId) -> StoreResult<bool> {
        let index = self
            .task_index(id)
            .ok_or_else(|| reject("task_toggle", StoreError::TaskNotFound(id)))?;
        let mut tasks = self.tasks.clone();
        tasks[index].completed = !tasks[index].completed;
        let completed = tasks[index].completed;
        self.commit(Some(tasks), None)?;

        info!("event=task_toggle module=store status=ok task_id={id} completed={completed}");
        Ok(completed)
    }

    /// Replaces a task's text with the trimmed `new_text`.
    pub fn edit_task_text(&mut self, id: TaskId, new_text: &str) -> StoreResult<Task> {
        let index = self
            .task_index(id)
            .ok_or_else(|| reject("task_edit", StoreError::TaskNotFound(id)))?;
        let new_text = new_text.trim();
        if new_text.is_empty() {
            return Err(reject("task_edit", StoreError::EmptyTaskText));
        }

        let mut tasks = self.tasks.clone();
        tasks[index].text = new_text.to_string();
        let edited = tasks[index].clone();
        self.commit(Some(tasks), None)?;

        info!("event=task_edit module=store status=ok task_id={id}");
        Ok(edited)
    }

    /// Removes every completed task on any date. Returns the removed count.
    pub fn clear_completed(&mut self) -> StoreResult<usize> {
        let tasks: Vec<Task> = self
            .tasks
            .iter()
            .filter(|task| !task.completed)
            .cloned()
            .collect();
        let removed = self.tasks.len() - tasks.len();
        self.commit(Some(tasks), None)?;

        info!("event=task_clear_completed module=store status=ok removed={removed}");
        Ok(removed)
    }

    // ---- reads ------------------------------------------------------------

    /// All tasks in insertion order.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn task(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    pub fn category(&self, id: CategoryId) -> Option<&Category> {
        self.categories.iter().find(|category| category.id == id)
    }

    pub fn tasks_on(&self, date: NaiveDate) -> Vec<&Task> {
        filter_by_date(&self.tasks, date)
    }

    /// Tasks on the selected date, narrowed by the current status filter.
    pub fn visible_tasks(&self) -> Vec<&Task> {
        filter_by_status(self.tasks_on(self.selected_date), self.status_filter)
    }

    pub fn has_tasks_on(&self, date: NaiveDate) -> bool {
        has_tasks_on(&self.tasks, date)
    }

    pub fn counts(&self, date: NaiveDate) -> TaskCounts {
        counts_on(&self.tasks, date)
    }

    pub fn selected_counts(&self) -> TaskCounts {
        self.counts(self.selected_date)
    }

    // ---- view state -------------------------------------------------------

    pub fn selected_date(&self) -> NaiveDate {
        self.selected_date
    }

    /// Focuses `date`. The displayed month is not moved.
    pub fn select_date(&mut self, date: NaiveDate) {
        self.selected_date = date;
    }

    pub fn status_filter(&self) -> StatusFilter {
        self.status_filter
    }

    pub fn set_status_filter(&mut self, filter: StatusFilter) {
        self.status_filter = filter;
    }

    pub fn displayed_month(&self) -> YearMonth {
        self.displayed_month
    }

    pub fn set_displayed_month(&mut self, month: YearMonth) {
        self.displayed_month = month;
    }

    /// Moves the displayed month by `delta` and returns it.
    pub fn change_month(&mut self, delta: i32) -> YearMonth {
        self.displayed_month = self.displayed_month.shift(delta);
        self.displayed_month
    }

    /// Grid for the displayed month, classified against today, the selected
    /// date and the current tasks.
    pub fn month_grid(&self) -> MonthGrid {
        build_month_grid(
            self.displayed_month,
            self.clock.today(),
            self.selected_date,
            |date| self.has_tasks_on(date),
        )
    }

    // ---- internals --------------------------------------------------------

    fn commit(
        &mut self,
        tasks: Option<Vec<Task>>,
        categories: Option<Vec<Category>>,
    ) -> StoreResult<()> {
        let snapshot = StoreSnapshot {
            tasks: tasks.as_deref().unwrap_or(&self.tasks),
            categories: categories.as_deref().unwrap_or(&self.categories),
        };
        self.repo.save_snapshot(&snapshot)?;

        if let Some(tasks) = tasks {
            self.tasks = tasks;
        }
        if let Some(categories) = categories {
            self.categories = categories;
        }
        Ok(())
    }

    fn now_ms(&self) -> i64 {
        self.clock.now().timestamp_millis()
    }

    fn task_index(&self, id: TaskId) -> Option<usize> {
        self.tasks.iter().position(|task| task.id == id)
    }

    fn category_index(&self, id: CategoryId) -> Option<usize> {
        self.categories.iter().position(|category| category.id == id)
    }
}

/// Assigns the first category to every task that has no category fields.
///
/// Tasks carrying any of the three fields are left alone. Returns the number
/// of tasks updated.
pub fn migrate_uncategorized(tasks: &mut [Task], categories: &[Category]) -> usize {
    let Some(first) = categories.first() else {
        return 0;
    };
    let mut migrated = 0;
    for task in tasks.iter_mut().filter(|task| task.lacks_category_fields()) {
        task.assign_category(first);
        migrated += 1;
    }
    migrated
}

fn reject(event: &'static str, err: StoreError) -> StoreError {
    warn!("event={event} module=store status=rejected reason={}", reason_code(&err));
    err
}

fn reason_code(err: &StoreError) -> &'static str {
    match err {
        StoreError::EmptyTaskText => "empty_text",
        StoreError::EmptyCategoryName => "empty_name",
        StoreError::DuplicateCategoryName(_) => "duplicate_name",
        StoreError::InvalidColor(_) => "invalid_color",
        StoreError::TaskNotFound(_) => "task_not_found",
        StoreError::CategoryNotFound(_) => "category_not_found",
        StoreError::IdSpaceExhausted => "id_space_exhausted",
        StoreError::Repo(_) => "repo_error",
    }
}

#[cfg(test)]
mod tests {
    use super::migrate_uncategorized;
    use crate::model::category::Category;
    use crate::model::task::Task;
    use chrono::{NaiveDate, TimeZone, Utc};

    fn legacy_task(id: i64) -> Task {
        Task::new(
            id,
            "legacy",
            NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            Utc.timestamp_millis_opt(id).unwrap(),
        )
    }

    #[test]
    fn migration_uses_first_category_and_respects_guard() {
        let categories = vec![
            Category::new(1, "Meeting", "#007bff"),
            Category::new(2, "Dev", "#28a745"),
        ];
        let mut name_only = legacy_task(2);
        name_only.category_name = Some("stale".to_string());
        let mut tasks = vec![legacy_task(1), name_only];

        assert_eq!(migrate_uncategorized(&mut tasks, &categories), 1);
        assert_eq!(tasks[0].category_id, Some(1));
        assert_eq!(tasks[0].category_color.as_deref(), Some("#007bff"));
        assert_eq!(tasks[1].category_id, None);
        assert_eq!(tasks[1].category_name.as_deref(), Some("stale"));
    }

    #[test]
    fn migration_without_categories_is_a_no_op() {
        let mut tasks = vec![legacy_task(1)];
        assert_eq!(migrate_uncategorized(&mut tasks, &[]), 0);
        assert!(tasks[0].lacks_category_fields());
    }
}
