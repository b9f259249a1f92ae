//! Read-only task queries shared by the store and its callers.
//!
//! All functions preserve insertion order.

use crate::model::task::{StatusFilter, Task};
use chrono::NaiveDate;

/// Per-date task counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskCounts {
    pub total: usize,
    pub completed: usize,
    /// Always `total - completed`.
    pub active: usize,
}

/// Tasks whose date equals `date`.
pub fn filter_by_date(tasks: &[Task], date: NaiveDate) -> Vec<&Task> {
    tasks.iter().filter(|task| task.date == date).collect()
}

/// Applies the completion filter; `All` returns the input unchanged.
pub fn filter_by_status<'a>(
    tasks: impl IntoIterator<Item = &'a Task>,
    status: StatusFilter,
) -> Vec<&'a Task> {
    tasks
        .into_iter()
        .filter(|task| status.matches(task))
        .collect()
}

pub fn has_tasks_on(tasks: &[Task], date: NaiveDate) -> bool {
    tasks.iter().any(|task| task.date == date)
}

pub fn counts_on(tasks: &[Task], date: NaiveDate) -> TaskCounts {
    let (total, completed) = tasks
        .iter()
        .filter(|task| task.date == date)
        .fold((0, 0), |(total, completed), task| {
            (total + 1, completed + usize::from(task.completed))
        });
    TaskCounts {
        total,
        completed,
        active: total - completed,
    }
}

#[cfg(test)]
mod tests {
    use super::{counts_on, filter_by_date, filter_by_status, has_tasks_on, TaskCounts};
    use crate::model::task::{StatusFilter, Task};
    use chrono::{NaiveDate, TimeZone, Utc};

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    fn task(id: i64, date: NaiveDate, completed: bool) -> Task {
        let mut task = Task::new(
            id,
            format!("task {id}"),
            date,
            Utc.timestamp_millis_opt(id).unwrap(),
        );
        task.completed = completed;
        task
    }

    fn fixture() -> Vec<Task> {
        vec![
            task(1, day(15), false),
            task(2, day(16), true),
            task(3, day(15), true),
            task(4, day(15), true),
        ]
    }

    #[test]
    fn date_filter_keeps_insertion_order() {
        let tasks = fixture();
        let ids: Vec<i64> = filter_by_date(&tasks, day(15)).iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![1, 3, 4]);
        assert!(filter_by_date(&tasks, day(1)).is_empty());
    }

    #[test]
    fn status_filter_applies_after_date_filter() {
        let tasks = fixture();
        let on_day = filter_by_date(&tasks, day(15));
        let active = filter_by_status(on_day.iter().copied(), StatusFilter::Active);
        let completed = filter_by_status(on_day.iter().copied(), StatusFilter::Completed);
        let all = filter_by_status(on_day.iter().copied(), StatusFilter::All);
        assert_eq!(active.iter().map(|t| t.id).collect::<Vec<_>>(), vec![1]);
        assert_eq!(completed.iter().map(|t| t.id).collect::<Vec<_>>(), vec![3, 4]);
        assert_eq!(all.len(), 3);
    }

    #[test]
    fn counts_split_completed_and_active() {
        let tasks = fixture();
        assert_eq!(
            counts_on(&tasks, day(15)),
            TaskCounts {
                total: 3,
                completed: 2,
                active: 1
            }
        );
        assert_eq!(counts_on(&tasks, day(20)), TaskCounts::default());
        assert!(has_tasks_on(&tasks, day(16)));
        assert!(!has_tasks_on(&tasks, day(17)));
    }
}
