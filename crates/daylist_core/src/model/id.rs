//! Timestamp-derived integer ids.

/// Task identifier: creation time in epoch milliseconds.
pub type TaskId = i64;

/// Category identifier: creation time in epoch milliseconds (seeds use 1..=3).
pub type CategoryId = i64;

/// Picks the id for a new record.
///
/// Uses `now_ms` when it is greater than every existing id, otherwise the
/// next integer after the current maximum. Two records created within the
/// same millisecond therefore still get distinct, increasing ids.
///
/// Returns `None` when the current maximum is `i64::MAX`.
pub fn allocate_id(now_ms: i64, existing: impl IntoIterator<Item = i64>) -> Option<i64> {
    match existing.into_iter().max() {
        Some(max) if max >= now_ms => max.checked_add(1),
        _ => Some(now_ms),
    }
}
