//! Task model.
//!
//! # Responsibility
//! - Define the dated to-do record and its denormalized category snapshot.
//! - Provide category assignment/removal helpers used by store operations.
//!
//! # Invariants
//! - `text` is non-empty after trimming.
//! - Category fields are either all absent or `category_id` is present.
//!   Legacy records may break this and must still load.
//! - `created_at` is informational and never drives logic.

use super::category::Category;
use super::id::{CategoryId, TaskId};
use super::ModelValidationError;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// One to-do entry bound to a calendar date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub text: String,
    #[serde(default)]
    pub completed: bool,
    /// Serialized as `YYYY-MM-DD`.
    pub date: NaiveDate,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<CategoryId>,
    /// Category name at assignment time (refreshed on rename).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_name: Option<String>,
    /// Category color at assignment time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_color: Option<String>,
}

impl Task {
    /// Creates an uncategorized, not-completed task.
    pub fn new(
        id: TaskId,
        text: impl Into<String>,
        date: NaiveDate,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            text: text.into(),
            completed: false,
            date,
            created_at,
            category_id: None,
            category_name: None,
            category_color: None,
        }
    }

    pub fn validate(&self) -> Result<(), ModelValidationError> {
        if self.text.trim().is_empty() {
            return Err(ModelValidationError::EmptyTaskText);
        }
        Ok(())
    }

    /// Copies id/name/color of `category` onto this task.
    pub fn assign_category(&mut self, category: &Category) {
        self.category_id = Some(category.id);
        self.category_name = Some(category.name.clone());
        self.category_color = Some(category.color.clone());
    }

    /// Strips every category field.
    pub fn clear_category(&mut self) {
        self.category_id = None;
        self.category_name = None;
        self.category_color = None;
    }

    /// True only when all three category fields are absent.
    ///
    /// This is the legacy-migration guard: a record with just a stale
    /// `category_name` is not considered uncategorized.
    pub fn lacks_category_fields(&self) -> bool {
        self.category_id.is_none() && self.category_name.is_none() && self.category_color.is_none()
    }

    pub fn belongs_to(&self, category_id: CategoryId) -> bool {
        self.category_id == Some(category_id)
    }
}

/// Completion filter applied after the date filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusFilter {
    #[default]
    All,
    /// Not completed.
    Active,
    Completed,
}

impl StatusFilter {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Active => "active",
            Self::Completed => "completed",
        }
    }

    /// Parses `all|active|completed`, case-insensitively.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "all" => Some(Self::All),
            "active" => Some(Self::Active),
            "completed" => Some(Self::Completed),
            _ => None,
        }
    }

    pub fn matches(self, task: &Task) -> bool {
        match self {
            Self::All => true,
            Self::Active => !task.completed,
            Self::Completed => task.completed,
        }
    }
}
