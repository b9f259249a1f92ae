//! Domain model for dated tasks and their categories.
//!
//! # Responsibility
//! - Define the records persisted in the `tasks` and `categories` slots.
//! - Own record-level validation shared by store and repository code.
//!
//! # Invariants
//! - Ids are integers derived from creation time and never reused.
//! - Wire field names are camelCase to stay compatible with existing slots.

pub mod category;
pub mod id;
pub mod task;

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Record-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelValidationError {
    /// Task text is empty after trimming.
    EmptyTaskText,
    /// Category name is empty after trimming.
    EmptyCategoryName,
    /// Category color is not a `#RRGGBB` hex string.
    InvalidColor(String),
}

impl Display for ModelValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTaskText => write!(f, "task text cannot be empty"),
            Self::EmptyCategoryName => write!(f, "category name cannot be empty"),
            Self::InvalidColor(value) => {
                write!(f, "invalid category color `{value}`; expected #RRGGBB")
            }
        }
    }
}

impl Error for ModelValidationError {}
