//! Category model.
//!
//! # Responsibility
//! - Define the named, colored tag that tasks may reference.
//! - Provide name comparison and color validation rules.
//!
//! # Invariants
//! - `name` is stored trimmed and is unique ignoring case across the store.
//! - `color` never changes after creation.

use super::id::CategoryId;
use super::ModelValidationError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static HEX_COLOR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^#[0-9a-fA-F]{6}$").expect("valid hex color regex"));

/// User-defined category assignable to tasks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    /// Hex color such as `#007bff`.
    pub color: String,
}

impl Category {
    pub fn new(id: CategoryId, name: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            color: color.into(),
        }
    }

    /// Validates a record loaded from or about to be written to storage.
    pub fn validate(&self) -> Result<(), ModelValidationError> {
        if self.name.trim().is_empty() {
            return Err(ModelValidationError::EmptyCategoryName);
        }
        validate_color(&self.color)
    }

    /// Case-insensitive name match used for uniqueness checks.
    pub fn name_matches(&self, other: &str) -> bool {
        self.name.to_lowercase() == other.trim().to_lowercase()
    }
}

/// Returns the category set used when no `categories` slot exists yet.
pub fn default_categories() -> Vec<Category> {
    vec![
        Category::new(1, "회의", "#007bff"),
        Category::new(2, "개발", "#28a745"),
        Category::new(3, "프로젝트", "#dc3545"),
    ]
}

/// Checks that `color` is a `#RRGGBB` hex string.
pub fn validate_color(color: &str) -> Result<(), ModelValidationError> {
    if HEX_COLOR_RE.is_match(color) {
        Ok(())
    } else {
        Err(ModelValidationError::InvalidColor(color.to_string()))
    }
}
