//! Core use-case services.
//!
//! # Responsibility
//! - Own the task store and the queries the presentation layer pulls.
//! - Keep UI layers decoupled from storage details.

pub mod query;
pub mod task_store;
