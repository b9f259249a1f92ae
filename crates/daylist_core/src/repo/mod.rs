//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the slot-snapshot persistence contract used by the store.
//! - Keep SQLite and JSON encoding details out of store logic.
//!
//! # Invariants
//! - Both slots are written together or not at all.
//! - Read paths reject invalid persisted records instead of masking them.

pub mod snapshot_repo;
