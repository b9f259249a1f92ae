//! Slot snapshot repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist the `tasks` and `categories` slots as JSON arrays.
//! - Write both slots in a single transaction.
//!
//! # Invariants
//! - Slot payloads are arrays of camelCase records; optional fields may be
//!   missing.
//! - Records are validated on both write and read paths.
//! - A missing slot is reported as `None`, distinct from an empty array.

use crate::db::DbError;
use crate::model::category::Category;
use crate::model::task::Task;
use crate::model::ModelValidationError;
use log::{error, info};
use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};
use serde::de::DeserializeOwned;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

pub type RepoResult<T> = Result<T, RepoError>;

/// Error for slot persistence and decoding.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    Serialization(serde_json::Error),
    Validation(ModelValidationError),
    InvalidData(String),
    MissingRequiredTable(&'static str),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Serialization(err) => write!(f, "slot serialization failed: {err}"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted slot data: {message}"),
            Self::MissingRequiredTable(table) => write!(f, "missing required table `{table}`"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Serialization(err) => Some(err),
            Self::Validation(err) => Some(err),
            Self::InvalidData(_) | Self::MissingRequiredTable(_) => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<serde_json::Error> for RepoError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization(value)
    }
}

impl From<ModelValidationError> for RepoError {
    fn from(value: ModelValidationError) -> Self {
        Self::Validation(value)
    }
}

/// Named persistence slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    Tasks,
    Categories,
}

impl Slot {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Tasks => "tasks",
            Self::Categories => "categories",
        }
    }
}

/// Slots as found in storage. `None` means the slot was never written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadedSlots {
    pub tasks: Option<Vec<Task>>,
    pub categories: Option<Vec<Category>>,
}

/// Full store state written as one unit.
#[derive(Debug, Clone, Copy)]
pub struct StoreSnapshot<'a> {
    pub tasks: &'a [Task],
    pub categories: &'a [Category],
}

/// Persistence contract for the task store.
pub trait SnapshotRepository {
    /// Reads both slots.
    fn load_slots(&self) -> RepoResult<LoadedSlots>;
    /// Replaces both slots atomically.
    fn save_snapshot(&mut self, snapshot: &StoreSnapshot<'_>) -> RepoResult<()>;
}

/// SQLite-backed slot repository over the `snapshot_slots` table.
pub struct SqliteSnapshotRepository<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SqliteSnapshotRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    ///
    /// # Errors
    /// - `MissingRequiredTable` when the connection was not opened through
    ///   `open_db`/`open_db_in_memory`.
    pub fn try_new(conn: &'conn mut Connection) -> RepoResult<Self> {
        let exists: i64 = conn.query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = 'snapshot_slots'
            );",
            [],
            |row| row.get(0),
        )?;
        if exists != 1 {
            return Err(RepoError::MissingRequiredTable("snapshot_slots"));
        }
        Ok(Self { conn })
    }

    /// Writes one slot from raw JSON, e.g. data exported by an older client.
    ///
    /// The payload is decoded and validated first; nothing is written when
    /// any record is invalid.
    pub fn import_slot_json(&mut self, slot: Slot, json: &str) -> RepoResult<usize> {
        let count = match slot {
            Slot::Tasks => decode_slot(slot, json, Task::validate)?.len(),
            Slot::Categories => decode_slot(slot, json, Category::validate)?.len(),
        };
        upsert_slot(self.conn, slot, json)?;
        info!(
            "event=slot_import module=repo status=ok slot={} records={count}",
            slot.as_str()
        );
        Ok(count)
    }

    fn read_slot(&self, slot: Slot) -> RepoResult<Option<String>> {
        let payload = self
            .conn
            .query_row(
                "SELECT payload FROM snapshot_slots WHERE name = ?1;",
                [slot.as_str()],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(payload)
    }
}

impl SnapshotRepository for SqliteSnapshotRepository<'_> {
    fn load_slots(&self) -> RepoResult<LoadedSlots> {
        let tasks = match self.read_slot(Slot::Tasks)? {
            Some(json) => Some(decode_slot(Slot::Tasks, &json, Task::validate)?),
            None => None,
        };
        let categories = match self.read_slot(Slot::Categories)? {
            Some(json) => Some(decode_slot(Slot::Categories, &json, Category::validate)?),
            None => None,
        };
        Ok(LoadedSlots { tasks, categories })
    }

    fn save_snapshot(&mut self, snapshot: &StoreSnapshot<'_>) -> RepoResult<()> {
        let started_at = Instant::now();
        for task in snapshot.tasks {
            task.validate()?;
        }
        for category in snapshot.categories {
            category.validate()?;
        }
        let tasks_json = serde_json::to_string(snapshot.tasks)?;
        let categories_json = serde_json::to_string(snapshot.categories)?;

        let result = write_both_slots(self.conn, &tasks_json, &categories_json);

        match &result {
            Ok(()) => info!(
                "event=snapshot_save module=repo status=ok tasks={} categories={} duration_ms={}",
                snapshot.tasks.len(),
                snapshot.categories.len(),
                started_at.elapsed().as_millis()
            ),
            Err(err) => error!(
                "event=snapshot_save module=repo status=error duration_ms={} error={err}",
                started_at.elapsed().as_millis()
            ),
        }
        result
    }
}

fn write_both_slots(
    conn: &mut Connection,
    tasks_json: &str,
    categories_json: &str,
) -> RepoResult<()> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    upsert_slot(&tx, Slot::Tasks, tasks_json)?;
    upsert_slot(&tx, Slot::Categories, categories_json)?;
    tx.commit()?;
    Ok(())
}

fn upsert_slot(conn: &Connection, slot: Slot, payload: &str) -> RepoResult<()> {
    conn.execute(
        "INSERT INTO snapshot_slots (name, payload, updated_at)
         VALUES (?1, ?2, (strftime('%s', 'now') * 1000))
         ON CONFLICT(name) DO UPDATE SET
            payload = excluded.payload,
            updated_at = excluded.updated_at;",
        params![slot.as_str(), payload],
    )?;
    Ok(())
}

fn decode_slot<T: DeserializeOwned>(
    slot: Slot,
    json: &str,
    validate: impl Fn(&T) -> Result<(), ModelValidationError>,
) -> RepoResult<Vec<T>> {
    let records: Vec<T> = serde_json::from_str(json).map_err(|err| {
        RepoError::InvalidData(format!("slot `{}` is not a record array: {err}", slot.as_str()))
    })?;
    for (index, record) in records.iter().enumerate() {
        validate(record).map_err(|err| {
            RepoError::InvalidData(format!("slot `{}` record {index}: {err}", slot.as_str()))
        })?;
    }
    Ok(records)
}
