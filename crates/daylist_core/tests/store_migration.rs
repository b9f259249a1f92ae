use chrono::{TimeZone, Utc};
use daylist_core::db::open_db_in_memory;
use daylist_core::{
    CreateTaskRequest, FixedClock, RepoError, Slot, SnapshotRepository, SqliteSnapshotRepository, StoreError,
    TaskStore,
};

fn clock() -> FixedClock {
    FixedClock::at(Utc.with_ymd_and_hms(2024, 3, 15, 9, 0, 0).unwrap())
}

const LEGACY_TASKS: &str = r##"[
    {"id": 1700000000000, "text": "no category", "completed": false,
     "date": "2024-03-15", "createdAt": "2023-11-14T22:13:20.000Z"},
    {"id": 1700000000001, "text": "name only", "completed": true,
     "date": "2024-03-15", "createdAt": "2023-11-14T22:13:20.001Z",
     "categoryName": "stale"},
    {"id": 1700000000002, "text": "categorized", "completed": false,
     "date": "2024-03-16", "createdAt": "2023-11-14T22:13:20.002Z",
     "categoryId": 3, "categoryName": "프로젝트", "categoryColor": "#dc3545"}
]"##;

#[test]
fn uncategorized_legacy_task_gets_first_category() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteSnapshotRepository::try_new(&mut conn).unwrap();
    assert_eq!(repo.import_slot_json(Slot::Tasks, LEGACY_TASKS).unwrap(), 3);

    let store = TaskStore::open_with_clock(repo, clock()).unwrap();
    let first = &store.categories()[0];
    let migrated = store.task(1_700_000_000_000).unwrap();
    assert_eq!(migrated.category_id, Some(first.id));
    assert_eq!(migrated.category_name.as_deref(), Some(first.name.as_str()));
    assert_eq!(migrated.category_color.as_deref(), Some(first.color.as_str()));
}

#[test]
fn migration_skips_task_carrying_only_a_category_name() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteSnapshotRepository::try_new(&mut conn).unwrap();
    repo.import_slot_json(Slot::Tasks, LEGACY_TASKS).unwrap();

    let store = TaskStore::open_with_clock(repo, clock()).unwrap();
    let name_only = store.task(1_700_000_000_001).unwrap();
    assert_eq!(name_only.category_id, None);
    assert_eq!(name_only.category_name.as_deref(), Some("stale"));
    assert_eq!(name_only.category_color, None);

    let categorized = store.task(1_700_000_000_002).unwrap();
    assert_eq!(categorized.category_id, Some(3));
}

#[test]
fn migration_is_persisted_and_idempotent_across_reopen() {
    let mut conn = open_db_in_memory().unwrap();
    {
        let mut repo = SqliteSnapshotRepository::try_new(&mut conn).unwrap();
        repo.import_slot_json(Slot::Tasks, LEGACY_TASKS).unwrap();
        TaskStore::open_with_clock(repo, clock()).unwrap();
    }

    let repo = SqliteSnapshotRepository::try_new(&mut conn).unwrap();
    let persisted = repo.load_slots().unwrap().tasks.unwrap();
    assert_eq!(persisted[0].category_id, Some(1));

    let store = TaskStore::open_with_clock(repo, clock()).unwrap();
    let after_second_open: Vec<_> = store.tasks().to_vec();
    assert_eq!(after_second_open, persisted);
}

#[test]
fn migration_does_nothing_when_category_slot_is_empty() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteSnapshotRepository::try_new(&mut conn).unwrap();
    repo.import_slot_json(Slot::Tasks, LEGACY_TASKS).unwrap();
    repo.import_slot_json(Slot::Categories, "[]").unwrap();

    let store = TaskStore::open_with_clock(repo, clock()).unwrap();
    assert!(store.categories().is_empty());
    assert!(store.task(1_700_000_000_000).unwrap().lacks_category_fields());
}

#[test]
fn legacy_records_missing_optional_fields_load() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteSnapshotRepository::try_new(&mut conn).unwrap();
    repo.import_slot_json(
        Slot::Tasks,
        r#"[{"id": 5, "text": "bare", "date": "2024-01-01", "createdAt": "2024-01-01T00:00:00Z"}]"#,
    )
    .unwrap();

    let store = TaskStore::open_with_clock(repo, clock()).unwrap();
    let task = store.task(5).unwrap();
    assert!(!task.completed);
    assert_eq!(task.category_id, Some(1));
}

#[test]
fn invalid_persisted_records_are_rejected() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteSnapshotRepository::try_new(&mut conn).unwrap();

    let err = repo
        .import_slot_json(
            Slot::Tasks,
            r#"[{"id": 1, "text": "  ", "date": "2024-01-01", "createdAt": "2024-01-01T00:00:00Z"}]"#,
        )
        .unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(_)));

    let err = repo
        .import_slot_json(Slot::Categories, r#"{"not": "an array"}"#)
        .unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(_)));

    // Nothing was written, so the store still starts from seeds.
    let store = TaskStore::open_with_clock(repo, clock()).unwrap();
    assert!(store.tasks().is_empty());
    assert_eq!(store.categories().len(), 3);
}

#[test]
fn corrupted_slot_fails_store_open() {
    let mut conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO snapshot_slots (name, payload) VALUES ('tasks', 'not json');",
        [],
    )
    .unwrap();

    let repo = SqliteSnapshotRepository::try_new(&mut conn).unwrap();
    let err = TaskStore::open_with_clock(repo, clock()).err().unwrap();
    assert!(matches!(err, StoreError::Repo(RepoError::InvalidData(_))));
}

#[test]
fn stored_maximum_ids_reject_new_records_instead_of_overflowing() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteSnapshotRepository::try_new(&mut conn).unwrap();
    repo.import_slot_json(
        Slot::Tasks,
        r##"[{"id": 9223372036854775807, "text": "last", "completed": false,
              "date": "2024-03-15", "createdAt": "2024-03-15T09:00:00Z"}]"##,
    )
    .unwrap();
    repo.import_slot_json(
        Slot::Categories,
        r##"[{"id": 9223372036854775807, "name": "Last", "color": "#000000"}]"##,
    )
    .unwrap();

    let mut store = TaskStore::open_with_clock(repo, clock()).unwrap();
    assert!(matches!(
        store.create_task(CreateTaskRequest::new("y")).unwrap_err(),
        StoreError::IdSpaceExhausted
    ));
    assert!(matches!(
        store.create_category("Next", "#111111").unwrap_err(),
        StoreError::IdSpaceExhausted
    ));
    assert_eq!(store.tasks().len(), 1);
    assert_eq!(store.categories().len(), 1);
}
