use pser_core::store::migrations::latest_version;
use pser_core::{
    PrimaryStore, RecordId, SqlitePrimaryStore, StoreError, StoreFault, SurveyRecord,
};
use rusqlite::{params, Connection};

fn record(id: &str, house_number: i64) -> SurveyRecord {
    let mut record = SurveyRecord::new(RecordId::from(id), house_number);
    record.hoh_cnic = format!("35202-00000{house_number:02}-1");
    record
}

#[test]
fn open_in_memory_applies_all_migrations() {
    let store = SqlitePrimaryStore::in_memory();
    let conn = store.open().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    assert!(object_exists(&conn, "table", "surveys"));
    assert!(object_exists(&conn, "index", "idx_surveys_house_number"));
    assert!(object_exists(&conn, "index", "idx_surveys_hoh_cnic"));
    assert!(object_exists(&conn, "index", "idx_surveys_timestamp"));
}

#[test]
fn write_all_then_read_all_preserves_list_order() {
    let store = SqlitePrimaryStore::in_memory();
    let mut conn = store.open().unwrap();
    let records = vec![record("c", 3), record("a", 1), record("b", 2)];

    store.write_all(&mut conn, &records).unwrap();
    assert_eq!(store.read_all(&mut conn).unwrap(), records);

    let reordered = vec![record("b", 2), record("c", 3)];
    store.write_all(&mut conn, &reordered).unwrap();
    assert_eq!(store.read_all(&mut conn).unwrap(), reordered);
}

#[test]
fn failed_rewrite_keeps_previous_contents() {
    let store = SqlitePrimaryStore::in_memory();
    let mut conn = store.open().unwrap();
    let original = vec![record("a", 1)];
    store.write_all(&mut conn, &original).unwrap();

    let duplicated = vec![record("x", 9), record("x", 9)];
    let err = store.write_all(&mut conn, &duplicated).unwrap_err();
    assert!(matches!(err, StoreError::Write(_)));
    assert_eq!(store.read_all(&mut conn).unwrap(), original);
}

#[test]
fn file_store_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("surveys.sqlite3");
    let records = vec![record("a", 1), record("b", 2)];

    let store = SqlitePrimaryStore::file(&path);
    let mut conn = store.open().unwrap();
    store.write_all(&mut conn, &records).unwrap();
    drop(conn);

    let mut reopened = store.open().unwrap();
    assert_eq!(store.read_all(&mut reopened).unwrap(), records);
}

#[test]
fn house_number_lookup_uses_indexed_column() {
    let store = SqlitePrimaryStore::in_memory();
    let mut conn = store.open().unwrap();
    store
        .write_all(&mut conn, &[record("a", 101), record("b", 7), record("c", 101)])
        .unwrap();

    let hits = store.find_by_house_number(&conn, 101).unwrap();
    let ids: Vec<&str> = hits.iter().map(|record| record.id.as_str()).collect();
    assert_eq!(ids, vec!["a", "c"]);
}

#[test]
fn version_one_database_upgrades_without_touching_rows() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("legacy.sqlite3");
    let legacy = record("legacy-1", 12);

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch(
        "CREATE TABLE surveys (
            id TEXT PRIMARY KEY NOT NULL,
            house_number INTEGER NOT NULL,
            hoh_cnic TEXT NOT NULL,
            timestamp TEXT NOT NULL,
            body TEXT NOT NULL
        );
        PRAGMA user_version = 1;",
    )
    .unwrap();
    conn.execute(
        "INSERT INTO surveys (id, house_number, hoh_cnic, timestamp, body)
         VALUES (?1, ?2, ?3, ?4, ?5);",
        params![
            legacy.id.as_str(),
            legacy.house_number,
            legacy.hoh_cnic.as_str(),
            legacy.timestamp.to_rfc3339(),
            serde_json::to_string(&legacy).unwrap(),
        ],
    )
    .unwrap();
    drop(conn);

    let store = SqlitePrimaryStore::file(&path);
    let mut upgraded = store.open().unwrap();
    assert_eq!(schema_version(&upgraded), latest_version());
    assert!(object_exists(&upgraded, "index", "idx_surveys_hoh_cnic"));
    assert_eq!(store.read_all(&mut upgraded).unwrap(), vec![legacy]);
}

#[test]
fn newer_schema_version_is_unavailable() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.sqlite3");
    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    let err = SqlitePrimaryStore::file(&path).open().unwrap_err();
    match err {
        StoreError::Unavailable(StoreFault::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        }) => {
            assert_eq!(db_version, 999);
            assert_eq!(latest_supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn corrupt_row_body_is_read_failure() {
    let store = SqlitePrimaryStore::in_memory();
    let mut conn = store.open().unwrap();
    conn.execute(
        "INSERT INTO surveys (id, house_number, hoh_cnic, timestamp, body)
         VALUES ('bad', 1, '', '', '{not json');",
        [],
    )
    .unwrap();

    let err = store.read_all(&mut conn).unwrap_err();
    assert!(matches!(err, StoreError::Read(StoreFault::Json(_))));
}

#[test]
fn unopenable_path_is_unavailable() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing-dir").join("surveys.sqlite3");

    let err = SqlitePrimaryStore::file(&path).open().unwrap_err();
    assert_eq!(err.code(), "store_unavailable");
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn object_exists(conn: &Connection, kind: &str, name: &str) -> bool {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = ?1 AND name = ?2);",
            [kind, name],
            |row| row.get(0),
        )
        .unwrap();
    exists == 1
}
