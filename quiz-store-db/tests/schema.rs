use quiz_store_db::open_memory;
use quiz_store_db::schema::{
    self, CURRENT_VERSION, Migration, SchemaError, TABLES, create_schema, migration_statements,
    record_schema_version, schema_version, upgrade_schema, upgrade_schema_with,
};
use rusqlite::Connection;

fn table_exists(conn: &Connection, table: &str) -> bool {
    conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name=?1)",
        [table],
        |row| row.get(0),
    )
    .unwrap()
}

#[test]
fn create_schema_in_memory() {
    let conn = open_memory().unwrap();
    for table in TABLES {
        assert!(table_exists(&conn, table), "table '{}' should exist", table);
    }
    assert!(table_exists(&conn, "schema_version"));
}

#[test]
fn schema_is_idempotent() {
    let conn = open_memory().unwrap();
    // Creating again should not error
    create_schema(&conn).unwrap();
}

#[test]
fn foreign_keys_enabled() {
    let conn = open_memory().unwrap();
    let fk: i32 = conn
        .query_row("PRAGMA foreign_keys", [], |row| row.get(0))
        .unwrap();
    assert_eq!(fk, 1);
}

#[test]
fn foreign_keys_reference_parents() {
    let conn = open_memory().unwrap();
    let mut stmt = conn
        .prepare("SELECT \"from\", \"table\" FROM pragma_foreign_key_list(?1)")
        .unwrap();
    let mut refs = |table: &str| -> Vec<(String, String)> {
        let mut refs: Vec<(String, String)> = stmt
            .query_map([table], |row| Ok((row.get(0)?, row.get(1)?)))
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();
        refs.sort();
        refs
    };
    assert_eq!(
        refs("exercises"),
        vec![
            ("level_id".to_string(), "levels".to_string()),
            ("question_id".to_string(), "questions".to_string()),
        ]
    );
    assert_eq!(
        refs("answers"),
        vec![("exercise_id".to_string(), "exercises".to_string())]
    );
    assert_eq!(
        refs("scorings"),
        vec![("level_id".to_string(), "levels".to_string())]
    );
}

#[test]
fn version_is_zero_without_schema() {
    let conn = Connection::open_in_memory().unwrap();
    assert_eq!(schema_version(&conn).unwrap(), 0);
}

#[test]
fn recorded_version_is_reported() {
    let conn = open_memory().unwrap();
    assert_eq!(schema_version(&conn).unwrap(), 0);
    record_schema_version(&conn, CURRENT_VERSION).unwrap();
    assert_eq!(schema_version(&conn).unwrap(), CURRENT_VERSION);
}

#[test]
fn failed_create_leaves_no_tables() {
    let conn = Connection::open_in_memory().unwrap();
    // A stale `exercises` table makes the index creation fail part-way through the batch.
    conn.execute_batch("CREATE TABLE exercises (id INTEGER PRIMARY KEY);")
        .unwrap();
    assert!(create_schema(&conn).is_err());
    assert!(!table_exists(&conn, "schema_version"));
    assert!(!table_exists(&conn, "questions"));
}

#[test]
fn upgrade_from_one_is_a_noop() {
    let conn = open_memory().unwrap();
    assert!(migration_statements(1).is_empty());
    upgrade_schema(&conn, 1, 2).unwrap();
    assert!(table_exists(&conn, "levels"));
}

#[test]
fn upgrade_runs_statements_in_order() {
    const ADD_COLUMN: &[&str] = &[
        "ALTER TABLE levels ADD COLUMN unlocked BOOLEAN NOT NULL DEFAULT 0",
        "UPDATE levels SET unlocked = 1 WHERE value = 1",
    ];
    const ADD_TABLE: &[&str] = &["CREATE TABLE progress (level_id INTEGER REFERENCES levels(id))"];
    let registry = [
        Migration {
            from_version: 2,
            statements: ADD_TABLE,
        },
        Migration {
            from_version: 1,
            statements: ADD_COLUMN,
        },
    ];

    let conn = open_memory().unwrap();
    conn.execute("INSERT INTO levels (value) VALUES (1), (2)", [])
        .unwrap();
    upgrade_schema_with(&conn, 1, 3, &registry).unwrap();

    let unlocked: i64 = conn
        .query_row("SELECT SUM(unlocked) FROM levels", [], |row| row.get(0))
        .unwrap();
    assert_eq!(unlocked, 1);
    assert!(table_exists(&conn, "progress"));
}

#[test]
fn failing_upgrade_statement_aborts_whole_upgrade() {
    const STATEMENTS: &[&str] = &[
        "CREATE TABLE progress (level_id INTEGER)",
        "ALTER TABLE no_such_table ADD COLUMN x INTEGER",
    ];
    let registry = [Migration {
        from_version: 1,
        statements: STATEMENTS,
    }];

    let conn = open_memory().unwrap();
    let err = upgrade_schema_with(&conn, 1, 2, &registry).unwrap_err();
    assert!(matches!(err, SchemaError::Migration { version: 1, .. }));
    assert!(!table_exists(&conn, "progress"));
}

#[test]
fn downgrade_is_rejected() {
    let conn = open_memory().unwrap();
    let err = schema::upgrade_schema(&conn, 3, 1).unwrap_err();
    assert!(matches!(
        err,
        SchemaError::VersionMismatch {
            expected: 1,
            found: 3
        }
    ));
}
