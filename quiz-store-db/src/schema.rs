//! SQLite schema creation and version-gated upgrades.

use rusqlite::Connection;
use thiserror::Error;

use crate::tx::atomically;

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Migration error: expected version {expected}, found {found}")]
    VersionMismatch { expected: i32, found: i32 },
    #[error("Migration from version {version} failed: {source}")]
    Migration {
        version: i32,
        source: rusqlite::Error,
    },
}

/// Current schema version. Increment when adding migrations.
pub const CURRENT_VERSION: i32 = 1;

/// Tables holding quiz records, one per entity kind.
pub const TABLES: [&str; 5] = ["levels", "scorings", "questions", "exercises", "answers"];

/// Statements upgrading a schema from `from_version` to `from_version + 1`.
#[derive(Debug, Clone, Copy)]
pub struct Migration {
    pub from_version: i32,
    pub statements: &'static [&'static str],
}

/// Registered migrations. Version 1 is the only schema that has shipped.
pub const MIGRATIONS: &[Migration] = &[];

/// Create all tables and indexes if they don't exist.
///
/// Runs in its own transaction unless the connection is already inside one,
/// so a failure never leaves part of the schema behind.
pub fn create_schema(conn: &Connection) -> Result<(), SchemaError> {
    atomically(conn, |conn| {
        conn.execute_batch(SCHEMA_SQL)?;
        Ok(())
    })
}

/// Open an in-memory database with the full schema and no data. Useful for testing.
pub fn open_memory() -> Result<Connection, SchemaError> {
    let conn = Connection::open_in_memory()?;
    conn.execute_batch("PRAGMA foreign_keys=ON;")?;
    create_schema(&conn)?;
    Ok(conn)
}

/// Statements registered for upgrading away from `from_version`.
pub fn migration_statements(from_version: i32) -> &'static [&'static str] {
    statements_in(MIGRATIONS, from_version)
}

/// Apply the registered migrations for every version in `old_version..new_version`.
pub fn upgrade_schema(
    conn: &Connection,
    old_version: i32,
    new_version: i32,
) -> Result<(), SchemaError> {
    upgrade_schema_with(conn, old_version, new_version, MIGRATIONS)
}

/// Apply migrations from `registry` in version order, then statement order.
///
/// All statements run in one transaction; the first failure aborts the
/// whole upgrade.
pub fn upgrade_schema_with(
    conn: &Connection,
    old_version: i32,
    new_version: i32,
    registry: &[Migration],
) -> Result<(), SchemaError> {
    if new_version < old_version {
        return Err(SchemaError::VersionMismatch {
            expected: new_version,
            found: old_version,
        });
    }

    atomically(conn, |conn| {
        for version in old_version..new_version {
            let statements = statements_in(registry, version);
            for sql in statements {
                conn.execute_batch(sql)
                    .map_err(|source| SchemaError::Migration { version, source })?;
            }
            if !statements.is_empty() {
                log::info!(
                    "Applied {} schema statements for version {} -> {}",
                    statements.len(),
                    version,
                    version + 1
                );
            }
        }
        Ok(())
    })
}

fn statements_in(registry: &[Migration], from_version: i32) -> &'static [&'static str] {
    registry
        .iter()
        .find(|m| m.from_version == from_version)
        .map(|m| m.statements)
        .unwrap_or(&[])
}

/// Get the recorded schema version, or 0 if no schema exists.
pub fn schema_version(conn: &Connection) -> Result<i32, SchemaError> {
    let exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version')",
        [],
        |row| row.get(0),
    )?;

    if !exists {
        return Ok(0);
    }

    let version: i32 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |row| row.get(0),
    )?;
    Ok(version)
}

/// Record a schema version.
pub fn record_schema_version(conn: &Connection, version: i32) -> Result<(), SchemaError> {
    conn.execute(
        "INSERT INTO schema_version (version) VALUES (?1)",
        [version],
    )?;
    Ok(())
}

const SCHEMA_SQL: &str = r#"
-- Schema version tracking
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER NOT NULL,
    applied_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS levels (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    value INTEGER NOT NULL,
    name TEXT
);

-- One scoring row per level
CREATE TABLE IF NOT EXISTS scorings (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    level_id INTEGER NOT NULL UNIQUE REFERENCES levels(id),
    points_correct INTEGER NOT NULL,
    points_incorrect INTEGER NOT NULL DEFAULT 0,
    pass_score INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS questions (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    kind TEXT NOT NULL DEFAULT 'text',
    content TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS exercises (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    level_id INTEGER NOT NULL REFERENCES levels(id),
    question_id INTEGER NOT NULL REFERENCES questions(id),
    hint TEXT
);
CREATE INDEX IF NOT EXISTS idx_exercises_level ON exercises(level_id);
CREATE INDEX IF NOT EXISTS idx_exercises_question ON exercises(question_id);

CREATE TABLE IF NOT EXISTS answers (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    exercise_id INTEGER NOT NULL REFERENCES exercises(id),
    content TEXT NOT NULL,
    correct BOOLEAN NOT NULL DEFAULT 0
);
CREATE INDEX IF NOT EXISTS idx_answers_exercise ON answers(exercise_id);
"#;
