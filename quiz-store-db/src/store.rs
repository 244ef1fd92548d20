//! Store open lifecycle.
//!
//! Opening a store with no schema creates the tables, loads the localized
//! document and seeds it, all in one transaction. Opening an older schema
//! runs the registered upgrades. Either way the store is only handed out
//! once it is complete.

use std::path::{Path, PathBuf};

use quiz_store_document::{DocumentError, DocumentLoader};
use rusqlite::Connection;
use thiserror::Error;

use crate::config::StoreConfig;
use crate::dao::AccessObjects;
use crate::schema::{self, CURRENT_VERSION, SchemaError};
use crate::seed::{self, SeedError, SeedStats};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to open database {path}: {source}")]
    Open {
        path: String,
        source: rusqlite::Error,
    },
    #[error("I/O error for {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("Store is already initialized at schema version {version}")]
    AlreadyInitialized { version: i32 },
    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),
    #[error("Cannot load quiz document: {0}")]
    Document(#[from] DocumentError),
    #[error("Seeding failed: {0}")]
    Seed(#[from] SeedError),
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// An opened, fully initialized quiz store.
pub struct QuizDatabase {
    conn: Connection,
    path: Option<PathBuf>,
}

impl QuizDatabase {
    /// Open or create the store at `path`, seeding it from `loader` on first open.
    pub fn open(
        path: &Path,
        loader: &DocumentLoader,
        language: &str,
    ) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| StoreError::Io {
                path: parent.display().to_string(),
                source: e,
            })?;
        }

        let conn = Connection::open(path).map_err(|e| StoreError::Open {
            path: path.display().to_string(),
            source: e,
        })?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;

        prepare(&conn, loader, language)?;
        log::info!("Opened quiz store at {}", path.display());

        Ok(Self {
            conn,
            path: Some(path.to_path_buf()),
        })
    }

    /// Create and seed an in-memory store.
    pub fn open_memory(loader: &DocumentLoader, language: &str) -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        prepare(&conn, loader, language)?;
        Ok(Self { conn, path: None })
    }

    /// Open the store described by `config`.
    pub fn from_config(config: &StoreConfig) -> Result<Self, StoreError> {
        let loader = config.document_loader();
        Self::open(&config.database_path(), &loader, &config.language())
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// File backing this store, `None` for in-memory stores.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn schema_version(&self) -> Result<i32, SchemaError> {
        schema::schema_version(&self.conn)
    }

    /// A fresh container of record access objects bound to this store's connection.
    ///
    /// Handles are cached per container, so keep the returned value around
    /// rather than calling this for every query. Statements stay in the
    /// connection's prepared-statement cache across containers.
    pub fn access(&self) -> AccessObjects<'_> {
        AccessObjects::new(&self.conn)
    }
}

/// Bring the schema on `conn` to [`CURRENT_VERSION`], seeding a fresh store.
fn prepare(conn: &Connection, loader: &DocumentLoader, language: &str) -> Result<(), StoreError> {
    let version = schema::schema_version(conn)?;
    if version == 0 {
        initialize(conn, loader, language)?;
    } else if version < CURRENT_VERSION {
        let tx = conn.unchecked_transaction()?;
        schema::upgrade_schema(&tx, version, CURRENT_VERSION)?;
        schema::record_schema_version(&tx, CURRENT_VERSION)?;
        tx.commit()?;
        log::info!("Upgraded schema from version {version} to {CURRENT_VERSION}");
    } else if version > CURRENT_VERSION {
        return Err(SchemaError::VersionMismatch {
            expected: CURRENT_VERSION,
            found: version,
        }
        .into());
    }
    Ok(())
}

/// First-run initialization: create the schema, load the document for
/// `language`, seed it and record the schema version.
///
/// Everything happens in one transaction. On error nothing is committed and
/// the store is left without a schema. A store that already records a schema
/// version is refused with [`StoreError::AlreadyInitialized`].
pub fn initialize(
    conn: &Connection,
    loader: &DocumentLoader,
    language: &str,
) -> Result<SeedStats, StoreError> {
    let tx = conn.unchecked_transaction()?;
    let version = schema::schema_version(&tx)?;
    if version != 0 {
        return Err(StoreError::AlreadyInitialized { version });
    }
    schema::create_schema(&tx)?;
    let quiz = loader.load_document(language, loader.default_language())?;
    let stats = seed::seed(&tx, &quiz)?;
    schema::record_schema_version(&tx, CURRENT_VERSION)?;
    tx.commit()?;
    Ok(stats)
}
