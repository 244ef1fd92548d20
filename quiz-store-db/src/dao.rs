//! Typed record access objects.
//!
//! One generic [`Dao`] serves every entity kind through the [`Record`]
//! trait. [`AccessObjects`] builds each handle on first use and hands out
//! the cached one afterwards.

use std::cell::OnceCell;
use std::marker::PhantomData;

use quiz_store_model::{Answer, Exercise, Level, Question, QuestionKind, Scoring};
use rusqlite::types::{Type, Value};
use rusqlite::{Connection, Params, Row, params, params_from_iter};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AccessError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Entity not found: {entity_type} with id {id}")]
    NotFound { entity_type: &'static str, id: i64 },
    #[error("{entity_type} has not been inserted yet")]
    Unsaved { entity_type: &'static str },
    #[error("{entity_type} already has id {id}")]
    AlreadySaved { entity_type: &'static str, id: i64 },
    #[error("Cannot access {entity_type} records: {source}")]
    Connection {
        entity_type: &'static str,
        source: rusqlite::Error,
    },
}

/// A row type stored in its own table with an integer identity.
pub trait Record: Sized {
    /// Entity name used in errors and logs.
    const ENTITY: &'static str;
    const TABLE: &'static str;
    /// Columns other than `id`, in binding order.
    const COLUMNS: &'static [&'static str];

    fn id(&self) -> Option<i64>;
    fn set_id(&mut self, id: i64);

    /// Map a row selected as `id` followed by [`Self::COLUMNS`].
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self>;

    /// Values for [`Self::COLUMNS`], in order.
    fn values(&self) -> Vec<Value>;
}

/// Typed CRUD handle for one entity kind, borrowing the store connection.
pub struct Dao<'c, R: Record> {
    conn: &'c Connection,
    select_sql: String,
    insert_sql: String,
    update_sql: String,
    _record: PhantomData<fn() -> R>,
}

impl<'c, R: Record> Dao<'c, R> {
    /// Bind a handle to `conn`, checking that the entity's table is reachable.
    pub fn new(conn: &'c Connection) -> Result<Self, AccessError> {
        let columns = R::COLUMNS.join(", ");
        let placeholders = (1..=R::COLUMNS.len())
            .map(|i| format!("?{i}"))
            .collect::<Vec<_>>()
            .join(", ");
        let assignments = R::COLUMNS
            .iter()
            .enumerate()
            .map(|(i, c)| format!("{c} = ?{}", i + 1))
            .collect::<Vec<_>>()
            .join(", ");

        // Fails with "no such table" until the schema exists.
        let select_sql = format!("SELECT id, {columns} FROM {}", R::TABLE);
        conn.prepare_cached(&select_sql)
            .map_err(|source| AccessError::Connection {
                entity_type: R::ENTITY,
                source,
            })?;

        Ok(Self {
            conn,
            select_sql,
            insert_sql: format!("INSERT INTO {} ({columns}) VALUES ({placeholders})", R::TABLE),
            update_sql: format!(
                "UPDATE {} SET {assignments} WHERE id = ?{}",
                R::TABLE,
                R::COLUMNS.len() + 1
            ),
            _record: PhantomData,
        })
    }

    pub fn connection(&self) -> &'c Connection {
        self.conn
    }

    /// Fetch a record by id.
    pub fn get(&self, id: i64) -> Result<R, AccessError> {
        self.find(id)?.ok_or(AccessError::NotFound {
            entity_type: R::ENTITY,
            id,
        })
    }

    /// Fetch a record by id, or `None` if no row has it.
    pub fn find(&self, id: i64) -> Result<Option<R>, AccessError> {
        let mut stmt = self
            .conn
            .prepare_cached(&format!("{} WHERE id = ?1", self.select_sql))?;
        match stmt.query_row(params![id], R::from_row) {
            Ok(r) => Ok(Some(r)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Insert a new record and store its generated id in it. Returns the id.
    pub fn insert(&self, record: &mut R) -> Result<i64, AccessError> {
        if let Some(id) = record.id() {
            return Err(AccessError::AlreadySaved {
                entity_type: R::ENTITY,
                id,
            });
        }
        let mut stmt = self.conn.prepare_cached(&self.insert_sql)?;
        stmt.execute(params_from_iter(record.values()))?;
        let id = self.conn.last_insert_rowid();
        record.set_id(id);
        Ok(id)
    }

    /// Re-read every stored field of `record` from its row.
    pub fn refresh(&self, record: &mut R) -> Result<(), AccessError> {
        let id = record.id().ok_or(AccessError::Unsaved {
            entity_type: R::ENTITY,
        })?;
        *record = self.get(id)?;
        Ok(())
    }

    /// Write every field of an existing record back to its row.
    pub fn update(&self, record: &R) -> Result<(), AccessError> {
        let id = record.id().ok_or(AccessError::Unsaved {
            entity_type: R::ENTITY,
        })?;
        let mut values = record.values();
        values.push(Value::Integer(id));
        let mut stmt = self.conn.prepare_cached(&self.update_sql)?;
        let changed = stmt.execute(params_from_iter(values))?;
        if changed == 0 {
            return Err(AccessError::NotFound {
                entity_type: R::ENTITY,
                id,
            });
        }
        Ok(())
    }

    /// All records in identity order.
    pub fn list(&self) -> Result<Vec<R>, AccessError> {
        self.select("ORDER BY id", [])
    }

    pub fn count(&self) -> Result<u64, AccessError> {
        let count: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM {}", R::TABLE),
            [],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    fn select(&self, tail: &str, params: impl Params) -> Result<Vec<R>, AccessError> {
        let mut stmt = self
            .conn
            .prepare_cached(&format!("{} {tail}", self.select_sql))?;
        let rows = stmt.query_map(params, R::from_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }
}

// ── Query surface ───────────────────────────────────────────────────────────

impl Dao<'_, Level> {
    /// Levels by authored value.
    pub fn ordered(&self) -> Result<Vec<Level>, AccessError> {
        self.select("ORDER BY value, id", [])
    }

    pub fn by_value(&self, value: u32) -> Result<Option<Level>, AccessError> {
        Ok(self
            .select("WHERE value = ?1 ORDER BY id LIMIT 1", params![value])?
            .into_iter()
            .next())
    }
}

impl Dao<'_, Exercise> {
    pub fn for_level(&self, level_id: i64) -> Result<Vec<Exercise>, AccessError> {
        self.select("WHERE level_id = ?1 ORDER BY id", params![level_id])
    }
}

impl Dao<'_, Answer> {
    pub fn for_exercise(&self, exercise_id: i64) -> Result<Vec<Answer>, AccessError> {
        self.select("WHERE exercise_id = ?1 ORDER BY id", params![exercise_id])
    }

    pub fn correct_for_exercise(&self, exercise_id: i64) -> Result<Vec<Answer>, AccessError> {
        self.select(
            "WHERE exercise_id = ?1 AND correct = 1 ORDER BY id",
            params![exercise_id],
        )
    }
}

impl Dao<'_, Scoring> {
    pub fn for_level(&self, level_id: i64) -> Result<Option<Scoring>, AccessError> {
        Ok(self
            .select("WHERE level_id = ?1", params![level_id])?
            .into_iter()
            .next())
    }
}

// ── Access object container ─────────────────────────────────────────────────

/// One cached access object per entity kind, created on first request.
///
/// Handles borrow the connection and never close it.
pub struct AccessObjects<'c> {
    conn: &'c Connection,
    levels: OnceCell<Dao<'c, Level>>,
    scorings: OnceCell<Dao<'c, Scoring>>,
    questions: OnceCell<Dao<'c, Question>>,
    exercises: OnceCell<Dao<'c, Exercise>>,
    answers: OnceCell<Dao<'c, Answer>>,
}

impl<'c> AccessObjects<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self {
            conn,
            levels: OnceCell::new(),
            scorings: OnceCell::new(),
            questions: OnceCell::new(),
            exercises: OnceCell::new(),
            answers: OnceCell::new(),
        }
    }

    pub fn connection(&self) -> &'c Connection {
        self.conn
    }

    pub fn levels(&self) -> Result<&Dao<'c, Level>, AccessError> {
        cached(self.conn, &self.levels)
    }

    pub fn scorings(&self) -> Result<&Dao<'c, Scoring>, AccessError> {
        cached(self.conn, &self.scorings)
    }

    pub fn questions(&self) -> Result<&Dao<'c, Question>, AccessError> {
        cached(self.conn, &self.questions)
    }

    pub fn exercises(&self) -> Result<&Dao<'c, Exercise>, AccessError> {
        cached(self.conn, &self.exercises)
    }

    pub fn answers(&self) -> Result<&Dao<'c, Answer>, AccessError> {
        cached(self.conn, &self.answers)
    }
}

fn cached<'a, 'c, R: Record>(
    conn: &'c Connection,
    cell: &'a OnceCell<Dao<'c, R>>,
) -> Result<&'a Dao<'c, R>, AccessError> {
    if let Some(dao) = cell.get() {
        return Ok(dao);
    }
    let dao = Dao::new(conn).inspect_err(|e| {
        log::error!("Cannot create {} access object: {e}", R::ENTITY);
    })?;
    Ok(cell.get_or_init(|| dao))
}

// ── Record impls ────────────────────────────────────────────────────────────

impl Record for Level {
    const ENTITY: &'static str = "level";
    const TABLE: &'static str = "levels";
    const COLUMNS: &'static [&'static str] = &["value", "name"];

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = Some(id);
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Level {
            id: row.get(0)?,
            value: row.get(1)?,
            name: row.get(2)?,
        })
    }

    fn values(&self) -> Vec<Value> {
        vec![self.value.into(), self.name.clone().into()]
    }
}

impl Record for Scoring {
    const ENTITY: &'static str = "scoring";
    const TABLE: &'static str = "scorings";
    const COLUMNS: &'static [&'static str] =
        &["level_id", "points_correct", "points_incorrect", "pass_score"];

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = Some(id);
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Scoring {
            id: row.get(0)?,
            level_id: row.get(1)?,
            points_correct: row.get(2)?,
            points_incorrect: row.get(3)?,
            pass_score: row.get(4)?,
        })
    }

    fn values(&self) -> Vec<Value> {
        vec![
            self.level_id.into(),
            self.points_correct.into(),
            self.points_incorrect.into(),
            self.pass_score.into(),
        ]
    }
}

impl Record for Question {
    const ENTITY: &'static str = "question";
    const TABLE: &'static str = "questions";
    const COLUMNS: &'static [&'static str] = &["kind", "content"];

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = Some(id);
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        let kind: String = row.get(1)?;
        let kind = QuestionKind::from_name(&kind)
            .ok_or_else(|| rusqlite::Error::InvalidColumnType(1, "kind".to_string(), Type::Text))?;
        Ok(Question {
            id: row.get(0)?,
            kind,
            content: row.get(2)?,
        })
    }

    fn values(&self) -> Vec<Value> {
        vec![
            self.kind.as_str().to_string().into(),
            self.content.clone().into(),
        ]
    }
}

impl Record for Exercise {
    const ENTITY: &'static str = "exercise";
    const TABLE: &'static str = "exercises";
    const COLUMNS: &'static [&'static str] = &["level_id", "question_id", "hint"];

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = Some(id);
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Exercise {
            id: row.get(0)?,
            level_id: row.get(1)?,
            question_id: row.get(2)?,
            hint: row.get(3)?,
        })
    }

    fn values(&self) -> Vec<Value> {
        vec![
            self.level_id.into(),
            self.question_id.into(),
            self.hint.clone().into(),
        ]
    }
}

impl Record for Answer {
    const ENTITY: &'static str = "answer";
    const TABLE: &'static str = "answers";
    const COLUMNS: &'static [&'static str] = &["exercise_id", "content", "correct"];

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = Some(id);
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Answer {
            id: row.get(0)?,
            exercise_id: row.get(1)?,
            content: row.get(2)?,
            correct: row.get(3)?,
        })
    }

    fn values(&self) -> Vec<Value> {
        vec![
            self.exercise_id.into(),
            self.content.clone().into(),
            self.correct.into(),
        ]
    }
}
