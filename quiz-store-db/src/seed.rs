//! One-time population of the store from a parsed quiz document.

use quiz_store_model::{Answer, Exercise, Level, Question, Quiz, Scoring};
use rusqlite::Connection;
use thiserror::Error;

use crate::dao::{AccessError, Dao, Record};
use crate::tx::atomically;

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("Failed to insert {entity} for level {level}: {source}")]
    Insert {
        entity: &'static str,
        level: u32,
        source: AccessError,
    },
    #[error("Access error: {0}")]
    Access(#[from] AccessError),
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Statistics from seeding the database.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedStats {
    pub levels: usize,
    pub scorings: usize,
    pub questions: usize,
    pub exercises: usize,
    pub answers: usize,
}

/// Insert every record of `quiz` in foreign-key order.
///
/// Each level is written before its scoring and exercises, and each
/// question before the exercise that references it. The walk runs in one
/// transaction (or the caller's), so the first failing insert leaves no
/// rows behind.
pub fn seed(conn: &Connection, quiz: &Quiz) -> Result<SeedStats, SeedError> {
    let stats = atomically(conn, |conn| seed_walk(conn, quiz))?;
    log::info!(
        "Seeded {} levels, {} exercises, {} answers",
        stats.levels,
        stats.exercises,
        stats.answers
    );
    Ok(stats)
}

fn seed_walk(conn: &Connection, quiz: &Quiz) -> Result<SeedStats, SeedError> {
    let levels = Dao::<Level>::new(conn)?;
    let scorings = Dao::<Scoring>::new(conn)?;
    let questions = Dao::<Question>::new(conn)?;
    let exercises = Dao::<Exercise>::new(conn)?;
    let answers = Dao::<Answer>::new(conn)?;

    let mut stats = SeedStats::default();

    for quiz_level in &quiz.levels {
        let value = quiz_level.value;

        let mut level = Level::from(quiz_level);
        let level_id = levels
            .insert(&mut level)
            .map_err(insert_failed::<Level>(value))?;
        stats.levels += 1;

        let mut scoring = Scoring::for_level(level_id, &quiz_level.scoring);
        scorings
            .insert(&mut scoring)
            .map_err(insert_failed::<Scoring>(value))?;
        stats.scorings += 1;

        for quiz_exercise in &quiz_level.exercises {
            let mut question = Question::from(&quiz_exercise.question);
            let question_id = questions
                .insert(&mut question)
                .map_err(insert_failed::<Question>(value))?;
            questions
                .refresh(&mut question)
                .map_err(insert_failed::<Question>(value))?;
            stats.questions += 1;

            let mut exercise = Exercise::new(level_id, question_id, quiz_exercise);
            let exercise_id = exercises
                .insert(&mut exercise)
                .map_err(insert_failed::<Exercise>(value))?;
            stats.exercises += 1;

            for quiz_answer in &quiz_exercise.answers {
                let mut answer = Answer::for_exercise(exercise_id, quiz_answer);
                answers
                    .insert(&mut answer)
                    .map_err(insert_failed::<Answer>(value))?;
                stats.answers += 1;
            }
        }

        log::debug!(
            "Seeded level {} ({} exercises)",
            value,
            quiz_level.exercises.len()
        );
    }

    Ok(stats)
}

fn insert_failed<R: Record>(level: u32) -> impl FnOnce(AccessError) -> SeedError {
    move |source| SeedError::Insert {
        entity: R::ENTITY,
        level,
        source,
    }
}
