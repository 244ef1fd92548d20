//! In-memory quiz definition, as parsed from a source document.
//!
//! Nothing here carries an identity. A `Quiz` is built by the loader,
//! walked once by the seeder and then dropped.

use crate::types::QuestionKind;

/// Root of a quiz definition: levels in authored order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Quiz {
    pub levels: Vec<QuizLevel>,
}

impl Quiz {
    pub fn exercise_count(&self) -> usize {
        self.levels.iter().map(|l| l.exercises.len()).sum()
    }

    pub fn answer_count(&self) -> usize {
        self.levels
            .iter()
            .flat_map(|l| &l.exercises)
            .map(|e| e.answers.len())
            .sum()
    }
}

/// One level: its scoring rules and its exercises in authored order.
#[derive(Debug, Clone, PartialEq)]
pub struct QuizLevel {
    /// Authored level number, used for display ordering.
    pub value: u32,
    pub name: Option<String>,
    pub scoring: QuizScoring,
    pub exercises: Vec<QuizExercise>,
}

/// A single exercise: exactly one question and its answers.
#[derive(Debug, Clone, PartialEq)]
pub struct QuizExercise {
    pub hint: Option<String>,
    pub question: QuizQuestion,
    pub answers: Vec<QuizAnswer>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct QuizQuestion {
    pub kind: QuestionKind,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct QuizAnswer {
    pub content: String,
    pub correct: bool,
}

/// Per-level scoring rules.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QuizScoring {
    /// Points awarded for a correct answer.
    pub points_correct: i32,
    /// Points added (usually negative) for an incorrect answer.
    pub points_incorrect: i32,
    /// Score needed to pass the level.
    pub pass_score: i32,
}
