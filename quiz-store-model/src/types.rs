//! Persisted record types.
//!
//! Every record is integer-identified. `id` is `None` until the store
//! assigns one on insert; foreign keys hold the identity of a row that
//! must already exist when this one is written.

use crate::document::{QuizAnswer, QuizExercise, QuizLevel, QuizQuestion, QuizScoring};

// ── Level ───────────────────────────────────────────────────────────────────

/// An ordered grouping of exercises.
#[derive(Debug, Clone, PartialEq)]
pub struct Level {
    pub id: Option<i64>,
    pub value: u32,
    pub name: Option<String>,
}

impl From<&QuizLevel> for Level {
    fn from(level: &QuizLevel) -> Self {
        Self {
            id: None,
            value: level.value,
            name: level.name.clone(),
        }
    }
}

// ── Scoring ─────────────────────────────────────────────────────────────────

/// Scoring rules for exactly one level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scoring {
    pub id: Option<i64>,
    pub level_id: i64,
    pub points_correct: i32,
    pub points_incorrect: i32,
    pub pass_score: i32,
}

impl Scoring {
    pub fn for_level(level_id: i64, scoring: &QuizScoring) -> Self {
        Self {
            id: None,
            level_id,
            points_correct: scoring.points_correct,
            points_incorrect: scoring.points_incorrect,
            pass_score: scoring.pass_score,
        }
    }

    /// Score for a run with the given number of correct and incorrect answers.
    pub fn score(&self, correct: u32, incorrect: u32) -> i64 {
        i64::from(self.points_correct) * i64::from(correct)
            + i64::from(self.points_incorrect) * i64::from(incorrect)
    }

    pub fn passes(&self, score: i64) -> bool {
        score >= i64::from(self.pass_score)
    }
}

// ── Question ────────────────────────────────────────────────────────────────

/// How a question's content is presented.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum QuestionKind {
    /// Content is the prompt text.
    #[default]
    Text,
    /// Content names an image resource.
    Image,
}

impl QuestionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Image => "image",
        }
    }

    /// Parse a stored or authored kind name. Returns `None` for unknown names.
    pub fn from_name(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "text" => Some(Self::Text),
            "image" => Some(Self::Image),
            _ => None,
        }
    }
}

/// Prompt content for one exercise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    pub id: Option<i64>,
    pub kind: QuestionKind,
    pub content: String,
}

impl From<&QuizQuestion> for Question {
    fn from(question: &QuizQuestion) -> Self {
        Self {
            id: None,
            kind: question.kind,
            content: question.content.clone(),
        }
    }
}

// ── Exercise ────────────────────────────────────────────────────────────────

/// Belongs to one level and points at its question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exercise {
    pub id: Option<i64>,
    pub level_id: i64,
    pub question_id: i64,
    pub hint: Option<String>,
}

impl Exercise {
    pub fn new(level_id: i64, question_id: i64, exercise: &QuizExercise) -> Self {
        Self {
            id: None,
            level_id,
            question_id,
            hint: exercise.hint.clone(),
        }
    }
}

// ── Answer ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Answer {
    pub id: Option<i64>,
    pub exercise_id: i64,
    pub content: String,
    pub correct: bool,
}

impl Answer {
    pub fn for_exercise(exercise_id: i64, answer: &QuizAnswer) -> Self {
        Self {
            id: None,
            exercise_id,
            content: answer.content.clone(),
            correct: answer.correct,
        }
    }
}
