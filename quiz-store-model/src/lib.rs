//! Quiz data model: the parsed document tree and the persisted record types.
//!
//! This crate has no database dependency. The document types are what a
//! loader produces from a localized quiz definition; the record types are
//! what `quiz-store-db` writes and reads back with store-assigned identities.

pub mod document;
pub mod types;

pub use document::{Quiz, QuizAnswer, QuizExercise, QuizLevel, QuizQuestion, QuizScoring};
pub use types::*;
