use std::io::BufRead;
use std::str::FromStr;

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use quiz_store_model::{
    QuestionKind, Quiz, QuizAnswer, QuizExercise, QuizLevel, QuizQuestion, QuizScoring,
};

use crate::error::DocumentError;

/// Parse a quiz document.
///
/// Expected shape:
/// ```text
/// <quiz>
///   <level value="1" name="Basics">
///     <scoring correct="10" incorrect="-5" pass="20"/>
///     <exercise hint="...">
///       <question type="text">Prompt</question>
///       <answer correct="true">Right</answer>
///       <answer>Wrong</answer>
///     </exercise>
///   </level>
/// </quiz>
/// ```
///
/// The parse is strict: unknown elements or attributes, a missing or repeated
/// `scoring`/`question`, and malformed attribute values all fail the whole
/// document.
pub fn parse_quiz<R: BufRead>(reader: R) -> Result<Quiz, DocumentError> {
    let mut xml = Reader::from_reader(reader);
    // Content may be split across text, CDATA and comment events; only the
    // joined content is trimmed, in `non_empty`.
    xml.config_mut().trim_text(false);

    let mut buf = Vec::new();
    let mut state = ParseState::default();

    loop {
        match xml.read_event_into(&mut buf)? {
            Event::Start(ref e) => state.open(e)?,
            Event::Empty(ref e) => {
                state.open(e)?;
                state.close(&tag_name(e))?;
            }
            Event::Text(ref e) => state.text(&e.unescape()?)?,
            Event::CData(ref e) => state.text(&String::from_utf8_lossy(&**e))?,
            Event::End(ref e) => {
                let tag = String::from_utf8_lossy(e.name().as_ref()).to_string();
                state.close(&tag)?;
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    state.finish()
}

/// Parse a quiz document from a file path.
pub fn parse_quiz_file(path: &std::path::Path) -> Result<Quiz, DocumentError> {
    let file = std::fs::File::open(path).map_err(|e| DocumentError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    parse_quiz(std::io::BufReader::new(file))
}

// ---------------------------------------------------------------------------
// Parser state
// ---------------------------------------------------------------------------

#[derive(Default)]
struct ParseState {
    quiz: Option<Quiz>,
    closed: bool,
    level: Option<LevelBuilder>,
    in_scoring: bool,
    exercise: Option<ExerciseBuilder>,
    text: Option<TextElement>,
}

struct LevelBuilder {
    value: u32,
    name: Option<String>,
    scoring: Option<QuizScoring>,
    exercises: Vec<QuizExercise>,
}

struct ExerciseBuilder {
    hint: Option<String>,
    question: Option<QuizQuestion>,
    answers: Vec<QuizAnswer>,
}

enum TextElement {
    Question { kind: QuestionKind, content: String },
    Answer { correct: bool, content: String },
}

impl ParseState {
    fn open(&mut self, e: &BytesStart<'_>) -> Result<(), DocumentError> {
        let tag = tag_name(e);
        if self.text.is_some() || self.in_scoring {
            return Err(DocumentError::invalid_document(format!(
                "<{tag}> is not allowed inside a text or scoring element"
            )));
        }
        if self.closed {
            return Err(DocumentError::invalid_document(format!(
                "<{tag}> after the end of <quiz>"
            )));
        }

        match tag.as_str() {
            "quiz" => {
                if self.quiz.is_some() {
                    return Err(DocumentError::invalid_document("Nested <quiz> element"));
                }
                expect_no_attributes(e, "quiz")?;
                self.quiz = Some(Quiz::default());
            }
            "level" => {
                let Some(quiz) = self.quiz.as_ref() else {
                    return Err(misplaced("level", "quiz"));
                };
                if self.level.is_some() {
                    return Err(misplaced("level", "quiz"));
                }
                let mut level = LevelBuilder {
                    value: quiz.levels.len() as u32 + 1,
                    name: None,
                    scoring: None,
                    exercises: Vec::new(),
                };
                for (key, value) in attributes(e)? {
                    match key.as_str() {
                        "value" => level.value = parse_number("level", &key, &value)?,
                        "name" => level.name = Some(value),
                        _ => return Err(unknown_attribute("level", &key)),
                    }
                }
                self.level = Some(level);
            }
            "scoring" => {
                let Some(level) = self.level.as_mut() else {
                    return Err(misplaced("scoring", "level"));
                };
                if self.exercise.is_some() {
                    return Err(misplaced("scoring", "level"));
                }
                if level.scoring.is_some() {
                    return Err(DocumentError::invalid_document(format!(
                        "Level {} has more than one <scoring>",
                        level.value
                    )));
                }
                level.scoring = Some(parse_scoring(e)?);
                self.in_scoring = true;
            }
            "exercise" => {
                if self.level.is_none() || self.exercise.is_some() {
                    return Err(misplaced("exercise", "level"));
                }
                let mut exercise = ExerciseBuilder {
                    hint: None,
                    question: None,
                    answers: Vec::new(),
                };
                for (key, value) in attributes(e)? {
                    match key.as_str() {
                        "hint" => exercise.hint = Some(value),
                        _ => return Err(unknown_attribute("exercise", &key)),
                    }
                }
                self.exercise = Some(exercise);
            }
            "question" => {
                let Some(exercise) = self.exercise.as_ref() else {
                    return Err(misplaced("question", "exercise"));
                };
                if exercise.question.is_some() {
                    return Err(DocumentError::invalid_document(
                        "Exercise has more than one <question>",
                    ));
                }
                let mut kind = QuestionKind::Text;
                for (key, value) in attributes(e)? {
                    match key.as_str() {
                        "type" => {
                            kind = QuestionKind::from_name(&value).ok_or_else(|| {
                                DocumentError::invalid_document(format!(
                                    "Unknown question type: {value}"
                                ))
                            })?;
                        }
                        _ => return Err(unknown_attribute("question", &key)),
                    }
                }
                self.text = Some(TextElement::Question {
                    kind,
                    content: String::new(),
                });
            }
            "answer" => {
                if self.exercise.is_none() {
                    return Err(misplaced("answer", "exercise"));
                }
                let mut correct = false;
                for (key, value) in attributes(e)? {
                    match key.as_str() {
                        "correct" => correct = parse_bool("answer", &key, &value)?,
                        _ => return Err(unknown_attribute("answer", &key)),
                    }
                }
                self.text = Some(TextElement::Answer {
                    correct,
                    content: String::new(),
                });
            }
            other => {
                return Err(DocumentError::invalid_document(format!(
                    "Unknown element <{other}>"
                )));
            }
        }
        Ok(())
    }

    fn text(&mut self, text: &str) -> Result<(), DocumentError> {
        match self.text.as_mut() {
            Some(TextElement::Question { content, .. } | TextElement::Answer { content, .. }) => {
                content.push_str(text);
                Ok(())
            }
            None if text.trim().is_empty() => Ok(()),
            None => Err(DocumentError::invalid_document(format!(
                "Unexpected text outside question or answer: {}",
                text.trim()
            ))),
        }
    }

    fn close(&mut self, tag: &str) -> Result<(), DocumentError> {
        match tag {
            "question" | "answer" => {
                let exercise = self
                    .exercise
                    .as_mut()
                    .ok_or_else(|| misplaced(tag, "exercise"))?;
                match self.text.take() {
                    Some(TextElement::Question { kind, content }) => {
                        let content = non_empty("question", content)?;
                        exercise.question = Some(QuizQuestion { kind, content });
                    }
                    Some(TextElement::Answer { correct, content }) => {
                        let content = non_empty("answer", content)?;
                        exercise.answers.push(QuizAnswer { content, correct });
                    }
                    None => return Err(misplaced(tag, "exercise")),
                }
            }
            "scoring" => self.in_scoring = false,
            "exercise" => {
                let (Some(level), Some(exercise)) = (self.level.as_mut(), self.exercise.take())
                else {
                    return Err(misplaced("exercise", "level"));
                };
                let question = exercise.question.ok_or_else(|| {
                    DocumentError::invalid_document(format!(
                        "Exercise {} of level {} has no <question>",
                        level.exercises.len() + 1,
                        level.value
                    ))
                })?;
                level.exercises.push(QuizExercise {
                    hint: exercise.hint,
                    question,
                    answers: exercise.answers,
                });
            }
            "level" => {
                let (Some(quiz), Some(level)) = (self.quiz.as_mut(), self.level.take()) else {
                    return Err(misplaced("level", "quiz"));
                };
                let scoring = level.scoring.ok_or_else(|| {
                    DocumentError::invalid_document(format!(
                        "Level {} has no <scoring>",
                        level.value
                    ))
                })?;
                quiz.levels.push(QuizLevel {
                    value: level.value,
                    name: level.name,
                    scoring,
                    exercises: level.exercises,
                });
            }
            "quiz" => self.closed = true,
            _ => {}
        }
        Ok(())
    }

    fn finish(self) -> Result<Quiz, DocumentError> {
        match self.quiz {
            Some(quiz) if self.closed && !quiz.levels.is_empty() => Ok(quiz),
            Some(_) if self.closed => Err(DocumentError::invalid_document(
                "Quiz document contains no levels",
            )),
            Some(_) => Err(DocumentError::invalid_document("Unterminated <quiz> element")),
            None => Err(DocumentError::invalid_document("No <quiz> root element found")),
        }
    }
}

// ---------------------------------------------------------------------------
// Attribute helpers
// ---------------------------------------------------------------------------

fn tag_name(e: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(e.name().as_ref()).to_string()
}

fn attributes(e: &BytesStart<'_>) -> Result<Vec<(String, String)>, DocumentError> {
    let mut out = Vec::new();
    for attr in e.attributes() {
        let attr = attr?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).to_string();
        let value = attr.unescape_value()?.to_string();
        out.push((key, value));
    }
    Ok(out)
}

fn expect_no_attributes(e: &BytesStart<'_>, tag: &str) -> Result<(), DocumentError> {
    match attributes(e)?.into_iter().next() {
        Some((key, _)) => Err(unknown_attribute(tag, &key)),
        None => Ok(()),
    }
}

fn parse_scoring(e: &BytesStart<'_>) -> Result<QuizScoring, DocumentError> {
    let mut scoring = QuizScoring::default();
    let mut has_correct = false;
    for (key, value) in attributes(e)? {
        match key.as_str() {
            "correct" => {
                scoring.points_correct = parse_number("scoring", &key, &value)?;
                has_correct = true;
            }
            "incorrect" => scoring.points_incorrect = parse_number("scoring", &key, &value)?,
            "pass" => scoring.pass_score = parse_number("scoring", &key, &value)?,
            _ => return Err(unknown_attribute("scoring", &key)),
        }
    }
    if !has_correct {
        return Err(DocumentError::invalid_document(
            "<scoring> is missing the 'correct' attribute",
        ));
    }
    Ok(scoring)
}

fn parse_number<T: FromStr>(tag: &str, key: &str, value: &str) -> Result<T, DocumentError> {
    value.trim().parse().map_err(|_| {
        DocumentError::invalid_document(format!("Invalid {key} on <{tag}>: {value}"))
    })
}

fn parse_bool(tag: &str, key: &str, value: &str) -> Result<bool, DocumentError> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(DocumentError::invalid_document(format!(
            "Invalid {key} on <{tag}>: {value}"
        ))),
    }
}

fn non_empty(tag: &str, content: String) -> Result<String, DocumentError> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Err(DocumentError::invalid_document(format!("Empty <{tag}>")));
    }
    Ok(trimmed.to_string())
}

fn misplaced(tag: &str, parent: &str) -> DocumentError {
    DocumentError::invalid_document(format!("<{tag}> must be a direct child of <{parent}>"))
}

fn unknown_attribute(tag: &str, key: &str) -> DocumentError {
    DocumentError::invalid_document(format!("Unknown attribute '{key}' on <{tag}>"))
}
