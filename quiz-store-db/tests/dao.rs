use quiz_store_db::*;
use quiz_store_model::*;
use rusqlite::Connection;

fn test_level(value: u32) -> Level {
    Level {
        id: None,
        value,
        name: Some(format!("Level {value}")),
    }
}

fn test_question(content: &str) -> Question {
    Question {
        id: None,
        kind: QuestionKind::Text,
        content: content.to_string(),
    }
}

#[test]
fn insert_assigns_identity() {
    let conn = open_memory().unwrap();
    let levels = Dao::<Level>::new(&conn).unwrap();

    let mut level = test_level(1);
    let id = levels.insert(&mut level).unwrap();
    assert_eq!(level.id, Some(id));
    assert_eq!(levels.get(id).unwrap(), level);
}

#[test]
fn insert_twice_is_rejected() {
    let conn = open_memory().unwrap();
    let levels = Dao::<Level>::new(&conn).unwrap();

    let mut level = test_level(1);
    levels.insert(&mut level).unwrap();
    let err = levels.insert(&mut level).unwrap_err();
    assert!(matches!(err, AccessError::AlreadySaved { entity_type: "level", .. }));
    assert_eq!(levels.count().unwrap(), 1);
}

#[test]
fn get_missing_is_not_found() {
    let conn = open_memory().unwrap();
    let questions = Dao::<Question>::new(&conn).unwrap();

    assert!(questions.find(42).unwrap().is_none());
    let err = questions.get(42).unwrap_err();
    assert!(matches!(
        err,
        AccessError::NotFound {
            entity_type: "question",
            id: 42
        }
    ));
}

#[test]
fn refresh_rereads_stored_fields() {
    let conn = open_memory().unwrap();
    let questions = Dao::<Question>::new(&conn).unwrap();

    let mut question = test_question("What is 2 + 2?");
    let id = questions.insert(&mut question).unwrap();

    conn.execute(
        "UPDATE questions SET kind = 'image', content = 'two_plus_two.png' WHERE id = ?1",
        [id],
    )
    .unwrap();
    questions.refresh(&mut question).unwrap();

    assert_eq!(question.id, Some(id));
    assert_eq!(question.kind, QuestionKind::Image);
    assert_eq!(question.content, "two_plus_two.png");
}

#[test]
fn refresh_requires_identity() {
    let conn = open_memory().unwrap();
    let questions = Dao::<Question>::new(&conn).unwrap();

    let mut question = test_question("unsaved");
    let err = questions.refresh(&mut question).unwrap_err();
    assert!(matches!(err, AccessError::Unsaved { entity_type: "question" }));
}

#[test]
fn update_writes_back() {
    let conn = open_memory().unwrap();
    let levels = Dao::<Level>::new(&conn).unwrap();

    let mut level = test_level(1);
    let id = levels.insert(&mut level).unwrap();
    level.name = None;
    level.value = 9;
    levels.update(&level).unwrap();

    let stored = levels.get(id).unwrap();
    assert_eq!(stored.name, None);
    assert_eq!(stored.value, 9);

    let missing = Level {
        id: Some(id + 100),
        ..test_level(2)
    };
    assert!(matches!(
        levels.update(&missing),
        Err(AccessError::NotFound { .. })
    ));
}

#[test]
fn unknown_question_kind_fails_to_map() {
    let conn = open_memory().unwrap();
    conn.execute(
        "INSERT INTO questions (kind, content) VALUES ('audio', 'beep.ogg')",
        [],
    )
    .unwrap();
    let questions = Dao::<Question>::new(&conn).unwrap();
    assert!(matches!(
        questions.get(conn.last_insert_rowid()),
        Err(AccessError::Sqlite(_))
    ));
}

#[test]
fn child_queries_follow_foreign_keys() {
    let conn = open_memory().unwrap();
    let access = AccessObjects::new(&conn);
    let levels = access.levels().unwrap();
    let questions = access.questions().unwrap();
    let exercises = access.exercises().unwrap();
    let answers = access.answers().unwrap();
    let scorings = access.scorings().unwrap();

    let mut second = test_level(2);
    let mut first = test_level(1);
    let second_id = levels.insert(&mut second).unwrap();
    let first_id = levels.insert(&mut first).unwrap();

    let mut scoring = Scoring {
        id: None,
        level_id: first_id,
        points_correct: 10,
        points_incorrect: -5,
        pass_score: 20,
    };
    scorings.insert(&mut scoring).unwrap();

    let mut question = test_question("Capital of Poland?");
    let question_id = questions.insert(&mut question).unwrap();
    let mut exercise = Exercise {
        id: None,
        level_id: first_id,
        question_id,
        hint: None,
    };
    let exercise_id = exercises.insert(&mut exercise).unwrap();
    for (content, correct) in [("Krakow", false), ("Warsaw", true), ("Gdansk", false)] {
        let mut answer = Answer {
            id: None,
            exercise_id,
            content: content.to_string(),
            correct,
        };
        answers.insert(&mut answer).unwrap();
    }

    let ordered: Vec<u32> = levels.ordered().unwrap().iter().map(|l| l.value).collect();
    assert_eq!(ordered, vec![1, 2]);
    assert_eq!(levels.by_value(2).unwrap().and_then(|l| l.id), Some(second_id));
    assert!(levels.by_value(7).unwrap().is_none());

    assert_eq!(exercises.for_level(first_id).unwrap(), vec![exercise]);
    assert!(exercises.for_level(second_id).unwrap().is_empty());

    let contents: Vec<String> = answers
        .for_exercise(exercise_id)
        .unwrap()
        .into_iter()
        .map(|a| a.content)
        .collect();
    assert_eq!(contents, vec!["Krakow", "Warsaw", "Gdansk"]);
    let correct = answers.correct_for_exercise(exercise_id).unwrap();
    assert_eq!(correct.len(), 1);
    assert_eq!(correct[0].content, "Warsaw");

    assert_eq!(scorings.for_level(first_id).unwrap(), Some(scoring));
    assert_eq!(scorings.for_level(second_id).unwrap(), None);
}

#[test]
fn foreign_key_violation_is_reported() {
    let conn = open_memory().unwrap();
    let answers = Dao::<Answer>::new(&conn).unwrap();
    let mut orphan = Answer {
        id: None,
        exercise_id: 99,
        content: "nowhere".to_string(),
        correct: false,
    };
    assert!(matches!(
        answers.insert(&mut orphan),
        Err(AccessError::Sqlite(_))
    ));
    assert_eq!(orphan.id, None);
}

#[test]
fn access_objects_are_cached() {
    let conn = open_memory().unwrap();
    let access = AccessObjects::new(&conn);
    let first = access.levels().unwrap();
    let second = access.levels().unwrap();
    assert!(std::ptr::eq(first, second));
}

#[test]
fn access_object_without_schema_is_connection_error() {
    let conn = Connection::open_in_memory().unwrap();
    let access = AccessObjects::new(&conn);
    match access.exercises().err().unwrap() {
        AccessError::Connection {
            entity_type,
            source,
        } => {
            assert_eq!(entity_type, "exercise");
            assert!(source.to_string().contains("no such table"), "{source}");
        }
        other => panic!("unexpected error: {other:?}"),
    }

    // Nothing is cached after a failure; creating the schema makes the handle available.
    create_schema(&conn).unwrap();
    assert!(access.exercises().is_ok());
}
