use assert_matches::assert_matches;
use chrono::{TimeZone, Utc};
use spellplay::clock::ManualClock;
use spellplay::session::GameMode;
use spellplay::store::{SessionStore, SqliteStore};
use spellplay::words::NewWord;
use spellplay::{EngineContext, GameError, PracticeEngine};

/// Integration tests for practice sessions: answering, timing, resuming and completion
/// against an in-memory store.

fn store_with(words: &[(&str, u8)]) -> (SqliteStore, i64) {
    let store = SqliteStore::open_in_memory().unwrap();
    let list_id = store.create_list("flow").unwrap();
    for (text, difficulty) in words {
        store
            .add_word(list_id, &NewWord::new(text, *difficulty))
            .unwrap();
    }
    (store, list_id)
}

#[test]
fn cat_and_dog_one_right_one_wrong() {
    let (store, list_id) = store_with(&[("cat", 2), ("dog", 2)]);
    let clock = ManualClock::new(Utc.with_ymd_and_hms(2026, 9, 1, 9, 0, 0).unwrap());
    let mut engine = PracticeEngine::from_context(
        EngineContext::new(&store, &store)
            .with_clock(&clock)
            .with_seed(42),
    );

    let session_id = engine.start("kid", list_id).unwrap();
    let first = engine.current("kid").unwrap();
    assert_eq!(first.index, 0);
    assert_eq!(first.total, 2);
    assert_eq!(first.session_id, session_id);

    let answer = engine.submit_answer("kid", &first.word.text).unwrap();
    assert!(answer.is_correct);
    assert_eq!(answer.time_taken_ms, 0);
    assert_eq!(answer.points_earned, 70);
    assert_eq!(answer.next_index, Some(1));
    assert!(!answer.completed());

    let second = engine.current("kid").unwrap();
    assert_eq!(second.index, 1);
    assert_eq!(second.points_so_far, 70);
    assert_ne!(second.word.text, first.word.text);

    let answer = engine.submit_answer("kid", "wrong").unwrap();
    assert!(!answer.is_correct);
    assert_eq!(answer.points_earned, 0);
    assert_eq!(answer.correct_word, second.word.text);

    let session = answer.session.expect("session finalized after last word");
    assert_eq!(session.id, session_id);
    assert_eq!(session.total_words, 2);
    assert_eq!(session.correct_words, 1);
    assert_eq!(session.points_earned, 70);
    assert!(session.is_complete());

    let attempts = store.attempts_for_session(session_id).unwrap();
    assert_eq!(attempts.len(), 2);
    assert_eq!(attempts[1].attempt_text, "wrong");
}

#[test]
fn repeated_get_current_is_idempotent() {
    let (store, list_id) = store_with(&[("cat", 2), ("dog", 2)]);
    let clock = ManualClock::new(Utc.with_ymd_and_hms(2026, 9, 1, 9, 0, 0).unwrap());
    let mut engine =
        PracticeEngine::from_context(EngineContext::new(&store, &store).with_clock(&clock));
    engine.start("kid", list_id).unwrap();

    let first = engine.current("kid").unwrap();
    clock.advance_ms(3_000);
    let again = engine.current("kid").unwrap();

    assert_eq!(first, again);
    assert_eq!(again.presented_at, first.presented_at);

    // the reload did not reset the timer
    let answer = engine.submit_answer("kid", &first.word.text).unwrap();
    assert_eq!(answer.time_taken_ms, 3_000);
    assert_eq!(answer.points_earned, 20 + 20);
}

#[test]
fn session_resumes_from_a_fresh_engine() {
    let (store, list_id) = store_with(&[("cat", 1), ("dog", 1), ("owl", 1)]);
    let clock = ManualClock::new(Utc.with_ymd_and_hms(2026, 9, 1, 9, 0, 0).unwrap());

    let order: Vec<String> = {
        let mut engine =
            PracticeEngine::from_context(EngineContext::new(&store, &store).with_clock(&clock));
        engine.start("kid", list_id).unwrap();
        let word = engine.current("kid").unwrap().word;
        engine.submit_answer("kid", &word.text).unwrap();
        store
            .load_cursor("kid", GameMode::Practice)
            .unwrap()
            .unwrap()
            .words
            .into_iter()
            .map(|w| w.text)
            .collect()
    };

    // a later request builds everything again from the store
    let engine =
        PracticeEngine::from_context(EngineContext::new(&store, &store).with_clock(&clock));
    let view = engine.current("kid").unwrap();
    assert_eq!(view.index, 1);
    assert_eq!(view.word.text, order[1]);
    assert_eq!(view.correct_so_far, 1);
}

#[test]
fn complete_early_keeps_history_and_drops_cursor() {
    let (store, list_id) = store_with(&[("cat", 1), ("dog", 1), ("owl", 1)]);
    let mut engine = PracticeEngine::new(&store, &store);
    let session_id = engine.start("kid", list_id).unwrap();
    let word = engine.current("kid").unwrap().word;
    engine.submit_answer("kid", &word.text).unwrap();

    let session = engine.complete("kid").unwrap().unwrap();
    assert_eq!(session.id, session_id);
    assert_eq!(session.total_words, 3);
    assert_eq!(session.correct_words, 1);
    assert!(session.is_complete());

    assert!(store.load_cursor("kid", GameMode::Practice).unwrap().is_none());
    assert_matches!(engine.current("kid"), Err(GameError::NotFound(_)));
    assert_eq!(engine.complete("kid").unwrap(), None);
    assert_eq!(store.attempts_for_session(session_id).unwrap().len(), 1);
}

#[test]
fn finished_session_rejects_further_answers_until_closed() {
    let (store, list_id) = store_with(&[("cat", 1)]);
    let mut engine = PracticeEngine::new(&store, &store);
    let session_id = engine.start("kid", list_id).unwrap();

    let answer = engine.submit_answer("kid", "cat").unwrap();
    let finalized = answer.session.unwrap();

    // a duplicate submit after the last word does not score again
    assert_matches!(
        engine.submit_answer("kid", "cat"),
        Err(GameError::NotFound(_))
    );

    // leaving the results keeps the first completion time
    let closed = engine.complete("kid").unwrap().unwrap();
    assert_eq!(closed.completed_at, finalized.completed_at);
    assert_eq!(closed.points_earned, finalized.points_earned);
    assert_eq!(store.attempts_for_session(session_id).unwrap().len(), 1);
}

#[test]
fn starting_again_replaces_the_live_session() {
    let (store, list_id) = store_with(&[("cat", 1), ("dog", 1)]);
    let mut engine = PracticeEngine::new(&store, &store);
    let first = engine.start("kid", list_id).unwrap();
    let second = engine.start("kid", list_id).unwrap();

    assert_ne!(first, second);
    assert_eq!(engine.current("kid").unwrap().session_id, second);
    // the abandoned session stays in history, unfinished
    assert!(!store.get_session(first).unwrap().unwrap().is_complete());
}

#[test]
fn players_do_not_share_sessions() {
    let (store, list_id) = store_with(&[("cat", 1), ("dog", 1)]);
    let mut engine = PracticeEngine::new(&store, &store);
    engine.start("ann", list_id).unwrap();

    assert_matches!(engine.current("bob"), Err(GameError::NotFound(_)));
    engine.start("bob", list_id).unwrap();
    let word = engine.current("bob").unwrap().word;
    engine.submit_answer("bob", &word.text).unwrap();

    assert_eq!(engine.current("ann").unwrap().index, 0);
    assert_eq!(engine.current("bob").unwrap().index, 1);
}

#[test]
fn empty_and_unknown_lists_cannot_start() {
    let (store, list_id) = store_with(&[]);
    let mut engine = PracticeEngine::new(&store, &store);
    assert_matches!(engine.start("kid", list_id), Err(GameError::EmptyList(id)) if id == list_id);
    assert_matches!(engine.start("kid", 9_999), Err(GameError::NotFound(_)));
}
