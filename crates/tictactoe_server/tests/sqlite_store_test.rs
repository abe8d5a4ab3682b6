//! Tests for the SQLite key-value store.

use std::sync::Arc;
use std::thread;

use tempfile::NamedTempFile;

use tictactoe_server::{
    GameEngine, GameStatus, KvStore, NoopMetrics, Player, Scores, SqliteStore, Square,
};

/// Creates a temporary database file with schema applied, returns the file
/// handle (must stay in scope to keep the file alive) and a ready store.
fn setup_test_db() -> (NamedTempFile, SqliteStore) {
    let db_file = NamedTempFile::new().expect("Failed to create temp file");
    let db_path = db_file.path().to_str().expect("Invalid path").to_string();
    let store = SqliteStore::open(db_path).expect("Failed to open store");
    (db_file, store)
}

#[test]
fn test_missing_key_reads_none() {
    let (_db, store) = setup_test_db();
    assert_eq!(store.get("board").expect("Get failed"), None);
    assert!(store.entries().expect("Entries failed").is_empty());
}

#[test]
fn test_set_overwrites_existing_key() {
    let (_db, store) = setup_test_db();
    store.set("x_is_next", "true").expect("Set failed");
    store.set("x_is_next", "false").expect("Set failed");

    assert_eq!(
        store.get("x_is_next").expect("Get failed").as_deref(),
        Some("false")
    );
    let entries = store.entries().expect("Entries failed");
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].key(), "x_is_next");
}

#[test]
fn test_reopen_applies_no_duplicate_schema() {
    let (db, store) = setup_test_db();
    store.set("scores", r#"{"X":1,"O":0,"draws":0}"#).expect("Set failed");

    let reopened = SqliteStore::open(store.db_path().to_string()).expect("Reopen failed");
    assert_eq!(
        reopened.get("scores").expect("Get failed").as_deref(),
        Some(r#"{"X":1,"O":0,"draws":0}"#)
    );
    drop(db);
}

#[test]
fn test_game_survives_engine_restart() {
    let (_db, store) = setup_test_db();

    {
        let engine = GameEngine::new(store.clone(), NoopMetrics);
        for index in [0, 3, 1, 4, 2] {
            engine.make_move(index).expect("Move failed");
        }
    }

    let engine = GameEngine::new(store, NoopMetrics);
    let view = engine.get_state().expect("State failed");
    assert_eq!(view.status(), GameStatus::Won);
    assert_eq!(view.board().squares()[0], Square::Occupied(Player::X));
    assert_eq!(
        engine.get_scores().expect("Scores failed"),
        Scores { x: 1, o: 0, draws: 0 }
    );
    assert_eq!(engine.get_history().expect("History failed").len(), 1);
}

#[test]
fn test_unreachable_database_is_store_error() {
    let result = SqliteStore::open("/nonexistent/dir/tictactoe.db".to_string());
    assert!(result.is_err());
}

/// Plays a full board on one thread while four others poll the state.
fn play_with_readers<K, R>(
    mover: Arc<GameEngine<K, NoopMetrics>>,
    reader: Arc<GameEngine<R, NoopMetrics>>,
) where
    K: KvStore + 'static,
    R: KvStore + 'static,
{
    let readers: Vec<_> = (0..4)
        .map(|_| {
            let engine = Arc::clone(&reader);
            thread::spawn(move || {
                for _ in 0..20 {
                    engine.get_state().expect("Concurrent read failed");
                }
            })
        })
        .collect();

    for index in 0..9 {
        mover.make_move(index).expect("Concurrent move failed");
    }
    for handle in readers {
        handle.join().expect("Reader panicked");
    }
}

#[test]
fn test_concurrent_reads_and_moves_on_one_engine() {
    let (_db, store) = setup_test_db();
    let engine = Arc::new(GameEngine::new(store, NoopMetrics));

    for _ in 0..5 {
        engine.reset(false).expect("Reset failed");
        play_with_readers(Arc::clone(&engine), Arc::clone(&engine));
        let view = engine.get_state().expect("State failed");
        assert_eq!(view.board().occupied_count(), 9);
    }
}

#[test]
fn test_concurrent_reads_and_moves_across_engines() {
    let (_db, store) = setup_test_db();
    let mover = Arc::new(GameEngine::new(store.clone(), NoopMetrics));
    let reader = Arc::new(GameEngine::new(store, NoopMetrics));

    for _ in 0..5 {
        mover.reset(false).expect("Reset failed");
        play_with_readers(Arc::clone(&mover), Arc::clone(&reader));
        let view = reader.get_state().expect("State failed");
        assert_eq!(view.board().occupied_count(), 9);
    }
}
