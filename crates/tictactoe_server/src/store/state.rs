//! Typed game-state access over a [`KvStore`].

use chrono::{DateTime, Utc};
use derive_getters::Getters;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tictactoe_rules::{Board, Player};
use tracing::{debug, info, instrument};

use crate::store::{KvStore, StoreError};

/// Key holding the serialized board.
pub const BOARD_KEY: &str = "board";
/// Key holding the serialized turn flag.
pub const X_IS_NEXT_KEY: &str = "x_is_next";
/// Key holding the serialized score tallies.
pub const SCORES_KEY: &str = "scores";
/// Key holding the serialized game history.
pub const HISTORY_KEY: &str = "history";

/// Board plus whose turn it is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    /// Current board.
    pub board: Board,
    /// True when X moves next.
    pub x_is_next: bool,
}

impl GameState {
    /// The player whose mark the next accepted move places.
    pub fn next_player(&self) -> Player {
        Player::from_x_is_next(self.x_is_next)
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self {
            board: Board::new(),
            x_is_next: true,
        }
    }
}

/// Per-outcome tallies across games.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scores {
    /// Games won by X.
    #[serde(rename = "X")]
    pub x: u64,
    /// Games won by O.
    #[serde(rename = "O")]
    pub o: u64,
    /// Drawn games.
    pub draws: u64,
}

impl Scores {
    /// Adds one to the tally for `winner`, or to draws when `None`.
    pub fn record(&mut self, winner: Option<Player>) {
        match winner {
            Some(Player::X) => self.x += 1,
            Some(Player::O) => self.o += 1,
            None => self.draws += 1,
        }
    }

    /// Total finished games.
    pub fn total(&self) -> u64 {
        self.x + self.o + self.draws
    }
}

/// One finished game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct HistoryEntry {
    /// Winning mark, `None` for a draw.
    winner: Option<Player>,
    /// Final board.
    board: Board,
    /// When the game finished.
    timestamp: DateTime<Utc>,
}

impl HistoryEntry {
    /// Records a game finishing now.
    pub fn now(winner: Option<Player>, board: Board) -> Self {
        Self {
            winner,
            board,
            timestamp: Utc::now(),
        }
    }
}

/// Typed adapter over a raw key-value store.
///
/// Every read is read-or-default: a missing key is written with its constant
/// default before the default is returned. Concurrent first reads may each
/// write that same default, which leaves the store unchanged. The adapter
/// does not make read-modify-write sequences atomic; callers serialize them.
#[derive(Debug)]
pub struct StateStore<K> {
    kv: K,
}

impl<K: KvStore> StateStore<K> {
    /// Wraps a raw store.
    pub fn new(kv: K) -> Self {
        Self { kv }
    }

    /// The raw store.
    pub fn kv(&self) -> &K {
        &self.kv
    }

    /// Reads the board and turn flag.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the store is unreachable or holds undecodable data.
    #[instrument(skip(self))]
    pub fn read_state(&self) -> Result<GameState, StoreError> {
        let board = self.read_or_default(BOARD_KEY, Board::new)?;
        let x_is_next = self.read_or_default(X_IS_NEXT_KEY, || true)?;
        Ok(GameState { board, x_is_next })
    }

    /// Writes the board and turn flag.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the store is unreachable.
    #[instrument(skip(self, state), fields(x_is_next = state.x_is_next))]
    pub fn write_state(&self, state: &GameState) -> Result<(), StoreError> {
        self.write(BOARD_KEY, &state.board)?;
        self.write(X_IS_NEXT_KEY, &state.x_is_next)
    }

    /// Reads the score tallies.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the store is unreachable or holds undecodable data.
    #[instrument(skip(self))]
    pub fn read_scores(&self) -> Result<Scores, StoreError> {
        self.read_or_default(SCORES_KEY, Scores::default)
    }

    /// Writes the score tallies.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the store is unreachable.
    #[instrument(skip(self))]
    pub fn write_scores(&self, scores: &Scores) -> Result<(), StoreError> {
        self.write(SCORES_KEY, scores)
    }

    /// Reads the game history, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the store is unreachable or holds undecodable data.
    #[instrument(skip(self))]
    pub fn read_history(&self) -> Result<Vec<HistoryEntry>, StoreError> {
        self.read_or_default(HISTORY_KEY, Vec::new)
    }

    /// Writes the game history.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the store is unreachable.
    #[instrument(skip(self, history), fields(len = history.len()))]
    pub fn write_history(&self, history: &[HistoryEntry]) -> Result<(), StoreError> {
        self.write(HISTORY_KEY, &history)
    }

    fn read_or_default<T, F>(&self, key: &str, default: F) -> Result<T, StoreError>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> T,
    {
        match self.kv.get(key)? {
            Some(raw) => serde_json::from_str(&raw).map_err(|e| {
                StoreError::new(format!("Corrupt value under '{}': {}", key, e))
            }),
            None => {
                info!(key, "Initializing missing key with default");
                let value = default();
                self.write(key, &value)?;
                Ok(value)
            }
        }
    }

    fn write<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), StoreError> {
        let raw = serde_json::to_string(value)
            .map_err(|e| StoreError::new(format!("Failed to encode '{}': {}", key, e)))?;
        debug!(key, bytes = raw.len(), "Writing key");
        self.kv.set(key, &raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use tictactoe_rules::{Position, Square};

    #[test]
    fn test_first_read_writes_defaults() {
        let store = StateStore::new(MemoryStore::new());
        let state = store.read_state().unwrap();
        assert_eq!(state, GameState::default());
        assert_eq!(
            store.kv().get(BOARD_KEY).unwrap().as_deref(),
            Some("[null,null,null,null,null,null,null,null,null]")
        );
        assert_eq!(store.kv().get(X_IS_NEXT_KEY).unwrap().as_deref(), Some("true"));

        assert_eq!(store.read_scores().unwrap(), Scores::default());
        assert_eq!(
            store.kv().get(SCORES_KEY).unwrap().as_deref(),
            Some(r#"{"X":0,"O":0,"draws":0}"#)
        );
        assert!(store.read_history().unwrap().is_empty());
        assert_eq!(store.kv().get(HISTORY_KEY).unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn test_state_round_trips_through_store() {
        let store = StateStore::new(MemoryStore::new());
        let mut state = GameState::default();
        state.board.set(Position::Center, Square::Occupied(Player::X));
        state.x_is_next = false;
        store.write_state(&state).unwrap();

        let read = store.read_state().unwrap();
        assert_eq!(read, state);
        assert_eq!(read.next_player(), Player::O);
    }

    #[test]
    fn test_corrupt_value_is_an_error() {
        let store = StateStore::new(MemoryStore::new());
        store.kv().set(SCORES_KEY, "not json").unwrap();
        let err = store.read_scores().unwrap_err();
        assert!(err.message.contains("scores"));
    }

    #[test]
    fn test_unavailable_store_does_not_default() {
        let kv = MemoryStore::new();
        kv.set_unavailable(true);
        let store = StateStore::new(kv);
        assert!(store.read_state().is_err());
        assert!(store.read_history().is_err());
    }

    #[test]
    fn test_history_entry_wire_format() {
        let entry = HistoryEntry::now(None, Board::new());
        let json = serde_json::to_value(&entry).unwrap();
        assert!(json["winner"].is_null());
        assert_eq!(json["board"].as_array().map(|b| b.len()), Some(9));
        assert!(json["timestamp"].is_string());
    }

    #[test]
    fn test_scores_record() {
        let mut scores = Scores::default();
        scores.record(Some(Player::O));
        scores.record(None);
        assert_eq!(scores, Scores { x: 0, o: 1, draws: 1 });
        assert_eq!(scores.total(), 2);
    }
}
