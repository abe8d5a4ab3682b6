//! Move application, outcome bookkeeping and resets.

use std::sync::{Mutex, MutexGuard, PoisonError};

use tictactoe_rules::{Board, Outcome, Player, Position, Square, classify};
use tracing::{debug, error, info, instrument, warn};

use crate::engine::{EngineError, ResetView, StateView};
use crate::metrics::{GameResult, InvalidMoveReason, MetricsSink};
use crate::store::{GameState, HistoryEntry, KvStore, Scores, StateStore, StoreError};

/// Tic-tac-toe engine over a shared store.
///
/// The engine caches nothing between calls: every operation re-reads the
/// store, so any number of engines may share one store. Within one engine a
/// transition lock serializes the read-validate-write of moves and resets,
/// and state reads wait on it so they never see a half-written move.
/// Engines in different processes sharing a store can still interleave, in
/// which case the later write wins.
#[derive(Debug)]
pub struct GameEngine<K, M> {
    store: StateStore<K>,
    metrics: M,
    transition: Mutex<()>,
}

impl<K: KvStore, M: MetricsSink> GameEngine<K, M> {
    /// Creates an engine over `kv`, reporting events to `metrics`.
    pub fn new(kv: K, metrics: M) -> Self {
        Self {
            store: StateStore::new(kv),
            metrics,
            transition: Mutex::new(()),
        }
    }

    /// The typed store adapter.
    pub fn store(&self) -> &StateStore<K> {
        &self.store
    }

    /// The metrics sink.
    pub fn metrics(&self) -> &M {
        &self.metrics
    }

    fn lock_transition(&self) -> MutexGuard<'_, ()> {
        // The guarded unit carries no data, so a poisoned lock is still usable.
        self.transition
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Reads and classifies the current game without changing anything.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::StoreUnavailable`] if the store cannot be read.
    #[instrument(skip(self))]
    pub fn get_state(&self) -> Result<StateView, EngineError> {
        // Board and turn are separate keys; reading mid-move could pair them wrong.
        let _guard = self.lock_transition();
        let state = self.store.read_state().inspect_err(log_store_error)?;
        let outcome = classify(&state.board);
        debug!(status = %outcome.status(), "State read");
        Ok(StateView::new(state, outcome))
    }

    /// Places the next player's mark at `index`.
    ///
    /// A rejected move writes nothing.
    ///
    /// # Errors
    ///
    /// - [`EngineError::OutOfBounds`] if `index` is not in 0-8.
    /// - [`EngineError::CellTaken`] if the cell already holds a mark.
    /// - [`EngineError::StoreUnavailable`] if the store cannot be used.
    #[instrument(skip(self))]
    pub fn make_move(&self, index: i64) -> Result<StateView, EngineError> {
        let Ok(pos) = Position::try_from(index) else {
            warn!(index, "Rejected move: out of bounds");
            self.metrics.invalid_move(InvalidMoveReason::OutOfBounds);
            return Err(EngineError::OutOfBounds(index));
        };

        let _guard = self.lock_transition();
        let mut state = self.store.read_state().inspect_err(log_store_error)?;

        if !state.board.is_empty(pos) {
            warn!(index, "Rejected move: cell taken");
            self.metrics.invalid_move(InvalidMoveReason::CellTaken);
            return Err(EngineError::CellTaken(pos));
        }

        let player = state.next_player();
        state.board.set(pos, Square::Occupied(player));
        state.x_is_next = !state.x_is_next;
        self.store
            .write_state(&state)
            .inspect_err(log_store_error)?;
        debug!(%player, position = %pos, "Move applied");

        let outcome = classify(&state.board);
        match outcome {
            Outcome::Won { winner, line } => {
                info!(%winner, line = ?line.indices(), "Game won");
                self.record_finished(Some(winner), &state.board)?;
            }
            Outcome::Draw => {
                info!("Game drawn");
                self.record_finished(None, &state.board)?;
            }
            Outcome::Playing => {}
        }

        Ok(StateView::new(state, outcome))
    }

    /// Appends a finished game to the history and bumps its score. The game is
    /// counted only once both writes have landed.
    fn record_finished(&self, winner: Option<Player>, board: &Board) -> Result<(), EngineError> {
        let mut history = self.store.read_history().inspect_err(log_store_error)?;
        history.push(HistoryEntry::now(winner, board.clone()));
        self.store
            .write_history(&history)
            .inspect_err(log_store_error)?;

        let mut scores = self.store.read_scores().inspect_err(log_store_error)?;
        scores.record(winner);
        self.store
            .write_scores(&scores)
            .inspect_err(log_store_error)?;

        let result = winner.map_or(GameResult::Draw, GameResult::Won);
        self.metrics.game_finished(result);
        debug!(outcome = result.label(), games = history.len(), "Outcome recorded");
        Ok(())
    }

    /// Starts a fresh game. With `reset_stats`, also clears scores and history.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::StoreUnavailable`] if the store cannot be written.
    #[instrument(skip(self))]
    pub fn reset(&self, reset_stats: bool) -> Result<ResetView, EngineError> {
        let _guard = self.lock_transition();
        let state = GameState::default();
        self.store
            .write_state(&state)
            .inspect_err(log_store_error)?;

        if !reset_stats {
            info!("Board reset");
            return Ok(ResetView::new(state, None, None));
        }

        let scores = Scores::default();
        let history: Vec<HistoryEntry> = Vec::new();
        self.store
            .write_scores(&scores)
            .inspect_err(log_store_error)?;
        self.store
            .write_history(&history)
            .inspect_err(log_store_error)?;
        self.metrics.full_reset();
        info!("Board, scores and history reset");

        Ok(ResetView::new(state, Some(scores), Some(history)))
    }

    /// Current score tallies.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::StoreUnavailable`] if the store cannot be read.
    #[instrument(skip(self))]
    pub fn get_scores(&self) -> Result<Scores, EngineError> {
        Ok(self.store.read_scores().inspect_err(log_store_error)?)
    }

    /// Finished games, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::StoreUnavailable`] if the store cannot be read.
    #[instrument(skip(self))]
    pub fn get_history(&self) -> Result<Vec<HistoryEntry>, EngineError> {
        Ok(self.store.read_history().inspect_err(log_store_error)?)
    }
}

fn log_store_error(err: &StoreError) {
    error!(error = %err, "Store operation failed");
}
