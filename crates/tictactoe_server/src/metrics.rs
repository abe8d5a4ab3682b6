//! Game outcome counters and their text exposition.
//!
//! The engine reports events to a [`MetricsSink`]. Reporting is
//! fire-and-forget: sink methods return nothing and cannot fail a request.

use std::fmt::Write as _;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tictactoe_rules::Player;
use tracing::{trace, warn};

/// Why a move was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum InvalidMoveReason {
    /// Index outside 0-8.
    OutOfBounds,
    /// Target cell already occupied.
    CellTaken,
}

/// How a finished game ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameResult {
    /// A player completed a line.
    Won(Player),
    /// Full board, no line.
    Draw,
}

impl GameResult {
    /// Value of the `outcome` label.
    pub fn label(&self) -> &'static str {
        match self {
            GameResult::Won(Player::X) => "X",
            GameResult::Won(Player::O) => "O",
            GameResult::Draw => "draw",
        }
    }
}

/// Receiver for engine events.
pub trait MetricsSink: Send + Sync {
    /// A game ended in a win or draw.
    fn game_finished(&self, result: GameResult);

    /// A move was rejected.
    fn invalid_move(&self, reason: InvalidMoveReason);

    /// Board, scores and history were all cleared.
    fn full_reset(&self);
}

impl<M: MetricsSink + ?Sized> MetricsSink for Arc<M> {
    fn game_finished(&self, result: GameResult) {
        (**self).game_finished(result)
    }

    fn invalid_move(&self, reason: InvalidMoveReason) {
        (**self).invalid_move(reason)
    }

    fn full_reset(&self) {
        (**self).full_reset()
    }
}

/// Sink that drops every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopMetrics;

impl MetricsSink for NoopMetrics {
    fn game_finished(&self, _result: GameResult) {}

    fn invalid_move(&self, _reason: InvalidMoveReason) {}

    fn full_reset(&self) {}
}

/// Lock-free process counters.
#[derive(Debug, Default)]
pub struct GameMetrics {
    games_played: AtomicU64,
    full_resets: AtomicU64,
    wins_x: AtomicU64,
    wins_o: AtomicU64,
    draws: AtomicU64,
    out_of_bounds: AtomicU64,
    cell_taken: AtomicU64,
}

impl GameMetrics {
    /// Creates a tracker with every counter at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Finished games.
    pub fn games_played(&self) -> u64 {
        self.games_played.load(Ordering::Relaxed)
    }

    /// Resets that also cleared scores and history.
    pub fn full_resets(&self) -> u64 {
        self.full_resets.load(Ordering::Relaxed)
    }

    /// Games ending with `result`.
    pub fn wins(&self, result: GameResult) -> u64 {
        self.outcome_counter(result).load(Ordering::Relaxed)
    }

    /// Moves rejected for `reason`.
    pub fn invalid_moves(&self, reason: InvalidMoveReason) -> u64 {
        self.reason_counter(reason).load(Ordering::Relaxed)
    }

    fn outcome_counter(&self, result: GameResult) -> &AtomicU64 {
        match result {
            GameResult::Won(Player::X) => &self.wins_x,
            GameResult::Won(Player::O) => &self.wins_o,
            GameResult::Draw => &self.draws,
        }
    }

    fn reason_counter(&self, reason: InvalidMoveReason) -> &AtomicU64 {
        match reason {
            InvalidMoveReason::OutOfBounds => &self.out_of_bounds,
            InvalidMoveReason::CellTaken => &self.cell_taken,
        }
    }

    /// Renders all counters in the Prometheus text exposition format.
    pub fn render(&self) -> String {
        let mut out = String::new();
        if let Err(e) = self.write_exposition(&mut out) {
            warn!(error = %e, "Failed to render metrics");
        }
        out
    }

    fn write_exposition(&self, out: &mut String) -> std::fmt::Result {
        writeln!(out, "# HELP games_played_total Games that ended in a win or draw.")?;
        writeln!(out, "# TYPE games_played_total counter")?;
        writeln!(out, "games_played_total {}", self.games_played())?;

        writeln!(
            out,
            "# HELP full_game_resets_total Resets that also cleared scores and history."
        )?;
        writeln!(out, "# TYPE full_game_resets_total counter")?;
        writeln!(out, "full_game_resets_total {}", self.full_resets())?;

        writeln!(out, "# HELP wins_total Finished games by outcome.")?;
        writeln!(out, "# TYPE wins_total counter")?;
        for result in [
            GameResult::Won(Player::X),
            GameResult::Won(Player::O),
            GameResult::Draw,
        ] {
            writeln!(
                out,
                "wins_total{{outcome=\"{}\"}} {}",
                result.label(),
                self.wins(result)
            )?;
        }

        writeln!(out, "# HELP invalid_moves_total Rejected moves by reason.")?;
        writeln!(out, "# TYPE invalid_moves_total counter")?;
        for reason in [InvalidMoveReason::OutOfBounds, InvalidMoveReason::CellTaken] {
            writeln!(
                out,
                "invalid_moves_total{{reason=\"{}\"}} {}",
                reason,
                self.invalid_moves(reason)
            )?;
        }
        Ok(())
    }
}

impl MetricsSink for GameMetrics {
    fn game_finished(&self, result: GameResult) {
        trace!(outcome = result.label(), "Counting finished game");
        self.games_played.fetch_add(1, Ordering::Relaxed);
        self.outcome_counter(result).fetch_add(1, Ordering::Relaxed);
    }

    fn invalid_move(&self, reason: InvalidMoveReason) {
        trace!(%reason, "Counting invalid move");
        self.reason_counter(reason).fetch_add(1, Ordering::Relaxed);
    }

    fn full_reset(&self) {
        self.full_resets.fetch_add(1, Ordering::Relaxed);
    }
}
