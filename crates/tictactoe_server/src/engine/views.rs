//! Response payloads returned by the engine.

use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use tictactoe_rules::{Board, GameStatus, Outcome, Player, WinningLine};

use crate::store::{GameState, HistoryEntry, Scores};

/// Board, turn and classification.
///
/// Serialized flat: `{board, x_is_next, status, winner?, winning_line?}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
#[serde(into = "StateWire", try_from = "StateWire")]
pub struct StateView {
    board: Board,
    x_is_next: bool,
    outcome: Outcome,
}

impl StateView {
    /// Builds a view of `state` classified as `outcome`.
    pub fn new(state: GameState, outcome: Outcome) -> Self {
        Self {
            board: state.board,
            x_is_next: state.x_is_next,
            outcome,
        }
    }

    /// Coarse status.
    pub fn status(&self) -> GameStatus {
        self.outcome.status()
    }
}

#[derive(Serialize, Deserialize)]
struct StateWire {
    board: Board,
    x_is_next: bool,
    status: GameStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    winner: Option<Player>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    winning_line: Option<WinningLine>,
}

impl From<StateView> for StateWire {
    fn from(view: StateView) -> Self {
        Self {
            board: view.board,
            x_is_next: view.x_is_next,
            status: view.outcome.status(),
            winner: view.outcome.winner(),
            winning_line: view.outcome.winning_line(),
        }
    }
}

impl TryFrom<StateWire> for StateView {
    type Error = String;

    fn try_from(wire: StateWire) -> Result<Self, Self::Error> {
        let outcome = match (wire.status, wire.winner, wire.winning_line) {
            (GameStatus::Playing, _, _) => Outcome::Playing,
            (GameStatus::Draw, _, _) => Outcome::Draw,
            (GameStatus::Won, Some(winner), Some(line)) => Outcome::Won { winner, line },
            (GameStatus::Won, _, _) => {
                return Err("status 'won' requires winner and winning_line".to_string());
            }
        };
        Ok(Self {
            board: wire.board,
            x_is_next: wire.x_is_next,
            outcome,
        })
    }
}

/// Result of a reset. Scores and history are present only for full resets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct ResetView {
    board: Board,
    x_is_next: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    scores: Option<Scores>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    history: Option<Vec<HistoryEntry>>,
}

impl ResetView {
    /// Builds a reset response.
    pub fn new(
        state: GameState,
        scores: Option<Scores>,
        history: Option<Vec<HistoryEntry>>,
    ) -> Self {
        Self {
            board: state.board,
            x_is_next: state.x_is_next,
            scores,
            history,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tictactoe_rules::classify;

    #[test]
    fn test_playing_view_omits_winner_fields() {
        let view = StateView::new(GameState::default(), Outcome::Playing);
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["status"], "playing");
        assert_eq!(json["x_is_next"], true);
        assert!(json.get("winner").is_none());
        assert!(json.get("winning_line").is_none());
    }

    #[test]
    fn test_won_view_parses_back() {
        let value = json!({
            "board": ["X", "X", "X", "O", "O", null, null, null, null],
            "x_is_next": false,
            "status": "won",
            "winner": "X",
            "winning_line": [0, 1, 2],
        });
        let view: StateView = serde_json::from_value(value.clone()).unwrap();
        assert_eq!(*view.outcome(), classify(view.board()));
        assert_eq!(serde_json::to_value(&view).unwrap(), value);
    }

    #[test]
    fn test_won_without_line_rejected() {
        let value = json!({
            "board": [null, null, null, null, null, null, null, null, null],
            "x_is_next": true,
            "status": "won",
        });
        assert!(serde_json::from_value::<StateView>(value).is_err());
    }

    #[test]
    fn test_partial_reset_omits_stats() {
        let view = ResetView::new(GameState::default(), None, None);
        let json = serde_json::to_value(&view).unwrap();
        assert!(json.get("scores").is_none());
        assert!(json.get("history").is_none());
    }
}
