//! Position classification.

use crate::rules::{WinningLine, find_winning_line, is_full};
use crate::{Board, Player};
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// Classification of a board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// No winner and at least one empty square.
    Playing,
    /// A player holds a complete line.
    Won {
        /// The player holding the line.
        winner: Player,
        /// The first matching line in evaluation order.
        line: WinningLine,
    },
    /// Board full with no winner.
    Draw,
}

impl Outcome {
    /// Coarse status without the winner details.
    pub fn status(&self) -> GameStatus {
        match self {
            Outcome::Playing => GameStatus::Playing,
            Outcome::Won { .. } => GameStatus::Won,
            Outcome::Draw => GameStatus::Draw,
        }
    }

    /// Winning player, if the game is won.
    pub fn winner(&self) -> Option<Player> {
        match self {
            Outcome::Won { winner, .. } => Some(*winner),
            _ => None,
        }
    }

    /// Winning line, if the game is won.
    pub fn winning_line(&self) -> Option<WinningLine> {
        match self {
            Outcome::Won { line, .. } => Some(*line),
            _ => None,
        }
    }

    /// True once the game is won or drawn.
    pub fn is_finished(&self) -> bool {
        !matches!(self, Outcome::Playing)
    }
}

/// Wire-level game status.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum GameStatus {
    /// Game is ongoing.
    Playing,
    /// Game ended in a win.
    Won,
    /// Game ended in a draw.
    Draw,
}

/// Classifies a board: win check first, then draw, otherwise still playing.
#[instrument(skip(board))]
pub fn classify(board: &Board) -> Outcome {
    if let Some((winner, line)) = find_winning_line(board) {
        Outcome::Won { winner, line }
    } else if is_full(board) {
        Outcome::Draw
    } else {
        Outcome::Playing
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Position, Square};

    #[test]
    fn test_empty_board_is_playing() {
        let outcome = classify(&Board::new());
        assert_eq!(outcome, Outcome::Playing);
        assert_eq!(outcome.status(), GameStatus::Playing);
        assert_eq!(outcome.winner(), None);
        assert!(!outcome.is_finished());
    }

    #[test]
    fn test_win_reports_line() {
        let mut board = Board::new();
        for pos in [Position::TopCenter, Position::Center, Position::BottomCenter] {
            board.set(pos, Square::Occupied(Player::O));
        }
        let outcome = classify(&board);
        assert_eq!(outcome.status(), GameStatus::Won);
        assert_eq!(outcome.winner(), Some(Player::O));
        assert_eq!(outcome.winning_line().map(|l| l.indices()), Some([1, 4, 7]));
    }

    #[test]
    fn test_status_strings() {
        assert_eq!(GameStatus::Playing.to_string(), "playing");
        assert_eq!("draw".parse::<GameStatus>().unwrap(), GameStatus::Draw);
        assert_eq!(serde_json::to_string(&GameStatus::Won).unwrap(), r#""won""#);
    }
}
