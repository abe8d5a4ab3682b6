//! Win detection logic for tic-tac-toe.

use crate::{Board, InvalidIndex, Player, Position, Square};
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// The eight winning lines, evaluated in this order.
pub const LINES: [[Position; 3]; 8] = [
    // Rows
    [Position::TopLeft, Position::TopCenter, Position::TopRight],
    [
        Position::MiddleLeft,
        Position::Center,
        Position::MiddleRight,
    ],
    [
        Position::BottomLeft,
        Position::BottomCenter,
        Position::BottomRight,
    ],
    // Columns
    [
        Position::TopLeft,
        Position::MiddleLeft,
        Position::BottomLeft,
    ],
    [
        Position::TopCenter,
        Position::Center,
        Position::BottomCenter,
    ],
    [
        Position::TopRight,
        Position::MiddleRight,
        Position::BottomRight,
    ],
    // Diagonals
    [Position::TopLeft, Position::Center, Position::BottomRight],
    [Position::TopRight, Position::Center, Position::BottomLeft],
];

/// Ordered triple of positions that completed three in a row.
///
/// Serialized as an array of three board indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "[usize; 3]", try_from = "[usize; 3]")]
pub struct WinningLine([Position; 3]);

impl WinningLine {
    /// Positions of the line in evaluation order.
    pub fn positions(&self) -> [Position; 3] {
        self.0
    }

    /// Board indices of the line in evaluation order.
    pub fn indices(&self) -> [usize; 3] {
        self.0.map(Position::to_index)
    }
}

impl From<WinningLine> for [usize; 3] {
    fn from(line: WinningLine) -> Self {
        line.indices()
    }
}

impl TryFrom<[usize; 3]> for WinningLine {
    type Error = InvalidIndex;

    fn try_from(indices: [usize; 3]) -> Result<Self, Self::Error> {
        let mut positions = [Position::TopLeft; 3];
        for (slot, index) in positions.iter_mut().zip(indices) {
            *slot = Position::from_index(index).ok_or(InvalidIndex(index as i64))?;
        }
        Ok(Self(positions))
    }
}

/// Finds the first line held entirely by one player.
///
/// Lines are checked in [`LINES`] order and the first match wins.
#[instrument(skip(board))]
pub fn find_winning_line(board: &Board) -> Option<(Player, WinningLine)> {
    LINES.iter().find_map(|&[a, b, c]| {
        let sq = board.get(a);
        match sq {
            Square::Occupied(player) if sq == board.get(b) && sq == board.get(c) => {
                Some((player, WinningLine([a, b, c])))
            }
            _ => None,
        }
    })
}

/// Checks if there is a winner on the board.
///
/// Returns `Some(player)` if the player has three in a row,
/// `None` otherwise.
#[instrument(skip(board))]
pub fn check_winner(board: &Board) -> Option<Player> {
    find_winning_line(board).map(|(player, _)| player)
}
