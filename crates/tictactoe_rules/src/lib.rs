//! Pure tic-tac-toe rules.
//!
//! Board storage, cell addressing and the win/draw classification used by
//! the game server. Nothing in this crate performs I/O or holds state across
//! calls, so every function can be exercised directly in tests.
//!
//! # Example
//!
//! ```
//! use tictactoe_rules::{Board, Outcome, Player, Position, Square, classify};
//!
//! let mut board = Board::new();
//! for pos in [Position::TopLeft, Position::TopCenter, Position::TopRight] {
//!     board.set(pos, Square::Occupied(Player::X));
//! }
//!
//! match classify(&board) {
//!     Outcome::Won { winner, line } => {
//!         assert_eq!(winner, Player::X);
//!         assert_eq!(line.indices(), [0, 1, 2]);
//!     }
//!     other => panic!("unexpected outcome: {other:?}"),
//! }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod outcome;
mod position;
mod rules;
mod types;

pub use outcome::{GameStatus, Outcome, classify};
pub use position::{InvalidIndex, Position};
pub use rules::{LINES, WinningLine, check_winner, find_winning_line, is_draw, is_full};
pub use types::{BOARD_SIZE, Board, Player, Square};
