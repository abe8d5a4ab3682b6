//! Game rules for tic-tac-toe.
//!
//! Pure functions evaluating a board. Rules are separated from board
//! storage so the server can classify any stored position without
//! replaying moves.

mod draw;
mod win;

pub use draw::{is_draw, is_full};
pub use win::{LINES, WinningLine, check_winner, find_winning_line};
