//! Engine error types.

use derive_more::{Display, Error, From};
use tictactoe_rules::Position;

use crate::metrics::InvalidMoveReason;
use crate::store::StoreError;

/// Why an engine operation failed.
#[derive(Debug, Clone, Display, Error, From)]
pub enum EngineError {
    /// Index outside 0-8.
    #[display("Invalid move: index {} is out of bounds (must be 0-8)", _0)]
    OutOfBounds(#[error(not(source))] i64),

    /// Target cell already holds a mark.
    #[display("Invalid move: cell {} is already taken", _0.to_index())]
    CellTaken(#[error(not(source))] Position),

    /// The backing store could not be used.
    #[display("{}", _0)]
    #[from]
    StoreUnavailable(#[error(source)] StoreError),
}

impl EngineError {
    /// Metric label for rejected moves; `None` for infrastructure failures.
    pub fn invalid_move_reason(&self) -> Option<InvalidMoveReason> {
        match self {
            EngineError::OutOfBounds(_) => Some(InvalidMoveReason::OutOfBounds),
            EngineError::CellTaken(_) => Some(InvalidMoveReason::CellTaken),
            EngineError::StoreUnavailable(_) => None,
        }
    }

    /// True for errors caused by the caller's request rather than the service.
    pub fn is_user_error(&self) -> bool {
        self.invalid_move_reason().is_some()
    }
}
