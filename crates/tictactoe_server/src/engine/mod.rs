//! Game engine: validates moves, mutates the stored board and records outcomes.

mod error;
mod game_engine;
mod views;

pub use error::EngineError;
pub use game_engine::GameEngine;
pub use views::{ResetView, StateView};
