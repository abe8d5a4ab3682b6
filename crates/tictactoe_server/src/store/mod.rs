//! State store adapter: raw key-value backends plus typed game-state access.

mod error;
mod kv;
mod models;
mod schema; // Diesel generated schema - internal use only
mod sqlite;
mod state;

pub use error::StoreError;
pub use kv::{DynStore, KvStore, MemoryStore};
pub use models::KvEntry;
pub use sqlite::SqliteStore;
pub use state::{
    BOARD_KEY, GameState, HISTORY_KEY, HistoryEntry, SCORES_KEY, Scores, StateStore,
    X_IS_NEXT_KEY,
};
