//! Tic-tac-toe game-state service.
//!
//! A single shared board exposed over HTTP, persisted in a key-value store,
//! with running score tallies, a history of finished games and outcome
//! counters.
//!
//! # Architecture
//!
//! - **Store**: raw key-value backends (memory, SQLite) and the typed
//!   read-or-default adapter over them
//! - **Engine**: move validation, outcome classification and bookkeeping
//! - **Metrics**: counters the engine reports to
//! - **HTTP**: axum routes over the engine
//! - **Client**: typed REST client used by the CLI
//!
//! # Example
//!
//! ```
//! use tictactoe_server::{GameEngine, GameStatus, MemoryStore, NoopMetrics};
//!
//! let engine = GameEngine::new(MemoryStore::new(), NoopMetrics);
//! for index in [0, 3, 1, 4, 2] {
//!     engine.make_move(index).unwrap();
//! }
//! assert_eq!(engine.get_state().unwrap().status(), GameStatus::Won);
//! assert_eq!(engine.get_scores().unwrap().x, 1);
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod client;
mod config;
mod engine;
mod http;
mod metrics;
mod store;

// Crate-level exports - Store
pub use store::{
    BOARD_KEY, DynStore, GameState, HISTORY_KEY, HistoryEntry, KvEntry, KvStore, MemoryStore,
    SCORES_KEY, Scores, SqliteStore, StateStore, StoreError, X_IS_NEXT_KEY,
};

// Crate-level exports - Engine
pub use engine::{EngineError, GameEngine, ResetView, StateView};

// Crate-level exports - Metrics
pub use metrics::{GameMetrics, GameResult, InvalidMoveReason, MetricsSink, NoopMetrics};

// Crate-level exports - HTTP
pub use http::{ApiError, AppState, ResetRequest, ServiceEngine, router};

// Crate-level exports - Client
pub use client::{GameClient, MoveReply, render_state};

// Crate-level exports - Config
pub use config::{ConfigError, ServerConfig, StoreBackend};

// Crate-level exports - Game types
pub use tictactoe_rules::{Board, GameStatus, Outcome, Player, Position, Square, WinningLine};
