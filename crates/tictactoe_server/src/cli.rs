//! Command-line interface for tictactoe_server.

use clap::{Parser, Subcommand};

use tictactoe_server::StoreBackend;

/// Tic-tac-toe game-state service
#[derive(Parser, Debug)]
#[command(name = "tictactoe_server")]
#[command(about = "Tic-tac-toe game-state service with persistent scores", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the HTTP game server
    Serve {
        /// Path to a TOML config file
        #[arg(short, long)]
        config: Option<std::path::PathBuf>,

        /// Host to bind to
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to
        #[arg(short, long)]
        port: Option<u16>,

        /// Storage backend
        #[arg(long, value_enum)]
        store: Option<StoreBackend>,

        /// SQLite database path
        #[arg(long)]
        db_path: Option<String>,
    },

    /// Talk to a running server
    Client {
        /// Game server URL
        #[arg(long, default_value = "http://127.0.0.1:8000")]
        server_url: String,

        /// Request to send
        #[command(subcommand)]
        action: ClientAction,
    },
}

/// Requests the client can send
#[derive(Subcommand, Debug)]
pub enum ClientAction {
    /// Show the board and status
    State,

    /// Place the next mark
    Move {
        /// Cell index (0-8, row-major)
        #[arg(allow_negative_numbers = true)]
        index: i64,
    },

    /// Start a new game
    Reset {
        /// Also clear scores and history
        #[arg(long)]
        stats: bool,
    },

    /// Show score tallies
    Scores,

    /// Show finished games
    History,
}
