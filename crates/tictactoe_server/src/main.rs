//! Tic-tac-toe server - unified CLI
//!
//! Runs the HTTP game server or talks to a running one.

#![warn(missing_docs)]

mod cli;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, ClientAction, Command};
use tictactoe_server::{
    AppState, GameClient, GameMetrics, MoveReply, ServerConfig, StoreBackend, render_state,
    router,
};
use tracing::{info, instrument};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    initialize_tracing();

    match cli.command {
        Command::Serve {
            config,
            host,
            port,
            store,
            db_path,
        } => run_server(config, host, port, store, db_path).await,
        Command::Client { server_url, action } => run_client(server_url, action).await,
    }
}

fn initialize_tracing() {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tictactoe_server=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Run the HTTP game server
#[instrument]
async fn run_server(
    config_path: Option<PathBuf>,
    host: Option<String>,
    port: Option<u16>,
    store: Option<StoreBackend>,
    db_path: Option<String>,
) -> Result<()> {
    let config = match config_path {
        Some(path) => ServerConfig::from_file(path)?,
        None => ServerConfig::default(),
    }
    .with_overrides(host, port, store, db_path);

    info!(store = %config.store(), db_path = %config.db_path(), "Opening store");
    let store = config.open_store()?;
    let metrics = Arc::new(GameMetrics::new());
    let app = router(AppState::new(store, metrics));

    let listener = tokio::net::TcpListener::bind((config.host().as_str(), *config.port())).await?;
    info!(
        "Server ready at http://{}:{}/",
        config.host(),
        config.port()
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

/// Send one request to a running server and print the reply
#[instrument(skip(action))]
async fn run_client(server_url: String, action: ClientAction) -> Result<()> {
    let client = GameClient::new(server_url);

    match action {
        ClientAction::State => {
            let view = client.state().await?;
            println!("{}", render_state(&view));
        }
        ClientAction::Move { index } => match client.make_move(index).await? {
            MoveReply::Accepted(view) => println!("{}", render_state(&view)),
            MoveReply::Rejected { error } => println!("{}", error),
        },
        ClientAction::Reset { stats } => {
            let view = client.reset(stats).await?;
            println!("{}", view.board().display());
            if let Some(scores) = view.scores() {
                println!("\nScores cleared: {}", serde_json::to_string(scores)?);
            }
        }
        ClientAction::Scores => {
            let scores = client.scores().await?;
            println!("X: {}  O: {}  draws: {}", scores.x, scores.o, scores.draws);
        }
        ClientAction::History => {
            let history = client.history().await?;
            if history.is_empty() {
                println!("No finished games");
            }
            for entry in history {
                let result = entry
                    .winner()
                    .map_or("Draw".to_string(), |p| format!("{} won", p));
                println!("{}  {}", entry.timestamp().to_rfc3339(), result);
            }
        }
    }

    Ok(())
}
