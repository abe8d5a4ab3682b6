//! HTTP client for a running game server.

use anyhow::{Context, Result};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use crate::engine::{ResetView, StateView};
use crate::http::ResetRequest;
use crate::store::{HistoryEntry, Scores};

/// Reply to a move request.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum MoveReply {
    /// The server rejected the move.
    Rejected {
        /// Reason reported by the server.
        error: String,
    },
    /// The move was applied.
    Accepted(StateView),
}

/// Typed client over the REST API.
#[derive(Debug, Clone)]
pub struct GameClient {
    base_url: String,
    client: reqwest::Client,
}

impl GameClient {
    /// Creates a client for the server at `base_url` (e.g. `http://127.0.0.1:8000`).
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            client: reqwest::Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn read<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        let status = response.status();
        debug!(%status, "Response received");
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Server returned {}: {}", status, body);
        }
        response.json::<T>().await.context("Failed to decode response")
    }

    /// Fetches the current board and status.
    #[instrument(skip(self), fields(base_url = %self.base_url))]
    pub async fn state(&self) -> Result<StateView> {
        let response = self
            .client
            .get(self.url("/api/state"))
            .send()
            .await
            .context("Failed to reach server")?;
        self.read(response).await
    }

    /// Places the next mark at `index`.
    #[instrument(skip(self), fields(base_url = %self.base_url))]
    pub async fn make_move(&self, index: i64) -> Result<MoveReply> {
        let response = self
            .client
            .post(self.url(&format!("/api/move/{}", index)))
            .send()
            .await
            .context("Failed to reach server")?;
        self.read(response).await
    }

    /// Resets the board, and optionally scores and history.
    #[instrument(skip(self), fields(base_url = %self.base_url))]
    pub async fn reset(&self, reset_stats: bool) -> Result<ResetView> {
        let response = self
            .client
            .post(self.url("/api/reset"))
            .json(&ResetRequest { reset_stats })
            .send()
            .await
            .context("Failed to reach server")?;
        self.read(response).await
    }

    /// Fetches the score tallies.
    #[instrument(skip(self), fields(base_url = %self.base_url))]
    pub async fn scores(&self) -> Result<Scores> {
        let response = self
            .client
            .get(self.url("/api/scores"))
            .send()
            .await
            .context("Failed to reach server")?;
        self.read(response).await
    }

    /// Fetches finished games, oldest first.
    #[instrument(skip(self), fields(base_url = %self.base_url))]
    pub async fn history(&self) -> Result<Vec<HistoryEntry>> {
        let response = self
            .client
            .get(self.url("/api/history"))
            .send()
            .await
            .context("Failed to reach server")?;
        self.read(response).await
    }
}

/// Renders a state view for the terminal.
pub fn render_state(view: &StateView) -> String {
    let status = match view.outcome() {
        tictactoe_rules::Outcome::Playing => {
            let next = tictactoe_rules::Player::from_x_is_next(*view.x_is_next());
            format!("Playing, {} to move", next)
        }
        tictactoe_rules::Outcome::Won { winner, line } => {
            format!("{} wins on {:?}", winner, line.indices())
        }
        tictactoe_rules::Outcome::Draw => "Draw".to_string(),
    };
    format!("{}\n\n{}", view.board().display(), status)
}
