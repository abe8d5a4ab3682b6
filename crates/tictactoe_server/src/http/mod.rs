//! REST surface over the game engine.

mod error;
mod handlers;

use std::sync::Arc;

use axum::Router;
use axum::extract::Request;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::{get, post};
use tracing::info;

use crate::engine::GameEngine;
use crate::metrics::GameMetrics;
use crate::store::DynStore;

pub use error::ApiError;
pub use handlers::ResetRequest;

/// Engine type served over HTTP.
pub type ServiceEngine = GameEngine<DynStore, Arc<GameMetrics>>;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    engine: Arc<ServiceEngine>,
    metrics: Arc<GameMetrics>,
}

impl AppState {
    /// Builds handler state over `store`, counting events in `metrics`.
    pub fn new(store: DynStore, metrics: Arc<GameMetrics>) -> Self {
        let engine = Arc::new(GameEngine::new(store, Arc::clone(&metrics)));
        Self { engine, metrics }
    }

    /// The shared engine.
    pub fn engine(&self) -> &ServiceEngine {
        &self.engine
    }
}

/// Builds the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/state", get(handlers::get_state))
        .route("/api/move/{index}", post(handlers::make_move))
        .route("/api/reset", post(handlers::reset))
        .route("/api/scores", get(handlers::get_scores))
        .route("/api/history", get(handlers::get_history))
        .route("/health", get(handlers::health))
        .route("/metrics", get(handlers::metrics))
        .layer(middleware::from_fn(log_request))
        .with_state(state)
}

async fn log_request(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let uri = req.uri().clone();
    let response = next.run(req).await;
    info!(method = %method, uri = %uri, status = %response.status(), "Request handled");
    response
}
