//! Route handlers.

use std::num::IntErrorKind;
use std::sync::Arc;

use axum::Json;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::header;
use axum::response::IntoResponse;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{debug, instrument};

use crate::engine::{EngineError, ResetView, StateView};
use crate::http::{ApiError, AppState, ServiceEngine};
use crate::store::{HistoryEntry, Scores};

/// Body of `POST /api/reset`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResetRequest {
    /// Also clear scores and history.
    #[serde(default)]
    pub reset_stats: bool,
}

impl ResetRequest {
    /// Parses the request body; an empty body means a plain reset.
    pub fn from_body(body: &[u8]) -> Result<Self, ApiError> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }
        serde_json::from_slice(body).map_err(|e| ApiError::BadRequest(e.to_string()))
    }
}

/// Parses the move path segment.
///
/// Integers too large for `i64` saturate, so the engine still rejects them as
/// out of bounds. Anything that is not an integer is a bad request.
pub(crate) fn parse_move_index(raw: &str) -> Result<i64, ApiError> {
    raw.parse::<i64>().or_else(|e| match e.kind() {
        IntErrorKind::PosOverflow => Ok(i64::MAX),
        IntErrorKind::NegOverflow => Ok(i64::MIN),
        _ => Err(ApiError::BadRequest(format!("invalid move index '{}': {}", raw, e))),
    })
}

/// Runs an engine call on the blocking pool.
async fn with_engine<T, F>(state: &AppState, f: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce(&ServiceEngine) -> Result<T, EngineError> + Send + 'static,
{
    let engine = Arc::clone(&state.engine);
    let result = tokio::task::spawn_blocking(move || f(engine.as_ref())).await?;
    Ok(result?)
}

#[instrument(skip(state))]
pub(crate) async fn get_state(
    State(state): State<AppState>,
) -> Result<Json<StateView>, ApiError> {
    with_engine(&state, |engine| engine.get_state()).await.map(Json)
}

#[instrument(skip(state))]
pub(crate) async fn make_move(
    State(state): State<AppState>,
    Path(raw): Path<String>,
) -> Result<Json<StateView>, ApiError> {
    let index = parse_move_index(&raw)?;
    with_engine(&state, move |engine| engine.make_move(index))
        .await
        .map(Json)
}

#[instrument(skip(state, body), fields(body_len = body.len()))]
pub(crate) async fn reset(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<ResetView>, ApiError> {
    let request = ResetRequest::from_body(&body)?;
    debug!(reset_stats = request.reset_stats, "Reset requested");
    with_engine(&state, move |engine| engine.reset(request.reset_stats))
        .await
        .map(Json)
}

#[instrument(skip(state))]
pub(crate) async fn get_scores(State(state): State<AppState>) -> Result<Json<Scores>, ApiError> {
    with_engine(&state, |engine| engine.get_scores()).await.map(Json)
}

#[instrument(skip(state))]
pub(crate) async fn get_history(
    State(state): State<AppState>,
) -> Result<Json<Vec<HistoryEntry>>, ApiError> {
    with_engine(&state, |engine| engine.get_history())
        .await
        .map(Json)
}

pub(crate) async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}
