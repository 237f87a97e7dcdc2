//! Liveness / readiness endpoint.

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};

use crate::error::{AppError, AppResult};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/health", get(health))
}

/// GET /health
///
/// Verifies database connectivity; 500 when the pool cannot serve a query.
async fn health(State(state): State<AppState>) -> AppResult<Json<Value>> {
    questboard_db::health_check(&state.pool)
        .await
        .map_err(AppError::Database)?;
    Ok(Json(json!({ "status": "ok" })))
}
