//! Routes under `/api/v1/quests`.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::quests;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/{id}", get(quests::get_quest))
        .route("/{id}/assign", post(quests::assign_quest))
        .route("/{id}/cancel", post(quests::cancel_quest))
        .route("/{id}/turn-in", post(quests::turn_in_quest))
}
