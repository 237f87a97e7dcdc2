//! Routes under `/api/v1/skills`.

use axum::routing::post;
use axum::Router;

use crate::handlers::skills;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/suggest", post(skills::suggest_skills))
}
