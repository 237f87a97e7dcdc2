//! Routes under `/api/v1/user`.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::{skills, users};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/me", get(users::me))
        .route("/skills", get(skills::list_my_skills))
        .route("/skills/declare", post(skills::declare_skill))
        .route("/skills/{name}/decline", post(skills::decline_skill))
        .route("/favorites", put(skills::set_favorites))
}
