//! Routes under `/api/v1/teams`.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{quests, teams};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", post(teams::create_team).get(teams::list_my_teams))
        .route("/{id}", get(teams::get_team))
        .route(
            "/{id}/members",
            post(teams::add_member).get(teams::list_members),
        )
        .route(
            "/{id}/skills",
            post(teams::add_team_skill).get(teams::list_team_skills),
        )
        .route("/{id}/rank-candidates", post(teams::rank_team_candidates))
        .route(
            "/{id}/quests",
            post(quests::create_quest).get(quests::list_quests),
        )
}
