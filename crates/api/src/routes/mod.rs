//! API route tree.
//!
//! ```text
//! /health
//! /api/v1
//! ├── /auth
//! │   ├── POST /register
//! │   ├── POST /login
//! │   ├── POST /refresh
//! │   └── POST /logout
//! ├── /teams
//! │   ├── POST /                      create team (guild leader)
//! │   ├── GET  /                      teams the requester belongs to
//! │   ├── GET  /{id}                  team detail
//! │   ├── POST /{id}/members          add member (team leader)
//! │   ├── GET  /{id}/members          members with skill maps
//! │   ├── POST /{id}/skills           add required skill (team leader)
//! │   ├── GET  /{id}/skills           team skill list
//! │   ├── POST /{id}/rank-candidates  rank members against a skill map
//! │   ├── POST /{id}/quests           create quest (team leader)
//! │   └── GET  /{id}/quests           list quests (?status filter)
//! ├── /quests
//! │   ├── GET  /{id}                  quest detail with required skills
//! │   ├── POST /{id}/assign           self-assign / leader assigns
//! │   ├── POST /{id}/cancel           cancel (team leader)
//! │   └── POST /{id}/turn-in          complete + XP award
//! ├── /user
//! │   ├── GET  /me                    profile with skill levels
//! │   ├── GET  /skills                skill list with level info
//! │   ├── POST /skills/declare        slider assessment -> declared XP
//! │   ├── POST /skills/{name}/decline declare with zero contribution
//! │   └── PUT  /favorites             set favorite skills (max 3)
//! └── /skills
//!     └── POST /suggest               LLM skill suggestion
//! ```

mod auth;
mod health;
mod quests;
mod skills;
mod teams;
mod users;

use axum::Router;

use crate::state::AppState;

/// Build the full application router.
pub fn api_routes() -> Router<AppState> {
    let v1 = Router::new()
        .nest("/auth", auth::routes())
        .nest("/teams", teams::routes())
        .nest("/quests", quests::routes())
        .nest("/user", users::routes())
        .nest("/skills", skills::routes());

    Router::new()
        .merge(health::routes())
        .nest("/api/v1", v1)
}
