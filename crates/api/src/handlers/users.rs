//! Handlers for the `/user` resource (current-user profile).

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use questboard_core::error::CoreError;
use questboard_db::models::user::UserResponse;
use questboard_db::repositories::{RoleRepo, SkillRepo, UserRepo};

use super::skills::{skill_with_level, SkillWithLevel};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Response body for `GET /user/me`: profile plus skill listing with
/// per-skill level info.
#[derive(Debug, Serialize)]
pub struct MeResponse {
    #[serde(flatten)]
    pub user: UserResponse,
    pub skills: Vec<SkillWithLevel>,
}

/// GET /api/v1/user/me
pub async fn me(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> AppResult<Json<DataResponse<MeResponse>>> {
    let user = UserRepo::find_by_id(&state.pool, auth_user.user_id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "user",
                id: auth_user.user_id,
            })
        })?;

    let role = RoleRepo::resolve_name(&state.pool, user.role_id).await?;
    let skill_rows = SkillRepo::list_for_user(&state.pool, user.id).await?;

    Ok(Json(DataResponse::new(MeResponse {
        user: UserResponse {
            id: user.id,
            username: user.username,
            email: user.email,
            role,
            is_active: user.is_active,
            created_at: user.created_at,
        },
        skills: skill_rows.into_iter().map(skill_with_level).collect(),
    })))
}
