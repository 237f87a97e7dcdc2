//! Handlers for the user's own skills: listing with level info, one-time
//! declaration, declining, favorites, and LLM-backed suggestions.

use std::collections::BTreeSet;

use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use validator::Validate;

use questboard_core::completion::validate_favorites;
use questboard_core::declaration::{declared_xp, SkillAssessment};
use questboard_core::leveling::{level_info, LevelInfo};
use questboard_core::skill_map::UNDECLARED_XP;
use questboard_db::models::skill::{rows_to_skill_map, UserSkill};
use questboard_db::repositories::SkillRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAuth;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// One skill in the listing: raw row state plus derived level progress.
/// Undeclared skills carry no level info.
#[derive(Debug, Serialize)]
pub struct SkillWithLevel {
    pub skill_name: String,
    pub xp: i64,
    pub is_favorite: bool,
    pub declared: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<LevelInfo>,
}

/// Request body for `POST /user/skills/declare`.
#[derive(Debug, Deserialize, Validate)]
pub struct DeclareRequest {
    #[validate(length(min = 1, max = 128))]
    pub skill_name: String,
    #[validate(nested)]
    pub assessment: SkillAssessment,
}

/// Request body for `PUT /user/favorites`.
#[derive(Debug, Deserialize)]
pub struct SetFavoritesRequest {
    pub skill_names: Vec<String>,
}

/// Request body for `POST /skills/suggest`.
#[derive(Debug, Deserialize, Validate)]
pub struct SuggestRequest {
    #[validate(length(min = 1, max = 4096))]
    pub description: String,
}

/// Response body for `POST /skills/suggest`.
#[derive(Debug, Serialize)]
pub struct SuggestResponse {
    pub skills: Vec<String>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/user/skills
///
/// The requester's skill rows with derived level info for declared skills.
pub async fn list_my_skills(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<DataResponse<Vec<SkillWithLevel>>>> {
    let rows = SkillRepo::list_for_user(&state.pool, user.user_id).await?;
    Ok(Json(DataResponse::new(
        rows.into_iter().map(skill_with_level).collect(),
    )))
}

/// POST /api/v1/user/skills/declare
///
/// One-time self-assessment for a skill. The four sliders are weighted
/// and scaled into the declared XP value; re-declaring is a conflict.
pub async fn declare_skill(
    State(state): State<AppState>,
    user: AuthUser,
    Json(input): Json<DeclareRequest>,
) -> AppResult<Json<DataResponse<SkillWithLevel>>> {
    input
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let xp = declared_xp(&input.assessment);
    let row = SkillRepo::declare(&state.pool, user.user_id, &input.skill_name, xp).await?;

    tracing::info!(
        user_id = user.user_id,
        skill = %input.skill_name,
        xp,
        "Skill declared"
    );
    Ok(Json(DataResponse::new(skill_with_level(row))))
}

/// POST /api/v1/user/skills/{name}/decline
///
/// Decline a skill: declares it with an all-zeros assessment, so it
/// leaves the undeclared state at 0 XP. Same one-time rule as declare.
pub async fn decline_skill(
    State(state): State<AppState>,
    user: AuthUser,
    Path(skill_name): Path<String>,
) -> AppResult<Json<DataResponse<SkillWithLevel>>> {
    let xp = declared_xp(&SkillAssessment::declined());
    let row = SkillRepo::declare(&state.pool, user.user_id, &skill_name, xp).await?;

    tracing::info!(user_id = user.user_id, skill = %skill_name, "Skill declined");
    Ok(Json(DataResponse::new(skill_with_level(row))))
}

/// PUT /api/v1/user/favorites
///
/// Replace the requester's favorite-skill set (at most 3, each a skill
/// they track). Returns the updated skill listing.
pub async fn set_favorites(
    State(state): State<AppState>,
    user: AuthUser,
    Json(input): Json<SetFavoritesRequest>,
) -> AppResult<Json<DataResponse<Vec<SkillWithLevel>>>> {
    let rows = SkillRepo::list_for_user(&state.pool, user.user_id).await?;
    let skills = rows_to_skill_map(&rows)?;
    let favorites: BTreeSet<String> = input.skill_names.iter().cloned().collect();
    validate_favorites(&favorites, &skills)?;

    SkillRepo::set_favorites(&state.pool, user.user_id, &input.skill_names).await?;

    let updated = SkillRepo::list_for_user(&state.pool, user.user_id).await?;
    Ok(Json(DataResponse::new(
        updated.into_iter().map(skill_with_level).collect(),
    )))
}

/// POST /api/v1/skills/suggest
///
/// Suggest skill names for a free-text description via the configured
/// LLM client. Returns 503 when no client is configured.
pub async fn suggest_skills(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
    Json(input): Json<SuggestRequest>,
) -> AppResult<Json<DataResponse<SuggestResponse>>> {
    input
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let client = state.suggestions.as_ref().ok_or_else(|| {
        AppError::ServiceUnavailable("Skill suggestion is not configured".into())
    })?;

    let skills = client.suggest_skills(&input.description).await.map_err(|e| {
        tracing::warn!(error = %e, "Skill suggestion request failed");
        AppError::ServiceUnavailable("Skill suggestion is temporarily unavailable".into())
    })?;

    Ok(Json(DataResponse::new(SuggestResponse { skills })))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Attach derived level progress to a skill row.
pub(crate) fn skill_with_level(row: UserSkill) -> SkillWithLevel {
    let declared = row.xp != UNDECLARED_XP;
    SkillWithLevel {
        level: declared.then(|| level_info(row.xp)),
        skill_name: row.skill_name,
        xp: row.xp,
        is_favorite: row.is_favorite,
        declared,
    }
}
