//! Handlers for the `/quests` resource: creation, listing, assignment,
//! cancellation, and the turn-in transaction that awards XP.

use std::collections::{BTreeMap, BTreeSet};

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use validator::Validate;

use questboard_core::completion::compute_skill_awards;
use questboard_core::error::CoreError;
use questboard_core::leveling::{level_info, LevelInfo};
use questboard_core::quest::{check_turn_in, QuestStatus};
use questboard_core::types::DbId;
use questboard_db::models::quest::{CreateQuest, Quest};
use questboard_db::models::skill::rows_to_skill_map;
use questboard_db::repositories::{QuestRepo, SkillRepo};

use super::teams::{ensure_leader, ensure_member, load_team};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Maximum proficiency weight per required skill.
const MAX_SKILL_WEIGHT: i32 = 3;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /teams/{id}/quests`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateQuestRequest {
    #[validate(length(min = 1, max = 256))]
    pub title: String,
    pub description: Option<String>,
    /// Required skills mapped to proficiency weights (0-3).
    pub required_skills: BTreeMap<String, i32>,
}

/// Query string for `GET /teams/{id}/quests`.
#[derive(Debug, Deserialize)]
pub struct ListQuestsQuery {
    pub status: Option<QuestStatus>,
}

/// Request body for `POST /quests/{id}/assign`. Omitting `assignee_id`
/// self-assigns.
#[derive(Debug, Default, Deserialize)]
pub struct AssignRequest {
    pub assignee_id: Option<DbId>,
}

/// Quest detail with its required-skill weights.
#[derive(Debug, Serialize)]
pub struct QuestDetail {
    #[serde(flatten)]
    pub quest: Quest,
    pub required_skills: BTreeMap<String, i32>,
}

/// One entry of the turn-in response's `skill_changes` map.
#[derive(Debug, Serialize)]
pub struct SkillChangeResponse {
    pub before: i64,
    pub after: i64,
    pub gained: i64,
    pub is_favorite: bool,
    pub leveled_up: bool,
    pub level: LevelInfo,
}

/// Response body for `POST /quests/{id}/turn-in`.
#[derive(Debug, Serialize)]
pub struct TurnInResponse {
    pub quest: Quest,
    pub skill_changes: BTreeMap<String, SkillChangeResponse>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/teams/{id}/quests
///
/// Create a quest on a team. Restricted to the team's leader. Each
/// required skill carries a proficiency weight in 0-3.
pub async fn create_quest(
    State(state): State<AppState>,
    user: AuthUser,
    Path(team_id): Path<DbId>,
    Json(input): Json<CreateQuestRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<QuestDetail>>)> {
    input
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;
    for (name, &weight) in &input.required_skills {
        if !(0..=MAX_SKILL_WEIGHT).contains(&weight) {
            return Err(AppError::BadRequest(format!(
                "Weight for skill '{name}' must be between 0 and {MAX_SKILL_WEIGHT}, got {weight}"
            )));
        }
    }

    let team = load_team(&state, team_id).await?;
    ensure_leader(&team, user.user_id)?;

    let quest = QuestRepo::create(
        &state.pool,
        team_id,
        user.user_id,
        &CreateQuest {
            title: input.title,
            description: input.description,
            required_skills: input.required_skills.clone(),
        },
    )
    .await?;

    tracing::info!(quest_id = quest.id, team_id, "Quest created");
    Ok((
        StatusCode::CREATED,
        Json(DataResponse::new(QuestDetail {
            quest,
            required_skills: input.required_skills,
        })),
    ))
}

/// GET /api/v1/teams/{id}/quests
///
/// List the team's quests, newest first, optionally filtered by `?status=`.
/// Members only.
pub async fn list_quests(
    State(state): State<AppState>,
    user: AuthUser,
    Path(team_id): Path<DbId>,
    Query(query): Query<ListQuestsQuery>,
) -> AppResult<Json<DataResponse<Vec<Quest>>>> {
    load_team(&state, team_id).await?;
    ensure_member(&state, team_id, user.user_id).await?;

    let quests = QuestRepo::list_for_team(&state.pool, team_id, query.status).await?;
    Ok(Json(DataResponse::new(quests)))
}

/// GET /api/v1/quests/{id}
///
/// Quest detail with required-skill weights. Team members only.
pub async fn get_quest(
    State(state): State<AppState>,
    user: AuthUser,
    Path(quest_id): Path<DbId>,
) -> AppResult<Json<DataResponse<QuestDetail>>> {
    let quest = load_quest(&state, quest_id).await?;
    ensure_member(&state, quest.team_id, user.user_id).await?;

    let required_skills = QuestRepo::required_skills(&state.pool, quest_id).await?;
    Ok(Json(DataResponse::new(QuestDetail {
        quest,
        required_skills,
    })))
}

/// POST /api/v1/quests/{id}/assign
///
/// Assign an open quest. Any member may self-assign; assigning someone
/// else is restricted to the team's leader. The target must be a member.
pub async fn assign_quest(
    State(state): State<AppState>,
    user: AuthUser,
    Path(quest_id): Path<DbId>,
    Json(input): Json<AssignRequest>,
) -> AppResult<Json<DataResponse<Quest>>> {
    let quest = load_quest(&state, quest_id).await?;
    let team = load_team(&state, quest.team_id).await?;
    ensure_member(&state, quest.team_id, user.user_id).await?;

    let assignee_id = input.assignee_id.unwrap_or(user.user_id);
    if assignee_id != user.user_id {
        ensure_leader(&team, user.user_id)?;
        ensure_member(&state, quest.team_id, assignee_id).await?;
    }

    // Early status check for a precise error; the repository re-checks
    // under a conditional update so a race still loses cleanly.
    let status = QuestStatus::parse(&quest.status)?;
    if !status.can_assign() {
        return Err(AppError::Core(CoreError::Conflict(format!(
            "Quest cannot be assigned from status '{}'",
            status.as_str()
        ))));
    }

    let updated = QuestRepo::assign(&state.pool, quest_id, assignee_id).await?;
    tracing::info!(quest_id, assignee_id, "Quest assigned");
    Ok(Json(DataResponse::new(updated)))
}

/// POST /api/v1/quests/{id}/cancel
///
/// Cancel an open or in-progress quest. Restricted to the team's leader.
pub async fn cancel_quest(
    State(state): State<AppState>,
    user: AuthUser,
    Path(quest_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Quest>>> {
    let quest = load_quest(&state, quest_id).await?;
    let team = load_team(&state, quest.team_id).await?;
    ensure_leader(&team, user.user_id)?;

    let updated = QuestRepo::cancel(&state.pool, quest_id).await?;
    tracing::info!(quest_id, "Quest cancelled");
    Ok(Json(DataResponse::new(updated)))
}

/// POST /api/v1/quests/{id}/turn-in
///
/// Complete an in-progress quest. Only the assignee may turn in. The
/// response reports the updated quest plus the per-skill XP changes,
/// each with derived level info and a `leveled_up` flag.
pub async fn turn_in_quest(
    State(state): State<AppState>,
    user: AuthUser,
    Path(quest_id): Path<DbId>,
) -> AppResult<Json<DataResponse<TurnInResponse>>> {
    let quest = load_quest(&state, quest_id).await?;

    let status = QuestStatus::parse(&quest.status)?;
    check_turn_in(status, quest.assignee_id, user.user_id)?;

    // Load what the award computation needs: the quest's weights and the
    // assignee's skill map + favorite set.
    let required = QuestRepo::required_skills(&state.pool, quest_id).await?;
    let skill_rows = SkillRepo::list_for_user(&state.pool, user.user_id).await?;
    let skills = rows_to_skill_map(&skill_rows)?;
    let favorites: BTreeSet<String> = skill_rows
        .iter()
        .filter(|r| r.is_favorite)
        .map(|r| r.skill_name.clone())
        .collect();

    let awards = compute_skill_awards(&required, &skills, &favorites);

    // Atomic status flip + XP upserts; a concurrent turn-in conflicts here.
    let completed = QuestRepo::complete(&state.pool, quest_id, user.user_id, &awards).await?;

    let skill_changes = awards
        .into_iter()
        .map(|(name, change)| {
            (
                name,
                SkillChangeResponse {
                    before: change.before,
                    after: change.after,
                    gained: change.gained,
                    is_favorite: change.is_favorite,
                    leveled_up: change.leveled_up(),
                    level: level_info(change.after),
                },
            )
        })
        .collect();

    tracing::info!(quest_id, assignee_id = user.user_id, "Quest turned in");
    Ok(Json(DataResponse::new(TurnInResponse {
        quest: completed,
        skill_changes,
    })))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Load a quest or fail with 404.
async fn load_quest(state: &AppState, quest_id: DbId) -> AppResult<Quest> {
    QuestRepo::find_by_id(&state.pool, quest_id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "quest",
                id: quest_id,
            })
        })
}
