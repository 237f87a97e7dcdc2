//! Handlers for the `/teams` resource: team CRUD, membership, the team
//! skill list, and candidate ranking.

use std::collections::BTreeMap;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use validator::Validate;

use questboard_core::error::CoreError;
use questboard_core::matching::{rank_candidates, CandidateProfile};
use questboard_core::skill_map::SkillMap;
use questboard_core::types::DbId;
use questboard_db::models::skill::rows_to_skill_map;
use questboard_db::models::team::{Team, TeamSkill};
use questboard_db::repositories::{SkillRepo, TeamRepo, UserRepo};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireGuildLeader;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /teams`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTeamRequest {
    #[validate(length(min = 1, max = 128))]
    pub name: String,
}

/// Request body for `POST /teams/{id}/members`.
#[derive(Debug, Deserialize)]
pub struct AddMemberRequest {
    pub user_id: DbId,
}

/// Request body for `POST /teams/{id}/skills`.
#[derive(Debug, Deserialize, Validate)]
pub struct AddSkillRequest {
    #[validate(length(min = 1, max = 128))]
    pub skill_name: String,
}

/// Request body for `POST /teams/{id}/rank-candidates`.
#[derive(Debug, Deserialize)]
pub struct RankCandidatesRequest {
    /// Skill name -> target XP to rank against.
    pub required_skills: BTreeMap<String, i32>,
}

/// A member with their full skill map, for the members listing.
#[derive(Debug, Serialize)]
pub struct MemberWithSkills {
    pub user_id: DbId,
    pub username: String,
    pub skills: SkillMap,
}

/// One entry of the rank-candidates response.
#[derive(Debug, Serialize)]
pub struct RankedMember {
    pub user_id: DbId,
    pub username: String,
    pub score: f64,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/teams
///
/// Create a team led by the requester. Guild leaders only.
pub async fn create_team(
    State(state): State<AppState>,
    RequireGuildLeader(user): RequireGuildLeader,
    Json(input): Json<CreateTeamRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<Team>>)> {
    input
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let team = TeamRepo::create(
        &state.pool,
        &questboard_db::models::team::CreateTeam { name: input.name },
        user.user_id,
    )
    .await?;

    tracing::info!(team_id = team.id, leader_id = user.user_id, "Team created");
    Ok((StatusCode::CREATED, Json(DataResponse::new(team))))
}

/// GET /api/v1/teams
///
/// List the teams the requester belongs to.
pub async fn list_my_teams(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<DataResponse<Vec<Team>>>> {
    let teams = TeamRepo::list_for_user(&state.pool, user.user_id).await?;
    Ok(Json(DataResponse::new(teams)))
}

/// GET /api/v1/teams/{id}
///
/// Team detail. Members only.
pub async fn get_team(
    State(state): State<AppState>,
    user: AuthUser,
    Path(team_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Team>>> {
    let team = load_team(&state, team_id).await?;
    ensure_member(&state, team_id, user.user_id).await?;
    Ok(Json(DataResponse::new(team)))
}

/// POST /api/v1/teams/{id}/members
///
/// Add a user to the team. Restricted to the team's leader. Joining seeds
/// an undeclared skill row per team skill for the new member.
pub async fn add_member(
    State(state): State<AppState>,
    user: AuthUser,
    Path(team_id): Path<DbId>,
    Json(input): Json<AddMemberRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<questboard_db::models::team::TeamMember>>)> {
    let team = load_team(&state, team_id).await?;
    ensure_leader(&team, user.user_id)?;

    // The new member must exist and be active.
    let new_member = UserRepo::find_by_id(&state.pool, input.user_id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "user",
                id: input.user_id,
            })
        })?;
    if !new_member.is_active {
        return Err(AppError::BadRequest(
            "Cannot add a deactivated user to a team".into(),
        ));
    }
    if TeamRepo::is_member(&state.pool, team_id, input.user_id).await? {
        return Err(AppError::Core(CoreError::Conflict(
            "User is already a member of this team".into(),
        )));
    }

    let member = TeamRepo::add_member(&state.pool, team_id, input.user_id).await?;

    tracing::info!(team_id, user_id = input.user_id, "Member added to team");
    Ok((StatusCode::CREATED, Json(DataResponse::new(member))))
}

/// GET /api/v1/teams/{id}/members
///
/// List members with their full skill maps. Members only.
pub async fn list_members(
    State(state): State<AppState>,
    user: AuthUser,
    Path(team_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<MemberWithSkills>>>> {
    load_team(&state, team_id).await?;
    ensure_member(&state, team_id, user.user_id).await?;

    let members = TeamRepo::list_members(&state.pool, team_id).await?;
    let skill_rows = SkillRepo::list_for_team_members(&state.pool, team_id).await?;

    // Group skill rows by user; rows are ordered by (user_id, skill_name).
    let mut by_user: BTreeMap<DbId, SkillMap> = BTreeMap::new();
    for row in &skill_rows {
        by_user
            .entry(row.user_id)
            .or_default()
            .set(&row.skill_name, row.xp)
            .map_err(AppError::Core)?;
    }

    let listing = members
        .into_iter()
        .map(|m| MemberWithSkills {
            skills: by_user.remove(&m.user_id).unwrap_or_default(),
            user_id: m.user_id,
            username: m.username,
        })
        .collect();

    Ok(Json(DataResponse::new(listing)))
}

/// POST /api/v1/teams/{id}/skills
///
/// Add a required skill to the team. Restricted to the team's leader.
/// Propagates an undeclared skill row to every current member.
pub async fn add_team_skill(
    State(state): State<AppState>,
    user: AuthUser,
    Path(team_id): Path<DbId>,
    Json(input): Json<AddSkillRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<TeamSkill>>)> {
    input
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let team = load_team(&state, team_id).await?;
    ensure_leader(&team, user.user_id)?;

    let skill = TeamRepo::add_skill(&state.pool, team_id, &input.skill_name).await?;
    Ok((StatusCode::CREATED, Json(DataResponse::new(skill))))
}

/// GET /api/v1/teams/{id}/skills
///
/// The team's required-skill list. Members only.
pub async fn list_team_skills(
    State(state): State<AppState>,
    user: AuthUser,
    Path(team_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<TeamSkill>>>> {
    load_team(&state, team_id).await?;
    ensure_member(&state, team_id, user.user_id).await?;

    let skills = TeamRepo::list_skills(&state.pool, team_id).await?;
    Ok(Json(DataResponse::new(skills)))
}

/// POST /api/v1/teams/{id}/rank-candidates
///
/// Rank the team's members against an ad-hoc required-skill map, best
/// match first. Restricted to the team's leader; used while composing a
/// quest to pick an assignee.
pub async fn rank_team_candidates(
    State(state): State<AppState>,
    user: AuthUser,
    Path(team_id): Path<DbId>,
    Json(input): Json<RankCandidatesRequest>,
) -> AppResult<Json<DataResponse<Vec<RankedMember>>>> {
    let team = load_team(&state, team_id).await?;
    ensure_leader(&team, user.user_id)?;

    let members = TeamRepo::list_members(&state.pool, team_id).await?;
    let skill_rows = SkillRepo::list_for_team_members(&state.pool, team_id).await?;

    let mut by_user: BTreeMap<DbId, Vec<questboard_db::models::skill::UserSkill>> =
        BTreeMap::new();
    for row in skill_rows {
        by_user.entry(row.user_id).or_default().push(row);
    }

    let usernames: BTreeMap<DbId, String> = members
        .iter()
        .map(|m| (m.user_id, m.username.clone()))
        .collect();

    let candidates = members
        .iter()
        .map(|m| {
            let rows = by_user.remove(&m.user_id).unwrap_or_default();
            Ok(CandidateProfile {
                user_id: m.user_id,
                skills: rows_to_skill_map(&rows)?,
            })
        })
        .collect::<Result<Vec<_>, CoreError>>()?;

    let ranked = rank_candidates(&input.required_skills, candidates)
        .into_iter()
        .map(|r| RankedMember {
            username: usernames.get(&r.user_id).cloned().unwrap_or_default(),
            user_id: r.user_id,
            score: r.score,
        })
        .collect();

    Ok(Json(DataResponse::new(ranked)))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Load a team or fail with 404.
pub(crate) async fn load_team(state: &AppState, team_id: DbId) -> AppResult<Team> {
    TeamRepo::find_by_id(&state.pool, team_id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "team",
                id: team_id,
            })
        })
}

/// Fail with 403 unless the user is a member of the team.
pub(crate) async fn ensure_member(
    state: &AppState,
    team_id: DbId,
    user_id: DbId,
) -> AppResult<()> {
    if TeamRepo::is_member(&state.pool, team_id, user_id).await? {
        Ok(())
    } else {
        Err(AppError::Core(CoreError::Forbidden(
            "Not a member of this team".into(),
        )))
    }
}

/// Fail with 403 unless the user leads the team.
pub(crate) fn ensure_leader(team: &Team, user_id: DbId) -> AppResult<()> {
    if team.leader_id == user_id {
        Ok(())
    } else {
        Err(AppError::Core(CoreError::Forbidden(
            "Only the team leader may do this".into(),
        )))
    }
}
