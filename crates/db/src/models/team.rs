//! Team entity models and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use questboard_core::types::{DbId, Timestamp};

/// A row from the `teams` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Team {
    pub id: DbId,
    pub name: String,
    pub leader_id: DbId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A row from the `team_members` join table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TeamMember {
    pub team_id: DbId,
    pub user_id: DbId,
    pub joined_at: Timestamp,
}

/// A row from the `team_skills` table: one required skill of a team.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TeamSkill {
    pub id: DbId,
    pub team_id: DbId,
    pub skill_name: String,
    pub created_at: Timestamp,
}

/// A team member joined with their username, for listings and candidate
/// ranking responses.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TeamMemberInfo {
    pub user_id: DbId,
    pub username: String,
}

/// DTO for creating a new team.
#[derive(Debug, Deserialize)]
pub struct CreateTeam {
    pub name: String,
}
