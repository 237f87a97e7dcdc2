//! Quest entity models and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use questboard_core::types::{DbId, Timestamp};

/// A row from the `quests` table.
///
/// `status` is lowercase text matching `questboard_core::quest::QuestStatus`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Quest {
    pub id: DbId,
    pub team_id: DbId,
    pub title: String,
    pub description: Option<String>,
    pub status: String,
    pub assignee_id: Option<DbId>,
    pub created_by: DbId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub completed_at: Option<Timestamp>,
}

/// A row from the `quest_skills` table: one required skill with its
/// proficiency weight (0-3).
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct QuestSkill {
    pub quest_id: DbId,
    pub skill_name: String,
    pub weight: i32,
}

/// DTO for creating a new quest.
#[derive(Debug, Deserialize)]
pub struct CreateQuest {
    pub title: String,
    pub description: Option<String>,
    /// Required skills mapped to proficiency weights (0-3).
    pub required_skills: std::collections::BTreeMap<String, i32>,
}
