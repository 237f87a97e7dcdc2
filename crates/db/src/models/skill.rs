//! Per-user skill rows.
//!
//! One row per (user, skill). `xp = -1` is the undeclared sentinel; the
//! `CHECK (xp >= -1)` constraint mirrors the `SkillMap` invariant.

use serde::Serialize;
use sqlx::FromRow;

use questboard_core::skill_map::SkillMap;
use questboard_core::types::{DbId, Timestamp};

/// A row from the `user_skills` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct UserSkill {
    pub id: DbId,
    pub user_id: DbId,
    pub skill_name: String,
    pub xp: i64,
    pub is_favorite: bool,
    pub declared_at: Option<Timestamp>,
    pub updated_at: Timestamp,
}

/// Fold skill rows into the domain [`SkillMap`].
///
/// Row values already satisfy the map's invariant via the table CHECK
/// constraint, so a constraint failure here indicates schema drift.
pub fn rows_to_skill_map(rows: &[UserSkill]) -> Result<SkillMap, questboard_core::error::CoreError> {
    SkillMap::from_entries(rows.iter().map(|r| (r.skill_name.clone(), r.xp)))
}
