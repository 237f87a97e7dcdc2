//! Repository for the `user_skills` table.
//!
//! Skill rows are created at the undeclared sentinel (`-1`) when a user
//! joins a team (see `TeamRepo`), transition to a non-negative value
//! exactly once via declaration, and afterwards only ever increase through
//! quest completion (see `QuestRepo::complete`).

use sqlx::PgPool;

use questboard_core::completion::MAX_FAVORITE_SKILLS;
use questboard_core::error::CoreError;
use questboard_core::skill_map::UNDECLARED_XP;
use questboard_core::types::DbId;

use crate::models::skill::UserSkill;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, user_id, skill_name, xp, is_favorite, declared_at, updated_at";

/// Errors from skill operations that are not plain database failures.
#[derive(Debug, thiserror::Error)]
pub enum SkillRepoError {
    #[error(transparent)]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Core(#[from] CoreError),
}

/// Provides operations on per-user skill rows.
pub struct SkillRepo;

impl SkillRepo {
    /// List all skill rows for a user, ordered by skill name.
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<UserSkill>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM user_skills WHERE user_id = $1 ORDER BY skill_name"
        );
        sqlx::query_as::<_, UserSkill>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// List skill rows for every member of a team, ordered by user then skill.
    ///
    /// Used to build candidate profiles for match ranking.
    pub async fn list_for_team_members(
        pool: &PgPool,
        team_id: DbId,
    ) -> Result<Vec<UserSkill>, sqlx::Error> {
        let query = format!(
            "SELECT us.{} FROM user_skills us \
             JOIN team_members tm ON tm.user_id = us.user_id \
             WHERE tm.team_id = $1 \
             ORDER BY us.user_id, us.skill_name",
            COLUMNS.replace(", ", ", us.")
        );
        sqlx::query_as::<_, UserSkill>(&query)
            .bind(team_id)
            .fetch_all(pool)
            .await
    }

    /// Declare a skill: transition its row from the `-1` sentinel to the
    /// given XP value, exactly once.
    ///
    /// The conditional `WHERE xp = -1` makes re-declaration lose the
    /// update; that case surfaces as [`CoreError::Conflict`]. A skill the
    /// user does not track at all surfaces as [`CoreError::Validation`].
    pub async fn declare(
        pool: &PgPool,
        user_id: DbId,
        skill_name: &str,
        xp: i64,
    ) -> Result<UserSkill, SkillRepoError> {
        if xp < 0 {
            return Err(CoreError::Validation(format!(
                "Declared XP must be non-negative, got {xp}"
            ))
            .into());
        }

        let query = format!(
            "UPDATE user_skills SET xp = $3, declared_at = NOW()
             WHERE user_id = $1 AND skill_name = $2 AND xp = $4
             RETURNING {COLUMNS}"
        );
        let updated = sqlx::query_as::<_, UserSkill>(&query)
            .bind(user_id)
            .bind(skill_name)
            .bind(xp)
            .bind(UNDECLARED_XP)
            .fetch_optional(pool)
            .await?;

        if let Some(row) = updated {
            return Ok(row);
        }

        // Distinguish "already declared" from "skill not tracked".
        let exists: (bool,) = sqlx::query_as(
            "SELECT EXISTS(SELECT 1 FROM user_skills WHERE user_id = $1 AND skill_name = $2)",
        )
        .bind(user_id)
        .bind(skill_name)
        .fetch_one(pool)
        .await?;

        if exists.0 {
            Err(CoreError::Conflict(format!(
                "Skill '{skill_name}' has already been declared"
            ))
            .into())
        } else {
            Err(CoreError::Validation(format!(
                "Skill '{skill_name}' is not assigned to this user"
            ))
            .into())
        }
    }

    /// Replace the user's favorite-skill set (at most
    /// [`MAX_FAVORITE_SKILLS`]), clearing previous flags in the same
    /// transaction.
    ///
    /// Membership of each name in the user's skill rows is the caller's
    /// concern (`validate_favorites` against the loaded map); this method
    /// only enforces the cardinality cap defensively.
    pub async fn set_favorites(
        pool: &PgPool,
        user_id: DbId,
        skill_names: &[String],
    ) -> Result<(), SkillRepoError> {
        if skill_names.len() > MAX_FAVORITE_SKILLS {
            return Err(CoreError::Validation(format!(
                "At most {MAX_FAVORITE_SKILLS} favorite skills allowed"
            ))
            .into());
        }

        let mut tx = pool.begin().await?;

        sqlx::query("UPDATE user_skills SET is_favorite = false WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            "UPDATE user_skills SET is_favorite = true
             WHERE user_id = $1 AND skill_name = ANY($2)",
        )
        .bind(user_id)
        .bind(skill_names)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }
}
