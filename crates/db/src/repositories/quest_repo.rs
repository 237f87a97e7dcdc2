//! Repository for quests and their required-skill maps.
//!
//! Status transitions are guarded with conditional updates so two racing
//! requests cannot both win: assign, cancel, and complete all include the
//! expected current status in the `WHERE` clause and treat zero updated
//! rows as a conflict.

use std::collections::BTreeMap;

use sqlx::PgPool;

use questboard_core::completion::SkillChange;
use questboard_core::error::CoreError;
use questboard_core::quest::QuestStatus;
use questboard_core::types::DbId;

use crate::models::quest::{CreateQuest, Quest, QuestSkill};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, team_id, title, description, status, assignee_id, \
                       created_by, created_at, updated_at, completed_at";

/// Errors from quest operations that are not plain database failures.
#[derive(Debug, thiserror::Error)]
pub enum QuestRepoError {
    #[error(transparent)]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Core(#[from] CoreError),
}

/// Provides CRUD operations and status transitions for quests.
pub struct QuestRepo;

impl QuestRepo {
    /// Create a quest together with its required-skill rows.
    pub async fn create(
        pool: &PgPool,
        team_id: DbId,
        created_by: DbId,
        input: &CreateQuest,
    ) -> Result<Quest, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO quests (team_id, title, description, created_by)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        let quest = sqlx::query_as::<_, Quest>(&query)
            .bind(team_id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(created_by)
            .fetch_one(&mut *tx)
            .await?;

        for (skill_name, weight) in &input.required_skills {
            sqlx::query(
                "INSERT INTO quest_skills (quest_id, skill_name, weight) VALUES ($1, $2, $3)",
            )
            .bind(quest.id)
            .bind(skill_name)
            .bind(weight)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(quest)
    }

    /// Find a quest by id.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Quest>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM quests WHERE id = $1");
        sqlx::query_as::<_, Quest>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List quests for a team, optionally filtered by status, newest first.
    pub async fn list_for_team(
        pool: &PgPool,
        team_id: DbId,
        status: Option<QuestStatus>,
    ) -> Result<Vec<Quest>, sqlx::Error> {
        match status {
            Some(status) => {
                let query = format!(
                    "SELECT {COLUMNS} FROM quests \
                     WHERE team_id = $1 AND status = $2 \
                     ORDER BY created_at DESC"
                );
                sqlx::query_as::<_, Quest>(&query)
                    .bind(team_id)
                    .bind(status.as_str())
                    .fetch_all(pool)
                    .await
            }
            None => {
                let query = format!(
                    "SELECT {COLUMNS} FROM quests WHERE team_id = $1 ORDER BY created_at DESC"
                );
                sqlx::query_as::<_, Quest>(&query)
                    .bind(team_id)
                    .fetch_all(pool)
                    .await
            }
        }
    }

    /// Load a quest's required skills as a name → weight map.
    pub async fn required_skills(
        pool: &PgPool,
        quest_id: DbId,
    ) -> Result<BTreeMap<String, i32>, sqlx::Error> {
        let rows = sqlx::query_as::<_, QuestSkill>(
            "SELECT quest_id, skill_name, weight FROM quest_skills \
             WHERE quest_id = $1 ORDER BY skill_name",
        )
        .bind(quest_id)
        .fetch_all(pool)
        .await?;
        Ok(rows.into_iter().map(|r| (r.skill_name, r.weight)).collect())
    }

    /// Assign a quest to a user. Conditional on the quest still being open.
    pub async fn assign(
        pool: &PgPool,
        quest_id: DbId,
        assignee_id: DbId,
    ) -> Result<Quest, QuestRepoError> {
        let query = format!(
            "UPDATE quests SET status = $3, assignee_id = $2
             WHERE id = $1 AND status = $4
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Quest>(&query)
            .bind(quest_id)
            .bind(assignee_id)
            .bind(QuestStatus::InProgress.as_str())
            .bind(QuestStatus::Open.as_str())
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| {
                CoreError::Conflict("Quest is no longer open for assignment".into()).into()
            })
    }

    /// Cancel a quest. Conditional on it being open or in progress.
    pub async fn cancel(pool: &PgPool, quest_id: DbId) -> Result<Quest, QuestRepoError> {
        let query = format!(
            "UPDATE quests SET status = $2
             WHERE id = $1 AND status IN ($3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Quest>(&query)
            .bind(quest_id)
            .bind(QuestStatus::Cancelled.as_str())
            .bind(QuestStatus::Open.as_str())
            .bind(QuestStatus::InProgress.as_str())
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| CoreError::Conflict("Quest can no longer be cancelled".into()).into())
    }

    /// Complete a quest and apply XP awards as a single atomic unit.
    ///
    /// The status flip is a compare-and-swap on `(status, assignee_id)`:
    /// of two concurrent turn-in attempts only one sees an updated row,
    /// the other rolls back with a conflict and no XP is awarded twice.
    /// Awards are upserted so a skill the user never tracked (or left
    /// undeclared at `-1`) lands at exactly the gained amount.
    pub async fn complete(
        pool: &PgPool,
        quest_id: DbId,
        assignee_id: DbId,
        awards: &BTreeMap<String, SkillChange>,
    ) -> Result<Quest, QuestRepoError> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "UPDATE quests SET status = $3, completed_at = NOW()
             WHERE id = $1 AND assignee_id = $2 AND status = $4
             RETURNING {COLUMNS}"
        );
        let quest = sqlx::query_as::<_, Quest>(&query)
            .bind(quest_id)
            .bind(assignee_id)
            .bind(QuestStatus::Completed.as_str())
            .bind(QuestStatus::InProgress.as_str())
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| {
                CoreError::Conflict(
                    "Quest was already turned in, cancelled, or reassigned".into(),
                )
            })?;

        for (skill_name, change) in awards {
            sqlx::query(
                "INSERT INTO user_skills (user_id, skill_name, xp, declared_at)
                 VALUES ($1, $2, $3, NOW())
                 ON CONFLICT (user_id, skill_name) DO UPDATE SET
                     xp = GREATEST(user_skills.xp, 0) + $4,
                     declared_at = COALESCE(user_skills.declared_at, NOW())",
            )
            .bind(assignee_id)
            .bind(skill_name)
            .bind(change.gained)
            .bind(change.gained)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(quest)
    }
}
