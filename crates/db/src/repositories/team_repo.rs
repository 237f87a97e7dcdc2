//! Repository for teams, team membership, and the team skill list.
//!
//! Joining a team seeds one undeclared (`-1`) `user_skills` row per team
//! skill; adding a team skill propagates the sentinel row to every current
//! member. Both happen in a transaction so a member's skill map never
//! lags the team's skill list.

use sqlx::{PgPool, Postgres, Transaction};

use questboard_core::skill_map::UNDECLARED_XP;
use questboard_core::types::DbId;

use crate::models::team::{CreateTeam, Team, TeamMember, TeamMemberInfo, TeamSkill};

/// Column list for `teams` queries.
const TEAM_COLUMNS: &str = "id, name, leader_id, created_at, updated_at";

/// Column list for `team_skills` queries.
const SKILL_COLUMNS: &str = "id, team_id, skill_name, created_at";

/// Provides CRUD operations for teams, members, and team skills.
pub struct TeamRepo;

impl TeamRepo {
    /// Create a team with the given leader, who also becomes its first member.
    pub async fn create(
        pool: &PgPool,
        input: &CreateTeam,
        leader_id: DbId,
    ) -> Result<Team, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO teams (name, leader_id) VALUES ($1, $2) RETURNING {TEAM_COLUMNS}"
        );
        let team = sqlx::query_as::<_, Team>(&query)
            .bind(&input.name)
            .bind(leader_id)
            .fetch_one(&mut *tx)
            .await?;

        sqlx::query("INSERT INTO team_members (team_id, user_id) VALUES ($1, $2)")
            .bind(team.id)
            .bind(leader_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(team)
    }

    /// Find a team by id.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Team>, sqlx::Error> {
        let query = format!("SELECT {TEAM_COLUMNS} FROM teams WHERE id = $1");
        sqlx::query_as::<_, Team>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List the teams a user belongs to, ordered by name.
    pub async fn list_for_user(pool: &PgPool, user_id: DbId) -> Result<Vec<Team>, sqlx::Error> {
        let query = "SELECT t.id, t.name, t.leader_id, t.created_at, t.updated_at \
             FROM teams t \
             JOIN team_members tm ON tm.team_id = t.id \
             WHERE tm.user_id = $1 \
             ORDER BY t.name";
        sqlx::query_as::<_, Team>(query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Whether the user is a member of the team.
    pub async fn is_member(
        pool: &PgPool,
        team_id: DbId,
        user_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let row: (bool,) = sqlx::query_as(
            "SELECT EXISTS(SELECT 1 FROM team_members WHERE team_id = $1 AND user_id = $2)",
        )
        .bind(team_id)
        .bind(user_id)
        .fetch_one(pool)
        .await?;
        Ok(row.0)
    }

    /// Add a user to a team, seeding an undeclared `user_skills` row for
    /// every skill the team already requires.
    pub async fn add_member(
        pool: &PgPool,
        team_id: DbId,
        user_id: DbId,
    ) -> Result<TeamMember, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let member = sqlx::query_as::<_, TeamMember>(
            "INSERT INTO team_members (team_id, user_id) VALUES ($1, $2)
             RETURNING team_id, user_id, joined_at",
        )
        .bind(team_id)
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;

        Self::seed_member_skills(&mut tx, team_id, user_id).await?;

        tx.commit().await?;
        Ok(member)
    }

    /// List all members of a team with their usernames, in join order.
    pub async fn list_members(
        pool: &PgPool,
        team_id: DbId,
    ) -> Result<Vec<TeamMemberInfo>, sqlx::Error> {
        sqlx::query_as::<_, TeamMemberInfo>(
            "SELECT tm.user_id, u.username FROM team_members tm \
             JOIN users u ON u.id = tm.user_id \
             WHERE tm.team_id = $1 \
             ORDER BY tm.joined_at",
        )
        .bind(team_id)
        .fetch_all(pool)
        .await
    }

    /// Add a required skill to the team and propagate an undeclared row to
    /// every existing member that does not already track it.
    pub async fn add_skill(
        pool: &PgPool,
        team_id: DbId,
        skill_name: &str,
    ) -> Result<TeamSkill, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO team_skills (team_id, skill_name) VALUES ($1, $2)
             RETURNING {SKILL_COLUMNS}"
        );
        let skill = sqlx::query_as::<_, TeamSkill>(&query)
            .bind(team_id)
            .bind(skill_name)
            .fetch_one(&mut *tx)
            .await?;

        sqlx::query(
            "INSERT INTO user_skills (user_id, skill_name, xp)
             SELECT tm.user_id, $2, $3 FROM team_members tm WHERE tm.team_id = $1
             ON CONFLICT (user_id, skill_name) DO NOTHING",
        )
        .bind(team_id)
        .bind(skill_name)
        .bind(UNDECLARED_XP)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(skill)
    }

    /// List the team's required skills, ordered by name.
    pub async fn list_skills(pool: &PgPool, team_id: DbId) -> Result<Vec<TeamSkill>, sqlx::Error> {
        let query = format!(
            "SELECT {SKILL_COLUMNS} FROM team_skills WHERE team_id = $1 ORDER BY skill_name"
        );
        sqlx::query_as::<_, TeamSkill>(&query)
            .bind(team_id)
            .fetch_all(pool)
            .await
    }

    async fn seed_member_skills(
        tx: &mut Transaction<'_, Postgres>,
        team_id: DbId,
        user_id: DbId,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO user_skills (user_id, skill_name, xp)
             SELECT $2, ts.skill_name, $3 FROM team_skills ts WHERE ts.team_id = $1
             ON CONFLICT (user_id, skill_name) DO NOTHING",
        )
        .bind(team_id)
        .bind(user_id)
        .bind(UNDECLARED_XP)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }
}
