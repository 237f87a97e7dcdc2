//! HTTP-level integration tests for the quest lifecycle: creation,
//! assignment, cancellation, and the turn-in XP award transaction.

mod common;

use axum::http::StatusCode;
use common::{body_json, get_auth, post_json, post_json_auth};
use sqlx::PgPool;

const PASSWORD: &str = "strong_password_123!";

async fn register(pool: &PgPool, username: &str, role: &str) -> (String, i64) {
    let app = common::build_test_app(pool.clone());
    let body = serde_json::json!({
        "username": username,
        "email": format!("{username}@test.com"),
        "password": PASSWORD,
        "role": role,
    });
    let response = post_json(app, "/api/v1/auth/register", body).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    (
        json["access_token"].as_str().unwrap().to_string(),
        json["user"]["id"].as_i64().unwrap(),
    )
}

/// Set up a team with a leader and one adventurer member, plus the given
/// team skills. Returns `(leader_token, member_token, member_id, team_id)`.
async fn setup_team(pool: &PgPool, skills: &[&str]) -> (String, String, i64, i64) {
    let (leader_token, _) = register(pool, "quest_leader", "guild_leader").await;
    let (member_token, member_id) = register(pool, "quest_member", "adventurer").await;

    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(
        app,
        "/api/v1/teams",
        serde_json::json!({ "name": "Questing Guild" }),
        &leader_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let team_id = body_json(response).await["data"]["id"].as_i64().unwrap();

    for skill in skills {
        let app = common::build_test_app(pool.clone());
        let response = post_json_auth(
            app,
            &format!("/api/v1/teams/{team_id}/skills"),
            serde_json::json!({ "skill_name": skill }),
            &leader_token,
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(
        app,
        &format!("/api/v1/teams/{team_id}/members"),
        serde_json::json!({ "user_id": member_id }),
        &leader_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    (leader_token, member_token, member_id, team_id)
}

async fn create_quest(
    pool: &PgPool,
    token: &str,
    team_id: i64,
    required: serde_json::Value,
) -> i64 {
    let app = common::build_test_app(pool.clone());
    let body = serde_json::json!({
        "title": "Slay the backlog",
        "description": "A mountain of tickets",
        "required_skills": required,
    });
    let response =
        post_json_auth(app, &format!("/api/v1/teams/{team_id}/quests"), body, token).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["data"]["id"].as_i64().unwrap()
}

async fn assign_self(pool: &PgPool, token: &str, quest_id: i64) {
    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(
        app,
        &format!("/api/v1/quests/{quest_id}/assign"),
        serde_json::json!({}),
        token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
}

// ---------------------------------------------------------------------------
// Creation and listing
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn test_quest_creation_is_leader_only(pool: PgPool) {
    let (_leader, member_token, _, team_id) = setup_team(&pool, &["rust"]).await;

    let app = common::build_test_app(pool);
    let body = serde_json::json!({
        "title": "Not allowed",
        "required_skills": { "rust": 2 },
    });
    let response =
        post_json_auth(app, &format!("/api/v1/teams/{team_id}/quests"), body, &member_token)
            .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_quest_weight_out_of_range_rejected(pool: PgPool) {
    let (leader_token, _, _, team_id) = setup_team(&pool, &["rust"]).await;

    let app = common::build_test_app(pool);
    let body = serde_json::json!({
        "title": "Too heavy",
        "required_skills": { "rust": 4 },
    });
    let response =
        post_json_auth(app, &format!("/api/v1/teams/{team_id}/quests"), body, &leader_token)
            .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_list_quests_with_status_filter(pool: PgPool) {
    let (leader_token, member_token, _, team_id) = setup_team(&pool, &["rust"]).await;

    let open_id = create_quest(&pool, &leader_token, team_id, serde_json::json!({ "rust": 1 }))
        .await;
    let taken_id =
        create_quest(&pool, &leader_token, team_id, serde_json::json!({ "rust": 2 })).await;
    assign_self(&pool, &member_token, taken_id).await;

    let app = common::build_test_app(pool.clone());
    let response = get_auth(
        app,
        &format!("/api/v1/teams/{team_id}/quests?status=open"),
        &member_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let quests = json["data"].as_array().unwrap();
    assert_eq!(quests.len(), 1);
    assert_eq!(quests[0]["id"], open_id);

    // Unfiltered listing returns both.
    let app = common::build_test_app(pool);
    let response =
        get_auth(app, &format!("/api/v1/teams/{team_id}/quests"), &member_token).await;
    let json = body_json(response).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 2);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_quest_detail_includes_required_skills(pool: PgPool) {
    let (leader_token, member_token, _, team_id) = setup_team(&pool, &["rust", "sql"]).await;
    let quest_id = create_quest(
        &pool,
        &leader_token,
        team_id,
        serde_json::json!({ "rust": 2, "sql": 1 }),
    )
    .await;

    let app = common::build_test_app(pool);
    let response = get_auth(app, &format!("/api/v1/quests/{quest_id}"), &member_token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["status"], "open");
    assert_eq!(json["data"]["required_skills"]["rust"], 2);
    assert_eq!(json["data"]["required_skills"]["sql"], 1);
}

// ---------------------------------------------------------------------------
// Assignment and cancellation
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn test_member_self_assigns(pool: PgPool) {
    let (leader_token, member_token, member_id, team_id) = setup_team(&pool, &["rust"]).await;
    let quest_id =
        create_quest(&pool, &leader_token, team_id, serde_json::json!({ "rust": 1 })).await;

    let app = common::build_test_app(pool);
    let response = post_json_auth(
        app,
        &format!("/api/v1/quests/{quest_id}/assign"),
        serde_json::json!({}),
        &member_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["status"], "in_progress");
    assert_eq!(json["data"]["assignee_id"], member_id);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_only_leader_assigns_others(pool: PgPool) {
    let (leader_token, member_token, _, team_id) = setup_team(&pool, &["rust"]).await;
    let (_, other_id) = register(&pool, "other_member", "adventurer").await;

    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(
        app,
        &format!("/api/v1/teams/{team_id}/members"),
        serde_json::json!({ "user_id": other_id }),
        &leader_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let quest_id =
        create_quest(&pool, &leader_token, team_id, serde_json::json!({ "rust": 1 })).await;

    // A member assigning someone else is forbidden.
    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(
        app,
        &format!("/api/v1/quests/{quest_id}/assign"),
        serde_json::json!({ "assignee_id": other_id }),
        &member_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // The leader can.
    let app = common::build_test_app(pool);
    let response = post_json_auth(
        app,
        &format!("/api/v1/quests/{quest_id}/assign"),
        serde_json::json!({ "assignee_id": other_id }),
        &leader_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_double_assignment_conflicts(pool: PgPool) {
    let (leader_token, member_token, _, team_id) = setup_team(&pool, &["rust"]).await;
    let quest_id =
        create_quest(&pool, &leader_token, team_id, serde_json::json!({ "rust": 1 })).await;

    assign_self(&pool, &member_token, quest_id).await;

    let app = common::build_test_app(pool);
    let response = post_json_auth(
        app,
        &format!("/api/v1/quests/{quest_id}/assign"),
        serde_json::json!({}),
        &member_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_cancel_is_leader_only(pool: PgPool) {
    let (leader_token, member_token, _, team_id) = setup_team(&pool, &["rust"]).await;
    let quest_id =
        create_quest(&pool, &leader_token, team_id, serde_json::json!({ "rust": 1 })).await;

    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(
        app,
        &format!("/api/v1/quests/{quest_id}/cancel"),
        serde_json::json!({}),
        &member_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(
        app,
        &format!("/api/v1/quests/{quest_id}/cancel"),
        serde_json::json!({}),
        &leader_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["status"], "cancelled");

    // A cancelled quest cannot be assigned.
    let app = common::build_test_app(pool);
    let response = post_json_auth(
        app,
        &format!("/api/v1/quests/{quest_id}/assign"),
        serde_json::json!({}),
        &member_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

// ---------------------------------------------------------------------------
// Turn-in and XP awards
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn test_turn_in_awards_weighted_xp(pool: PgPool) {
    let (leader_token, member_token, _, team_id) = setup_team(&pool, &["rust", "sql"]).await;

    // Member declines both skills so they start declared at 0 XP.
    for skill in ["rust", "sql"] {
        let app = common::build_test_app(pool.clone());
        let response = post_json_auth(
            app,
            &format!("/api/v1/user/skills/{skill}/decline"),
            serde_json::json!({}),
            &member_token,
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    // Favorite rust for the 3x multiplier.
    let app = common::build_test_app(pool.clone());
    let response = common::put_json_auth(
        app,
        "/api/v1/user/favorites",
        serde_json::json!({ "skill_names": ["rust"] }),
        &member_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let quest_id = create_quest(
        &pool,
        &leader_token,
        team_id,
        serde_json::json!({ "rust": 2, "sql": 2 }),
    )
    .await;
    assign_self(&pool, &member_token, quest_id).await;

    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(
        app,
        &format!("/api/v1/quests/{quest_id}/turn-in"),
        serde_json::json!({}),
        &member_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;

    assert_eq!(json["data"]["quest"]["status"], "completed");
    // sql: weight 2 * 5 = 10 XP.
    assert_eq!(json["data"]["skill_changes"]["sql"]["gained"], 10);
    assert_eq!(json["data"]["skill_changes"]["sql"]["after"], 10);
    assert_eq!(json["data"]["skill_changes"]["sql"]["is_favorite"], false);
    // rust: favorite, weight 2 * 5 * 3 = 30 XP.
    assert_eq!(json["data"]["skill_changes"]["rust"]["gained"], 30);
    assert_eq!(json["data"]["skill_changes"]["rust"]["after"], 30);
    assert_eq!(json["data"]["skill_changes"]["rust"]["is_favorite"], true);
    // 0 -> 30 XP crosses several level thresholds (3, 9, 18, 30).
    assert_eq!(json["data"]["skill_changes"]["rust"]["leveled_up"], true);

    // The awards are persisted on the member's skill rows.
    let app = common::build_test_app(pool);
    let response = get_auth(app, "/api/v1/user/skills", &member_token).await;
    let json = body_json(response).await;
    let skills = json["data"].as_array().unwrap();
    let rust = skills.iter().find(|s| s["skill_name"] == "rust").unwrap();
    assert_eq!(rust["xp"], 30);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_turn_in_from_undeclared_starts_at_zero(pool: PgPool) {
    let (leader_token, member_token, _, team_id) = setup_team(&pool, &["rust"]).await;

    // Member never declares rust; it stays at the -1 sentinel.
    let quest_id =
        create_quest(&pool, &leader_token, team_id, serde_json::json!({ "rust": 1 })).await;
    assign_self(&pool, &member_token, quest_id).await;

    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(
        app,
        &format!("/api/v1/quests/{quest_id}/turn-in"),
        serde_json::json!({}),
        &member_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["skill_changes"]["rust"]["before"], 0);
    assert_eq!(json["data"]["skill_changes"]["rust"]["after"], 5);

    // Completion also transitions the skill out of the undeclared state.
    let app = common::build_test_app(pool);
    let response = get_auth(app, "/api/v1/user/skills", &member_token).await;
    let json = body_json(response).await;
    let rust = &json["data"].as_array().unwrap()[0];
    assert_eq!(rust["xp"], 5);
    assert_eq!(rust["declared"], true);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_only_the_assignee_turns_in(pool: PgPool) {
    let (leader_token, member_token, _, team_id) = setup_team(&pool, &["rust"]).await;
    let quest_id =
        create_quest(&pool, &leader_token, team_id, serde_json::json!({ "rust": 1 })).await;
    assign_self(&pool, &member_token, quest_id).await;

    let app = common::build_test_app(pool);
    let response = post_json_auth(
        app,
        &format!("/api/v1/quests/{quest_id}/turn-in"),
        serde_json::json!({}),
        &leader_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_double_turn_in_conflicts_without_double_award(pool: PgPool) {
    let (leader_token, member_token, _, team_id) = setup_team(&pool, &["rust"]).await;
    let quest_id =
        create_quest(&pool, &leader_token, team_id, serde_json::json!({ "rust": 3 })).await;
    assign_self(&pool, &member_token, quest_id).await;

    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(
        app,
        &format!("/api/v1/quests/{quest_id}/turn-in"),
        serde_json::json!({}),
        &member_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(
        app,
        &format!("/api/v1/quests/{quest_id}/turn-in"),
        serde_json::json!({}),
        &member_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    // XP was awarded exactly once: 3 * 5 = 15.
    let app = common::build_test_app(pool);
    let response = get_auth(app, "/api/v1/user/skills", &member_token).await;
    let json = body_json(response).await;
    assert_eq!(json["data"].as_array().unwrap()[0]["xp"], 15);
}
