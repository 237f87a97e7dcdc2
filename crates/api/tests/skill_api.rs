//! HTTP-level integration tests for skill declaration, declining,
//! favorites, the `/user/me` profile, and the suggestion endpoint.

mod common;

use axum::http::StatusCode;
use common::{body_json, get_auth, post_json, post_json_auth, put_json_auth};
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

/// Create a team led by a fresh guild leader, add the given user to it,
/// and register the listed team skills. Returns the leader's token.
async fn seed_team_skills(pool: &PgPool, member_id: i64, skills: &[&str]) -> String {
    let (leader_token, _) = register(pool, "skill_leader", "guild_leader").await;

    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(
        app,
        "/api/v1/teams",
        serde_json::json!({ "name": "Skill Team" }),
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

    leader_token
}

// ---------------------------------------------------------------------------
// Declaration
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn test_declare_computes_weighted_xp(pool: PgPool) {
    let (token, user_id) = register(&pool, "declarer", "adventurer").await;
    seed_team_skills(&pool, user_id, &["rust"]).await;

    // Professional experience alone at the top slider: 5 * 0.4 / 5 * 165 = 66.
    let app = common::build_test_app(pool);
    let body = serde_json::json!({
        "skill_name": "rust",
        "assessment": {
            "professional_experience": 5.0,
            "formal_education": 0.0,
            "informal_experience": 0.0,
            "confidence": 0.0,
        }
    });
    let response = post_json_auth(app, "/api/v1/user/skills/declare", body, &token).await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["xp"], 66);
    assert_eq!(json["data"]["declared"], true);
    assert!(json["data"]["level"]["level"].as_i64().unwrap() > 0);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_declare_is_one_time(pool: PgPool) {
    let (token, user_id) = register(&pool, "redeclarer", "adventurer").await;
    seed_team_skills(&pool, user_id, &["rust"]).await;

    let assessment = serde_json::json!({
        "professional_experience": 2.0,
        "formal_education": 2.0,
        "informal_experience": 2.0,
        "confidence": 2.0,
    });

    let app = common::build_test_app(pool.clone());
    let body = serde_json::json!({ "skill_name": "rust", "assessment": assessment });
    let response = post_json_auth(app, "/api/v1/user/skills/declare", body, &token).await;
    assert_eq!(response.status(), StatusCode::OK);

    let app = common::build_test_app(pool);
    let body = serde_json::json!({ "skill_name": "rust", "assessment": assessment });
    let response = post_json_auth(app, "/api/v1/user/skills/declare", body, &token).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_declare_unknown_skill_rejected(pool: PgPool) {
    let (token, _) = register(&pool, "lost", "adventurer").await;

    let app = common::build_test_app(pool);
    let body = serde_json::json!({
        "skill_name": "basket-weaving",
        "assessment": {
            "professional_experience": 1.0,
            "formal_education": 1.0,
            "informal_experience": 1.0,
            "confidence": 1.0,
        }
    });
    let response = post_json_auth(app, "/api/v1/user/skills/declare", body, &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_declare_rejects_out_of_range_sliders(pool: PgPool) {
    let (token, user_id) = register(&pool, "overconfident", "adventurer").await;
    seed_team_skills(&pool, user_id, &["rust"]).await;

    let app = common::build_test_app(pool);
    let body = serde_json::json!({
        "skill_name": "rust",
        "assessment": {
            "professional_experience": 6.0,
            "formal_education": 0.0,
            "informal_experience": 0.0,
            "confidence": 0.0,
        }
    });
    let response = post_json_auth(app, "/api/v1/user/skills/declare", body, &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_decline_declares_at_zero(pool: PgPool) {
    let (token, user_id) = register(&pool, "decliner", "adventurer").await;
    seed_team_skills(&pool, user_id, &["rust"]).await;

    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(
        app,
        "/api/v1/user/skills/rust/decline",
        serde_json::json!({}),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["xp"], 0);
    assert_eq!(json["data"]["declared"], true);
    assert_eq!(json["data"]["level"]["level"], 0);

    // Declining is still a one-time declaration.
    let app = common::build_test_app(pool);
    let response = post_json_auth(
        app,
        "/api/v1/user/skills/rust/decline",
        serde_json::json!({}),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

// ---------------------------------------------------------------------------
// Favorites
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn test_favorites_capped_at_three(pool: PgPool) {
    let (token, user_id) = register(&pool, "fan", "adventurer").await;
    seed_team_skills(&pool, user_id, &["a", "b", "c", "d"]).await;

    let app = common::build_test_app(pool.clone());
    let body = serde_json::json!({ "skill_names": ["a", "b", "c", "d"] });
    let response = put_json_auth(app, "/api/v1/user/favorites", body, &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let app = common::build_test_app(pool);
    let body = serde_json::json!({ "skill_names": ["a", "b", "c"] });
    let response = put_json_auth(app, "/api/v1/user/favorites", body, &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let favorite_count = json["data"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|s| s["is_favorite"] == true)
        .count();
    assert_eq!(favorite_count, 3);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_favorites_replace_previous_set(pool: PgPool) {
    let (token, user_id) = register(&pool, "fickle", "adventurer").await;
    seed_team_skills(&pool, user_id, &["a", "b"]).await;

    let app = common::build_test_app(pool.clone());
    let body = serde_json::json!({ "skill_names": ["a"] });
    let response = put_json_auth(app, "/api/v1/user/favorites", body, &token).await;
    assert_eq!(response.status(), StatusCode::OK);

    let app = common::build_test_app(pool);
    let body = serde_json::json!({ "skill_names": ["b"] });
    let response = put_json_auth(app, "/api/v1/user/favorites", body, &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    for skill in json["data"].as_array().unwrap() {
        let expected = skill["skill_name"] == "b";
        assert_eq!(skill["is_favorite"].as_bool().unwrap(), expected);
    }
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_favorites_must_be_tracked_skills(pool: PgPool) {
    let (token, user_id) = register(&pool, "wisher", "adventurer").await;
    seed_team_skills(&pool, user_id, &["a"]).await;

    let app = common::build_test_app(pool);
    let body = serde_json::json!({ "skill_names": ["cobol"] });
    let response = put_json_auth(app, "/api/v1/user/favorites", body, &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Profile and suggestions
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn test_me_returns_profile_with_skills(pool: PgPool) {
    let (token, user_id) = register(&pool, "selfie", "adventurer").await;
    seed_team_skills(&pool, user_id, &["rust"]).await;

    let app = common::build_test_app(pool);
    let response = get_auth(app, "/api/v1/user/me", &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["username"], "selfie");
    assert_eq!(json["data"]["role"], "adventurer");
    assert_eq!(json["data"]["skills"].as_array().unwrap().len(), 1);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_me_requires_auth(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = common::get(app, "/api/v1/user/me").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

/// With no suggestion client configured, the endpoint answers 503.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_suggest_unconfigured_returns_503(pool: PgPool) {
    let (token, _) = register(&pool, "suggester", "guild_leader").await;

    let app = common::build_test_app(pool);
    let body = serde_json::json!({ "description": "build a web dashboard" });
    let response = post_json_auth(app, "/api/v1/skills/suggest", body, &token).await;

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let json = body_json(response).await;
    assert_eq!(json["code"], "SERVICE_UNAVAILABLE");
}
