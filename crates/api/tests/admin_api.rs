//! Authorization and admin-surface integration tests.

mod common;

use axum::http::StatusCode;
use serde_json::json;
use sqlx::PgPool;

use common::{admin_token, build_test_app, request_json, seed_capacity_event, seed_school};
use rsvp_core::roles::{ROLE_ADMIN, ROLE_SUPER_ADMIN};

#[sqlx::test(migrations = "../../db/migrations")]
async fn admin_routes_require_a_token(pool: PgPool) {
    let app = build_test_app(pool);

    let (status, body) = request_json(&app, "GET", "/api/v1/events", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "UNAUTHORIZED");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn cross_school_access_is_forbidden(pool: PgPool) {
    let school_a = seed_school(&pool, "school-a").await;
    let school_b = seed_school(&pool, "school-b").await;
    let event_a = seed_capacity_event(&pool, school_a, "a-night", 10).await;
    let app = build_test_app(pool);

    let foreign = admin_token(1, ROLE_ADMIN, Some(school_b));
    let (status, body) = request_json(
        &app,
        "GET",
        &format!("/api/v1/events/{event_a}"),
        Some(&foreign),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN, "body: {body}");

    // Super admins cross school boundaries.
    let root = admin_token(2, ROLE_SUPER_ADMIN, None);
    let (status, _) = request_json(
        &app,
        "GET",
        &format!("/api/v1/events/{event_a}"),
        Some(&root),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn event_crud_happy_path(pool: PgPool) {
    let school = seed_school(&pool, "crud").await;
    let app = build_test_app(pool);
    let token = admin_token(1, ROLE_ADMIN, Some(school));

    let (status, body) = request_json(
        &app,
        "POST",
        "/api/v1/events",
        Some(&token),
        Some(json!({
            "title": "Backgammon Night",
            "slug": "backgammon-night",
            "event_type": "CAPACITY_BASED",
            "capacity": 40,
            "start_at": "2030-06-01T18:00:00Z",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "body: {body}");
    let event_id = body["data"]["id"].as_i64().unwrap();
    assert_eq!(body["data"]["status"], "OPEN");
    assert_eq!(body["data"]["spots_reserved"], 0);

    let (status, body) = request_json(
        &app,
        "PATCH",
        &format!("/api/v1/events/{event_id}"),
        Some(&token),
        Some(json!({ "status": "CLOSED" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "CLOSED");

    let (status, _) = request_json(
        &app,
        "DELETE",
        &format!("/api/v1/events/{event_id}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = request_json(
        &app,
        "GET",
        &format!("/api/v1/events/{event_id}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn repair_requires_super_admin(pool: PgPool) {
    let school = seed_school(&pool, "repair-auth").await;
    let event = seed_capacity_event(&pool, school, "night", 10).await;
    let app = build_test_app(pool);

    let admin = admin_token(1, ROLE_ADMIN, Some(school));
    let (status, _) = request_json(
        &app,
        "POST",
        &format!("/api/v1/events/{event}/repair"),
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let root = admin_token(2, ROLE_SUPER_ADMIN, None);
    let (status, body) = request_json(
        &app,
        "POST",
        &format!("/api/v1/events/{event}/repair"),
        Some(&root),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK, "body: {body}");
    assert_eq!(body["data"]["corrections"].as_array().unwrap().len(), 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn ban_lifecycle_over_http(pool: PgPool) {
    let school = seed_school(&pool, "ban-http").await;
    let app = build_test_app(pool);
    let token = admin_token(1, ROLE_ADMIN, Some(school));

    let (status, body) = request_json(
        &app,
        "POST",
        "/api/v1/bans",
        Some(&token),
        Some(json!({
            "phone_number": "050-123-4567",
            "reason": "no-shows",
            "banned_games_count": 3,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "body: {body}");
    let ban_id = body["data"]["id"].as_i64().unwrap();
    // Stored normalized.
    assert_eq!(body["data"]["phone_number"], "0501234567");

    let (status, body) = request_json(&app, "GET", "/api/v1/bans/stats", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["active"], 1);

    let (status, body) = request_json(
        &app,
        "DELETE",
        &format!("/api/v1/bans/{ban_id}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["active"], false);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn health_endpoint_is_public(pool: PgPool) {
    let app = build_test_app(pool);
    let (status, body) = request_json(&app, "GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}
