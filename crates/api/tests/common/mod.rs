//! Shared harness for API integration tests.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, Response, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use rsvp_api::auth::jwt::{generate_access_token, JwtConfig};
use rsvp_api::config::ServerConfig;
use rsvp_api::router::build_app_router;
use rsvp_api::state::AppState;
use rsvp_core::types::DbId;

pub const TEST_SECRET: &str = "test-secret-for-integration-tests";

/// Build a test `ServerConfig` with safe defaults and a fixed JWT secret.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        jwt: JwtConfig {
            secret: TEST_SECRET.to_string(),
            access_token_expiry_mins: 60,
        },
    }
}

/// Build the full application router with all middleware layers, using
/// the given database pool. Mirrors the construction in `main.rs` so
/// tests exercise the production middleware stack.
pub fn build_test_app(pool: PgPool) -> Router {
    let config = test_config();
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        event_bus: Arc::new(rsvp_events::EventBus::default()),
    };
    build_app_router(state, &config)
}

/// Mint an admin bearer token for the given role and school.
pub fn admin_token(user_id: DbId, role: &str, school_id: Option<DbId>) -> String {
    let config = test_config();
    generate_access_token(user_id, role, school_id, &config.jwt).unwrap()
}

/// Send a JSON request, optionally authenticated.
pub async fn request_json(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }

    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response: Response<_> = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null)
    };
    (status, json)
}

/// Seed a school and return its id.
pub async fn seed_school(pool: &PgPool, slug: &str) -> DbId {
    sqlx::query_scalar("INSERT INTO schools (name, slug) VALUES ($1, $2) RETURNING id")
        .bind(format!("School {slug}"))
        .bind(slug)
        .fetch_one(pool)
        .await
        .unwrap()
}

/// Seed an OPEN capacity-based event and return (id, slug).
pub async fn seed_capacity_event(
    pool: &PgPool,
    school_id: DbId,
    slug: &str,
    capacity: i32,
) -> DbId {
    sqlx::query_scalar(
        "INSERT INTO events \
             (school_id, title, slug, event_type, capacity, start_at, check_in_token) \
         VALUES ($1, 'Event', $2, 'CAPACITY_BASED', $3, NOW() + INTERVAL '48 hours', $4) \
         RETURNING id",
    )
    .bind(school_id)
    .bind(slug)
    .bind(capacity)
    .bind(rsvp_core::codes::generate_check_in_token())
    .fetch_one(pool)
    .await
    .unwrap()
}
