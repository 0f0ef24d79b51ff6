//! Integration tests for the cancellation / compensation engine.

mod common;

use assert_matches::assert_matches;
use chrono::{Duration, Utc};
use sqlx::PgPool;

use common::{
    add_table, create_capacity_event, create_capacity_event_starting, create_school,
    create_table_event, phone, registration_input,
};
use rsvp_core::error::CoreError;
use rsvp_db::models::registration::{CancellationActor, RegistrationStatus};
use rsvp_db::models::table::TableStatus;
use rsvp_db::repositories::RegistrationRepo;
use rsvp_db::DbError;

#[sqlx::test(migrations = "../../db/migrations")]
async fn token_cancel_releases_table_exactly_once(pool: PgPool) {
    let school = create_school(&pool, "release").await;
    let event = create_table_event(&pool, school).await;
    let table = add_table(&pool, event.id, 1, 4, 2).await;

    let outcome = RegistrationRepo::register_table(
        &pool,
        event.id,
        &registration_input("0501234567", 1, Some(4)),
    )
    .await
    .unwrap();
    assert_eq!(outcome.registration.status, RegistrationStatus::Confirmed);

    let cancelled = RegistrationRepo::cancel_with_token(
        &pool,
        event.id,
        "0501234567",
        Some("change of plans"),
    )
    .await
    .unwrap();

    assert_eq!(cancelled.status, RegistrationStatus::Cancelled);
    assert_eq!(cancelled.cancelled_by, Some(CancellationActor::Customer));
    assert!(cancelled.cancelled_at.is_some());
    assert_eq!(cancelled.cancellation_reason.as_deref(), Some("change of plans"));

    let status: TableStatus =
        sqlx::query_scalar("SELECT status FROM event_tables WHERE id = $1")
            .bind(table.id)
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(status, TableStatus::Available);

    // A second cancellation is an error, and state is unchanged.
    let again =
        RegistrationRepo::cancel_with_token(&pool, event.id, "0501234567", None).await;
    assert_matches!(again, Err(DbError::Core(CoreError::AlreadyCancelled)));

    let status: TableStatus =
        sqlx::query_scalar("SELECT status FROM event_tables WHERE id = $1")
            .bind(table.id)
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(status, TableStatus::Available);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn capacity_cancel_returns_spots(pool: PgPool) {
    let school = create_school(&pool, "refund").await;
    let event = create_capacity_event(&pool, school, 10).await;

    RegistrationRepo::register_capacity(
        &pool,
        event.id,
        &registration_input("0501234567", 4, None),
    )
    .await
    .unwrap();

    let reserved: i32 = sqlx::query_scalar("SELECT spots_reserved FROM events WHERE id = $1")
        .bind(event.id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(reserved, 4);

    RegistrationRepo::cancel_with_token(&pool, event.id, "0501234567", None)
        .await
        .unwrap();

    let reserved: i32 = sqlx::query_scalar("SELECT spots_reserved FROM events WHERE id = $1")
        .bind(event.id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(reserved, 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn waitlist_cancel_does_not_touch_the_counter(pool: PgPool) {
    let school = create_school(&pool, "wl-cancel").await;
    let event = create_capacity_event(&pool, school, 1).await;

    RegistrationRepo::register_capacity(&pool, event.id, &registration_input(&phone(0), 1, None))
        .await
        .unwrap();
    RegistrationRepo::register_capacity(&pool, event.id, &registration_input(&phone(1), 1, None))
        .await
        .unwrap();

    // Cancel the waitlisted one; it held no spots.
    RegistrationRepo::cancel_with_token(&pool, event.id, &phone(1), None)
        .await
        .unwrap();

    let reserved: i32 = sqlx::query_scalar("SELECT spots_reserved FROM events WHERE id = $1")
        .bind(event.id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(reserved, 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn deadline_blocks_customer_but_not_admin(pool: PgPool) {
    let school = create_school(&pool, "deadline").await;
    // Starts in two hours; the default deadline is 24.
    let event =
        create_capacity_event_starting(&pool, school, 10, Utc::now() + Duration::hours(2)).await;

    let outcome = RegistrationRepo::register_capacity(
        &pool,
        event.id,
        &registration_input("0501234567", 2, None),
    )
    .await
    .unwrap();

    let result =
        RegistrationRepo::cancel_with_token(&pool, event.id, "0501234567", None).await;
    assert_matches!(
        result,
        Err(DbError::Core(CoreError::DeadlineExceeded { hours: 24 }))
    );

    // Admin cancellation ignores the deadline and still compensates.
    let cancelled =
        RegistrationRepo::cancel_by_admin(&pool, outcome.registration.id, Some("no-show"))
            .await
            .unwrap();
    assert_eq!(cancelled.cancelled_by, Some(CancellationActor::Admin));

    let reserved: i32 = sqlx::query_scalar("SELECT spots_reserved FROM events WHERE id = $1")
        .bind(event.id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(reserved, 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn admin_cancel_of_cancelled_registration_fails(pool: PgPool) {
    let school = create_school(&pool, "double-admin").await;
    let event = create_capacity_event(&pool, school, 10).await;

    let outcome = RegistrationRepo::register_capacity(
        &pool,
        event.id,
        &registration_input("0501234567", 1, None),
    )
    .await
    .unwrap();

    RegistrationRepo::cancel_by_admin(&pool, outcome.registration.id, None)
        .await
        .unwrap();
    let again = RegistrationRepo::cancel_by_admin(&pool, outcome.registration.id, None).await;
    assert_matches!(again, Err(DbError::Core(CoreError::AlreadyCancelled)));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn cancel_unknown_registration_is_not_found(pool: PgPool) {
    let school = create_school(&pool, "missing").await;
    let event = create_capacity_event(&pool, school, 10).await;

    let result =
        RegistrationRepo::cancel_with_token(&pool, event.id, "0599999999", None).await;
    assert_matches!(result, Err(DbError::Core(CoreError::NotFound { .. })));

    let result = RegistrationRepo::cancel_by_admin(&pool, 424242, None).await;
    assert_matches!(result, Err(DbError::Core(CoreError::NotFound { .. })));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn cancelled_phone_can_register_again(pool: PgPool) {
    let school = create_school(&pool, "re-register").await;
    let event = create_capacity_event(&pool, school, 10).await;

    RegistrationRepo::register_capacity(
        &pool,
        event.id,
        &registration_input("0501234567", 1, None),
    )
    .await
    .unwrap();
    RegistrationRepo::cancel_with_token(&pool, event.id, "0501234567", None)
        .await
        .unwrap();

    let outcome = RegistrationRepo::register_capacity(
        &pool,
        event.id,
        &registration_input("0501234567", 1, None),
    )
    .await
    .unwrap();
    assert_eq!(outcome.registration.status, RegistrationStatus::Confirmed);
}
