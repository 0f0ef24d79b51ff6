//! Integration tests for the admin repair job.

mod common;

use assert_matches::assert_matches;
use sqlx::PgPool;

use common::{create_capacity_event, create_school, create_table_event, phone, registration_input};
use rsvp_core::error::CoreError;
use rsvp_db::models::registration::RegistrationStatus;
use rsvp_db::repositories::RegistrationRepo;
use rsvp_db::DbError;

#[sqlx::test(migrations = "../../db/migrations")]
async fn consistent_event_needs_no_corrections(pool: PgPool) {
    let school = create_school(&pool, "clean").await;
    let event = create_capacity_event(&pool, school, 5).await;

    for i in 0..3 {
        RegistrationRepo::register_capacity(
            &pool,
            event.id,
            &registration_input(&phone(i), 2, None),
        )
        .await
        .unwrap();
    }

    let corrections = RegistrationRepo::repair_event(&pool, event.id).await.unwrap();
    assert!(corrections.is_empty(), "got: {corrections:?}");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn repairs_drifted_statuses_and_counter(pool: PgPool) {
    let school = create_school(&pool, "drifted").await;
    let event = create_capacity_event(&pool, school, 5).await;

    // Three arrivals of 2 spots: first two fit, third waitlists.
    for i in 0..3 {
        RegistrationRepo::register_capacity(
            &pool,
            event.id,
            &registration_input(&phone(i), 2, None),
        )
        .await
        .unwrap();
    }

    // Corrupt the stored state: flip everyone to CONFIRMED and skew the
    // counter, simulating the drift the job exists to heal.
    sqlx::query("UPDATE registrations SET status = 'CONFIRMED', waitlist_priority = NULL WHERE event_id = $1")
        .bind(event.id)
        .execute(&pool)
        .await
        .unwrap();
    sqlx::query("UPDATE events SET spots_reserved = 0 WHERE id = $1")
        .bind(event.id)
        .execute(&pool)
        .await
        .unwrap();

    let corrections = RegistrationRepo::repair_event(&pool, event.id).await.unwrap();
    assert_eq!(corrections.len(), 1);
    assert_eq!(corrections[0].old_status, RegistrationStatus::Confirmed);
    assert_eq!(corrections[0].new_status, RegistrationStatus::Waitlist);

    // The counter is re-synced to the recomputed confirmed sum.
    let reserved: i32 = sqlx::query_scalar("SELECT spots_reserved FROM events WHERE id = $1")
        .bind(event.id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(reserved, 4);

    // The demoted registration got a waitlist priority.
    let priority: Option<i32> = sqlx::query_scalar(
        "SELECT waitlist_priority FROM registrations WHERE id = $1",
    )
    .bind(corrections[0].registration_id)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(priority, Some(1));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn repair_is_idempotent(pool: PgPool) {
    let school = create_school(&pool, "idempotent").await;
    let event = create_capacity_event(&pool, school, 3).await;

    for i in 0..4 {
        RegistrationRepo::register_capacity(
            &pool,
            event.id,
            &registration_input(&phone(i), 1, None),
        )
        .await
        .unwrap();
    }

    sqlx::query("UPDATE registrations SET status = 'WAITLIST' WHERE event_id = $1")
        .bind(event.id)
        .execute(&pool)
        .await
        .unwrap();

    let first = RegistrationRepo::repair_event(&pool, event.id).await.unwrap();
    assert!(!first.is_empty());

    // Second run finds nothing left to fix.
    let second = RegistrationRepo::repair_event(&pool, event.id).await.unwrap();
    assert!(second.is_empty(), "second run corrected: {second:?}");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn cancelled_registrations_are_ignored(pool: PgPool) {
    let school = create_school(&pool, "skip-cancelled").await;
    let event = create_capacity_event(&pool, school, 2).await;

    let first = RegistrationRepo::register_capacity(
        &pool,
        event.id,
        &registration_input(&phone(0), 2, None),
    )
    .await
    .unwrap();
    RegistrationRepo::register_capacity(&pool, event.id, &registration_input(&phone(1), 2, None))
        .await
        .unwrap();

    RegistrationRepo::cancel_by_admin(&pool, first.registration.id, None)
        .await
        .unwrap();

    // After the cancellation freed the spots, the waitlisted arrival is
    // entitled to them; repair promotes it.
    let corrections = RegistrationRepo::repair_event(&pool, event.id).await.unwrap();
    assert_eq!(corrections.len(), 1);
    assert_eq!(corrections[0].new_status, RegistrationStatus::Confirmed);

    let cancelled_status: RegistrationStatus =
        sqlx::query_scalar("SELECT status FROM registrations WHERE id = $1")
            .bind(first.registration.id)
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(cancelled_status, RegistrationStatus::Cancelled);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn rejects_table_based_events(pool: PgPool) {
    let school = create_school(&pool, "repair-tables").await;
    let event = create_table_event(&pool, school).await;

    let result = RegistrationRepo::repair_event(&pool, event.id).await;
    assert_matches!(result, Err(DbError::Core(CoreError::Validation(_))));
}
