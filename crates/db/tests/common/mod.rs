//! Shared fixtures for repository integration tests.

use chrono::{Duration, Utc};
use sqlx::PgPool;

use rsvp_core::types::DbId;
use rsvp_db::models::event::Event;
use rsvp_db::models::registration::NewRegistration;
use rsvp_db::models::school::CreateSchool;
use rsvp_db::models::table::EventTable;
use rsvp_db::repositories::SchoolRepo;

/// Insert a school and return its id.
pub async fn create_school(pool: &PgPool, slug: &str) -> DbId {
    SchoolRepo::create(
        pool,
        &CreateSchool {
            name: format!("School {slug}"),
            slug: slug.to_string(),
        },
    )
    .await
    .unwrap()
    .id
}

/// Insert an OPEN capacity-based event starting 48 hours from now with a
/// 24-hour cancellation deadline.
pub async fn create_capacity_event(pool: &PgPool, school_id: DbId, capacity: i32) -> Event {
    create_capacity_event_starting(pool, school_id, capacity, Utc::now() + Duration::hours(48))
        .await
}

pub async fn create_capacity_event_starting(
    pool: &PgPool,
    school_id: DbId,
    capacity: i32,
    start_at: chrono::DateTime<Utc>,
) -> Event {
    sqlx::query_as(
        "INSERT INTO events \
             (school_id, title, slug, event_type, capacity, start_at, check_in_token) \
         VALUES ($1, $2, $3, 'CAPACITY_BASED', $4, $5, $6) \
         RETURNING id, school_id, title, slug, event_type, status, capacity, \
                   spots_reserved, max_spots_per_person, cancellation_deadline_hours, \
                   start_at, end_at, check_in_token, form_fields, ban_counters_applied, \
                   created_at, updated_at",
    )
    .bind(school_id)
    .bind("Capacity Event")
    .bind(format!("capacity-{school_id}-{}", suffix()))
    .bind(capacity)
    .bind(start_at)
    .bind(rsvp_core::codes::generate_check_in_token())
    .fetch_one(pool)
    .await
    .unwrap()
}

/// Insert an OPEN table-based event starting 48 hours from now.
pub async fn create_table_event(pool: &PgPool, school_id: DbId) -> Event {
    create_table_event_starting(pool, school_id, Utc::now() + Duration::hours(48)).await
}

pub async fn create_table_event_starting(
    pool: &PgPool,
    school_id: DbId,
    start_at: chrono::DateTime<Utc>,
) -> Event {
    sqlx::query_as(
        "INSERT INTO events \
             (school_id, title, slug, event_type, start_at, check_in_token) \
         VALUES ($1, $2, $3, 'TABLE_BASED', $4, $5) \
         RETURNING id, school_id, title, slug, event_type, status, capacity, \
                   spots_reserved, max_spots_per_person, cancellation_deadline_hours, \
                   start_at, end_at, check_in_token, form_fields, ban_counters_applied, \
                   created_at, updated_at",
    )
    .bind(school_id)
    .bind("Table Event")
    .bind(format!("tables-{school_id}-{}", suffix()))
    .bind(start_at)
    .bind(rsvp_core::codes::generate_check_in_token())
    .fetch_one(pool)
    .await
    .unwrap()
}

/// Insert a table for an event.
pub async fn add_table(
    pool: &PgPool,
    event_id: DbId,
    table_number: i32,
    capacity: i32,
    min_order: i32,
) -> EventTable {
    sqlx::query_as(
        "INSERT INTO event_tables (event_id, table_number, capacity, min_order, table_order) \
         VALUES ($1, $2, $3, $4, $2) \
         RETURNING id, event_id, table_number, capacity, min_order, status, table_order, \
                   created_at, updated_at",
    )
    .bind(event_id)
    .bind(table_number)
    .bind(capacity)
    .bind(min_order)
    .fetch_one(pool)
    .await
    .unwrap()
}

/// Engine input for a given phone; codes and tokens are unique per call.
pub fn registration_input(phone: &str, spots: i32, guests: Option<i32>) -> NewRegistration {
    NewRegistration {
        phone_number: phone.to_string(),
        spots_count: spots,
        guests_count: guests,
        form_data: serde_json::json!({}),
        confirmation_code: rsvp_core::codes::generate_confirmation_code(),
        cancellation_token: format!("cancel-{}-{}", phone, uuid_like()),
    }
}

/// Distinct phone per index, normalized form.
pub fn phone(i: usize) -> String {
    format!("05{:08}", i)
}

fn uuid_like() -> String {
    rsvp_core::codes::generate_check_in_token()
}

/// Random slug suffix so fixtures never collide within a test database.
fn suffix() -> String {
    rsvp_core::codes::generate_confirmation_code().to_lowercase()
}
