use chrono::{DateTime, Utc};
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::models::{Event, NewEvent, RsvpActivity, RsvpCounts};

const EVENT_COLUMNS: &str = "id, organizer_id, title, description, location, starts_at, ends_at, \
                             capacity, is_public, created_at, updated_at";

pub async fn insert_event<'e, E>(executor: E, event: &NewEvent<'_>) -> Result<Event, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(&format!(
        // language=PostgreSQL
        r#"
            INSERT INTO events (organizer_id, title, description, location, starts_at, ends_at, capacity, is_public)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {EVENT_COLUMNS}
        "#
    ))
    .bind(event.organizer_id)
    .bind(event.title)
    .bind(event.description)
    .bind(event.location)
    .bind(event.starts_at)
    .bind(event.ends_at)
    .bind(event.capacity)
    .bind(event.is_public)
    .fetch_one(executor)
    .await
}

pub async fn find_by_id<'e, E>(executor: E, id: Uuid) -> Result<Option<Event>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(&format!(
        // language=PostgreSQL
        "SELECT {EVENT_COLUMNS} FROM events WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(executor)
    .await
}

/// Fetch an event only if it belongs to `organizer_id`
pub async fn find_owned<'e, E>(
    executor: E,
    id: Uuid,
    organizer_id: Uuid,
) -> Result<Option<Event>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(&format!(
        // language=PostgreSQL
        "SELECT {EVENT_COLUMNS} FROM events WHERE id = $1 AND organizer_id = $2"
    ))
    .bind(id)
    .bind(organizer_id)
    .fetch_optional(executor)
    .await
}

/// Fetch an event and hold a row lock until the transaction ends
pub async fn lock_by_id<'e, E>(executor: E, id: Uuid) -> Result<Option<Event>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(&format!(
        // language=PostgreSQL
        "SELECT {EVENT_COLUMNS} FROM events WHERE id = $1 FOR UPDATE"
    ))
    .bind(id)
    .fetch_optional(executor)
    .await
}

pub async fn list_by_organizer<'e, E>(
    executor: E,
    organizer_id: Uuid,
) -> Result<Vec<Event>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(&format!(
        // language=PostgreSQL
        "SELECT {EVENT_COLUMNS} FROM events WHERE organizer_id = $1 ORDER BY starts_at DESC"
    ))
    .bind(organizer_id)
    .fetch_all(executor)
    .await
}

pub async fn delete_owned<'e, E>(
    executor: E,
    id: Uuid,
    organizer_id: Uuid,
) -> Result<u64, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let result = sqlx::query(
        // language=PostgreSQL
        r#"
            DELETE FROM events
            WHERE id = $1 AND organizer_id = $2
        "#,
    )
    .bind(id)
    .bind(organizer_id)
    .execute(executor)
    .await?;
    Ok(result.rows_affected())
}

pub async fn rsvp_counts<'e, E>(executor: E, event_id: Uuid) -> Result<RsvpCounts, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT
                COUNT(*) FILTER (WHERE response = 'attending') AS attending,
                COUNT(*) FILTER (WHERE response = 'declined') AS declined,
                COUNT(*) FILTER (WHERE response = 'maybe') AS maybe,
                COALESCE(SUM(guest_count) FILTER (WHERE response = 'attending'), 0)::BIGINT AS headcount
            FROM rsvps
            WHERE event_id = $1
        "#,
    )
    .bind(event_id)
    .fetch_one(executor)
    .await
}

/// Current answer of every reply last changed at or after `since`, oldest
/// first. A changed answer counts on the day it was changed.
pub async fn rsvp_activity_since<'e, E>(
    executor: E,
    event_id: Uuid,
    since: DateTime<Utc>,
) -> Result<Vec<RsvpActivity>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT response, updated_at AS answered_at
            FROM rsvps
            WHERE event_id = $1 AND updated_at >= $2
            ORDER BY updated_at
        "#,
    )
    .bind(event_id)
    .bind(since)
    .fetch_all(executor)
    .await
}
