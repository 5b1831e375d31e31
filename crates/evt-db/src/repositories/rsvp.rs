use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::models::{Rsvp, RsvpResponse};

pub async fn find_by_invite<'e, E>(executor: E, invite_id: Uuid) -> Result<Option<Rsvp>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT id, invite_id, event_id, response, guest_count, note, responded_at, updated_at
            FROM rsvps
            WHERE invite_id = $1
        "#,
    )
    .bind(invite_id)
    .fetch_optional(executor)
    .await
}

/// Attending headcount for an event, ignoring one invite's current reply
pub async fn attending_headcount_excluding<'e, E>(
    executor: E,
    event_id: Uuid,
    invite_id: Uuid,
) -> Result<i64, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_scalar(
        // language=PostgreSQL
        r#"
            SELECT COALESCE(SUM(guest_count), 0)::BIGINT
            FROM rsvps
            WHERE event_id = $1 AND invite_id <> $2 AND response = 'attending'
        "#,
    )
    .bind(event_id)
    .bind(invite_id)
    .fetch_one(executor)
    .await
}

/// Record or replace the reply for an invite
pub async fn upsert_rsvp<'e, E>(
    executor: E,
    invite_id: Uuid,
    event_id: Uuid,
    response: RsvpResponse,
    guest_count: i32,
    note: Option<&str>,
) -> Result<Rsvp, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            INSERT INTO rsvps (invite_id, event_id, response, guest_count, note)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (invite_id) DO UPDATE
            SET response = EXCLUDED.response,
                guest_count = EXCLUDED.guest_count,
                note = EXCLUDED.note,
                updated_at = NOW()
            RETURNING id, invite_id, event_id, response, guest_count, note, responded_at, updated_at
        "#,
    )
    .bind(invite_id)
    .bind(event_id)
    .bind(response.as_str())
    .bind(guest_count)
    .bind(note)
    .fetch_one(executor)
    .await
}

pub async fn delete_by_invite<'e, E>(executor: E, invite_id: Uuid) -> Result<u64, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let result = sqlx::query(
        // language=PostgreSQL
        r#"
            DELETE FROM rsvps
            WHERE invite_id = $1
        "#,
    )
    .bind(invite_id)
    .execute(executor)
    .await?;
    Ok(result.rows_affected())
}
