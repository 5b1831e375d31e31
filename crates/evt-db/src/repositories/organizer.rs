use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::models::Organizer;

/// Insert the organizer on first sight, refresh the email otherwise.
///
/// A changed email address loses its verified flag.
pub async fn upsert_by_external_id<'e, E>(
    executor: E,
    external_id: &str,
    email: &str,
) -> Result<Organizer, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            INSERT INTO organizers (external_id, email)
            VALUES ($1, $2)
            ON CONFLICT (external_id) DO UPDATE
            SET email = EXCLUDED.email,
                email_verified = organizers.email_verified AND organizers.email = EXCLUDED.email,
                updated_at = NOW()
            RETURNING id, external_id, email, email_verified, created_at
        "#,
    )
    .bind(external_id)
    .bind(email)
    .fetch_one(executor)
    .await
}

pub async fn find_by_id<'e, E>(executor: E, id: Uuid) -> Result<Option<Organizer>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT id, external_id, email, email_verified, created_at
            FROM organizers
            WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(executor)
    .await
}

pub async fn mark_email_verified<'e, E>(executor: E, id: Uuid) -> Result<(), sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query(
        // language=PostgreSQL
        r#"
            UPDATE organizers
            SET email_verified = TRUE, updated_at = NOW()
            WHERE id = $1
        "#,
    )
    .bind(id)
    .execute(executor)
    .await?;
    Ok(())
}
