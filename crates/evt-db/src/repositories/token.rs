use chrono::{DateTime, Utc};
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::models::EmailVerificationToken;

// --- Email verification tokens ---

pub async fn invalidate_verification_tokens<'e, E>(
    executor: E,
    organizer_id: Uuid,
) -> Result<(), sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query(
        // language=PostgreSQL
        r#"
            UPDATE email_verification_tokens
            SET used_at = NOW()
            WHERE organizer_id = $1 AND used_at IS NULL
        "#,
    )
    .bind(organizer_id)
    .execute(executor)
    .await?;
    Ok(())
}

pub async fn insert_verification_token<'e, E>(
    executor: E,
    organizer_id: Uuid,
    token_hash: &str,
    expires_at: DateTime<Utc>,
) -> Result<Uuid, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_scalar(
        // language=PostgreSQL
        r#"
            INSERT INTO email_verification_tokens (organizer_id, token_hash, expires_at)
            VALUES ($1, $2, $3)
            RETURNING id
        "#,
    )
    .bind(organizer_id)
    .bind(token_hash)
    .bind(expires_at)
    .fetch_one(executor)
    .await
}

pub async fn find_verification_token<'e, E>(
    executor: E,
    id: Uuid,
) -> Result<Option<EmailVerificationToken>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT id, organizer_id, token_hash, expires_at, used_at
            FROM email_verification_tokens
            WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(executor)
    .await
}

/// Mark a token used. Returns false if it was already used or has expired.
pub async fn consume_verification_token<'e, E>(executor: E, id: Uuid) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let result = sqlx::query(
        // language=PostgreSQL
        r#"
            UPDATE email_verification_tokens
            SET used_at = NOW()
            WHERE id = $1
                AND used_at IS NULL
                AND expires_at > NOW()
        "#,
    )
    .bind(id)
    .execute(executor)
    .await?;
    Ok(result.rows_affected() == 1)
}

pub async fn cleanup_expired_verification_tokens<'e, E>(executor: E) -> Result<u64, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let result = sqlx::query(
        // language=PostgreSQL
        r#"
            DELETE FROM email_verification_tokens
            WHERE expires_at < NOW() OR used_at IS NOT NULL
        "#,
    )
    .execute(executor)
    .await?;
    Ok(result.rows_affected())
}
