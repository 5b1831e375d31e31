use chrono::{DateTime, Utc};
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::models::{Invite, InviteStatus};

const INVITE_COLUMNS: &str = "id, event_id, guest_name, guest_email, token_hash, status, message_id, \
                              expires_at, created_at, updated_at";

/// Insert a new invite holding the digest of its link token
pub async fn insert_invite<'e, E>(
    executor: E,
    event_id: Uuid,
    guest_name: &str,
    guest_email: &str,
    token_hash: &str,
    expires_at: DateTime<Utc>,
) -> Result<Invite, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(&format!(
        // language=PostgreSQL
        r#"
            INSERT INTO invites (event_id, guest_name, guest_email, token_hash, expires_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {INVITE_COLUMNS}
        "#
    ))
    .bind(event_id)
    .bind(guest_name)
    .bind(guest_email)
    .bind(token_hash)
    .bind(expires_at)
    .fetch_one(executor)
    .await
}

pub async fn find_by_id<'e, E>(executor: E, id: Uuid) -> Result<Option<Invite>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(&format!(
        // language=PostgreSQL
        "SELECT {INVITE_COLUMNS} FROM invites WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(executor)
    .await
}

/// Load an invite and lock its row until the transaction ends.
///
/// Every write that depends on the invite's token or status (reply, revoke,
/// resend) takes this lock first, so they apply one after another.
pub async fn find_by_id_for_update<'e, E>(executor: E, id: Uuid) -> Result<Option<Invite>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(&format!(
        // language=PostgreSQL
        "SELECT {INVITE_COLUMNS} FROM invites WHERE id = $1 FOR UPDATE"
    ))
    .bind(id)
    .fetch_optional(executor)
    .await
}

pub async fn find_in_event<'e, E>(
    executor: E,
    id: Uuid,
    event_id: Uuid,
) -> Result<Option<Invite>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(&format!(
        // language=PostgreSQL
        "SELECT {INVITE_COLUMNS} FROM invites WHERE id = $1 AND event_id = $2"
    ))
    .bind(id)
    .bind(event_id)
    .fetch_optional(executor)
    .await
}

pub async fn list_by_event<'e, E>(executor: E, event_id: Uuid) -> Result<Vec<Invite>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(&format!(
        // language=PostgreSQL
        "SELECT {INVITE_COLUMNS} FROM invites WHERE event_id = $1 ORDER BY created_at"
    ))
    .bind(event_id)
    .fetch_all(executor)
    .await
}

/// Swap in a new token digest, which invalidates the previous link
pub async fn rotate_token<'e, E>(
    executor: E,
    id: Uuid,
    token_hash: &str,
    expires_at: DateTime<Utc>,
) -> Result<Invite, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(&format!(
        // language=PostgreSQL
        r#"
            UPDATE invites
            SET token_hash = $2,
                expires_at = $3,
                status = CASE WHEN status = 'responded' THEN status ELSE 'pending' END,
                message_id = NULL,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {INVITE_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(token_hash)
    .bind(expires_at)
    .fetch_one(executor)
    .await
}

pub async fn set_status<'e, E>(
    executor: E,
    id: Uuid,
    status: InviteStatus,
) -> Result<(), sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query(
        // language=PostgreSQL
        r#"
            UPDATE invites
            SET status = $2, updated_at = NOW()
            WHERE id = $1
        "#,
    )
    .bind(id)
    .bind(status.as_str())
    .execute(executor)
    .await?;
    Ok(())
}

/// Mark an invite as answered. A revoked invite is left alone; returns
/// whether the row changed.
pub async fn mark_responded<'e, E>(executor: E, id: Uuid) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let result = sqlx::query(
        // language=PostgreSQL
        r#"
            UPDATE invites
            SET status = 'responded', updated_at = NOW()
            WHERE id = $1 AND status <> 'revoked'
        "#,
    )
    .bind(id)
    .execute(executor)
    .await?;
    Ok(result.rows_affected() == 1)
}

/// Record the outcome of handing the invite email to the mail server
pub async fn record_dispatch<'e, E>(
    executor: E,
    id: Uuid,
    status: InviteStatus,
    message_id: Option<&str>,
) -> Result<(), sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query(
        // language=PostgreSQL
        r#"
            UPDATE invites
            SET status = $2, message_id = $3, updated_at = NOW()
            WHERE id = $1 AND status = 'pending'
        "#,
    )
    .bind(id)
    .bind(status.as_str())
    .bind(message_id)
    .execute(executor)
    .await?;
    Ok(())
}

/// Apply a delivery event reported by the email provider.
///
/// Only invites still in flight (`sent` or `delivered`) are touched, so a
/// late event never overwrites a response or a revocation.
pub async fn apply_delivery_status<'e, E>(
    executor: E,
    message_id: &str,
    status: InviteStatus,
) -> Result<u64, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let result = sqlx::query(
        // language=PostgreSQL
        r#"
            UPDATE invites
            SET status = $2, updated_at = NOW()
            WHERE message_id = $1 AND status IN ('sent', 'delivered')
        "#,
    )
    .bind(message_id)
    .bind(status.as_str())
    .execute(executor)
    .await?;
    Ok(result.rows_affected())
}

/// Mark invites whose link lapsed without a response
pub async fn expire_lapsed_invites<'e, E>(executor: E) -> Result<u64, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let result = sqlx::query(
        // language=PostgreSQL
        r#"
            UPDATE invites
            SET status = 'expired', updated_at = NOW()
            WHERE expires_at < NOW()
                AND status IN ('pending', 'sent', 'delivered', 'failed')
        "#,
    )
    .execute(executor)
    .await?;
    Ok(result.rows_affected())
}
