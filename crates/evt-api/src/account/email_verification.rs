use chrono::{DateTime, Duration, Utc};
use evt_db::repositories::{organizer as organizer_repo, token as token_repo};
use evt_token::{generate_token_pair, verify_token};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{error::ApiError, metrics, validation::is_plausible_token};

const INVALID_LINK: &str = "Invalid or expired verification link";

/// A verification token just issued; `token` goes into the emailed link only.
pub struct IssuedVerification {
    pub id: Uuid,
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Create an email verification token, invalidating any unused ones
pub async fn create_verification_token(
    pool: &PgPool,
    organizer_id: Uuid,
    expires_in_hours: i64,
) -> Result<IssuedVerification, ApiError> {
    let pair = generate_token_pair()?;
    let expires_at = Utc::now() + Duration::hours(expires_in_hours);

    let mut tx = pool.begin().await?;
    token_repo::invalidate_verification_tokens(&mut *tx, organizer_id).await?;
    let id = token_repo::insert_verification_token(&mut *tx, organizer_id, &pair.hash, expires_at).await?;
    tx.commit().await?;

    Ok(IssuedVerification {
        id,
        token: pair.token,
        expires_at,
    })
}

/// Link sent to the organizer
pub fn verification_url(frontend_url: &str, id: Uuid, token: &str) -> String {
    format!("{frontend_url}/verify-email?id={id}&token={token}")
}

/// Check a presented verification token and mark the organizer's email as verified
pub async fn verify_email_token(pool: &PgPool, id: Uuid, token: &str) -> Result<Uuid, ApiError> {
    if !is_plausible_token(token) {
        metrics::record_token_check("email_verification", "malformed");
        return Err(ApiError::Auth(INVALID_LINK.to_string()));
    }

    let record = token_repo::find_verification_token(pool, id)
        .await?
        .ok_or_else(|| ApiError::Auth(INVALID_LINK.to_string()))?;

    if !verify_token(token, &record.token_hash) {
        metrics::record_token_check("email_verification", "rejected");
        tracing::warn!(verification_id = %id, "Email verification token mismatch");
        return Err(ApiError::Auth(INVALID_LINK.to_string()));
    }

    let mut tx = pool.begin().await?;

    // Single use: the conditional update fails for used or expired tokens
    if !token_repo::consume_verification_token(&mut *tx, record.id).await? {
        metrics::record_token_check("email_verification", "expired");
        return Err(ApiError::Auth(INVALID_LINK.to_string()));
    }

    organizer_repo::mark_email_verified(&mut *tx, record.organizer_id).await?;
    tx.commit().await?;

    metrics::record_token_check("email_verification", "verified");
    tracing::info!(organizer_id = %record.organizer_id, "Organizer email verified");

    Ok(record.organizer_id)
}
