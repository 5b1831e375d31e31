//! Background jobs for periodic maintenance.
//!
//! Expiry is already enforced when a link is used. These jobs keep the tables
//! tidy and make invite lists show lapsed invites as `expired`.

use std::time::Duration;

use evt_db::repositories::{invite as invite_repo, token as token_repo};
use sqlx::PgPool;
use tokio::{task::JoinHandle, time::interval};

/// Start all background jobs
///
/// Returns the join handles so the caller can keep or abort them
pub fn start_background_jobs(pool: PgPool) -> Vec<JoinHandle<()>> {
    vec![
        tokio::spawn(periodic_verification_token_cleanup_job(pool.clone())),
        tokio::spawn(periodic_invite_expiry_job(pool)),
    ]
}

/// Delete used or expired email verification tokens every 6 hours
async fn periodic_verification_token_cleanup_job(pool: PgPool) {
    // Stay out of the way of startup
    tokio::time::sleep(Duration::from_secs(600)).await;

    let mut interval = interval(Duration::from_secs(21600));

    loop {
        interval.tick().await;

        match token_repo::cleanup_expired_verification_tokens(&pool).await {
            Ok(deleted) if deleted > 0 => {
                tracing::info!(deleted, "Verification token cleanup complete");
            }
            Ok(_) => {
                tracing::debug!("Verification token cleanup complete: nothing to delete");
            }
            Err(e) => {
                tracing::error!("Failed to clean up verification tokens: {e}");
            }
        }
    }
}

/// Mark invites whose link lapsed without a reply, every hour
async fn periodic_invite_expiry_job(pool: PgPool) {
    tokio::time::sleep(Duration::from_secs(60)).await;

    let mut interval = interval(Duration::from_secs(3600));

    loop {
        interval.tick().await;

        match invite_repo::expire_lapsed_invites(&pool).await {
            Ok(expired) if expired > 0 => {
                tracing::info!(expired, "Marked lapsed invites as expired");
            }
            Ok(_) => {
                tracing::debug!("Invite expiry complete: no lapsed invites");
            }
            Err(e) => {
                tracing::error!("Failed to expire lapsed invites: {e}");
            }
        }
    }
}
