use chrono::{DateTime, Duration, Utc};
use evt_db::{
    models::{Event, Invite, InviteStatus},
    repositories::invite as invite_repo,
};
use evt_token::generate_token_pair;

use super::model::GuestContact;
use crate::{ApiState, error::ApiError, metrics};

/// An invite together with its freshly issued link. The link is the only
/// place the plaintext token exists; it is emailed and then dropped.
pub struct IssuedInvite {
    pub invite: Invite,
    pub rsvp_url: String,
}

/// Links lapse after `expiry_days`, or when the event starts if that is sooner.
pub fn invite_expiry(now: DateTime<Utc>, starts_at: DateTime<Utc>, expiry_days: i64) -> DateTime<Utc> {
    (now + Duration::days(expiry_days)).min(starts_at)
}

/// Link a guest follows to respond
pub fn rsvp_url(frontend_url: &str, invite: &Invite, token: &str) -> String {
    format!("{frontend_url}/rsvp/{}/{token}", invite.id)
}

fn ensure_upcoming(event: &Event, now: DateTime<Utc>) -> Result<(), ApiError> {
    if event.starts_at <= now {
        return Err(ApiError::Conflict("Event has already started".to_string()));
    }
    Ok(())
}

/// Create an invite for a guest, storing only the digest of its link token
pub async fn issue_invite(
    state: &ApiState,
    event: &Event,
    guest: &GuestContact,
) -> Result<IssuedInvite, ApiError> {
    let now = Utc::now();
    ensure_upcoming(event, now)?;

    let pair = generate_token_pair()?;
    let expires_at = invite_expiry(now, event.starts_at, state.invite_expiry_days);

    let invite = match invite_repo::insert_invite(
        &state.pool,
        event.id,
        &guest.name,
        &guest.email,
        &pair.hash,
        expires_at,
    )
    .await
    {
        Ok(invite) => invite,
        Err(sqlx::Error::Database(db_err))
            if db_err.constraint() == Some("invites_event_guest_email_key") =>
        {
            return Err(ApiError::Conflict(
                "This guest has already been invited".to_string(),
            ));
        }
        Err(e) => return Err(e.into()),
    };

    tracing::info!(invite_id = %invite.id, event_id = %event.id, "Invite issued");

    let rsvp_url = rsvp_url(&state.frontend_url, &invite, &pair.token);
    Ok(IssuedInvite { invite, rsvp_url })
}

/// Replace an invite's token. The old link stops verifying immediately.
pub async fn rotate_invite(
    state: &ApiState,
    event: &Event,
    invite: &Invite,
) -> Result<IssuedInvite, ApiError> {
    let now = Utc::now();
    ensure_upcoming(event, now)?;

    // Status is checked on the locked row, not the caller's copy
    let mut tx = state.pool.begin().await?;
    let locked = invite_repo::find_by_id_for_update(&mut *tx, invite.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Invite not found".to_string()))?;
    if locked.status == InviteStatus::Revoked {
        return Err(ApiError::Conflict("Invite has been revoked".to_string()));
    }

    let pair = generate_token_pair()?;
    let expires_at = invite_expiry(now, event.starts_at, state.invite_expiry_days);
    let invite = invite_repo::rotate_token(&mut *tx, locked.id, &pair.hash, expires_at).await?;
    tx.commit().await?;

    tracing::info!(invite_id = %invite.id, "Invite token rotated");

    let rsvp_url = rsvp_url(&state.frontend_url, &invite, &pair.token);
    Ok(IssuedInvite { invite, rsvp_url })
}

/// Email the link to the guest and record the outcome on the invite.
///
/// A failed send is not an error for the organizer's request: the invite
/// exists and can be resent.
pub async fn dispatch_invite(
    state: &ApiState,
    event: &Event,
    issued: &mut IssuedInvite,
) -> Result<(), ApiError> {
    let Some(email_service) = &state.email_service else {
        tracing::debug!(invite_id = %issued.invite.id, "No mailer configured, invite left pending");
        return Ok(());
    };

    // Responded invites keep their status; only a fresh link is mailed
    let track_status = issued.invite.status == InviteStatus::Pending;

    let result = email_service
        .send_invite(
            &issued.invite.guest_email,
            &issued.invite.guest_name,
            &event.title,
            event.starts_at,
            &issued.rsvp_url,
        )
        .await;
    metrics::record_email_event("invite", result.is_ok());

    let (status, message_id) = match result {
        Ok(message_id) => (InviteStatus::Sent, Some(message_id)),
        Err(e) => {
            tracing::error!(invite_id = %issued.invite.id, "Failed to send invite: {e}");
            (InviteStatus::Failed, None)
        }
    };

    if track_status {
        invite_repo::record_dispatch(&state.pool, issued.invite.id, status, message_id.as_deref())
            .await?;
        issued.invite.status = status;
        issued.invite.message_id = message_id;
    }

    Ok(())
}
