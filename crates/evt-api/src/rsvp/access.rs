//! Authorization of tokenized RSVP links.
//!
//! The invite is looked up by its non-secret ID; the token from the URL is
//! then checked against the stored digest. A missing invite, a malformed
//! token and a wrong token all produce the same 404 so the endpoint cannot be
//! used to probe which invites exist.

use chrono::{DateTime, Utc};
use evt_db::models::{Invite, InviteStatus};
use evt_token::verify_token;

use crate::{error::ApiError, metrics, validation::is_plausible_token};

/// The one error every unusable link maps to
pub fn invite_not_found() -> ApiError {
    ApiError::NotFound("Invitation not found".to_string())
}

/// Authorize access to an invite through its link token
pub fn check_invite_access(
    invite: Option<Invite>,
    presented_token: &str,
    now: DateTime<Utc>,
) -> Result<Invite, ApiError> {
    if !is_plausible_token(presented_token) {
        metrics::record_token_check("rsvp", "malformed");
        return Err(invite_not_found());
    }

    let Some(invite) = invite else {
        metrics::record_token_check("rsvp", "rejected");
        return Err(invite_not_found());
    };

    if !verify_token(presented_token, &invite.token_hash) {
        metrics::record_token_check("rsvp", "rejected");
        tracing::warn!(invite_id = %invite.id, "RSVP token mismatch");
        return Err(invite_not_found());
    }

    if invite.status == InviteStatus::Revoked {
        metrics::record_token_check("rsvp", "rejected");
        return Err(invite_not_found());
    }

    if invite.is_expired_at(now) {
        metrics::record_token_check("rsvp", "expired");
        return Err(ApiError::Gone("This invitation has expired".to_string()));
    }

    metrics::record_token_check("rsvp", "verified");
    Ok(invite)
}
