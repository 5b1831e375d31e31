use chrono::{DateTime, Utc};
use evt_db::models::{InviteStatus, Rsvp, RsvpResponse};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{error::ApiError, event::model::PublicEventResponse, validation::validate_text_len};

/// Largest party a single invite can answer for
pub const MAX_PARTY_SIZE: i32 = 10;

#[derive(Debug, Deserialize)]
pub struct RsvpRequest {
    pub response: RsvpResponse,
    pub guest_count: Option<i32>,
    pub note: Option<String>,
}

/// A validated reply, ready to store
#[derive(Debug, PartialEq, Eq)]
pub struct RsvpSubmission {
    pub response: RsvpResponse,
    pub guest_count: i32,
    pub note: Option<String>,
}

impl RsvpRequest {
    pub fn into_submission(self) -> Result<RsvpSubmission, ApiError> {
        let guest_count = match self.response {
            RsvpResponse::Declined => 0,
            RsvpResponse::Attending | RsvpResponse::Maybe => {
                let count = self.guest_count.unwrap_or(1);
                if !(1..=MAX_PARTY_SIZE).contains(&count) {
                    return Err(ApiError::Validation(format!(
                        "Guest count must be between 1 and {MAX_PARTY_SIZE}"
                    )));
                }
                count
            }
        };

        let note = self
            .note
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());
        if let Some(note) = &note {
            validate_text_len("Note", note, 1, 500)?;
        }

        Ok(RsvpSubmission {
            response: self.response,
            guest_count,
            note,
        })
    }
}

/// What a guest sees when opening their link
#[derive(Debug, Serialize)]
pub struct RsvpPageResponse {
    pub invite_id: Uuid,
    pub guest_name: String,
    pub status: InviteStatus,
    pub expires_at: DateTime<Utc>,
    pub event: PublicEventResponse,
    pub rsvp: Option<Rsvp>,
}
