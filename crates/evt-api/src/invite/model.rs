use evt_db::models::Invite;
use serde::{Deserialize, Serialize};

use crate::{
    error::ApiError,
    normalization::{normalize_display_name, normalize_email},
    validation::{validate_email, validate_guest_name},
};

#[derive(Debug, Deserialize)]
pub struct CreateInviteRequest {
    pub guest_name: String,
    pub guest_email: String,
}

/// Guest details after normalization and validation
#[derive(Debug, PartialEq, Eq)]
pub struct GuestContact {
    pub name: String,
    pub email: String,
}

impl CreateInviteRequest {
    pub fn into_contact(self) -> Result<GuestContact, ApiError> {
        let name = normalize_display_name(&self.guest_name);
        let email = normalize_email(&self.guest_email);

        validate_guest_name(&name)?;
        validate_email(&email)?;

        Ok(GuestContact { name, email })
    }
}

/// Invite as returned to the organizer. The token digest is never serialized;
/// the link itself is only present in local development without a mailer.
#[derive(Debug, Serialize)]
pub struct InviteResponse {
    #[serde(flatten)]
    pub invite: Invite,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rsvp_url: Option<String>,
}
