use evt_db::{models::Organizer, repositories::organizer as organizer_repo};
use sqlx::PgPool;

use super::AuthOrganizer;
use crate::{error::ApiError, normalization::normalize_email, validation::validate_email};

/// Map an authenticated session to the local organizer row, creating it on
/// first sight.
pub async fn resolve_organizer(pool: &PgPool, auth: &AuthOrganizer) -> Result<Organizer, ApiError> {
    let email = normalize_email(&auth.email);
    validate_email(&email).map_err(|_| ApiError::Auth("Session has no usable email".to_string()))?;

    let organizer = organizer_repo::upsert_by_external_id(pool, &auth.subject, &email).await?;
    Ok(organizer)
}

/// Organizers must confirm their address before guests receive mail from them.
pub fn require_verified(organizer: &Organizer) -> Result<(), ApiError> {
    if !organizer.email_verified {
        return Err(ApiError::Forbidden(
            "Verify your email address before sending invitations".to_string(),
        ));
    }
    Ok(())
}
