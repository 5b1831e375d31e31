use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts},
};
use axum_extra::extract::CookieJar;

use super::jwt::{SESSION_COOKIE, verify_session_token};
use crate::{error::ApiError, state::AuthConfig};

/// Authenticated organizer extractor
///
/// Reads the auth provider's session token from the `__session` cookie, or
/// from an `Authorization: Bearer` header for API clients.
///
/// # Example
/// ```
/// use axum::extract::State;
/// use evt_api::{error::ApiError, auth::AuthOrganizer, ApiState};
///
/// async fn protected_route(
///     organizer: AuthOrganizer,
///     State(state): State<ApiState>,
/// ) -> Result<(), ApiError> {
///     // organizer.subject and organizer.email are available
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthOrganizer {
    /// Provider user ID
    pub subject: String,
    pub email: String,
}

impl<S> FromRequestParts<S> for AuthOrganizer
where
    AuthConfig: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let auth_config = AuthConfig::from_ref(state);

        let token = bearer_token(parts)
            .or_else(|| {
                CookieJar::from_headers(&parts.headers)
                    .get(SESSION_COOKIE)
                    .map(|c| c.value().to_owned())
            })
            .ok_or_else(|| ApiError::Auth("Not authenticated".to_string()))?;

        let claims = verify_session_token(&token, &auth_config.jwt_secret)?;

        Ok(Self {
            subject: claims.sub,
            email: claims.email,
        })
    }
}

fn bearer_token(parts: &Parts) -> Option<String> {
    parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}
