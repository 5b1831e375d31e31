use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// Session cookie set by the auth provider
pub const SESSION_COOKIE: &str = "__session";

/// Claims carried by an organizer session token
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Provider user ID
    pub sub: String,
    pub email: String,
    pub exp: usize,
    #[serde(default)]
    pub iat: Option<usize>,
}

/// Verify and decode a session token issued by the auth provider
pub fn verify_session_token(token: &str, jwt_secret: &str) -> Result<Claims, ApiError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_required_spec_claims(&["exp", "sub"]);

    let token_data = jsonwebtoken::decode::<Claims>(
        token,
        &DecodingKey::from_secret(jwt_secret.as_bytes()),
        &validation,
    )
    .map_err(|e| {
        tracing::debug!("Rejected session token: {e}");
        ApiError::Auth("Invalid or expired session".to_string())
    })?;

    if token_data.claims.sub.is_empty() {
        return Err(ApiError::Auth("Invalid or expired session".to_string()));
    }

    Ok(token_data.claims)
}
