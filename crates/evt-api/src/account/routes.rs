use axum::{
    Json, Router,
    extract::{Query, State},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::email_verification::{create_verification_token, verification_url, verify_email_token};
use crate::{
    ApiState,
    auth::{AuthOrganizer, service::resolve_organizer},
    error::ApiError,
    metrics,
    middleware::rate_limit,
};

pub fn routes() -> Router<ApiState> {
    use crate::make_rate_limit_layer;

    let account_routes = Router::new()
        .route("/account", get(get_account))
        .route("/account/email/verification", post(send_verification))
        .layer(make_rate_limit_layer!(
            rate_limit::GENERAL_REPLENISH_MS,
            rate_limit::GENERAL_BURST_SIZE
        ));

    // Token-bearing route, strict limit
    let verify_routes = Router::new()
        .route("/account/email/verify", get(verify_email))
        .layer(make_rate_limit_layer!(
            rate_limit::TOKEN_REPLENISH_MS,
            rate_limit::TOKEN_BURST_SIZE
        ));

    Router::new().merge(account_routes).merge(verify_routes)
}

#[derive(Debug, Serialize)]
pub struct AccountResponse {
    pub id: Uuid,
    pub email: String,
    pub email_verified: bool,
}

async fn get_account(
    organizer: AuthOrganizer,
    State(state): State<ApiState>,
) -> Result<Json<AccountResponse>, ApiError> {
    let organizer = resolve_organizer(&state.pool, &organizer).await?;

    Ok(Json(AccountResponse {
        id: organizer.id,
        email: organizer.email,
        email_verified: organizer.email_verified,
    }))
}

#[derive(Debug, Serialize)]
pub struct VerificationSentResponse {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verification_url: Option<String>,
}

async fn send_verification(
    organizer: AuthOrganizer,
    State(state): State<ApiState>,
) -> Result<Json<VerificationSentResponse>, ApiError> {
    let organizer = resolve_organizer(&state.pool, &organizer).await?;

    if organizer.email_verified {
        return Ok(Json(VerificationSentResponse {
            message: "Email already verified".to_string(),
            verification_url: None,
        }));
    }

    let issued =
        create_verification_token(&state.pool, organizer.id, state.verification_expiry_hours)
            .await?;
    let url = verification_url(&state.frontend_url, issued.id, &issued.token);

    match &state.email_service {
        Some(email_service) => {
            let result = email_service
                .send_verification_email(&organizer.email, &url, state.verification_expiry_hours)
                .await;
            metrics::record_email_event("email_verification", result.is_ok());
            result?;

            Ok(Json(VerificationSentResponse {
                message: "Verification email sent".to_string(),
                verification_url: None,
            }))
        }
        None if state.exposes_links() => Ok(Json(VerificationSentResponse {
            message: "Email service not configured, link returned for development".to_string(),
            verification_url: Some(url),
        })),
        None => Err(ApiError::Email("Email service not configured".to_string())),
    }
}

#[derive(Debug, Deserialize)]
struct VerifyEmailQuery {
    id: Uuid,
    token: String,
}

async fn verify_email(
    State(state): State<ApiState>,
    Query(query): Query<VerifyEmailQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    verify_email_token(&state.pool, query.id, &query.token).await?;

    Ok(Json(serde_json::json!({
        "message": "Email verified successfully"
    })))
}
