use axum::{
    Router,
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::post,
};
use evt_db::repositories::invite as invite_repo;
use evt_token::hash_token;
use subtle::ConstantTimeEq;

use super::payload::EmailEvent;
use crate::{ApiState, error::ApiError, metrics, middleware::rate_limit};

pub const WEBHOOK_SECRET_HEADER: &str = "x-webhook-secret";

pub fn routes() -> Router<ApiState> {
    use crate::make_rate_limit_layer;

    Router::new()
        .route("/webhooks/email", post(email_webhook))
        .layer(make_rate_limit_layer!(
            rate_limit::GENERAL_REPLENISH_MS,
            rate_limit::GENERAL_BURST_SIZE
        ))
}

/// Compare the presented shared secret with the configured one.
///
/// Both sides are hashed first so the comparison always runs over two
/// fixed-length digests and its timing reveals nothing about the secret's
/// length.
fn secret_matches(headers: &HeaderMap, expected: &str) -> bool {
    let Some(presented) = headers
        .get(WEBHOOK_SECRET_HEADER)
        .and_then(|value| value.to_str().ok())
    else {
        return false;
    };

    let presented = hash_token(presented);
    let expected = hash_token(expected);
    presented.as_bytes().ct_eq(expected.as_bytes()).into()
}

async fn email_webhook(
    State(state): State<ApiState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<StatusCode, ApiError> {
    let Some(secret) = state.webhook_secret.as_deref() else {
        return Err(ApiError::NotFound("Not found".to_string()));
    };

    if !secret_matches(&headers, secret) {
        tracing::warn!("Rejected email webhook with bad secret");
        return Err(ApiError::Auth("Invalid webhook secret".to_string()));
    }

    let event = EmailEvent::decode(&body).map_err(|e| ApiError::Validation(e.to_string()))?;
    metrics::record_webhook_event(event.name());

    if let Some(status) = event.invite_status() {
        let updated =
            invite_repo::apply_delivery_status(&state.pool, event.message_id(), status).await?;
        tracing::info!(
            event = event.name(),
            status = %status,
            updated,
            "Applied email delivery event"
        );
    }

    if let EmailEvent::Failed {
        reason: Some(reason),
        ..
    } = &event
    {
        tracing::warn!(reason = %reason, "Invite email delivery failed");
    }

    Ok(StatusCode::NO_CONTENT)
}
