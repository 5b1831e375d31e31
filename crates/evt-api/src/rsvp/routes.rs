use axum::{
    Json, Router,
    extract::{Path, State},
    http::header,
    response::IntoResponse,
    routing::get,
};
use chrono::Utc;
use evt_db::{
    models::{Rsvp, RsvpResponse},
    repositories::{event as event_repo, invite as invite_repo, rsvp as rsvp_repo},
};
use uuid::Uuid;

use super::{
    access::{check_invite_access, invite_not_found},
    model::{RsvpPageResponse, RsvpRequest},
};
use crate::{
    ApiState, error::ApiError, event::model::PublicEventResponse, metrics, middleware::rate_limit,
    validation::is_plausible_token,
};

/// Link-bearing pages must never be stored by browsers or proxies
const NO_STORE: [(header::HeaderName, &str); 1] = [(header::CACHE_CONTROL, "no-store")];

pub fn routes() -> Router<ApiState> {
    use crate::make_rate_limit_layer;

    Router::new()
        .route("/rsvp/{invite_id}/{token}", get(get_rsvp).post(submit_rsvp))
        .layer(make_rate_limit_layer!(
            rate_limit::TOKEN_REPLENISH_MS,
            rate_limit::TOKEN_BURST_SIZE
        ))
}

/// Reject links that cannot match anything before touching the database.
/// A malformed ID is treated like an unknown one.
fn link_invite_id(raw_id: &str, token: &str) -> Result<Uuid, ApiError> {
    match Uuid::parse_str(raw_id) {
        Ok(id) if is_plausible_token(token) => Ok(id),
        _ => {
            metrics::record_token_check("rsvp", "malformed");
            Err(invite_not_found())
        }
    }
}

async fn get_rsvp(
    State(state): State<ApiState>,
    Path((invite_id, token)): Path<(String, String)>,
) -> Result<impl IntoResponse, ApiError> {
    let invite_id = link_invite_id(&invite_id, &token)?;
    let invite = invite_repo::find_by_id(&state.pool, invite_id).await?;
    let invite = check_invite_access(invite, &token, Utc::now())?;

    let event = event_repo::find_by_id(&state.pool, invite.event_id)
        .await?
        .ok_or_else(invite_not_found)?;
    let counts = event_repo::rsvp_counts(&state.pool, event.id).await?;
    let rsvp = rsvp_repo::find_by_invite(&state.pool, invite.id).await?;

    Ok((
        NO_STORE,
        Json(RsvpPageResponse {
            invite_id: invite.id,
            guest_name: invite.guest_name,
            status: invite.status,
            expires_at: invite.expires_at,
            event: PublicEventResponse::new(event, &counts),
            rsvp,
        }),
    ))
}

async fn submit_rsvp(
    State(state): State<ApiState>,
    Path((invite_id, token)): Path<(String, String)>,
    Json(payload): Json<RsvpRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let invite_id = link_invite_id(&invite_id, &token)?;
    let mut tx = state.pool.begin().await?;

    // Held until commit, so a concurrent revoke or resend cannot slip in
    // between the token check and the write
    let invite = invite_repo::find_by_id_for_update(&mut *tx, invite_id).await?;
    let invite = check_invite_access(invite, &token, Utc::now())?;
    let submission = payload.into_submission()?;

    // Serializes concurrent replies for the same event
    let event = event_repo::lock_by_id(&mut *tx, invite.event_id)
        .await?
        .ok_or_else(invite_not_found)?;

    if submission.response == RsvpResponse::Attending
        && let Some(capacity) = event.capacity
    {
        let taken = rsvp_repo::attending_headcount_excluding(&mut *tx, event.id, invite.id).await?;
        if taken + i64::from(submission.guest_count) > i64::from(capacity) {
            return Err(ApiError::Conflict(
                "Not enough spots left for this party size".to_string(),
            ));
        }
    }

    let rsvp: Rsvp = rsvp_repo::upsert_rsvp(
        &mut *tx,
        invite.id,
        event.id,
        submission.response,
        submission.guest_count,
        submission.note.as_deref(),
    )
    .await?;
    if !invite_repo::mark_responded(&mut *tx, invite.id).await? {
        return Err(invite_not_found());
    }

    tx.commit().await?;

    metrics::record_rsvp(submission.response.as_str());
    tracing::info!(
        invite_id = %invite.id,
        event_id = %event.id,
        response = %submission.response,
        guest_count = submission.guest_count,
        "RSVP recorded"
    );

    Ok((NO_STORE, Json(rsvp)))
}
