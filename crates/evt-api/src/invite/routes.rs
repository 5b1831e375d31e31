use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post},
};
use evt_db::{
    models::{Invite, InviteStatus},
    repositories::{invite as invite_repo, rsvp as rsvp_repo},
};
use uuid::Uuid;

use super::{
    model::{CreateInviteRequest, InviteResponse},
    service::{IssuedInvite, dispatch_invite, issue_invite, rotate_invite},
};
use crate::{
    ApiState,
    auth::{
        AuthOrganizer,
        service::{require_verified, resolve_organizer},
    },
    error::ApiError,
    event::routes::owned_event,
    middleware::rate_limit,
};

pub fn routes() -> Router<ApiState> {
    use crate::make_rate_limit_layer;

    Router::new()
        .route("/events/{event_id}/invites", get(list_invites).post(create_invite))
        .route(
            "/events/{event_id}/invites/{invite_id}/resend",
            post(resend_invite),
        )
        .route("/events/{event_id}/invites/{invite_id}", delete(revoke_invite))
        .layer(make_rate_limit_layer!(
            rate_limit::GENERAL_REPLENISH_MS,
            rate_limit::GENERAL_BURST_SIZE
        ))
}

fn to_response(state: &ApiState, issued: IssuedInvite) -> InviteResponse {
    InviteResponse {
        invite: issued.invite,
        rsvp_url: state.exposes_links().then_some(issued.rsvp_url),
    }
}

async fn create_invite(
    auth: AuthOrganizer,
    State(state): State<ApiState>,
    Path(event_id): Path<Uuid>,
    Json(payload): Json<CreateInviteRequest>,
) -> Result<(StatusCode, Json<InviteResponse>), ApiError> {
    let organizer = resolve_organizer(&state.pool, &auth).await?;
    require_verified(&organizer)?;
    let event = owned_event(&state, organizer.id, event_id).await?;
    let guest = payload.into_contact()?;

    let mut issued = issue_invite(&state, &event, &guest).await?;
    dispatch_invite(&state, &event, &mut issued).await?;

    Ok((StatusCode::CREATED, Json(to_response(&state, issued))))
}

async fn list_invites(
    auth: AuthOrganizer,
    State(state): State<ApiState>,
    Path(event_id): Path<Uuid>,
) -> Result<Json<Vec<Invite>>, ApiError> {
    let organizer = resolve_organizer(&state.pool, &auth).await?;
    let event = owned_event(&state, organizer.id, event_id).await?;

    let invites = invite_repo::list_by_event(&state.pool, event.id).await?;
    Ok(Json(invites))
}

async fn resend_invite(
    auth: AuthOrganizer,
    State(state): State<ApiState>,
    Path((event_id, invite_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<InviteResponse>, ApiError> {
    let organizer = resolve_organizer(&state.pool, &auth).await?;
    require_verified(&organizer)?;
    let event = owned_event(&state, organizer.id, event_id).await?;
    let invite = invite_repo::find_in_event(&state.pool, invite_id, event.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Invite not found".to_string()))?;

    let mut issued = rotate_invite(&state, &event, &invite).await?;
    dispatch_invite(&state, &event, &mut issued).await?;

    Ok(Json(to_response(&state, issued)))
}

async fn revoke_invite(
    auth: AuthOrganizer,
    State(state): State<ApiState>,
    Path((event_id, invite_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, ApiError> {
    let organizer = resolve_organizer(&state.pool, &auth).await?;
    let event = owned_event(&state, organizer.id, event_id).await?;

    // Locked so an in-flight reply either lands before the revoke and is
    // removed with it, or sees the revoked status and is rejected
    let mut tx = state.pool.begin().await?;
    let invite = invite_repo::find_by_id_for_update(&mut *tx, invite_id)
        .await?
        .filter(|invite| invite.event_id == event.id)
        .ok_or_else(|| ApiError::NotFound("Invite not found".to_string()))?;

    // A revoked guest no longer counts towards the headcount
    invite_repo::set_status(&mut *tx, invite.id, InviteStatus::Revoked).await?;
    rsvp_repo::delete_by_invite(&mut *tx, invite.id).await?;
    tx.commit().await?;

    tracing::info!(invite_id = %invite.id, "Invite revoked");

    Ok(StatusCode::NO_CONTENT)
}
