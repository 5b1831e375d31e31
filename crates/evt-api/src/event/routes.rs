use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
};
use chrono::Utc;
use evt_db::{models::Event, repositories::event as event_repo};
use uuid::Uuid;

use super::model::{CreateEventRequest, EventResponse, PublicEventResponse};
use crate::{
    ApiState,
    auth::{AuthOrganizer, service::resolve_organizer},
    error::ApiError,
    middleware::rate_limit,
};

pub fn routes() -> Router<ApiState> {
    use crate::make_rate_limit_layer;

    Router::new()
        .route("/events", get(list_events).post(create_event))
        .route("/events/{event_id}", get(get_event).delete(delete_event))
        .route("/public/events/{event_id}", get(get_public_event))
        .layer(make_rate_limit_layer!(
            rate_limit::GENERAL_REPLENISH_MS,
            rate_limit::GENERAL_BURST_SIZE
        ))
}

/// Load an event owned by the organizer, 404 otherwise
pub(crate) async fn owned_event(
    state: &ApiState,
    organizer_id: Uuid,
    event_id: Uuid,
) -> Result<Event, ApiError> {
    event_repo::find_owned(&state.pool, event_id, organizer_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Event not found".to_string()))
}

async fn create_event(
    auth: AuthOrganizer,
    State(state): State<ApiState>,
    Json(payload): Json<CreateEventRequest>,
) -> Result<(StatusCode, Json<EventResponse>), ApiError> {
    let organizer = resolve_organizer(&state.pool, &auth).await?;
    let new_event = payload.validate(organizer.id, Utc::now())?;

    let event = event_repo::insert_event(&state.pool, &new_event).await?;
    tracing::info!(event_id = %event.id, organizer_id = %organizer.id, "Event created");

    Ok((
        StatusCode::CREATED,
        Json(EventResponse {
            event,
            rsvps: Default::default(),
        }),
    ))
}

async fn list_events(
    auth: AuthOrganizer,
    State(state): State<ApiState>,
) -> Result<Json<Vec<Event>>, ApiError> {
    let organizer = resolve_organizer(&state.pool, &auth).await?;
    let events = event_repo::list_by_organizer(&state.pool, organizer.id).await?;
    Ok(Json(events))
}

async fn get_event(
    auth: AuthOrganizer,
    State(state): State<ApiState>,
    Path(event_id): Path<Uuid>,
) -> Result<Json<EventResponse>, ApiError> {
    let organizer = resolve_organizer(&state.pool, &auth).await?;
    let event = owned_event(&state, organizer.id, event_id).await?;
    let rsvps = event_repo::rsvp_counts(&state.pool, event.id).await?;

    Ok(Json(EventResponse { event, rsvps }))
}

async fn delete_event(
    auth: AuthOrganizer,
    State(state): State<ApiState>,
    Path(event_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let organizer = resolve_organizer(&state.pool, &auth).await?;

    if event_repo::delete_owned(&state.pool, event_id, organizer.id).await? == 0 {
        return Err(ApiError::NotFound("Event not found".to_string()));
    }

    tracing::info!(event_id = %event_id, "Event deleted");
    Ok(StatusCode::NO_CONTENT)
}

async fn get_public_event(
    State(state): State<ApiState>,
    Path(event_id): Path<Uuid>,
) -> Result<Json<PublicEventResponse>, ApiError> {
    let event = event_repo::find_by_id(&state.pool, event_id)
        .await?
        .filter(|event| event.is_public)
        .ok_or_else(|| ApiError::NotFound("Event not found".to_string()))?;

    let counts = event_repo::rsvp_counts(&state.pool, event.id).await?;
    Ok(Json(PublicEventResponse::new(event, &counts)))
}
