use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use chrono::{Days, NaiveDate, Utc};
use evt_db::repositories::event as event_repo;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::series::{DailyBucket, ResponseTally, daily_series, start_of_day, totals};
use crate::{
    ApiState,
    auth::{AuthOrganizer, service::resolve_organizer},
    error::ApiError,
    event::routes::owned_event,
    middleware::rate_limit,
};

pub const DEFAULT_WINDOW_DAYS: u32 = 30;
pub const MAX_WINDOW_DAYS: u32 = 365;

pub fn routes() -> Router<ApiState> {
    use crate::make_rate_limit_layer;

    Router::new()
        .route("/events/{event_id}/analytics", get(get_analytics))
        .layer(make_rate_limit_layer!(
            rate_limit::GENERAL_REPLENISH_MS,
            rate_limit::GENERAL_BURST_SIZE
        ))
}

#[derive(Debug, Deserialize)]
pub struct AnalyticsQuery {
    pub days: Option<u32>,
}

impl AnalyticsQuery {
    fn window_days(&self) -> Result<u32, ApiError> {
        let days = self.days.unwrap_or(DEFAULT_WINDOW_DAYS);
        if !(1..=MAX_WINDOW_DAYS).contains(&days) {
            return Err(ApiError::Validation(format!(
                "days must be between 1 and {MAX_WINDOW_DAYS}"
            )));
        }
        Ok(days)
    }
}

#[derive(Debug, Serialize)]
pub struct AnalyticsResponse {
    pub event_id: Uuid,
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub totals: ResponseTally,
    pub daily: Vec<DailyBucket>,
}

async fn get_analytics(
    auth: AuthOrganizer,
    State(state): State<ApiState>,
    Path(event_id): Path<Uuid>,
    Query(query): Query<AnalyticsQuery>,
) -> Result<Json<AnalyticsResponse>, ApiError> {
    let days = query.window_days()?;
    let organizer = resolve_organizer(&state.pool, &auth).await?;
    let event = owned_event(&state, organizer.id, event_id).await?;

    let to = Utc::now().date_naive();
    let from = to
        .checked_sub_days(Days::new(u64::from(days - 1)))
        .ok_or_else(|| ApiError::Validation("Invalid analytics window".to_string()))?;

    let activity = event_repo::rsvp_activity_since(&state.pool, event.id, start_of_day(from)).await?;
    let daily = daily_series(&activity, from, to);

    Ok(Json(AnalyticsResponse {
        event_id: event.id,
        from,
        to,
        totals: totals(&daily),
        daily,
    }))
}
