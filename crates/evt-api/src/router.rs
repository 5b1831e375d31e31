use axum::{Json, Router, http::StatusCode, response::IntoResponse, routing::get};
use serde_json::json;

use crate::{account, analytics, event, invite, rsvp, state::ApiState, webhook};

pub fn router() -> Router<ApiState> {
    Router::new()
        .route("/health", get(health))
        .merge(account::routes())
        .merge(event::routes())
        .merge(invite::routes())
        .merge(rsvp::routes())
        .merge(analytics::routes())
        .merge(webhook::routes())
        .fallback(handler_404)
}

async fn health() -> StatusCode {
    StatusCode::OK
}

async fn handler_404() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": "The requested resource was not found" })),
    )
}
