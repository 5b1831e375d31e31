use axum::http::{Method, header};
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::config::Environment;

/// Creates a CORS layer for the configured origins.
///
/// With no origins configured, development falls back to a permissive layer
/// and production allows no cross-origin requests.
pub fn create_cors_layer(allowed_origins: Vec<String>, environment: Environment) -> CorsLayer {
    if allowed_origins.is_empty() && environment.is_development() {
        return CorsLayer::very_permissive();
    }

    let origins = allowed_origins
        .into_iter()
        .filter_map(|s| s.parse::<axum::http::HeaderValue>().ok())
        .collect::<Vec<_>>();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT, header::AUTHORIZATION])
        .allow_credentials(true)
}
