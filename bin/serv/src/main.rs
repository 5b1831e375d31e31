use std::net::SocketAddr;

use axum::{Router, extract::Request, middleware, routing::get};
use evt_api::{ApiConfig, ApiState};
use tower_http::trace::{DefaultOnResponse, TraceLayer};
use tracing::Level;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration from environment variables
    dotenvy::dotenv().ok();
    let config = ApiConfig::from_env()?;

    evt_api::tracing::init_tracing(config.env);
    tracing::info!(?config, "Configuration loaded");

    evt_db::ensure_database(&config.database_url).await?;
    let pool = evt_db::create_pool(&config.database_url, config.database_max_connections).await?;
    evt_db::run_migrations(&pool).await?;
    tracing::info!("Database migrations applied");

    let metrics_handle = evt_api::metrics::init_metrics()?;

    let state = ApiState::new(&config, pool);

    let _job_handles = evt_api::jobs::start_background_jobs(state.pool.clone());
    tracing::info!("Background jobs started (verification token cleanup, invite expiry)");

    let cors = evt_api::middleware::cors::create_cors_layer(config.allowed_origins(), config.env);

    // Responses are logged inside the request-ID span, which only carries the
    // normalized path. The raw URI may hold an RSVP token.
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|_: &Request| tracing::Span::current())
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    // Metrics endpoint has its own state
    let metrics_app = Router::new()
        .route("/metrics", get(evt_api::metrics::metrics_handler))
        .with_state(metrics_handle);

    let app = evt_api::router::router()
        .with_state(state)
        .merge(metrics_app)
        .layer(cors)
        .layer(trace_layer)
        .layer(middleware::from_fn(evt_api::metrics::track_metrics))
        .layer(middleware::from_fn(
            evt_api::middleware::request_id::request_id_middleware,
        ));

    let app = evt_api::middleware::security_headers::apply_security_headers(app, config.env);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, env = ?config.env, "Server listening");

    // Rate limiting keys on the peer address when no proxy header is present
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
