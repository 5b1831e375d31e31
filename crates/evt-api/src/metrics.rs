//! Prometheus metrics for request traffic and token handling.

use std::{sync::LazyLock, time::Instant};

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use metrics::{counter, histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use regex::Regex;

static UUID_SEGMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}")
        .expect("uuid pattern is valid")
});

static NUMBER_SEGMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/\d+(/|$)").expect("number pattern is valid"));

/// Initialize Prometheus metrics exporter
pub fn init_metrics() -> anyhow::Result<PrometheusHandle> {
    let handle = PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full("http_request_duration_seconds".to_string()),
            &[
                0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
            ],
        )?
        .install_recorder()?;

    Ok(handle)
}

/// Middleware to record HTTP request metrics
pub async fn track_metrics(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().to_string();
    let path = normalize_path(req.uri().path());

    let response = next.run(req).await;

    let duration = start.elapsed().as_secs_f64();
    let status = response.status().as_u16().to_string();

    counter!(
        "http_requests_total",
        "method" => method.clone(),
        "path" => path.clone(),
        "status" => status.clone()
    )
    .increment(1);

    histogram!(
        "http_request_duration_seconds",
        "method" => method,
        "path" => path,
        "status" => status
    )
    .record(duration);

    response
}

/// Normalize URL paths so they are safe to use as labels and log fields.
///
/// IDs become `:id` and the secret segment of RSVP links becomes `:token`.
pub fn normalize_path(path: &str) -> String {
    let normalized = UUID_SEGMENT.replace_all(path, ":id");
    let normalized = NUMBER_SEGMENT.replace_all(&normalized, "/:id$1");

    match normalized.strip_prefix("/rsvp/") {
        Some(rest) => {
            let mut segments = rest.splitn(2, '/');
            let invite = segments.next().unwrap_or_default();
            match segments.next() {
                Some(_) => format!("/rsvp/{invite}/:token"),
                None => format!("/rsvp/{invite}"),
            }
        }
        None => normalized.into_owned(),
    }
}

/// Handler for the /metrics endpoint
pub async fn metrics_handler(State(handle): State<PrometheusHandle>) -> impl IntoResponse {
    (StatusCode::OK, handle.render())
}

/// Record the outcome of checking a presented link token.
///
/// `kind` is `rsvp` or `email_verification`; `outcome` one of `verified`,
/// `rejected`, `malformed`, `expired`.
pub fn record_token_check(kind: &'static str, outcome: &'static str) {
    counter!("token_checks_total", "kind" => kind, "outcome" => outcome).increment(1);
}

/// Record email sending events
pub fn record_email_event(email_type: &'static str, success: bool) {
    let status = if success { "success" } else { "failure" };

    counter!("email_events_total", "type" => email_type, "status" => status).increment(1);
}

/// Record a decoded delivery webhook
pub fn record_webhook_event(event: &'static str) {
    counter!("email_webhook_events_total", "event" => event).increment(1);
}

/// Record a submitted RSVP
pub fn record_rsvp(response: &'static str) {
    counter!("rsvp_submissions_total", "response" => response).increment(1);
}
