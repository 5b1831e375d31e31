//! Log output setup.
//!
//! Pretty output while developing, JSON in production. Link tokens never
//! appear in log fields; request spans carry a normalized path only.

use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Environment;

/// Filter used when `RUST_LOG` is unset
pub const fn default_directives(env: Environment) -> &'static str {
    match env {
        Environment::Development => "debug,tower_http=debug,sqlx=warn,lettre=info",
        Environment::Production => "info,tower_http=info,sqlx=warn,lettre=warn",
    }
}

/// Install the global subscriber.
///
/// `RUST_LOG` overrides the default filter, e.g. `RUST_LOG=info,evt_api=debug`.
/// Production logs are flattened JSON with the current span (and so the
/// request ID) attached to every event.
pub fn init_tracing(env: Environment) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(env)));

    let output = match env {
        Environment::Development => tracing_subscriber::fmt::layer()
            .with_file(true)
            .with_line_number(true)
            .pretty()
            .boxed(),
        Environment::Production => tracing_subscriber::fmt::layer()
            .json()
            .flatten_event(true)
            .with_current_span(true)
            .with_span_list(false)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(output.with_filter(filter))
        .init();

    tracing::info!(env = ?env, "Tracing initialized");
}
