pub mod account;
pub mod analytics;
pub mod auth;
pub mod config;
pub mod email;
pub mod error;
pub mod event;
pub mod invite;
pub mod jobs;
pub mod metrics;
pub mod middleware;
pub mod normalization;
pub mod router;
pub mod rsvp;
pub mod state;
pub mod tracing;
pub mod validation;
pub mod webhook;

pub use config::ApiConfig;
pub use state::{ApiState, AuthConfig};
