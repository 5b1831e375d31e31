use axum::extract::FromRef;
use sqlx::PgPool;

use crate::{
    ApiConfig,
    config::Environment,
    email::{EmailService, SmtpSettings},
};

/// Settings needed to authenticate organizer sessions
#[derive(Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
}

#[derive(Clone)]
pub struct ApiState {
    pub pool: PgPool,
    pub auth: AuthConfig,
    pub frontend_url: String,
    pub environment: Environment,
    pub invite_expiry_days: i64,
    pub verification_expiry_hours: i64,
    pub email_service: Option<EmailService>,
    pub webhook_secret: Option<String>,
}

impl ApiState {
    /// Build the shared state. Every external client is constructed here, once,
    /// and handed to handlers through axum's `State`.
    pub fn new(config: &ApiConfig, pool: PgPool) -> Self {
        let email_service = if let (
            Some(host),
            Some(username),
            Some(password),
            Some(from_email),
            Some(from_name),
        ) = (
            config.smtp_host.as_deref(),
            config.smtp_username.as_deref(),
            config.smtp_password.as_deref(),
            config.smtp_from_email.as_deref(),
            config.smtp_from_name.as_deref(),
        ) {
            let settings = SmtpSettings {
                host,
                username,
                password,
                from_email,
                from_name,
            };
            match EmailService::new(&settings) {
                Ok(service) => Some(service),
                Err(e) => {
                    tracing::error!("Failed to initialize email service: {e}");
                    None
                }
            }
        } else {
            tracing::warn!("Email service not configured (missing SMTP environment variables)");
            None
        };

        if config.email_webhook_secret.is_none() {
            tracing::warn!("EMAIL_WEBHOOK_SECRET not set, delivery webhooks are disabled");
        }

        Self {
            pool,
            auth: AuthConfig {
                jwt_secret: config.jwt_secret.clone(),
            },
            frontend_url: config.frontend_url.trim_end_matches('/').to_string(),
            environment: config.env,
            invite_expiry_days: config.invite_expiry_days,
            verification_expiry_hours: config.verification_expiry_hours,
            email_service,
            webhook_secret: config.email_webhook_secret.clone(),
        }
    }

    /// Whether links may be echoed back in API responses (local development
    /// without a mailer).
    pub const fn exposes_links(&self) -> bool {
        self.environment.is_development() && self.email_service.is_none()
    }
}

impl FromRef<ApiState> for AuthConfig {
    fn from_ref(state: &ApiState) -> Self {
        state.auth.clone()
    }
}
