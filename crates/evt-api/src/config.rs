use std::fmt;

use serde::Deserialize;

/// Minimum length accepted for the session token signing secret
const MIN_JWT_SECRET_LEN: usize = 32;

/// Longest lifetime an invite link may be configured with
const MAX_INVITE_EXPIRY_DAYS: i64 = 365;

/// Longest lifetime a verification link may be configured with
const MAX_VERIFICATION_EXPIRY_HOURS: i64 = 720;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read configuration from environment: {0}")]
    Env(#[from] envy::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Deployment environment, read from `ENV`
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    pub const fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }

    pub const fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

/// Process configuration, one field per environment variable (upper-cased).
#[derive(Clone, Deserialize)]
pub struct ApiConfig {
    pub database_url: String,
    /// Shared secret used by the auth provider to sign organizer session tokens
    pub jwt_secret: String,
    /// Base URL used when building links sent to guests
    pub frontend_url: String,
    #[serde(default)]
    pub env: Environment,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_max_connections")]
    pub database_max_connections: u32,
    #[serde(default = "default_invite_expiry_days")]
    pub invite_expiry_days: i64,
    #[serde(default = "default_verification_expiry_hours")]
    pub verification_expiry_hours: i64,
    pub smtp_host: Option<String>,
    pub smtp_username: Option<String>,
    pub smtp_password: Option<String>,
    pub smtp_from_email: Option<String>,
    pub smtp_from_name: Option<String>,
    /// Shared secret expected in `X-Webhook-Secret` on delivery webhooks
    pub email_webhook_secret: Option<String>,
    /// Comma separated list of CORS origins
    pub allowed_origins: Option<String>,
}

const fn default_port() -> u16 {
    3000
}

const fn default_max_connections() -> u32 {
    10
}

const fn default_invite_expiry_days() -> i64 {
    30
}

const fn default_verification_expiry_hours() -> i64 {
    24
}

impl ApiConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let config: Self = envy::from_env()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.jwt_secret.len() < MIN_JWT_SECRET_LEN {
            return Err(ConfigError::Invalid(format!(
                "JWT_SECRET must be at least {MIN_JWT_SECRET_LEN} bytes"
            )));
        }

        if self.frontend_url.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "FRONTEND_URL cannot be empty".to_string(),
            ));
        }

        // Bounded so `Duration::days`/`Duration::hours` and the date math
        // after them cannot overflow and panic at request time
        if !(1..=MAX_INVITE_EXPIRY_DAYS).contains(&self.invite_expiry_days) {
            return Err(ConfigError::Invalid(format!(
                "INVITE_EXPIRY_DAYS must be between 1 and {MAX_INVITE_EXPIRY_DAYS}"
            )));
        }

        if !(1..=MAX_VERIFICATION_EXPIRY_HOURS).contains(&self.verification_expiry_hours) {
            return Err(ConfigError::Invalid(format!(
                "VERIFICATION_EXPIRY_HOURS must be between 1 and {MAX_VERIFICATION_EXPIRY_HOURS}"
            )));
        }

        Ok(())
    }

    pub fn allowed_origins(&self) -> Vec<String> {
        self.allowed_origins
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect()
    }
}

impl fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiConfig")
            .field("database_url", &"<redacted>")
            .field("jwt_secret", &"<redacted>")
            .field("frontend_url", &self.frontend_url)
            .field("env", &self.env)
            .field("port", &self.port)
            .field("database_max_connections", &self.database_max_connections)
            .field("invite_expiry_days", &self.invite_expiry_days)
            .field("verification_expiry_hours", &self.verification_expiry_hours)
            .field("smtp_host", &self.smtp_host)
            .field("smtp_from_email", &self.smtp_from_email)
            .field("email_webhook_secret", &self.email_webhook_secret.as_ref().map(|_| "<redacted>"))
            .field("allowed_origins", &self.allowed_origins)
            .finish_non_exhaustive()
    }
}
