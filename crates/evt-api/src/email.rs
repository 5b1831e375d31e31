use chrono::{DateTime, Utc};
use lettre::{Message, SmtpTransport, Transport, message::Mailbox, transport::smtp::authentication::Credentials};
use uuid::Uuid;

use crate::error::ApiError;

/// SMTP settings, all required for the mailer to be enabled
#[derive(Clone, Debug)]
pub struct SmtpSettings<'a> {
    pub host: &'a str,
    pub username: &'a str,
    pub password: &'a str,
    pub from_email: &'a str,
    pub from_name: &'a str,
}

/// Outbound mailer, built once at startup and shared through `ApiState`.
#[derive(Clone)]
pub struct EmailService {
    transport: SmtpTransport,
    from: Mailbox,
    from_domain: String,
}

impl EmailService {
    pub fn new(settings: &SmtpSettings<'_>) -> Result<Self, ApiError> {
        let from: Mailbox = format!("{} <{}>", settings.from_name, settings.from_email)
            .parse()
            .map_err(|e| ApiError::Email(format!("Invalid from email: {e}")))?;

        let credentials = Credentials::new(settings.username.to_string(), settings.password.to_string());
        let transport = SmtpTransport::relay(settings.host)
            .map_err(|e| ApiError::Email(format!("Failed to create SMTP transport: {e}")))?
            .credentials(credentials)
            .build();

        Ok(Self {
            transport,
            from_domain: from.email.domain().to_string(),
            from,
        })
    }

    /// Send a guest their RSVP link. Returns the Message-ID used, which
    /// delivery webhooks refer back to.
    pub async fn send_invite(
        &self,
        to_email: &str,
        guest_name: &str,
        event_title: &str,
        starts_at: DateTime<Utc>,
        rsvp_url: &str,
    ) -> Result<String, ApiError> {
        let body = format!(
            "Hi {guest_name},\n\nYou're invited to {event_title} on {}.\n\nLet the host know if you can make it:\n{rsvp_url}\n\nThis link is personal to you, please don't forward it.",
            starts_at.format("%A %-d %B %Y at %H:%M UTC"),
        );

        self.send(to_email, &format!("You're invited: {event_title}"), body)
            .await
    }

    pub async fn send_verification_email(
        &self,
        to_email: &str,
        verification_url: &str,
        expires_in_hours: i64,
    ) -> Result<String, ApiError> {
        let body = format!(
            "Hi,\n\nConfirm this address to start sending invitations:\n{verification_url}\n\nThis link will expire in {expires_in_hours} hours.\n\nIf you didn't request this, you can safely ignore this email.",
        );

        self.send(to_email, "Verify your email address", body).await
    }

    async fn send(&self, to_email: &str, subject: &str, body: String) -> Result<String, ApiError> {
        let message_id = format!("<{}@{}>", Uuid::new_v4(), self.from_domain);

        let email = Message::builder()
            .from(self.from.clone())
            .to(to_email
                .parse()
                .map_err(|e| ApiError::Validation(format!("Invalid recipient email: {e}")))?)
            .subject(subject)
            .message_id(Some(message_id.clone()))
            .body(body)
            .map_err(|e| ApiError::Email(format!("Failed to build email: {e}")))?;

        // SmtpTransport blocks, keep it off the async workers
        let transport = self.transport.clone();
        tokio::task::spawn_blocking(move || transport.send(&email))
            .await
            .map_err(|e| ApiError::Email(format!("Email task failed: {e}")))?
            .map_err(|e| ApiError::Email(format!("Failed to send email: {e}")))?;

        Ok(message_id)
    }
}
