use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A text column held a value outside its CHECK constraint.
#[derive(Debug, thiserror::Error)]
#[error("unknown {kind} value: {value}")]
pub struct UnknownVariant {
    kind: &'static str,
    value: String,
}

/// Organizer mirrored from the auth provider
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Organizer {
    pub id: Uuid,
    /// Subject claim issued by the auth provider
    pub external_id: String,
    pub email: String,
    pub email_verified: bool,
    pub created_at: DateTime<Utc>,
}

/// Event owned by an organizer
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Event {
    pub id: Uuid,
    pub organizer_id: Uuid,
    /// Event title (max 200 chars)
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub starts_at: DateTime<Utc>,
    pub ends_at: Option<DateTime<Utc>>,
    /// Maximum attending headcount, unlimited when `None`
    pub capacity: Option<i32>,
    pub is_public: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insert struct for events
#[derive(Debug, Clone)]
pub struct NewEvent<'a> {
    pub organizer_id: Uuid,
    pub title: &'a str,
    pub description: Option<&'a str>,
    pub location: Option<&'a str>,
    pub starts_at: DateTime<Utc>,
    pub ends_at: Option<DateTime<Utc>>,
    pub capacity: Option<i32>,
    pub is_public: bool,
}

/// Lifecycle of an invite
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InviteStatus {
    /// Created, email not dispatched yet (or no mailer configured)
    Pending,
    /// Handed to the mail server
    Sent,
    /// Delivery confirmed by the email provider
    Delivered,
    /// Delivery failed or the recipient complained
    Failed,
    /// Guest submitted an RSVP
    Responded,
    /// Organizer revoked the invite
    Revoked,
    /// Link lapsed without a response
    Expired,
}

impl InviteStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Sent => "sent",
            Self::Delivered => "delivered",
            Self::Failed => "failed",
            Self::Responded => "responded",
            Self::Revoked => "revoked",
            Self::Expired => "expired",
        }
    }
}

impl TryFrom<String> for InviteStatus {
    type Error = UnknownVariant;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "pending" => Ok(Self::Pending),
            "sent" => Ok(Self::Sent),
            "delivered" => Ok(Self::Delivered),
            "failed" => Ok(Self::Failed),
            "responded" => Ok(Self::Responded),
            "revoked" => Ok(Self::Revoked),
            "expired" => Ok(Self::Expired),
            _ => Err(UnknownVariant {
                kind: "invite status",
                value,
            }),
        }
    }
}

impl fmt::Display for InviteStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Invite row. `token_hash` is the digest of the link token and never leaves the server.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Invite {
    pub id: Uuid,
    pub event_id: Uuid,
    pub guest_name: String,
    pub guest_email: String,
    #[serde(skip_serializing)]
    pub token_hash: String,
    #[sqlx(try_from = "String")]
    pub status: InviteStatus,
    pub message_id: Option<String>,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Invite {
    /// Whether the invite link has lapsed at `now`
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.status == InviteStatus::Expired || self.expires_at <= now
    }
}

/// A guest's answer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RsvpResponse {
    Attending,
    Declined,
    Maybe,
}

impl RsvpResponse {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Attending => "attending",
            Self::Declined => "declined",
            Self::Maybe => "maybe",
        }
    }
}

impl TryFrom<String> for RsvpResponse {
    type Error = UnknownVariant;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "attending" => Ok(Self::Attending),
            "declined" => Ok(Self::Declined),
            "maybe" => Ok(Self::Maybe),
            _ => Err(UnknownVariant {
                kind: "rsvp response",
                value,
            }),
        }
    }
}

impl fmt::Display for RsvpResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// RSVP row, one per invite
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Rsvp {
    pub id: Uuid,
    pub invite_id: Uuid,
    pub event_id: Uuid,
    #[sqlx(try_from = "String")]
    pub response: RsvpResponse,
    pub guest_count: i32,
    pub note: Option<String>,
    pub responded_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Aggregated RSVP counts for an event
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct RsvpCounts {
    pub attending: i64,
    pub declined: i64,
    pub maybe: i64,
    /// Sum of `guest_count` over attending replies
    pub headcount: i64,
}

/// Timestamped response, input to the daily analytics series
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RsvpActivity {
    #[sqlx(try_from = "String")]
    pub response: RsvpResponse,
    pub answered_at: DateTime<Utc>,
}

/// Email verification token row (digest only)
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct EmailVerificationToken {
    pub id: Uuid,
    pub organizer_id: Uuid,
    pub token_hash: String,
    pub expires_at: DateTime<Utc>,
    pub used_at: Option<DateTime<Utc>>,
}
