use evt_db::models::InviteStatus;
use serde::Deserialize;

/// A delivery event as posted by the email provider.
///
/// Decoding is closed: any `event` tag outside this set, or a variant with
/// missing fields, is rejected rather than ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "event", rename_all = "lowercase")]
pub enum EmailEvent {
    Delivered {
        message_id: String,
    },
    Failed {
        message_id: String,
        #[serde(default)]
        reason: Option<String>,
    },
    Opened {
        message_id: String,
    },
    Complained {
        message_id: String,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum PayloadError {
    #[error("Malformed webhook payload: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("Webhook payload has an empty message_id")]
    EmptyMessageId,
}

impl EmailEvent {
    pub fn decode(body: &[u8]) -> Result<Self, PayloadError> {
        let event: Self = serde_json::from_slice(body)?;
        if event.message_id().trim().is_empty() {
            return Err(PayloadError::EmptyMessageId);
        }
        Ok(event)
    }

    pub fn message_id(&self) -> &str {
        match self {
            Self::Delivered { message_id }
            | Self::Failed { message_id, .. }
            | Self::Opened { message_id }
            | Self::Complained { message_id } => message_id,
        }
    }

    pub const fn name(&self) -> &'static str {
        match self {
            Self::Delivered { .. } => "delivered",
            Self::Failed { .. } => "failed",
            Self::Opened { .. } => "opened",
            Self::Complained { .. } => "complained",
        }
    }

    /// Invite status this event moves the invite to, if any.
    ///
    /// A spam complaint counts as a failed delivery so the guest is not mailed again.
    pub const fn invite_status(&self) -> Option<InviteStatus> {
        match self {
            Self::Delivered { .. } => Some(InviteStatus::Delivered),
            Self::Failed { .. } | Self::Complained { .. } => Some(InviteStatus::Failed),
            Self::Opened { .. } => None,
        }
    }
}
