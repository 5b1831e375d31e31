use chrono::{DateTime, Utc};
use evt_db::models::{Event, NewEvent, RsvpCounts};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{error::ApiError, validation::validate_text_len};

/// Request body for creating an event
#[derive(Debug, Deserialize)]
pub struct CreateEventRequest {
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub starts_at: DateTime<Utc>,
    pub ends_at: Option<DateTime<Utc>>,
    pub capacity: Option<i32>,
    #[serde(default)]
    pub is_public: bool,
}

impl CreateEventRequest {
    /// Validate the request, returning the trimmed insert struct
    pub fn validate(&self, organizer_id: Uuid, now: DateTime<Utc>) -> Result<NewEvent<'_>, ApiError> {
        let title = self.title.trim();
        validate_text_len("Title", title, 1, 200)?;

        let description = non_blank(self.description.as_deref());
        if let Some(description) = description {
            validate_text_len("Description", description, 1, 5000)?;
        }

        let location = non_blank(self.location.as_deref());
        if let Some(location) = location {
            validate_text_len("Location", location, 1, 300)?;
        }

        if self.starts_at <= now {
            return Err(ApiError::Validation(
                "Event must start in the future".to_string(),
            ));
        }

        if let Some(ends_at) = self.ends_at
            && ends_at <= self.starts_at
        {
            return Err(ApiError::Validation(
                "Event must end after it starts".to_string(),
            ));
        }

        if let Some(capacity) = self.capacity
            && capacity < 1
        {
            return Err(ApiError::Validation(
                "Capacity must be at least 1".to_string(),
            ));
        }

        Ok(NewEvent {
            organizer_id,
            title,
            description,
            location,
            starts_at: self.starts_at,
            ends_at: self.ends_at,
            capacity: self.capacity,
            is_public: self.is_public,
        })
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Organizer view of an event
#[derive(Debug, Serialize)]
pub struct EventResponse {
    #[serde(flatten)]
    pub event: Event,
    pub rsvps: RsvpCounts,
}

/// Public event page data, no organizer or guest details
#[derive(Debug, Serialize)]
pub struct PublicEventResponse {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub starts_at: DateTime<Utc>,
    pub ends_at: Option<DateTime<Utc>>,
    pub attending: i64,
    /// Spots left, when the event has a capacity
    pub spots_left: Option<i64>,
}

impl PublicEventResponse {
    pub fn new(event: Event, counts: &RsvpCounts) -> Self {
        Self {
            spots_left: event
                .capacity
                .map(|capacity| (i64::from(capacity) - counts.headcount).max(0)),
            id: event.id,
            title: event.title,
            description: event.description,
            location: event.location,
            starts_at: event.starts_at,
            ends_at: event.ends_at,
            attending: counts.headcount,
        }
    }
}
