//! Event DTOs for create, get, list, and capacity operations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::common_dto::PaginationMeta;
use crate::domain::{Event, EventId, EventMetrics, EventStatus};

/// Request body for `POST /events`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateEventRequest {
    /// Human-readable title (max 200 chars).
    pub title: String,
    /// Maximum number of confirmed RSVPs. Must be positive.
    pub capacity: u32,
}

/// Request body for `PATCH /events/:id/capacity`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateCapacityRequest {
    /// The new capacity. Must be positive; raising it promotes from the
    /// waitlist.
    pub capacity: u32,
}

/// Full event representation including the metrics snapshot.
#[derive(Debug, Serialize, ToSchema)]
pub struct EventResponse {
    /// Event identifier.
    pub id: EventId,
    /// Human-readable title.
    pub title: String,
    /// Confirmed-RSVP ceiling.
    pub capacity: u32,
    /// Lifecycle status.
    pub status: EventStatus,
    /// Derived counters.
    pub metrics: EventMetrics,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last mutation timestamp.
    pub updated_at: DateTime<Utc>,
}

impl From<Event> for EventResponse {
    fn from(event: Event) -> Self {
        Self {
            id: event.id,
            title: event.title,
            capacity: event.capacity,
            status: event.status,
            metrics: event.metrics,
            created_at: event.created_at,
            updated_at: event.updated_at,
        }
    }
}

/// Paginated list response for `GET /events`.
#[derive(Debug, Serialize, ToSchema)]
pub struct EventListResponse {
    /// Events on this page.
    pub data: Vec<EventResponse>,
    /// Pagination metadata.
    pub pagination: PaginationMeta,
}
