//! RSVP DTOs for registration and lifecycle operations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::common_dto::PaginationMeta;
use crate::domain::{AttendeeId, CheckInMethod, EventId, Rsvp, RsvpId, RsvpStatus};

/// Request body for `POST /events/:id/rsvps`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterRequest {
    /// The attendee to register.
    pub attendee_id: AttendeeId,
}

/// Full RSVP representation.
#[derive(Debug, Serialize, ToSchema)]
pub struct RsvpResponse {
    /// RSVP identifier.
    pub id: RsvpId,
    /// Event registered for.
    pub event_id: EventId,
    /// Registered attendee.
    pub attendee_id: AttendeeId,
    /// Lifecycle status.
    pub status: RsvpStatus,
    /// Registration timestamp.
    pub registered_at: DateTime<Utc>,
    /// Confirmation timestamp, if confirmed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confirmed_at: Option<DateTime<Utc>>,
    /// Whether the attendee has been checked in.
    pub checked_in: bool,
    /// Check-in timestamp, if checked in.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checked_in_at: Option<DateTime<Utc>>,
    /// Operator who performed the check-in, if checked in.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checked_in_by: Option<String>,
    /// How the check-in was performed, if checked in.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checked_in_method: Option<CheckInMethod>,
}

impl From<Rsvp> for RsvpResponse {
    fn from(rsvp: Rsvp) -> Self {
        Self {
            id: rsvp.id,
            event_id: rsvp.event_id,
            attendee_id: rsvp.attendee_id,
            status: rsvp.status,
            registered_at: rsvp.registered_at,
            confirmed_at: rsvp.confirmed_at,
            checked_in: rsvp.checked_in,
            checked_in_at: rsvp.checked_in_at,
            checked_in_by: rsvp.checked_in_by,
            checked_in_method: rsvp.checked_in_method,
        }
    }
}

/// Paginated list response for RSVP list endpoints.
#[derive(Debug, Serialize, ToSchema)]
pub struct RsvpListResponse {
    /// RSVPs on this page, in registration order.
    pub data: Vec<RsvpResponse>,
    /// Pagination metadata.
    pub pagination: PaginationMeta,
}
