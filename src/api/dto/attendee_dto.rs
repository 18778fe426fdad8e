//! Attendee DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{Attendee, AttendeeId};

/// Request body for `POST /attendees`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateAttendeeRequest {
    /// Display name.
    pub name: String,
    /// Contact email.
    pub email: String,
}

/// Attendee representation.
#[derive(Debug, Serialize, ToSchema)]
pub struct AttendeeResponse {
    /// Attendee identifier.
    pub id: AttendeeId,
    /// Display name.
    pub name: String,
    /// Contact email.
    pub email: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl From<Attendee> for AttendeeResponse {
    fn from(attendee: Attendee) -> Self {
        Self {
            id: attendee.id,
            name: attendee.name,
            email: attendee.email,
            created_at: attendee.created_at,
        }
    }
}
