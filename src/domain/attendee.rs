//! Attendee record referenced by RSVPs and ticket payloads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::AttendeeId;

/// A person who can register for events.
///
/// The engine only needs enough of a record for referential integrity:
/// the validator rejects tickets whose attendee has no record.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Attendee {
    /// Unique attendee identifier.
    pub id: AttendeeId,
    /// Display name.
    pub name: String,
    /// Contact email.
    pub email: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl Attendee {
    /// Creates a new attendee record.
    #[must_use]
    pub fn new(name: String, email: String) -> Self {
        Self {
            id: AttendeeId::new(),
            name,
            email,
            created_at: Utc::now(),
        }
    }
}
