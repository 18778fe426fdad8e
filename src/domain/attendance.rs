//! Append-only attendance record, one per successful check-in.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{AttendanceId, AttendeeId, CheckInMethod, EventId, RsvpId};

/// Proof that an attendee with a confirmed RSVP entered the event.
///
/// Exactly one record exists per checked-in RSVP: the record store
/// writes it together with the RSVP's check-in fields as one atomic
/// unit, and a re-scan of the same ticket never appends a second row.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Attendance {
    /// Unique attendance identifier.
    pub id: AttendanceId,
    /// Event the attendee entered.
    pub event_id: EventId,
    /// Attendee who entered.
    pub attendee_id: AttendeeId,
    /// RSVP that admitted them.
    pub rsvp_id: RsvpId,
    /// When the check-in happened.
    pub checked_in_at: DateTime<Utc>,
    /// How the check-in was performed.
    pub method: CheckInMethod,
    /// Operator (or station) that performed the check-in.
    pub operator_id: String,
    /// Optional free-text note from the operator.
    pub note: Option<String>,
}

impl Attendance {
    /// Creates a new attendance record stamped with the current time.
    #[must_use]
    pub fn new(
        event_id: EventId,
        attendee_id: AttendeeId,
        rsvp_id: RsvpId,
        method: CheckInMethod,
        operator_id: String,
        note: Option<String>,
    ) -> Self {
        Self {
            id: AttendanceId::new(),
            event_id,
            attendee_id,
            rsvp_id,
            checked_in_at: Utc::now(),
            method,
            operator_id,
            note,
        }
    }
}
