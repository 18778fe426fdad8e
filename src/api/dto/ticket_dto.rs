//! Ticket issuance, scan, and attendance DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{
    Attendance, AttendanceId, AttendeeId, CheckInMethod, EventId, RsvpId,
};

/// Response body for `POST /rsvps/:id/ticket`.
#[derive(Debug, Serialize, ToSchema)]
pub struct IssueTicketResponse {
    /// RSVP the ticket is backed by.
    pub rsvp_id: RsvpId,
    /// Event the ticket admits to.
    pub event_id: EventId,
    /// The JSON wire form to render as a QR code.
    pub encoded: String,
    /// Issue time in epoch milliseconds, as embedded in the payload.
    pub issued_at_ms: i64,
}

/// Request body for `POST /events/:id/scans`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ScanRequest {
    /// Raw string produced by the optical decoder.
    pub raw: String,
    /// Operator (or station) performing the scan.
    pub operator_id: String,
    /// Optional free-text note attached to the attendance record.
    #[serde(default)]
    pub note: Option<String>,
}

/// Request body for `POST /events/:id/check-ins` (manual check-in).
#[derive(Debug, Deserialize, ToSchema)]
pub struct ManualCheckInRequest {
    /// RSVP to check in.
    pub rsvp_id: RsvpId,
    /// Operator performing the check-in.
    pub operator_id: String,
    /// Optional free-text note.
    #[serde(default)]
    pub note: Option<String>,
}

/// Attendance record representation.
#[derive(Debug, Serialize, ToSchema)]
pub struct AttendanceResponse {
    /// Attendance identifier.
    pub id: AttendanceId,
    /// Event entered.
    pub event_id: EventId,
    /// Attendee who entered.
    pub attendee_id: AttendeeId,
    /// Admitting RSVP.
    pub rsvp_id: RsvpId,
    /// Check-in timestamp.
    pub checked_in_at: DateTime<Utc>,
    /// How the check-in was performed.
    pub method: CheckInMethod,
    /// Operator who performed it.
    pub operator_id: String,
    /// Optional note.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl From<Attendance> for AttendanceResponse {
    fn from(attendance: Attendance) -> Self {
        Self {
            id: attendance.id,
            event_id: attendance.event_id,
            attendee_id: attendance.attendee_id,
            rsvp_id: attendance.rsvp_id,
            checked_in_at: attendance.checked_in_at,
            method: attendance.method,
            operator_id: attendance.operator_id,
            note: attendance.note,
        }
    }
}
