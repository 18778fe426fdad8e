//! Domain events reflecting engine state mutations.
//!
//! Every ledger mutation, ticket issuance, and check-in decision emits
//! an [`EngineEvent`] through the [`super::EventBus`]. Events are
//! broadcast to WebSocket subscribers so door dashboards update live.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{AttendanceId, AttendeeId, CheckInMethod, EventId, RsvpId};

/// Domain event emitted after every engine state mutation (and after
/// every scan rejection, so the door crew sees refusals too).
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum EngineEvent {
    /// A new RSVP entered the waitlist.
    RsvpRegistered {
        /// Event registered for.
        event_id: EventId,
        /// The new RSVP.
        rsvp_id: RsvpId,
        /// Registering attendee.
        attendee_id: AttendeeId,
        /// Registration timestamp.
        timestamp: DateTime<Utc>,
    },

    /// An RSVP took one of the event's capacity slots.
    RsvpConfirmed {
        /// Event confirmed for.
        event_id: EventId,
        /// The confirmed RSVP.
        rsvp_id: RsvpId,
        /// `true` when the waitlist promoter confirmed it, `false` for a
        /// direct organizer approval.
        promoted: bool,
        /// Confirmation timestamp.
        timestamp: DateTime<Utc>,
    },

    /// An RSVP was withdrawn.
    RsvpCancelled {
        /// Event cancelled for.
        event_id: EventId,
        /// The cancelled RSVP.
        rsvp_id: RsvpId,
        /// `true` when the cancellation freed a confirmed slot.
        was_confirmed: bool,
        /// Cancellation timestamp.
        timestamp: DateTime<Utc>,
    },

    /// A ticket was issued for a confirmed RSVP.
    TicketIssued {
        /// Event the ticket admits to.
        event_id: EventId,
        /// Backing RSVP.
        rsvp_id: RsvpId,
        /// Issue timestamp.
        timestamp: DateTime<Utc>,
    },

    /// A scan passed the full validation pipeline and was committed.
    CheckInRecorded {
        /// Event checked in to.
        event_id: EventId,
        /// RSVP that was checked in.
        rsvp_id: RsvpId,
        /// The appended attendance record.
        attendance_id: AttendanceId,
        /// How the check-in was performed.
        method: CheckInMethod,
        /// Check-in timestamp.
        timestamp: DateTime<Utc>,
    },

    /// A scan was rejected at some pipeline step.
    ScanRejected {
        /// Event being scanned at.
        event_id: EventId,
        /// Rejection reason (e.g. `"expired_ticket"`).
        reason: String,
        /// Rejection timestamp.
        timestamp: DateTime<Utc>,
    },
}

impl EngineEvent {
    /// Returns the event (as in: gathering) this engine event concerns.
    #[must_use]
    pub fn event_id(&self) -> EventId {
        match self {
            Self::RsvpRegistered { event_id, .. }
            | Self::RsvpConfirmed { event_id, .. }
            | Self::RsvpCancelled { event_id, .. }
            | Self::TicketIssued { event_id, .. }
            | Self::CheckInRecorded { event_id, .. }
            | Self::ScanRejected { event_id, .. } => *event_id,
        }
    }

    /// Returns the event type as a static string slice.
    #[must_use]
    pub const fn event_type_str(&self) -> &'static str {
        match self {
            Self::RsvpRegistered { .. } => "rsvp_registered",
            Self::RsvpConfirmed { .. } => "rsvp_confirmed",
            Self::RsvpCancelled { .. } => "rsvp_cancelled",
            Self::TicketIssued { .. } => "ticket_issued",
            Self::CheckInRecorded { .. } => "check_in_recorded",
            Self::ScanRejected { .. } => "scan_rejected",
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn registered_event_type() {
        let event = EngineEvent::RsvpRegistered {
            event_id: EventId::new(),
            rsvp_id: RsvpId::new(),
            attendee_id: AttendeeId::new(),
            timestamp: Utc::now(),
        };
        assert_eq!(event.event_type_str(), "rsvp_registered");
    }

    #[test]
    fn check_in_serializes_with_method() {
        let event = EngineEvent::CheckInRecorded {
            event_id: EventId::new(),
            rsvp_id: RsvpId::new(),
            attendance_id: AttendanceId::new(),
            method: CheckInMethod::ScannedCode,
            timestamp: Utc::now(),
        };
        let json = serde_json::to_string(&event);
        assert!(json.is_ok());
        let json_str = json.unwrap_or_default();
        assert!(json_str.contains("check_in_recorded"));
        assert!(json_str.contains("scanned_code"));
    }

    #[test]
    fn event_id_accessor() {
        let id = EventId::new();
        let event = EngineEvent::ScanRejected {
            event_id: id,
            reason: "expired_ticket".to_string(),
            timestamp: Utc::now(),
        };
        assert_eq!(event.event_id(), id);
    }
}
