//! Ticket payload: the value object carried inside a QR code.
//!
//! The wire form is a compact JSON object with exactly the fields
//! `eventId`, `attendeeId`, `rsvpId`, and `timestamp` (epoch
//! milliseconds). An optional `signature` field is tolerated on decode
//! but never verified: tickets are currently unsigned, and the engine
//! models that behavior rather than quietly changing it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{AttendeeId, EventId, RsvpId};
use crate::error::EngineError;

/// The logical content of a ticket, reconstructed from every scan.
///
/// Not persisted: the issuer builds it on demand from a confirmed RSVP
/// and the validator rebuilds it from the decoded scan string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketPayload {
    /// Event the ticket admits to.
    #[serde(rename = "eventId")]
    pub event_id: EventId,
    /// Attendee the ticket was issued to.
    #[serde(rename = "attendeeId")]
    pub attendee_id: AttendeeId,
    /// RSVP backing the ticket.
    #[serde(rename = "rsvpId")]
    pub rsvp_id: RsvpId,
    /// Issue time in epoch milliseconds.
    #[serde(rename = "timestamp")]
    pub issued_at_ms: i64,
    /// Future integrity mechanism; parsed and ignored.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
}

impl TicketPayload {
    /// Builds a payload for the given references, stamped with the
    /// current time.
    #[must_use]
    pub fn new(event_id: EventId, attendee_id: AttendeeId, rsvp_id: RsvpId) -> Self {
        Self {
            event_id,
            attendee_id,
            rsvp_id,
            issued_at_ms: Utc::now().timestamp_millis(),
            signature: None,
        }
    }

    /// Serializes the payload to its compact JSON wire form.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Store`] if serialization fails, which for
    /// this struct it cannot in practice.
    pub fn encode(&self) -> Result<String, EngineError> {
        serde_json::to_string(self).map_err(|e| EngineError::Store(e.to_string()))
    }

    /// Parses a raw scan string back into a payload.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::MalformedTicket`] when the string is not
    /// JSON or is missing any required field.
    pub fn decode(raw: &str) -> Result<Self, EngineError> {
        serde_json::from_str(raw).map_err(|e| EngineError::MalformedTicket(e.to_string()))
    }

    /// Returns the issue time as a UTC timestamp, if the millisecond
    /// value is representable.
    #[must_use]
    pub fn issued_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.issued_at_ms)
    }
}

/// A payload together with its serialized wire form, ready to be
/// rendered as a QR code by the caller.
#[derive(Debug, Clone, Serialize)]
pub struct EncodedTicket {
    /// The logical payload.
    pub payload: TicketPayload,
    /// The JSON wire form embedded in the visual code.
    pub encoded: String,
}
