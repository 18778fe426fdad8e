//! Engine error types with HTTP status code mapping.
//!
//! [`EngineError`] is the central error type for the engine. Every variant
//! is a recoverable condition surfaced to the caller; each maps to a
//! stable numeric code and a structured JSON error response.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::{AttendeeId, EventId, RsvpId};

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "error": {
///     "code": 4008,
///     "message": "rsvp <id> is already checked in",
///     "details": null
///   }
/// }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code and human-readable message.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Numeric error code (see code ranges on [`EngineError`]).
    pub code: u32,
    /// Human-readable error message.
    pub message: String,
    /// Optional additional details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Engine error enum with HTTP status code mapping.
///
/// # Error Code Ranges
///
/// | Range     | Category                  | HTTP Status                |
/// |-----------|---------------------------|----------------------------|
/// | 1000–1999 | Request validation        | 400 Bad Request            |
/// | 2000–2999 | Missing records           | 404 Not Found              |
/// | 3000–3999 | Server / store            | 500 Internal Server Error  |
/// | 4000–4999 | Lifecycle / scan outcomes | 409 / 410 / 422            |
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Malformed API input outside the ticket pipeline.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The scanned string does not decode to a ticket payload.
    #[error("malformed ticket: {0}")]
    MalformedTicket(String),

    /// A referenced record (event, attendee, or RSVP) does not exist.
    #[error("{0} not found")]
    NotFound(String),

    /// The scanned ticket names an RSVP that does not exist (or does not
    /// match the registration it claims to be for).
    #[error("unknown ticket: no registration for rsvp {0}")]
    UnknownTicket(RsvpId),

    /// The attendee referenced by an otherwise valid ticket has no record.
    #[error("unknown attendee: {0}")]
    UnknownAttendee(AttendeeId),

    /// A non-cancelled RSVP already exists for this (event, attendee) pair.
    #[error("attendee {attendee_id} already has an active registration for event {event_id}")]
    DuplicateRegistration {
        /// Event the duplicate registration targets.
        event_id: EventId,
        /// Attendee who already holds an active RSVP.
        attendee_id: AttendeeId,
    },

    /// The RSVP is not in a status from which the operation is legal.
    #[error("invalid transition: {0}")]
    InvalidTransition(String),

    /// Confirming would push the event's confirmed count past capacity.
    #[error("event {0} is at capacity")]
    CapacityExceeded(EventId),

    /// Preconditions for issuing a ticket (or registering) are not met.
    #[error("not eligible: {0}")]
    NotEligible(String),

    /// The ticket is older than the maximum age, or post-dated beyond
    /// the clock-skew tolerance.
    #[error("ticket expired")]
    ExpiredTicket,

    /// The ticket was issued for a different event than the one being
    /// scanned at.
    #[error("ticket is for event {ticket_event}, not event {scanning_event}")]
    WrongEvent {
        /// Event the ticket was issued for.
        ticket_event: EventId,
        /// Event the scanner is operating at.
        scanning_event: EventId,
    },

    /// The RSVP behind the ticket is not confirmed.
    #[error("rsvp {0} is not confirmed")]
    NotConfirmed(RsvpId),

    /// The RSVP is already checked in; no second attendance record is
    /// created.
    #[error("rsvp {0} is already checked in")]
    DuplicateCheckIn(RsvpId),

    /// Record store failure.
    #[error("store error: {0}")]
    Store(String),
}

impl EngineError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::InvalidRequest(_) => 1001,
            Self::MalformedTicket(_) => 1002,
            Self::NotFound(_) => 2001,
            Self::UnknownTicket(_) => 2002,
            Self::UnknownAttendee(_) => 2003,
            Self::DuplicateRegistration { .. } => 4001,
            Self::InvalidTransition(_) => 4002,
            Self::CapacityExceeded(_) => 4003,
            Self::NotEligible(_) => 4004,
            Self::ExpiredTicket => 4005,
            Self::WrongEvent { .. } => 4006,
            Self::NotConfirmed(_) => 4007,
            Self::DuplicateCheckIn(_) => 4008,
            Self::Store(_) => 3001,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) | Self::MalformedTicket(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) | Self::UnknownTicket(_) | Self::UnknownAttendee(_) => {
                StatusCode::NOT_FOUND
            }
            Self::DuplicateRegistration { .. }
            | Self::InvalidTransition(_)
            | Self::CapacityExceeded(_)
            | Self::WrongEvent { .. }
            | Self::NotConfirmed(_)
            | Self::DuplicateCheckIn(_) => StatusCode::CONFLICT,
            Self::NotEligible(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::ExpiredTicket => StatusCode::GONE,
            Self::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns the scan rejection reason string, or `None` when the
    /// variant is not one of the ticket-pipeline rejections.
    #[must_use]
    pub const fn scan_reason(&self) -> Option<&'static str> {
        match self {
            Self::MalformedTicket(_) => Some("malformed_ticket"),
            Self::ExpiredTicket => Some("expired_ticket"),
            Self::WrongEvent { .. } => Some("wrong_event"),
            Self::UnknownTicket(_) => Some("unknown_ticket"),
            Self::NotConfirmed(_) => Some("not_confirmed"),
            Self::DuplicateCheckIn(_) => Some("duplicate_check_in"),
            Self::UnknownAttendee(_) => Some("unknown_attendee"),
            _ => None,
        }
    }
}

impl IntoResponse for EngineError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error_code(),
                message: self.to_string(),
                details: None,
            },
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn scan_rejections_have_reasons() {
        assert_eq!(
            EngineError::ExpiredTicket.scan_reason(),
            Some("expired_ticket")
        );
        assert_eq!(
            EngineError::DuplicateCheckIn(RsvpId::new()).scan_reason(),
            Some("duplicate_check_in")
        );
        assert_eq!(
            EngineError::CapacityExceeded(EventId::new()).scan_reason(),
            None
        );
    }

    #[test]
    fn status_codes_match_category() {
        assert_eq!(
            EngineError::MalformedTicket("bad json".to_string()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(EngineError::ExpiredTicket.status_code(), StatusCode::GONE);
        assert_eq!(
            EngineError::DuplicateCheckIn(RsvpId::new()).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            EngineError::UnknownTicket(RsvpId::new()).status_code(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn error_codes_are_stable() {
        assert_eq!(
            EngineError::DuplicateRegistration {
                event_id: EventId::new(),
                attendee_id: AttendeeId::new(),
            }
            .error_code(),
            4001
        );
        assert_eq!(EngineError::Store("down".to_string()).error_code(), 3001);
    }
}
