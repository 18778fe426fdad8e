//! RSVP entity: the registration lifecycle between an attendee and an
//! event.
//!
//! Lifecycle: every RSVP is created `waitlisted` (confirmation goes
//! through the organizer-approval gate), moves to `confirmed` only while
//! the event has free capacity, and to `cancelled` from either live
//! status. The `checked_in` flag flips false→true at most once, only on
//! a confirmed RSVP, and is never reset by the engine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{AttendeeId, EventId, RsvpId};

/// Lifecycle status of an RSVP.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum RsvpStatus {
    /// Registered, pending organizer approval or a free slot.
    Waitlisted,
    /// Holds one of the event's capacity slots.
    Confirmed,
    /// Withdrawn; terminal.
    Cancelled,
}

impl RsvpStatus {
    /// Returns `true` for the statuses that count as an active
    /// registration (everything but `cancelled`).
    #[must_use]
    pub const fn is_active(&self) -> bool {
        !matches!(self, Self::Cancelled)
    }

    /// Returns the status as the text stored in the database column.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Waitlisted => "waitlisted",
            Self::Confirmed => "confirmed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Parses a database column value back into a status.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "waitlisted" => Some(Self::Waitlisted),
            "confirmed" => Some(Self::Confirmed),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }
}

/// How a check-in was performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum CheckInMethod {
    /// A QR ticket was scanned at the entrance.
    ScannedCode,
    /// An operator checked the attendee in by hand.
    Manual,
    /// The attendee checked themselves in.
    SelfCheckIn,
}

impl CheckInMethod {
    /// Returns the method as the text stored in the database column.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::ScannedCode => "scanned_code",
            Self::Manual => "manual",
            Self::SelfCheckIn => "self_check_in",
        }
    }

    /// Parses a database column value back into a method.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "scanned_code" => Some(Self::ScannedCode),
            "manual" => Some(Self::Manual),
            "self_check_in" => Some(Self::SelfCheckIn),
            _ => None,
        }
    }
}

/// A registration linking one attendee to one event.
///
/// At most one non-cancelled RSVP exists per (event, attendee) pair; the
/// record store enforces the invariant at insert time.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Rsvp {
    /// Unique RSVP identifier.
    pub id: RsvpId,
    /// Event this registration is for.
    pub event_id: EventId,
    /// Registered attendee.
    pub attendee_id: AttendeeId,
    /// Lifecycle status.
    pub status: RsvpStatus,
    /// Registration timestamp; the waitlist promotes in this order.
    pub registered_at: DateTime<Utc>,
    /// Set when the RSVP is confirmed.
    pub confirmed_at: Option<DateTime<Utc>>,
    /// Monotonic check-in flag; set together with the fields below.
    pub checked_in: bool,
    /// When the check-in happened.
    pub checked_in_at: Option<DateTime<Utc>>,
    /// Operator who performed the check-in.
    pub checked_in_by: Option<String>,
    /// How the check-in was performed.
    pub checked_in_method: Option<CheckInMethod>,
}

impl Rsvp {
    /// Creates a new waitlisted RSVP for the given pair.
    #[must_use]
    pub fn new(event_id: EventId, attendee_id: AttendeeId) -> Self {
        Self {
            id: RsvpId::new(),
            event_id,
            attendee_id,
            status: RsvpStatus::Waitlisted,
            registered_at: Utc::now(),
            confirmed_at: None,
            checked_in: false,
            checked_in_at: None,
            checked_in_by: None,
            checked_in_method: None,
        }
    }
}
