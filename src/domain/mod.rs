//! Domain layer: identities, entities, the ticket wire form, and the
//! event system.
//!
//! This module contains the engine's core model: typed identifiers,
//! the Event / Attendee / RSVP / Attendance entities with their
//! lifecycle vocabulary, the ticket payload that travels inside QR
//! codes, and the broadcast bus that announces every state change.

pub mod attendance;
pub mod attendee;
pub mod engine_event;
pub mod event;
pub mod event_bus;
pub mod ids;
pub mod rsvp;
pub mod ticket;

pub use attendance::Attendance;
pub use attendee::Attendee;
pub use engine_event::EngineEvent;
pub use event::{Event, EventMetrics, EventStatus};
pub use event_bus::EventBus;
pub use ids::{AttendanceId, AttendeeId, EventId, RsvpId};
pub use rsvp::{CheckInMethod, Rsvp, RsvpStatus};
pub use ticket::{EncodedTicket, TicketPayload};
