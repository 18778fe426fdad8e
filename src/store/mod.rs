//! Record store port and its backends.
//!
//! [`RecordStore`] is the engine's only view of persistence. Besides
//! plain get/insert/list operations it exposes the conditional
//! primitives ([`RecordStore::confirm_rsvp`],
//! [`RecordStore::cancel_rsvp`], [`RecordStore::record_check_in`])
//! whose check-and-write semantics carry the engine's consistency
//! guarantees: the capacity ceiling on confirmed RSVPs and the
//! at-most-once check-in per ticket, both under concurrent callers.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;

use crate::domain::{
    Attendance, Attendee, AttendeeId, Event, EventId, EventMetrics, EventStatus, Rsvp, RsvpId,
    RsvpStatus,
};
use crate::error::EngineError;

/// Durable storage port for the engine's entities.
///
/// Implementations must make each conditional primitive atomic with
/// respect to concurrent calls: two `confirm_rsvp` calls racing for one
/// free slot yield one success and one [`EngineError::CapacityExceeded`];
/// two `record_check_in` calls for the same RSVP yield one success and
/// one [`EngineError::DuplicateCheckIn`] with no second attendance row.
#[async_trait]
pub trait RecordStore: Send + Sync + std::fmt::Debug {
    /// Inserts a new event.
    async fn insert_event(&self, event: Event) -> Result<Event, EngineError>;

    /// Fetches an event by id.
    async fn get_event(&self, id: EventId) -> Result<Option<Event>, EngineError>;

    /// Lists all events.
    async fn list_events(&self) -> Result<Vec<Event>, EngineError>;

    /// Sets an event's lifecycle status.
    async fn update_event_status(
        &self,
        id: EventId,
        status: EventStatus,
    ) -> Result<Event, EngineError>;

    /// Sets an event's capacity. Rejects with
    /// [`EngineError::CapacityExceeded`] when the new value is below the
    /// current confirmed count (confirmed RSVPs are never demoted).
    /// Callers promote from the waitlist afterwards if the capacity
    /// grew.
    async fn update_event_capacity(&self, id: EventId, capacity: u32)
    -> Result<Event, EngineError>;

    /// Writes the metrics snapshot for an event.
    async fn update_event_metrics(
        &self,
        id: EventId,
        metrics: EventMetrics,
    ) -> Result<(), EngineError>;

    /// Inserts a new attendee record.
    async fn insert_attendee(&self, attendee: Attendee) -> Result<Attendee, EngineError>;

    /// Fetches an attendee by id.
    async fn get_attendee(&self, id: AttendeeId) -> Result<Option<Attendee>, EngineError>;

    /// Inserts a new RSVP, enforcing at most one non-cancelled RSVP per
    /// (event, attendee) pair.
    async fn insert_rsvp(&self, rsvp: Rsvp) -> Result<Rsvp, EngineError>;

    /// Fetches an RSVP by id.
    async fn get_rsvp(&self, id: RsvpId) -> Result<Option<Rsvp>, EngineError>;

    /// Lists all RSVPs for an event.
    async fn list_rsvps_by_event(&self, event_id: EventId) -> Result<Vec<Rsvp>, EngineError>;

    /// Lists all RSVPs for an attendee.
    async fn list_rsvps_by_attendee(
        &self,
        attendee_id: AttendeeId,
    ) -> Result<Vec<Rsvp>, EngineError>;

    /// Conditionally confirms a waitlisted RSVP.
    ///
    /// The status write and the capacity check happen as one atomic
    /// unit: the transition goes through only while the event's
    /// confirmed count is below its capacity.
    async fn confirm_rsvp(&self, id: RsvpId) -> Result<Rsvp, EngineError>;

    /// Cancels a live RSVP, returning the updated record and the status
    /// it held before cancellation (so callers can promote when a
    /// confirmed slot was freed).
    async fn cancel_rsvp(&self, id: RsvpId) -> Result<(Rsvp, RsvpStatus), EngineError>;

    /// Commits a check-in: flips the RSVP's `checked_in` flag (only if
    /// currently false) and appends the attendance record, as one atomic
    /// unit. A lost race surfaces as [`EngineError::DuplicateCheckIn`]
    /// and appends nothing.
    async fn record_check_in(&self, attendance: Attendance) -> Result<Attendance, EngineError>;

    /// Lists attendance records for an event.
    async fn list_attendance_by_event(
        &self,
        event_id: EventId,
    ) -> Result<Vec<Attendance>, EngineError>;
}
