//! RSVP ledger: owns registration, confirmation, and cancellation.

use std::sync::Arc;

use chrono::Utc;

use crate::domain::{
    AttendeeId, EngineEvent, EventBus, EventId, Rsvp, RsvpId, RsvpStatus,
};
use crate::error::EngineError;
use crate::store::RecordStore;

/// Orchestration layer for the RSVP lifecycle.
///
/// Every mutation follows the same pattern: conditional store write →
/// metrics recompute → event emission. The ledger is the only writer of
/// RSVP status; check-in fields belong to the attendance recorder.
#[derive(Debug, Clone)]
pub struct RsvpLedger {
    store: Arc<dyn RecordStore>,
    metrics: super::MetricsAggregator,
    promoter: Arc<super::WaitlistPromoter>,
    bus: EventBus,
}

impl RsvpLedger {
    /// Creates a new ledger.
    #[must_use]
    pub fn new(
        store: Arc<dyn RecordStore>,
        metrics: super::MetricsAggregator,
        promoter: Arc<super::WaitlistPromoter>,
        bus: EventBus,
    ) -> Self {
        Self {
            store,
            metrics,
            promoter,
            bus,
        }
    }

    /// Registers an attendee for an event.
    ///
    /// The new RSVP always starts `waitlisted`: confirmation goes
    /// through the organizer-approval gate ([`Self::confirm`]) or the
    /// waitlist promoter, never through registration itself.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NotFound`] if the event or attendee does
    /// not exist, [`EngineError::NotEligible`] if the event is not
    /// published, and [`EngineError::DuplicateRegistration`] if the pair
    /// already has an active RSVP.
    pub async fn register(
        &self,
        event_id: EventId,
        attendee_id: AttendeeId,
    ) -> Result<Rsvp, EngineError> {
        let event = self
            .store
            .get_event(event_id)
            .await?
            .ok_or_else(|| EngineError::NotFound(format!("event {event_id}")))?;
        if !event.is_open_for_registration() {
            return Err(EngineError::NotEligible(format!(
                "event {} is not open for registration",
                event_id
            )));
        }
        self.store
            .get_attendee(attendee_id)
            .await?
            .ok_or_else(|| EngineError::NotFound(format!("attendee {attendee_id}")))?;

        let rsvp = self.store.insert_rsvp(Rsvp::new(event_id, attendee_id)).await?;
        self.metrics.recompute(event_id).await?;
        let _ = self.bus.publish(EngineEvent::RsvpRegistered {
            event_id,
            rsvp_id: rsvp.id,
            attendee_id,
            timestamp: Utc::now(),
        });

        tracing::info!(%event_id, rsvp_id = %rsvp.id, %attendee_id, "rsvp registered");
        Ok(rsvp)
    }

    /// Confirms a waitlisted RSVP, taking one capacity slot.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NotFound`] if the RSVP does not exist,
    /// [`EngineError::InvalidTransition`] if it is not waitlisted, and
    /// [`EngineError::CapacityExceeded`] if the event is full.
    pub async fn confirm(&self, rsvp_id: RsvpId) -> Result<Rsvp, EngineError> {
        let rsvp = self.store.confirm_rsvp(rsvp_id).await?;
        self.metrics.recompute(rsvp.event_id).await?;
        let _ = self.bus.publish(EngineEvent::RsvpConfirmed {
            event_id: rsvp.event_id,
            rsvp_id: rsvp.id,
            promoted: false,
            timestamp: Utc::now(),
        });

        tracing::info!(event_id = %rsvp.event_id, %rsvp_id, "rsvp confirmed");
        Ok(rsvp)
    }

    /// Cancels a live RSVP. When the cancellation frees a confirmed
    /// slot, the waitlist promoter runs for the event; a failed
    /// promotion attempt is logged but never fails the cancellation.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NotFound`] if the RSVP does not exist and
    /// [`EngineError::InvalidTransition`] if it is already cancelled.
    pub async fn cancel(&self, rsvp_id: RsvpId) -> Result<Rsvp, EngineError> {
        let (rsvp, prior) = self.store.cancel_rsvp(rsvp_id).await?;
        self.metrics.recompute(rsvp.event_id).await?;
        let was_confirmed = prior == RsvpStatus::Confirmed;
        let _ = self.bus.publish(EngineEvent::RsvpCancelled {
            event_id: rsvp.event_id,
            rsvp_id: rsvp.id,
            was_confirmed,
            timestamp: Utc::now(),
        });
        tracing::info!(event_id = %rsvp.event_id, %rsvp_id, was_confirmed, "rsvp cancelled");

        if was_confirmed {
            if let Err(err) = self.promoter.promote_next(rsvp.event_id).await {
                tracing::warn!(event_id = %rsvp.event_id, error = %err,
                    "waitlist promotion after cancellation failed");
            }
        }
        Ok(rsvp)
    }

    /// Fetches an RSVP by id.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NotFound`] if it does not exist.
    pub async fn get(&self, rsvp_id: RsvpId) -> Result<Rsvp, EngineError> {
        self.store
            .get_rsvp(rsvp_id)
            .await?
            .ok_or_else(|| EngineError::NotFound(format!("rsvp {rsvp_id}")))
    }

    /// Lists RSVPs for an event in registration order.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Store`] on store failure.
    pub async fn list_by_event(&self, event_id: EventId) -> Result<Vec<Rsvp>, EngineError> {
        self.store.list_rsvps_by_event(event_id).await
    }

    /// Lists RSVPs for an attendee in registration order.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Store`] on store failure.
    pub async fn list_by_attendee(
        &self,
        attendee_id: AttendeeId,
    ) -> Result<Vec<Rsvp>, EngineError> {
        self.store.list_rsvps_by_attendee(attendee_id).await
    }
}
