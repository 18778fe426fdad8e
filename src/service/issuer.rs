//! Ticket issuer: turns a confirmed RSVP into a scannable payload.

use std::sync::Arc;

use chrono::Utc;

use crate::domain::{
    AttendeeId, EncodedTicket, EngineEvent, EventBus, EventId, RsvpId, RsvpStatus, TicketPayload,
};
use crate::error::EngineError;
use crate::store::RecordStore;

/// Builds and serializes ticket payloads for confirmed RSVPs.
///
/// Issuance is stateless: nothing is persisted, and rendering the
/// encoded string into a QR image is the caller's concern.
#[derive(Debug, Clone)]
pub struct TicketIssuer {
    store: Arc<dyn RecordStore>,
    bus: EventBus,
}

impl TicketIssuer {
    /// Creates a new issuer.
    #[must_use]
    pub fn new(store: Arc<dyn RecordStore>, bus: EventBus) -> Self {
        Self { store, bus }
    }

    /// Issues a ticket for the given RSVP.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NotFound`] if the RSVP does not exist and
    /// [`EngineError::NotEligible`] if it does not belong to the given
    /// event and attendee or is not confirmed.
    pub async fn issue(
        &self,
        event_id: EventId,
        attendee_id: AttendeeId,
        rsvp_id: RsvpId,
    ) -> Result<EncodedTicket, EngineError> {
        let rsvp = self
            .store
            .get_rsvp(rsvp_id)
            .await?
            .ok_or_else(|| EngineError::NotFound(format!("rsvp {rsvp_id}")))?;

        if rsvp.event_id != event_id || rsvp.attendee_id != attendee_id {
            return Err(EngineError::NotEligible(format!(
                "rsvp {rsvp_id} does not belong to that event and attendee"
            )));
        }
        if rsvp.status != RsvpStatus::Confirmed {
            return Err(EngineError::NotEligible(format!(
                "rsvp {rsvp_id} is {}, only confirmed rsvps get tickets",
                rsvp.status.as_str()
            )));
        }

        let payload = TicketPayload::new(event_id, attendee_id, rsvp_id);
        let encoded = payload.encode()?;
        let _ = self.bus.publish(EngineEvent::TicketIssued {
            event_id,
            rsvp_id,
            timestamp: Utc::now(),
        });

        tracing::info!(%event_id, %rsvp_id, "ticket issued");
        Ok(EncodedTicket { payload, encoded })
    }
}
