//! Waitlist promoter: fills freed capacity from the waitlist in FIFO
//! order.

use std::sync::Arc;

use chrono::Utc;

use crate::domain::{EngineEvent, EventBus, EventId, Rsvp, RsvpStatus};
use crate::error::EngineError;
use crate::store::RecordStore;

/// Selects and confirms the next eligible waitlisted RSVP when capacity
/// frees up.
///
/// Safe to invoke opportunistically: when no capacity is free the
/// underlying conditional confirm rejects with `CapacityExceeded`, which
/// the promoter treats as "nothing to promote" rather than an error.
#[derive(Debug, Clone)]
pub struct WaitlistPromoter {
    store: Arc<dyn RecordStore>,
    metrics: super::MetricsAggregator,
    bus: EventBus,
}

impl WaitlistPromoter {
    /// Creates a new promoter.
    #[must_use]
    pub fn new(
        store: Arc<dyn RecordStore>,
        metrics: super::MetricsAggregator,
        bus: EventBus,
    ) -> Self {
        Self {
            store,
            metrics,
            bus,
        }
    }

    /// Confirms the earliest-registered waitlisted RSVP for the event,
    /// if any, and returns it.
    ///
    /// Candidates are ordered by registration time with the RSVP id as a
    /// stable tie-break. A candidate that a concurrent actor already
    /// confirmed or cancelled is skipped in favor of the next one; a
    /// capacity rejection ends the walk with `None`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Store`] on store failure. Capacity
    /// exhaustion and lost candidate races are not errors.
    pub async fn promote_next(&self, event_id: EventId) -> Result<Option<Rsvp>, EngineError> {
        let rsvps = self.store.list_rsvps_by_event(event_id).await?;
        let mut candidates: Vec<&Rsvp> = rsvps
            .iter()
            .filter(|r| r.status == RsvpStatus::Waitlisted)
            .collect();
        candidates.sort_by_key(|r| (r.registered_at, r.id));

        for candidate in candidates {
            match self.store.confirm_rsvp(candidate.id).await {
                Ok(rsvp) => {
                    self.metrics.recompute(event_id).await?;
                    let _ = self.bus.publish(EngineEvent::RsvpConfirmed {
                        event_id,
                        rsvp_id: rsvp.id,
                        promoted: true,
                        timestamp: Utc::now(),
                    });
                    tracing::info!(%event_id, rsvp_id = %rsvp.id, "waitlisted rsvp promoted");
                    return Ok(Some(rsvp));
                }
                // No free slot: nothing to promote.
                Err(EngineError::CapacityExceeded(_)) => return Ok(None),
                // A concurrent actor confirmed or cancelled this
                // candidate first; try the next one.
                Err(EngineError::InvalidTransition(_) | EngineError::NotFound(_)) => {}
                Err(other) => return Err(other),
            }
        }
        Ok(None)
    }

    /// Promotes repeatedly until capacity is exhausted or the waitlist
    /// runs dry. Used after an event's capacity is raised.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Store`] on store failure.
    pub async fn promote_until_full(&self, event_id: EventId) -> Result<Vec<Rsvp>, EngineError> {
        let mut promoted = Vec::new();
        while let Some(rsvp) = self.promote_next(event_id).await? {
            promoted.push(rsvp);
        }
        Ok(promoted)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::{Attendee, Event, EventStatus};
    use crate::service::MetricsAggregator;
    use crate::store::memory::MemoryStore;

    struct Fixture {
        store: Arc<MemoryStore>,
        promoter: WaitlistPromoter,
        event: Event,
    }

    async fn fixture(capacity: u32) -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let dyn_store = Arc::clone(&store) as Arc<dyn RecordStore>;
        let metrics = MetricsAggregator::new(Arc::clone(&dyn_store));
        let promoter = WaitlistPromoter::new(dyn_store, metrics, EventBus::new(16));

        let mut event = Event::new("Hack Night".to_string(), capacity);
        event.status = EventStatus::Published;
        let Ok(event) = store.insert_event(event).await else {
            panic!("insert failed");
        };
        Fixture {
            store,
            promoter,
            event,
        }
    }

    async fn waitlisted(fixture: &Fixture) -> Rsvp {
        let Ok(attendee) = fixture
            .store
            .insert_attendee(Attendee::new("w".to_string(), "w@example.com".to_string()))
            .await
        else {
            panic!("attendee insert failed");
        };
        let Ok(rsvp) = fixture
            .store
            .insert_rsvp(Rsvp::new(fixture.event.id, attendee.id))
            .await
        else {
            panic!("rsvp insert failed");
        };
        rsvp
    }

    #[tokio::test]
    async fn promotes_earliest_registration() {
        let fixture = fixture(2).await;
        let first = waitlisted(&fixture).await;
        let _second = waitlisted(&fixture).await;

        let Ok(Some(promoted)) = fixture.promoter.promote_next(fixture.event.id).await else {
            panic!("expected a promotion");
        };
        assert_eq!(promoted.id, first.id);
        assert_eq!(promoted.status, RsvpStatus::Confirmed);
    }

    #[tokio::test]
    async fn empty_waitlist_promotes_nothing() {
        let fixture = fixture(2).await;
        let Ok(result) = fixture.promoter.promote_next(fixture.event.id).await else {
            panic!("promoter errored");
        };
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn full_event_promotes_nothing() {
        let fixture = fixture(1).await;
        let holder = waitlisted(&fixture).await;
        let Ok(_) = fixture.store.confirm_rsvp(holder.id).await else {
            panic!("confirm failed");
        };
        let _waiting = waitlisted(&fixture).await;

        // The capacity rejection must read as "nothing to promote".
        let Ok(result) = fixture.promoter.promote_next(fixture.event.id).await else {
            panic!("promoter errored");
        };
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn promote_until_full_drains_free_slots() {
        let fixture = fixture(3).await;
        for _ in 0..5 {
            waitlisted(&fixture).await;
        }

        let Ok(promoted) = fixture.promoter.promote_until_full(fixture.event.id).await else {
            panic!("promoter errored");
        };
        assert_eq!(promoted.len(), 3);

        let Ok(Some(event)) = fixture.store.get_event(fixture.event.id).await else {
            panic!("event disappeared");
        };
        assert_eq!(event.metrics.confirmed_rsvps, 3);
        assert_eq!(event.metrics.waitlist_count, 2);
    }
}
