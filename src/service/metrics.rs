//! Event-level metrics aggregator.

use std::sync::Arc;

use crate::domain::{EventId, EventMetrics, RsvpStatus};
use crate::error::EngineError;
use crate::store::RecordStore;

/// Recomputes an event's counters from the RSVP and attendance sets.
///
/// Full recomputation rather than incremental counters: a recompute
/// after a retried mutation converges on the same numbers, so the
/// snapshot cannot drift from the source-of-truth ledgers. Invoked
/// after every ledger mutation and every attendance write.
#[derive(Debug, Clone)]
pub struct MetricsAggregator {
    store: Arc<dyn RecordStore>,
}

impl MetricsAggregator {
    /// Creates a new aggregator over the given store.
    #[must_use]
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Derives the counters for an event and writes them back to its
    /// metrics snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NotFound`] if the event does not exist, or
    /// [`EngineError::Store`] on store failure.
    pub async fn recompute(&self, event_id: EventId) -> Result<EventMetrics, EngineError> {
        let rsvps = self.store.list_rsvps_by_event(event_id).await?;
        let attendance = self.store.list_attendance_by_event(event_id).await?;

        let confirmed = rsvps
            .iter()
            .filter(|r| r.status == RsvpStatus::Confirmed)
            .count();
        let waitlisted = rsvps
            .iter()
            .filter(|r| r.status == RsvpStatus::Waitlisted)
            .count();

        let metrics = EventMetrics {
            total_rsvps: u32::try_from(rsvps.len()).unwrap_or(u32::MAX),
            confirmed_rsvps: u32::try_from(confirmed).unwrap_or(u32::MAX),
            waitlist_count: u32::try_from(waitlisted).unwrap_or(u32::MAX),
            attendance_count: u32::try_from(attendance.len()).unwrap_or(u32::MAX),
        };

        self.store.update_event_metrics(event_id, metrics).await?;
        tracing::debug!(%event_id, ?metrics, "event metrics recomputed");
        Ok(metrics)
    }
}
