//! Attendance recorder: the single atomic commit behind every check-in.

use std::sync::Arc;

use chrono::Utc;

use crate::domain::{
    Attendance, AttendeeId, CheckInMethod, EngineEvent, EventBus, EventId, RsvpId,
};
use crate::error::EngineError;
use crate::store::RecordStore;

/// Appends an attendance record and flips the RSVP's check-in fields as
/// one unit.
///
/// The store primitive it calls is a compare-and-set on the RSVP's
/// `checked_in` flag: of two concurrent invocations for the same RSVP,
/// exactly one appends a record and the other observes
/// [`EngineError::DuplicateCheckIn`].
#[derive(Debug, Clone)]
pub struct AttendanceRecorder {
    store: Arc<dyn RecordStore>,
    metrics: super::MetricsAggregator,
    bus: EventBus,
}

impl AttendanceRecorder {
    /// Creates a new recorder.
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

    /// Records a check-in for the given RSVP.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::UnknownTicket`] if the RSVP does not
    /// exist, [`EngineError::NotConfirmed`] if it is not confirmed, and
    /// [`EngineError::DuplicateCheckIn`] if it is already checked in
    /// (no second record is created).
    pub async fn record(
        &self,
        event_id: EventId,
        attendee_id: AttendeeId,
        rsvp_id: RsvpId,
        method: CheckInMethod,
        operator_id: String,
        note: Option<String>,
    ) -> Result<Attendance, EngineError> {
        let attendance = Attendance::new(event_id, attendee_id, rsvp_id, method, operator_id, note);
        let attendance = self.store.record_check_in(attendance).await?;

        self.metrics.recompute(event_id).await?;
        let _ = self.bus.publish(EngineEvent::CheckInRecorded {
            event_id,
            rsvp_id,
            attendance_id: attendance.id,
            method,
            timestamp: Utc::now(),
        });

        tracing::info!(%event_id, %rsvp_id, method = method.as_str(),
            operator = %attendance.operator_id, "check-in recorded");
        Ok(attendance)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::{Attendee, Event, EventStatus, Rsvp};
    use crate::service::MetricsAggregator;
    use crate::store::memory::MemoryStore;
    use tokio_test::assert_ok;

    async fn confirmed_rsvp(store: &Arc<MemoryStore>) -> Rsvp {
        let mut event = Event::new("Gala".to_string(), 5);
        event.status = EventStatus::Published;
        let Ok(event) = store.insert_event(event).await else {
            panic!("insert failed");
        };
        let Ok(attendee) = store
            .insert_attendee(Attendee::new("Jo".to_string(), "jo@example.com".to_string()))
            .await
        else {
            panic!("attendee insert failed");
        };
        let Ok(rsvp) = store.insert_rsvp(Rsvp::new(event.id, attendee.id)).await else {
            panic!("rsvp insert failed");
        };
        let Ok(rsvp) = store.confirm_rsvp(rsvp.id).await else {
            panic!("confirm failed");
        };
        rsvp
    }

    fn recorder(store: &Arc<MemoryStore>) -> AttendanceRecorder {
        let dyn_store = Arc::clone(store) as Arc<dyn RecordStore>;
        AttendanceRecorder::new(
            Arc::clone(&dyn_store),
            MetricsAggregator::new(dyn_store),
            EventBus::new(16),
        )
    }

    #[tokio::test]
    async fn record_sets_rsvp_check_in_fields() {
        let store = Arc::new(MemoryStore::new());
        let rsvp = confirmed_rsvp(&store).await;
        let recorder = recorder(&store);

        let attendance = assert_ok!(
            recorder
                .record(
                    rsvp.event_id,
                    rsvp.attendee_id,
                    rsvp.id,
                    CheckInMethod::Manual,
                    "front-desk".to_string(),
                    Some("walk-up".to_string()),
                )
                .await
        );
        assert_eq!(attendance.rsvp_id, rsvp.id);

        let Ok(Some(updated)) = store.get_rsvp(rsvp.id).await else {
            panic!("rsvp disappeared");
        };
        assert!(updated.checked_in);
        assert_eq!(updated.checked_in_by.as_deref(), Some("front-desk"));
        assert_eq!(updated.checked_in_method, Some(CheckInMethod::Manual));

        let Ok(Some(event)) = store.get_event(rsvp.event_id).await else {
            panic!("event disappeared");
        };
        assert_eq!(event.metrics.attendance_count, 1);
    }

    #[tokio::test]
    async fn second_record_is_duplicate_and_appends_nothing() {
        let store = Arc::new(MemoryStore::new());
        let rsvp = confirmed_rsvp(&store).await;
        let recorder = recorder(&store);

        assert_ok!(
            recorder
                .record(
                    rsvp.event_id,
                    rsvp.attendee_id,
                    rsvp.id,
                    CheckInMethod::ScannedCode,
                    "door-1".to_string(),
                    None,
                )
                .await
        );
        let second = recorder
            .record(
                rsvp.event_id,
                rsvp.attendee_id,
                rsvp.id,
                CheckInMethod::ScannedCode,
                "door-2".to_string(),
                None,
            )
            .await;
        assert!(matches!(second, Err(EngineError::DuplicateCheckIn(_))));

        let Ok(rows) = store.list_attendance_by_event(rsvp.event_id).await else {
            panic!("list failed");
        };
        assert_eq!(rows.len(), 1);
    }
}
