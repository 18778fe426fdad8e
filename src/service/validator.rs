//! Ticket validator: the ordered scan pipeline behind every check-in.
//!
//! A raw string from the (external) optical decoder runs through a fixed
//! sequence of checks (decode, freshness, event match, RSVP lookup and
//! status, duplicate gate, attendee lookup) and only then commits via
//! the attendance recorder. Each rejection carries its own reason so the
//! door crew sees a specific message, and no rejection stops the
//! validator from processing the next scan.

use std::sync::Arc;

use chrono::{Duration, Utc};

use crate::domain::{
    Attendance, CheckInMethod, EngineEvent, EventBus, EventId, RsvpStatus, TicketPayload,
};
use crate::error::EngineError;
use crate::store::RecordStore;

/// Validates scanned tickets and commits check-ins.
///
/// Holds no per-scan state: a rejected ticket simply means the external
/// scanning loop resumes and may re-present the same or another string.
#[derive(Debug, Clone)]
pub struct TicketValidator {
    store: Arc<dyn RecordStore>,
    recorder: super::AttendanceRecorder,
    bus: EventBus,
    max_ticket_age: Duration,
    clock_skew: Duration,
}

impl TicketValidator {
    /// Creates a new validator.
    ///
    /// `max_ticket_age` bounds how old a ticket's issue timestamp may
    /// be; `clock_skew` is the tolerance for timestamps slightly in the
    /// future (scanner and issuer clocks are rarely in perfect sync).
    #[must_use]
    pub fn new(
        store: Arc<dyn RecordStore>,
        recorder: super::AttendanceRecorder,
        bus: EventBus,
        max_ticket_age: Duration,
        clock_skew: Duration,
    ) -> Self {
        Self {
            store,
            recorder,
            bus,
            max_ticket_age,
            clock_skew,
        }
    }

    /// Runs a raw scan string through the full pipeline.
    ///
    /// On success exactly one attendance record exists for the ticket's
    /// RSVP, no matter how many scanners present it concurrently: the
    /// duplicate gate and the commit behave as a single compare-and-set
    /// in the record store, and a lost race is reported as
    /// [`EngineError::DuplicateCheckIn`] like any other re-scan.
    ///
    /// # Errors
    ///
    /// One of the scan rejections ([`EngineError::MalformedTicket`],
    /// [`EngineError::ExpiredTicket`], [`EngineError::WrongEvent`],
    /// [`EngineError::UnknownTicket`], [`EngineError::NotConfirmed`],
    /// [`EngineError::DuplicateCheckIn`],
    /// [`EngineError::UnknownAttendee`]) or [`EngineError::Store`].
    pub async fn validate(
        &self,
        raw: &str,
        scanning_event_id: EventId,
        operator_id: &str,
        note: Option<String>,
    ) -> Result<Attendance, EngineError> {
        let result = self
            .run_pipeline(raw, scanning_event_id, operator_id, note)
            .await;

        if let Err(err) = &result
            && let Some(reason) = err.scan_reason()
        {
            tracing::info!(event_id = %scanning_event_id, reason, "scan rejected");
            let _ = self.bus.publish(EngineEvent::ScanRejected {
                event_id: scanning_event_id,
                reason: reason.to_string(),
                timestamp: Utc::now(),
            });
        }
        result
    }

    async fn run_pipeline(
        &self,
        raw: &str,
        scanning_event_id: EventId,
        operator_id: &str,
        note: Option<String>,
    ) -> Result<Attendance, EngineError> {
        // Decode
        let payload = TicketPayload::decode(raw)?;

        // Freshness
        let issued_at = payload
            .issued_at()
            .ok_or_else(|| EngineError::MalformedTicket("timestamp out of range".to_string()))?;
        let now = Utc::now();
        if now - issued_at > self.max_ticket_age || issued_at - now > self.clock_skew {
            return Err(EngineError::ExpiredTicket);
        }

        // Event match
        if payload.event_id != scanning_event_id {
            return Err(EngineError::WrongEvent {
                ticket_event: payload.event_id,
                scanning_event: scanning_event_id,
            });
        }

        // RSVP lookup. A payload naming an RSVP whose stored references
        // disagree with it does not denote a real registration.
        let rsvp = self
            .store
            .get_rsvp(payload.rsvp_id)
            .await?
            .ok_or(EngineError::UnknownTicket(payload.rsvp_id))?;
        if rsvp.event_id != payload.event_id || rsvp.attendee_id != payload.attendee_id {
            return Err(EngineError::UnknownTicket(payload.rsvp_id));
        }

        // RSVP status
        if rsvp.status != RsvpStatus::Confirmed {
            return Err(EngineError::NotConfirmed(rsvp.id));
        }

        // Duplicate gate. The commit below re-checks atomically; this
        // early exit keeps re-scans cheap and side-effect free.
        if rsvp.checked_in {
            return Err(EngineError::DuplicateCheckIn(rsvp.id));
        }

        // Attendee lookup. Should never fire if referential integrity
        // held at registration time.
        self.store
            .get_attendee(payload.attendee_id)
            .await?
            .ok_or(EngineError::UnknownAttendee(payload.attendee_id))?;

        // Commit
        self.recorder
            .record(
                rsvp.event_id,
                rsvp.attendee_id,
                rsvp.id,
                CheckInMethod::ScannedCode,
                operator_id.to_string(),
                note,
            )
            .await
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::{Attendee, AttendeeId, Event, EventStatus, Rsvp, RsvpId};
    use crate::service::{AttendanceRecorder, MetricsAggregator};
    use crate::store::memory::MemoryStore;
    use tokio_test::assert_ok;

    struct Fixture {
        store: Arc<MemoryStore>,
        validator: TicketValidator,
        event: Event,
        rsvp: Rsvp,
    }

    async fn fixture() -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let dyn_store = Arc::clone(&store) as Arc<dyn RecordStore>;
        let bus = crate::domain::EventBus::new(64);
        let metrics = MetricsAggregator::new(Arc::clone(&dyn_store));
        let recorder = AttendanceRecorder::new(Arc::clone(&dyn_store), metrics, bus.clone());
        let validator = TicketValidator::new(
            dyn_store,
            recorder,
            bus,
            Duration::hours(24),
            Duration::minutes(5),
        );

        let mut event = Event::new("Expo".to_string(), 5);
        event.status = EventStatus::Published;
        let Ok(event) = store.insert_event(event).await else {
            panic!("insert failed");
        };
        let Ok(attendee) = store
            .insert_attendee(Attendee::new("Noa".to_string(), "noa@example.com".to_string()))
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
        Fixture {
            store,
            validator,
            event,
            rsvp,
        }
    }

    fn ticket(fixture: &Fixture) -> String {
        let Ok(encoded) =
            TicketPayload::new(fixture.event.id, fixture.rsvp.attendee_id, fixture.rsvp.id)
                .encode()
        else {
            panic!("encode failed");
        };
        encoded
    }

    fn stale_ticket(fixture: &Fixture, age: Duration) -> String {
        let mut payload =
            TicketPayload::new(fixture.event.id, fixture.rsvp.attendee_id, fixture.rsvp.id);
        payload.issued_at_ms = (Utc::now() - age).timestamp_millis();
        let Ok(encoded) = payload.encode() else {
            panic!("encode failed");
        };
        encoded
    }

    #[tokio::test]
    async fn fresh_ticket_checks_in() {
        let fixture = fixture().await;
        let attendance = assert_ok!(
            fixture
                .validator
                .validate(&ticket(&fixture), fixture.event.id, "door-1", None)
                .await
        );
        assert_eq!(attendance.rsvp_id, fixture.rsvp.id);
        assert_eq!(attendance.method, CheckInMethod::ScannedCode);

        let Ok(Some(rsvp)) = fixture.store.get_rsvp(fixture.rsvp.id).await else {
            panic!("rsvp disappeared");
        };
        assert!(rsvp.checked_in);
    }

    #[tokio::test]
    async fn garbage_is_malformed() {
        let fixture = fixture().await;
        let result = fixture
            .validator
            .validate("QR-NOISE-####", fixture.event.id, "door-1", None)
            .await;
        assert!(matches!(result, Err(EngineError::MalformedTicket(_))));
    }

    #[tokio::test]
    async fn day_old_ticket_is_expired() {
        let fixture = fixture().await;
        let raw = stale_ticket(&fixture, Duration::hours(25));
        let result = fixture
            .validator
            .validate(&raw, fixture.event.id, "door-1", None)
            .await;
        assert!(matches!(result, Err(EngineError::ExpiredTicket)));
    }

    #[tokio::test]
    async fn post_dated_ticket_is_expired() {
        let fixture = fixture().await;
        let raw = stale_ticket(&fixture, Duration::minutes(-30));
        let result = fixture
            .validator
            .validate(&raw, fixture.event.id, "door-1", None)
            .await;
        assert!(matches!(result, Err(EngineError::ExpiredTicket)));
    }

    #[tokio::test]
    async fn slightly_post_dated_ticket_is_within_skew() {
        let fixture = fixture().await;
        let raw = stale_ticket(&fixture, Duration::minutes(-2));
        assert_ok!(
            fixture
                .validator
                .validate(&raw, fixture.event.id, "door-1", None)
                .await
        );
    }

    #[tokio::test]
    async fn ticket_for_other_event_is_wrong_event() {
        let fixture = fixture().await;
        let result = fixture
            .validator
            .validate(&ticket(&fixture), EventId::new(), "door-1", None)
            .await;
        assert!(matches!(result, Err(EngineError::WrongEvent { .. })));
    }

    #[tokio::test]
    async fn unknown_rsvp_is_unknown_ticket() {
        let fixture = fixture().await;
        let Ok(raw) =
            TicketPayload::new(fixture.event.id, fixture.rsvp.attendee_id, RsvpId::new()).encode()
        else {
            panic!("encode failed");
        };
        let result = fixture
            .validator
            .validate(&raw, fixture.event.id, "door-1", None)
            .await;
        assert!(matches!(result, Err(EngineError::UnknownTicket(_))));
    }

    #[tokio::test]
    async fn forged_attendee_reference_is_unknown_ticket() {
        let fixture = fixture().await;
        let Ok(raw) =
            TicketPayload::new(fixture.event.id, AttendeeId::new(), fixture.rsvp.id)
                .encode()
        else {
            panic!("encode failed");
        };
        let result = fixture
            .validator
            .validate(&raw, fixture.event.id, "door-1", None)
            .await;
        assert!(matches!(result, Err(EngineError::UnknownTicket(_))));
    }

    #[tokio::test]
    async fn waitlisted_rsvp_is_not_confirmed() {
        let fixture = fixture().await;
        let Ok(attendee) = fixture
            .store
            .insert_attendee(Attendee::new("Ira".to_string(), "ira@example.com".to_string()))
            .await
        else {
            panic!("attendee insert failed");
        };
        let Ok(waitlisted) = fixture
            .store
            .insert_rsvp(Rsvp::new(fixture.event.id, attendee.id))
            .await
        else {
            panic!("rsvp insert failed");
        };
        let Ok(raw) =
            TicketPayload::new(fixture.event.id, attendee.id, waitlisted.id).encode()
        else {
            panic!("encode failed");
        };
        let result = fixture
            .validator
            .validate(&raw, fixture.event.id, "door-1", None)
            .await;
        assert!(matches!(result, Err(EngineError::NotConfirmed(_))));
    }

    #[tokio::test]
    async fn missing_attendee_record_is_unknown_attendee() {
        let fixture = fixture().await;
        // An RSVP whose attendee record was never written: referential
        // integrity did not hold, the defensive lookup catches it.
        let ghost = AttendeeId::new();
        let Ok(rsvp) = fixture
            .store
            .insert_rsvp(Rsvp::new(fixture.event.id, ghost))
            .await
        else {
            panic!("rsvp insert failed");
        };
        let Ok(rsvp) = fixture.store.confirm_rsvp(rsvp.id).await else {
            panic!("confirm failed");
        };
        let Ok(raw) = TicketPayload::new(fixture.event.id, ghost, rsvp.id).encode() else {
            panic!("encode failed");
        };
        let result = fixture
            .validator
            .validate(&raw, fixture.event.id, "door-1", None)
            .await;
        assert!(matches!(result, Err(EngineError::UnknownAttendee(_))));
    }

    #[tokio::test]
    async fn rescan_is_duplicate_with_single_attendance_row() {
        let fixture = fixture().await;
        let raw = ticket(&fixture);

        assert_ok!(
            fixture
                .validator
                .validate(&raw, fixture.event.id, "door-1", None)
                .await
        );
        let second = fixture
            .validator
            .validate(&raw, fixture.event.id, "door-2", None)
            .await;
        assert!(matches!(second, Err(EngineError::DuplicateCheckIn(_))));

        let Ok(rows) = fixture.store.list_attendance_by_event(fixture.event.id).await else {
            panic!("list failed");
        };
        assert_eq!(rows.len(), 1);
    }

    #[tokio::test]
    async fn concurrent_scans_commit_exactly_once() {
        let fixture = fixture().await;
        let raw = ticket(&fixture);

        let (a, b) = tokio::join!(
            fixture
                .validator
                .validate(&raw, fixture.event.id, "door-1", None),
            fixture
                .validator
                .validate(&raw, fixture.event.id, "door-2", None),
        );

        let successes = [&a, &b].iter().filter(|r| r.is_ok()).count();
        assert_eq!(successes, 1);
        let duplicates = [&a, &b]
            .iter()
            .filter(|r| matches!(r, Err(EngineError::DuplicateCheckIn(_))))
            .count();
        assert_eq!(duplicates, 1);

        let Ok(rows) = fixture.store.list_attendance_by_event(fixture.event.id).await else {
            panic!("list failed");
        };
        assert_eq!(rows.len(), 1);
    }

    #[tokio::test]
    async fn rejection_does_not_poison_next_scan() {
        let fixture = fixture().await;
        let result = fixture
            .validator
            .validate("garbage", fixture.event.id, "door-1", None)
            .await;
        assert!(result.is_err());

        assert_ok!(
            fixture
                .validator
                .validate(&ticket(&fixture), fixture.event.id, "door-1", None)
                .await
        );
    }
}
