//! In-memory record store.
//!
//! [`MemoryStore`] keeps all tables behind a single
//! [`tokio::sync::RwLock`]: reads take the shared lock, and every
//! conditional primitive takes the write lock for its whole
//! check-and-write, so the capacity check and the check-in
//! compare-and-set are atomic across tables. This is the default
//! backend and the substrate the test suite runs on.

use std::collections::HashMap;

use chrono::Utc;
use tokio::sync::RwLock;

use async_trait::async_trait;

use super::RecordStore;
use crate::domain::{
    Attendance, Attendee, AttendeeId, Event, EventId, EventMetrics, EventStatus, Rsvp, RsvpId,
    RsvpStatus,
};
use crate::error::EngineError;

#[derive(Debug, Default)]
struct Tables {
    events: HashMap<EventId, Event>,
    attendees: HashMap<AttendeeId, Attendee>,
    rsvps: HashMap<RsvpId, Rsvp>,
    attendance: Vec<Attendance>,
}

impl Tables {
    fn confirmed_count(&self, event_id: EventId) -> usize {
        self.rsvps
            .values()
            .filter(|r| r.event_id == event_id && r.status == RsvpStatus::Confirmed)
            .count()
    }
}

/// Volatile store backing a single-process deployment and the tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Tables>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn insert_event(&self, event: Event) -> Result<Event, EngineError> {
        let mut tables = self.inner.write().await;
        if tables.events.contains_key(&event.id) {
            return Err(EngineError::InvalidRequest(format!(
                "event {} already exists",
                event.id
            )));
        }
        tables.events.insert(event.id, event.clone());
        Ok(event)
    }

    async fn get_event(&self, id: EventId) -> Result<Option<Event>, EngineError> {
        Ok(self.inner.read().await.events.get(&id).cloned())
    }

    async fn list_events(&self) -> Result<Vec<Event>, EngineError> {
        let tables = self.inner.read().await;
        let mut events: Vec<Event> = tables.events.values().cloned().collect();
        events.sort_by_key(|e| e.created_at);
        Ok(events)
    }

    async fn update_event_status(
        &self,
        id: EventId,
        status: EventStatus,
    ) -> Result<Event, EngineError> {
        let mut tables = self.inner.write().await;
        let event = tables
            .events
            .get_mut(&id)
            .ok_or_else(|| EngineError::NotFound(format!("event {id}")))?;
        event.status = status;
        event.updated_at = Utc::now();
        Ok(event.clone())
    }

    async fn update_event_capacity(
        &self,
        id: EventId,
        capacity: u32,
    ) -> Result<Event, EngineError> {
        let mut tables = self.inner.write().await;
        if !tables.events.contains_key(&id) {
            return Err(EngineError::NotFound(format!("event {id}")));
        }
        // Never shrink below the confirmed count; confirmed RSVPs are
        // not demoted.
        if (capacity as usize) < tables.confirmed_count(id) {
            return Err(EngineError::CapacityExceeded(id));
        }
        let event = tables
            .events
            .get_mut(&id)
            .ok_or_else(|| EngineError::NotFound(format!("event {id}")))?;
        event.capacity = capacity;
        event.updated_at = Utc::now();
        Ok(event.clone())
    }

    async fn update_event_metrics(
        &self,
        id: EventId,
        metrics: EventMetrics,
    ) -> Result<(), EngineError> {
        let mut tables = self.inner.write().await;
        let event = tables
            .events
            .get_mut(&id)
            .ok_or_else(|| EngineError::NotFound(format!("event {id}")))?;
        event.metrics = metrics;
        event.updated_at = Utc::now();
        Ok(())
    }

    async fn insert_attendee(&self, attendee: Attendee) -> Result<Attendee, EngineError> {
        let mut tables = self.inner.write().await;
        tables.attendees.insert(attendee.id, attendee.clone());
        Ok(attendee)
    }

    async fn get_attendee(&self, id: AttendeeId) -> Result<Option<Attendee>, EngineError> {
        Ok(self.inner.read().await.attendees.get(&id).cloned())
    }

    async fn insert_rsvp(&self, rsvp: Rsvp) -> Result<Rsvp, EngineError> {
        let mut tables = self.inner.write().await;
        let duplicate = tables.rsvps.values().any(|r| {
            r.event_id == rsvp.event_id
                && r.attendee_id == rsvp.attendee_id
                && r.status.is_active()
        });
        if duplicate {
            return Err(EngineError::DuplicateRegistration {
                event_id: rsvp.event_id,
                attendee_id: rsvp.attendee_id,
            });
        }
        tables.rsvps.insert(rsvp.id, rsvp.clone());
        Ok(rsvp)
    }

    async fn get_rsvp(&self, id: RsvpId) -> Result<Option<Rsvp>, EngineError> {
        Ok(self.inner.read().await.rsvps.get(&id).cloned())
    }

    async fn list_rsvps_by_event(&self, event_id: EventId) -> Result<Vec<Rsvp>, EngineError> {
        let tables = self.inner.read().await;
        let mut rsvps: Vec<Rsvp> = tables
            .rsvps
            .values()
            .filter(|r| r.event_id == event_id)
            .cloned()
            .collect();
        rsvps.sort_by_key(|r| (r.registered_at, r.id));
        Ok(rsvps)
    }

    async fn list_rsvps_by_attendee(
        &self,
        attendee_id: AttendeeId,
    ) -> Result<Vec<Rsvp>, EngineError> {
        let tables = self.inner.read().await;
        let mut rsvps: Vec<Rsvp> = tables
            .rsvps
            .values()
            .filter(|r| r.attendee_id == attendee_id)
            .cloned()
            .collect();
        rsvps.sort_by_key(|r| (r.registered_at, r.id));
        Ok(rsvps)
    }

    async fn confirm_rsvp(&self, id: RsvpId) -> Result<Rsvp, EngineError> {
        let mut tables = self.inner.write().await;

        let rsvp = tables
            .rsvps
            .get(&id)
            .ok_or_else(|| EngineError::NotFound(format!("rsvp {id}")))?;
        if rsvp.status != RsvpStatus::Waitlisted {
            return Err(EngineError::InvalidTransition(format!(
                "cannot confirm a {} rsvp",
                rsvp.status.as_str()
            )));
        }

        let event_id = rsvp.event_id;
        let capacity = tables
            .events
            .get(&event_id)
            .ok_or_else(|| EngineError::NotFound(format!("event {event_id}")))?
            .capacity;

        // Capacity check and status write under the same write lock:
        // concurrent confirms for the last slot cannot both pass.
        if tables.confirmed_count(event_id) >= capacity as usize {
            return Err(EngineError::CapacityExceeded(event_id));
        }

        let rsvp = tables
            .rsvps
            .get_mut(&id)
            .ok_or_else(|| EngineError::NotFound(format!("rsvp {id}")))?;
        rsvp.status = RsvpStatus::Confirmed;
        rsvp.confirmed_at = Some(Utc::now());
        Ok(rsvp.clone())
    }

    async fn cancel_rsvp(&self, id: RsvpId) -> Result<(Rsvp, RsvpStatus), EngineError> {
        let mut tables = self.inner.write().await;
        let rsvp = tables
            .rsvps
            .get_mut(&id)
            .ok_or_else(|| EngineError::NotFound(format!("rsvp {id}")))?;
        if rsvp.status == RsvpStatus::Cancelled {
            return Err(EngineError::InvalidTransition(
                "rsvp is already cancelled".to_string(),
            ));
        }
        let prior = rsvp.status;
        rsvp.status = RsvpStatus::Cancelled;
        Ok((rsvp.clone(), prior))
    }

    async fn record_check_in(&self, attendance: Attendance) -> Result<Attendance, EngineError> {
        let mut tables = self.inner.write().await;

        let rsvp = tables
            .rsvps
            .get_mut(&attendance.rsvp_id)
            .ok_or(EngineError::UnknownTicket(attendance.rsvp_id))?;
        if rsvp.checked_in {
            return Err(EngineError::DuplicateCheckIn(attendance.rsvp_id));
        }
        if rsvp.status != RsvpStatus::Confirmed {
            return Err(EngineError::NotConfirmed(attendance.rsvp_id));
        }

        rsvp.checked_in = true;
        rsvp.checked_in_at = Some(attendance.checked_in_at);
        rsvp.checked_in_by = Some(attendance.operator_id.clone());
        rsvp.checked_in_method = Some(attendance.method);

        tables.attendance.push(attendance.clone());
        Ok(attendance)
    }

    async fn list_attendance_by_event(
        &self,
        event_id: EventId,
    ) -> Result<Vec<Attendance>, EngineError> {
        let tables = self.inner.read().await;
        Ok(tables
            .attendance
            .iter()
            .filter(|a| a.event_id == event_id)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::CheckInMethod;

    async fn published_event(store: &MemoryStore, capacity: u32) -> Event {
        let mut event = Event::new("Launch Party".to_string(), capacity);
        event.status = EventStatus::Published;
        let Ok(event) = store.insert_event(event).await else {
            panic!("insert failed");
        };
        event
    }

    async fn stored_rsvp(store: &MemoryStore, event_id: EventId) -> Rsvp {
        let Ok(attendee) = store
            .insert_attendee(Attendee::new("Sam".to_string(), "sam@example.com".to_string()))
            .await
        else {
            panic!("attendee insert failed");
        };
        let Ok(rsvp) = store.insert_rsvp(Rsvp::new(event_id, attendee.id)).await else {
            panic!("rsvp insert failed");
        };
        rsvp
    }

    #[tokio::test]
    async fn insert_and_get_event() {
        let store = MemoryStore::new();
        let event = published_event(&store, 10).await;
        let fetched = store.get_event(event.id).await;
        let Ok(Some(fetched)) = fetched else {
            panic!("event not found");
        };
        assert_eq!(fetched.capacity, 10);
    }

    #[tokio::test]
    async fn duplicate_active_rsvp_is_rejected() {
        let store = MemoryStore::new();
        let event = published_event(&store, 10).await;
        let rsvp = stored_rsvp(&store, event.id).await;

        let second = store
            .insert_rsvp(Rsvp::new(event.id, rsvp.attendee_id))
            .await;
        assert!(matches!(
            second,
            Err(EngineError::DuplicateRegistration { .. })
        ));
    }

    #[tokio::test]
    async fn cancelled_rsvp_frees_the_pair() {
        let store = MemoryStore::new();
        let event = published_event(&store, 10).await;
        let rsvp = stored_rsvp(&store, event.id).await;

        let cancelled = store.cancel_rsvp(rsvp.id).await;
        assert!(cancelled.is_ok());

        // The pair may register again once the old RSVP is cancelled.
        let again = store
            .insert_rsvp(Rsvp::new(event.id, rsvp.attendee_id))
            .await;
        assert!(again.is_ok());
    }

    #[tokio::test]
    async fn confirm_honors_capacity() {
        let store = MemoryStore::new();
        let event = published_event(&store, 1).await;
        let first = stored_rsvp(&store, event.id).await;
        let second = stored_rsvp(&store, event.id).await;

        let confirmed = store.confirm_rsvp(first.id).await;
        assert!(confirmed.is_ok());

        let overflow = store.confirm_rsvp(second.id).await;
        assert!(matches!(overflow, Err(EngineError::CapacityExceeded(_))));
    }

    #[tokio::test]
    async fn confirm_requires_waitlisted() {
        let store = MemoryStore::new();
        let event = published_event(&store, 5).await;
        let rsvp = stored_rsvp(&store, event.id).await;

        let Ok(_) = store.confirm_rsvp(rsvp.id).await else {
            panic!("first confirm failed");
        };
        let again = store.confirm_rsvp(rsvp.id).await;
        assert!(matches!(again, Err(EngineError::InvalidTransition(_))));
    }

    #[tokio::test]
    async fn cancel_reports_prior_status() {
        let store = MemoryStore::new();
        let event = published_event(&store, 5).await;
        let rsvp = stored_rsvp(&store, event.id).await;
        let Ok(_) = store.confirm_rsvp(rsvp.id).await else {
            panic!("confirm failed");
        };

        let Ok((cancelled, prior)) = store.cancel_rsvp(rsvp.id).await else {
            panic!("cancel failed");
        };
        assert_eq!(cancelled.status, RsvpStatus::Cancelled);
        assert_eq!(prior, RsvpStatus::Confirmed);

        let again = store.cancel_rsvp(rsvp.id).await;
        assert!(matches!(again, Err(EngineError::InvalidTransition(_))));
    }

    #[tokio::test]
    async fn check_in_flips_flag_once() {
        let store = MemoryStore::new();
        let event = published_event(&store, 5).await;
        let rsvp = stored_rsvp(&store, event.id).await;
        let Ok(rsvp) = store.confirm_rsvp(rsvp.id).await else {
            panic!("confirm failed");
        };

        let first = store
            .record_check_in(Attendance::new(
                event.id,
                rsvp.attendee_id,
                rsvp.id,
                CheckInMethod::ScannedCode,
                "door-1".to_string(),
                None,
            ))
            .await;
        assert!(first.is_ok());

        let second = store
            .record_check_in(Attendance::new(
                event.id,
                rsvp.attendee_id,
                rsvp.id,
                CheckInMethod::ScannedCode,
                "door-2".to_string(),
                None,
            ))
            .await;
        assert!(matches!(second, Err(EngineError::DuplicateCheckIn(_))));

        let Ok(rows) = store.list_attendance_by_event(event.id).await else {
            panic!("list failed");
        };
        assert_eq!(rows.len(), 1);
    }

    #[tokio::test]
    async fn check_in_requires_confirmed() {
        let store = MemoryStore::new();
        let event = published_event(&store, 5).await;
        let rsvp = stored_rsvp(&store, event.id).await;

        let result = store
            .record_check_in(Attendance::new(
                event.id,
                rsvp.attendee_id,
                rsvp.id,
                CheckInMethod::Manual,
                "door-1".to_string(),
                None,
            ))
            .await;
        assert!(matches!(result, Err(EngineError::NotConfirmed(_))));
    }

    #[tokio::test]
    async fn capacity_cannot_shrink_below_confirmed() {
        let store = MemoryStore::new();
        let event = published_event(&store, 3).await;
        for _ in 0..2 {
            let rsvp = stored_rsvp(&store, event.id).await;
            let Ok(_) = store.confirm_rsvp(rsvp.id).await else {
                panic!("confirm failed");
            };
        }

        let shrink = store.update_event_capacity(event.id, 1).await;
        assert!(matches!(shrink, Err(EngineError::CapacityExceeded(_))));

        let grow = store.update_event_capacity(event.id, 10).await;
        assert!(grow.is_ok());
    }

    #[tokio::test]
    async fn rsvps_list_in_registration_order() {
        let store = MemoryStore::new();
        let event = published_event(&store, 5).await;
        let first = stored_rsvp(&store, event.id).await;
        let second = stored_rsvp(&store, event.id).await;

        let Ok(listed) = store.list_rsvps_by_event(event.id).await else {
            panic!("list failed");
        };
        let ids: Vec<RsvpId> = listed.iter().map(|r| r.id).collect();
        assert_eq!(ids.first(), Some(&first.id));
        assert_eq!(ids.get(1), Some(&second.id));
    }
}
