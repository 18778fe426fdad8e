//! PostgreSQL implementation of the record store.
//!
//! Conditional primitives lean on the database: `confirm_rsvp` locks the
//! event row (`SELECT ... FOR UPDATE`) so capacity checks serialize per
//! event, and `record_check_in` runs a conditional `UPDATE ... WHERE
//! checked_in = FALSE` inside a transaction, so concurrent scanners
//! cannot both commit. The partial unique index created by
//! `migrations/0001_init.sql` enforces one active RSVP per
//! (event, attendee).

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use async_trait::async_trait;

use super::RecordStore;
use crate::domain::{
    Attendance, AttendanceId, Attendee, AttendeeId, CheckInMethod, Event, EventId, EventMetrics,
    EventStatus, Rsvp, RsvpId, RsvpStatus,
};
use crate::error::EngineError;

const EVENT_COLUMNS: &str = "id, title, capacity, status, total_rsvps, confirmed_rsvps, \
     waitlist_count, attendance_count, created_at, updated_at";

const RSVP_COLUMNS: &str = "id, event_id, attendee_id, status, registered_at, confirmed_at, \
     checked_in, checked_in_at, checked_in_by, checked_in_method";

const ATTENDANCE_COLUMNS: &str =
    "id, event_id, attendee_id, rsvp_id, checked_in_at, method, operator_id, note";

type EventRow = (
    Uuid,
    String,
    i32,
    String,
    i32,
    i32,
    i32,
    i32,
    DateTime<Utc>,
    DateTime<Utc>,
);

type RsvpRow = (
    Uuid,
    Uuid,
    Uuid,
    String,
    DateTime<Utc>,
    Option<DateTime<Utc>>,
    bool,
    Option<DateTime<Utc>>,
    Option<String>,
    Option<String>,
);

type AttendanceRow = (
    Uuid,
    Uuid,
    Uuid,
    Uuid,
    DateTime<Utc>,
    String,
    String,
    Option<String>,
);

/// PostgreSQL-backed record store using `sqlx::PgPool`.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Creates a new store with the given connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Applies the embedded migrations.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Store`] on migration failure.
    pub async fn run_migrations(&self) -> Result<(), EngineError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| EngineError::Store(e.to_string()))
    }
}

fn store_err(e: sqlx::Error) -> EngineError {
    EngineError::Store(e.to_string())
}

fn map_event(row: EventRow) -> Result<Event, EngineError> {
    let (id, title, capacity, status, total, confirmed, waitlist, attendance, created, updated) =
        row;
    let status = EventStatus::parse(&status)
        .ok_or_else(|| EngineError::Store(format!("corrupt event status: {status}")))?;
    Ok(Event {
        id: EventId::from_uuid(id),
        title,
        capacity: u32::try_from(capacity).unwrap_or(0),
        status,
        metrics: EventMetrics {
            total_rsvps: u32::try_from(total).unwrap_or(0),
            confirmed_rsvps: u32::try_from(confirmed).unwrap_or(0),
            waitlist_count: u32::try_from(waitlist).unwrap_or(0),
            attendance_count: u32::try_from(attendance).unwrap_or(0),
        },
        created_at: created,
        updated_at: updated,
    })
}

fn map_rsvp(row: RsvpRow) -> Result<Rsvp, EngineError> {
    let (
        id,
        event_id,
        attendee_id,
        status,
        registered_at,
        confirmed_at,
        checked_in,
        checked_in_at,
        checked_in_by,
        method,
    ) = row;
    let status = RsvpStatus::parse(&status)
        .ok_or_else(|| EngineError::Store(format!("corrupt rsvp status: {status}")))?;
    let checked_in_method = match method {
        Some(m) => Some(
            CheckInMethod::parse(&m)
                .ok_or_else(|| EngineError::Store(format!("corrupt check-in method: {m}")))?,
        ),
        None => None,
    };
    Ok(Rsvp {
        id: RsvpId::from_uuid(id),
        event_id: EventId::from_uuid(event_id),
        attendee_id: AttendeeId::from_uuid(attendee_id),
        status,
        registered_at,
        confirmed_at,
        checked_in,
        checked_in_at,
        checked_in_by,
        checked_in_method,
    })
}

fn map_attendance(row: AttendanceRow) -> Result<Attendance, EngineError> {
    let (id, event_id, attendee_id, rsvp_id, checked_in_at, method, operator_id, note) = row;
    let method = CheckInMethod::parse(&method)
        .ok_or_else(|| EngineError::Store(format!("corrupt check-in method: {method}")))?;
    Ok(Attendance {
        id: AttendanceId::from_uuid(id),
        event_id: EventId::from_uuid(event_id),
        attendee_id: AttendeeId::from_uuid(attendee_id),
        rsvp_id: RsvpId::from_uuid(rsvp_id),
        checked_in_at,
        method,
        operator_id,
        note,
    })
}

#[async_trait]
impl RecordStore for PgStore {
    async fn insert_event(&self, event: Event) -> Result<Event, EngineError> {
        sqlx::query(
            "INSERT INTO events (id, title, capacity, status, total_rsvps, confirmed_rsvps, \
             waitlist_count, attendance_count, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
        )
        .bind(event.id.as_uuid())
        .bind(&event.title)
        .bind(i32::try_from(event.capacity).unwrap_or(i32::MAX))
        .bind(event.status.as_str())
        .bind(i32::try_from(event.metrics.total_rsvps).unwrap_or(0))
        .bind(i32::try_from(event.metrics.confirmed_rsvps).unwrap_or(0))
        .bind(i32::try_from(event.metrics.waitlist_count).unwrap_or(0))
        .bind(i32::try_from(event.metrics.attendance_count).unwrap_or(0))
        .bind(event.created_at)
        .bind(event.updated_at)
        .execute(&self.pool)
        .await
        .map_err(store_err)?;
        Ok(event)
    }

    async fn get_event(&self, id: EventId) -> Result<Option<Event>, EngineError> {
        let row: Option<EventRow> =
            sqlx::query_as(&format!("SELECT {EVENT_COLUMNS} FROM events WHERE id = $1"))
                .bind(id.as_uuid())
                .fetch_optional(&self.pool)
                .await
                .map_err(store_err)?;
        row.map(map_event).transpose()
    }

    async fn list_events(&self) -> Result<Vec<Event>, EngineError> {
        let rows: Vec<EventRow> = sqlx::query_as(&format!(
            "SELECT {EVENT_COLUMNS} FROM events ORDER BY created_at ASC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(store_err)?;
        rows.into_iter().map(map_event).collect()
    }

    async fn update_event_status(
        &self,
        id: EventId,
        status: EventStatus,
    ) -> Result<Event, EngineError> {
        let row: Option<EventRow> = sqlx::query_as(&format!(
            "UPDATE events SET status = $2, updated_at = NOW() WHERE id = $1 \
             RETURNING {EVENT_COLUMNS}"
        ))
        .bind(id.as_uuid())
        .bind(status.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(store_err)?;
        row.map(map_event)
            .transpose()?
            .ok_or_else(|| EngineError::NotFound(format!("event {id}")))
    }

    async fn update_event_capacity(
        &self,
        id: EventId,
        capacity: u32,
    ) -> Result<Event, EngineError> {
        let mut tx = self.pool.begin().await.map_err(store_err)?;

        let existing: Option<(i32,)> =
            sqlx::query_as("SELECT capacity FROM events WHERE id = $1 FOR UPDATE")
                .bind(id.as_uuid())
                .fetch_optional(&mut *tx)
                .await
                .map_err(store_err)?;
        if existing.is_none() {
            return Err(EngineError::NotFound(format!("event {id}")));
        }

        // Never shrink below the confirmed count; confirmed RSVPs are
        // not demoted.
        let (confirmed,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM rsvps WHERE event_id = $1 AND status = 'confirmed'",
        )
        .bind(id.as_uuid())
        .fetch_one(&mut *tx)
        .await
        .map_err(store_err)?;
        if i64::from(capacity) < confirmed {
            return Err(EngineError::CapacityExceeded(id));
        }

        let row: EventRow = sqlx::query_as(&format!(
            "UPDATE events SET capacity = $2, updated_at = NOW() WHERE id = $1 \
             RETURNING {EVENT_COLUMNS}"
        ))
        .bind(id.as_uuid())
        .bind(i32::try_from(capacity).unwrap_or(i32::MAX))
        .fetch_one(&mut *tx)
        .await
        .map_err(store_err)?;

        tx.commit().await.map_err(store_err)?;
        map_event(row)
    }

    async fn update_event_metrics(
        &self,
        id: EventId,
        metrics: EventMetrics,
    ) -> Result<(), EngineError> {
        let result = sqlx::query(
            "UPDATE events SET total_rsvps = $2, confirmed_rsvps = $3, waitlist_count = $4, \
             attendance_count = $5, updated_at = NOW() WHERE id = $1",
        )
        .bind(id.as_uuid())
        .bind(i32::try_from(metrics.total_rsvps).unwrap_or(0))
        .bind(i32::try_from(metrics.confirmed_rsvps).unwrap_or(0))
        .bind(i32::try_from(metrics.waitlist_count).unwrap_or(0))
        .bind(i32::try_from(metrics.attendance_count).unwrap_or(0))
        .execute(&self.pool)
        .await
        .map_err(store_err)?;
        if result.rows_affected() == 0 {
            return Err(EngineError::NotFound(format!("event {id}")));
        }
        Ok(())
    }

    async fn insert_attendee(&self, attendee: Attendee) -> Result<Attendee, EngineError> {
        sqlx::query("INSERT INTO attendees (id, name, email, created_at) VALUES ($1, $2, $3, $4)")
            .bind(attendee.id.as_uuid())
            .bind(&attendee.name)
            .bind(&attendee.email)
            .bind(attendee.created_at)
            .execute(&self.pool)
            .await
            .map_err(store_err)?;
        Ok(attendee)
    }

    async fn get_attendee(&self, id: AttendeeId) -> Result<Option<Attendee>, EngineError> {
        let row: Option<(Uuid, String, String, DateTime<Utc>)> =
            sqlx::query_as("SELECT id, name, email, created_at FROM attendees WHERE id = $1")
                .bind(id.as_uuid())
                .fetch_optional(&self.pool)
                .await
                .map_err(store_err)?;
        Ok(row.map(|(id, name, email, created_at)| Attendee {
            id: AttendeeId::from_uuid(id),
            name,
            email,
            created_at,
        }))
    }

    async fn insert_rsvp(&self, rsvp: Rsvp) -> Result<Rsvp, EngineError> {
        sqlx::query(
            "INSERT INTO rsvps (id, event_id, attendee_id, status, registered_at, confirmed_at, \
             checked_in, checked_in_at, checked_in_by, checked_in_method) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
        )
        .bind(rsvp.id.as_uuid())
        .bind(rsvp.event_id.as_uuid())
        .bind(rsvp.attendee_id.as_uuid())
        .bind(rsvp.status.as_str())
        .bind(rsvp.registered_at)
        .bind(rsvp.confirmed_at)
        .bind(rsvp.checked_in)
        .bind(rsvp.checked_in_at)
        .bind(rsvp.checked_in_by.as_deref())
        .bind(rsvp.checked_in_method.map(|m| m.as_str()))
        .execute(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                EngineError::DuplicateRegistration {
                    event_id: rsvp.event_id,
                    attendee_id: rsvp.attendee_id,
                }
            }
            _ => store_err(e),
        })?;
        Ok(rsvp)
    }

    async fn get_rsvp(&self, id: RsvpId) -> Result<Option<Rsvp>, EngineError> {
        let row: Option<RsvpRow> =
            sqlx::query_as(&format!("SELECT {RSVP_COLUMNS} FROM rsvps WHERE id = $1"))
                .bind(id.as_uuid())
                .fetch_optional(&self.pool)
                .await
                .map_err(store_err)?;
        row.map(map_rsvp).transpose()
    }

    async fn list_rsvps_by_event(&self, event_id: EventId) -> Result<Vec<Rsvp>, EngineError> {
        let rows: Vec<RsvpRow> = sqlx::query_as(&format!(
            "SELECT {RSVP_COLUMNS} FROM rsvps WHERE event_id = $1 \
             ORDER BY registered_at ASC, id ASC"
        ))
        .bind(event_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(store_err)?;
        rows.into_iter().map(map_rsvp).collect()
    }

    async fn list_rsvps_by_attendee(
        &self,
        attendee_id: AttendeeId,
    ) -> Result<Vec<Rsvp>, EngineError> {
        let rows: Vec<RsvpRow> = sqlx::query_as(&format!(
            "SELECT {RSVP_COLUMNS} FROM rsvps WHERE attendee_id = $1 \
             ORDER BY registered_at ASC, id ASC"
        ))
        .bind(attendee_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(store_err)?;
        rows.into_iter().map(map_rsvp).collect()
    }

    async fn confirm_rsvp(&self, id: RsvpId) -> Result<Rsvp, EngineError> {
        let mut tx = self.pool.begin().await.map_err(store_err)?;

        let row: Option<RsvpRow> = sqlx::query_as(&format!(
            "SELECT {RSVP_COLUMNS} FROM rsvps WHERE id = $1 FOR UPDATE"
        ))
        .bind(id.as_uuid())
        .fetch_optional(&mut *tx)
        .await
        .map_err(store_err)?;
        let rsvp = row
            .map(map_rsvp)
            .transpose()?
            .ok_or_else(|| EngineError::NotFound(format!("rsvp {id}")))?;
        if rsvp.status != RsvpStatus::Waitlisted {
            return Err(EngineError::InvalidTransition(format!(
                "cannot confirm a {} rsvp",
                rsvp.status.as_str()
            )));
        }

        // Lock the event row so concurrent confirms for the same event
        // serialize their capacity checks.
        let capacity: Option<(i32,)> =
            sqlx::query_as("SELECT capacity FROM events WHERE id = $1 FOR UPDATE")
                .bind(rsvp.event_id.as_uuid())
                .fetch_optional(&mut *tx)
                .await
                .map_err(store_err)?;
        let Some((capacity,)) = capacity else {
            return Err(EngineError::NotFound(format!("event {}", rsvp.event_id)));
        };

        let (confirmed,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM rsvps WHERE event_id = $1 AND status = 'confirmed'",
        )
        .bind(rsvp.event_id.as_uuid())
        .fetch_one(&mut *tx)
        .await
        .map_err(store_err)?;
        if confirmed >= i64::from(capacity) {
            return Err(EngineError::CapacityExceeded(rsvp.event_id));
        }

        let updated: RsvpRow = sqlx::query_as(&format!(
            "UPDATE rsvps SET status = 'confirmed', confirmed_at = NOW() WHERE id = $1 \
             RETURNING {RSVP_COLUMNS}"
        ))
        .bind(id.as_uuid())
        .fetch_one(&mut *tx)
        .await
        .map_err(store_err)?;

        tx.commit().await.map_err(store_err)?;
        map_rsvp(updated)
    }

    async fn cancel_rsvp(&self, id: RsvpId) -> Result<(Rsvp, RsvpStatus), EngineError> {
        let mut tx = self.pool.begin().await.map_err(store_err)?;

        let row: Option<RsvpRow> = sqlx::query_as(&format!(
            "SELECT {RSVP_COLUMNS} FROM rsvps WHERE id = $1 FOR UPDATE"
        ))
        .bind(id.as_uuid())
        .fetch_optional(&mut *tx)
        .await
        .map_err(store_err)?;
        let rsvp = row
            .map(map_rsvp)
            .transpose()?
            .ok_or_else(|| EngineError::NotFound(format!("rsvp {id}")))?;
        if rsvp.status == RsvpStatus::Cancelled {
            return Err(EngineError::InvalidTransition(
                "rsvp is already cancelled".to_string(),
            ));
        }
        let prior = rsvp.status;

        let updated: RsvpRow = sqlx::query_as(&format!(
            "UPDATE rsvps SET status = 'cancelled' WHERE id = $1 RETURNING {RSVP_COLUMNS}"
        ))
        .bind(id.as_uuid())
        .fetch_one(&mut *tx)
        .await
        .map_err(store_err)?;

        tx.commit().await.map_err(store_err)?;
        Ok((map_rsvp(updated)?, prior))
    }

    async fn record_check_in(&self, attendance: Attendance) -> Result<Attendance, EngineError> {
        let mut tx = self.pool.begin().await.map_err(store_err)?;

        // The conditional update decides the race: only one concurrent
        // scanner observes rows_affected == 1.
        let result = sqlx::query(
            "UPDATE rsvps SET checked_in = TRUE, checked_in_at = $2, checked_in_by = $3, \
             checked_in_method = $4 \
             WHERE id = $1 AND status = 'confirmed' AND checked_in = FALSE",
        )
        .bind(attendance.rsvp_id.as_uuid())
        .bind(attendance.checked_in_at)
        .bind(&attendance.operator_id)
        .bind(attendance.method.as_str())
        .execute(&mut *tx)
        .await
        .map_err(store_err)?;

        if result.rows_affected() == 0 {
            let row: Option<(String, bool)> =
                sqlx::query_as("SELECT status, checked_in FROM rsvps WHERE id = $1")
                    .bind(attendance.rsvp_id.as_uuid())
                    .fetch_optional(&mut *tx)
                    .await
                    .map_err(store_err)?;
            return Err(match row {
                None => EngineError::UnknownTicket(attendance.rsvp_id),
                Some((_, true)) => EngineError::DuplicateCheckIn(attendance.rsvp_id),
                Some((_, false)) => EngineError::NotConfirmed(attendance.rsvp_id),
            });
        }

        sqlx::query(
            "INSERT INTO attendance (id, event_id, attendee_id, rsvp_id, checked_in_at, method, \
             operator_id, note) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(attendance.id.as_uuid())
        .bind(attendance.event_id.as_uuid())
        .bind(attendance.attendee_id.as_uuid())
        .bind(attendance.rsvp_id.as_uuid())
        .bind(attendance.checked_in_at)
        .bind(attendance.method.as_str())
        .bind(&attendance.operator_id)
        .bind(attendance.note.as_deref())
        .execute(&mut *tx)
        .await
        .map_err(store_err)?;

        tx.commit().await.map_err(store_err)?;
        Ok(attendance)
    }

    async fn list_attendance_by_event(
        &self,
        event_id: EventId,
    ) -> Result<Vec<Attendance>, EngineError> {
        let rows: Vec<AttendanceRow> = sqlx::query_as(&format!(
            "SELECT {ATTENDANCE_COLUMNS} FROM attendance WHERE event_id = $1 \
             ORDER BY checked_in_at ASC"
        ))
        .bind(event_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(store_err)?;
        rows.into_iter().map(map_attendance).collect()
    }
}
