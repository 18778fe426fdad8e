//! Event entity with capacity, lifecycle status, and a metrics snapshot.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::EventId;

/// Lifecycle status of an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum EventStatus {
    /// Being set up; not yet accepting registrations.
    Draft,
    /// Open for registration and check-in.
    Published,
    /// Called off; registrations are frozen.
    Cancelled,
    /// Over; registrations are frozen.
    Completed,
}

impl EventStatus {
    /// Returns the status as the text stored in the database column.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Published => "published",
            Self::Cancelled => "cancelled",
            Self::Completed => "completed",
        }
    }

    /// Parses a database column value back into a status.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "draft" => Some(Self::Draft),
            "published" => Some(Self::Published),
            "cancelled" => Some(Self::Cancelled),
            "completed" => Some(Self::Completed),
            _ => None,
        }
    }
}

/// Derived counters for an event, recomputed after every ledger mutation.
///
/// `confirmed_rsvps <= capacity` holds at all times; the confirm path
/// enforces it with a conditional write, and recomputation merely
/// re-derives the counts from the source-of-truth RSVP and attendance
/// sets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct EventMetrics {
    /// Every RSVP ever taken for the event, regardless of status.
    pub total_rsvps: u32,
    /// RSVPs currently in `confirmed` status.
    pub confirmed_rsvps: u32,
    /// RSVPs currently in `waitlisted` status.
    pub waitlist_count: u32,
    /// Attendance records (successful check-ins).
    pub attendance_count: u32,
}

/// An event with a hard capacity and derived metrics.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Event {
    /// Unique event identifier (immutable after creation).
    pub id: EventId,
    /// Human-readable title.
    pub title: String,
    /// Maximum number of confirmed RSVPs. Always positive.
    pub capacity: u32,
    /// Lifecycle status.
    pub status: EventStatus,
    /// Metrics snapshot maintained by the metrics aggregator.
    pub metrics: EventMetrics,
    /// Creation timestamp (immutable after creation).
    pub created_at: DateTime<Utc>,
    /// Timestamp of the last mutation.
    pub updated_at: DateTime<Utc>,
}

impl Event {
    /// Creates a new draft event with the given title and capacity.
    #[must_use]
    pub fn new(title: String, capacity: u32) -> Self {
        let now = Utc::now();
        Self {
            id: EventId::new(),
            title,
            capacity,
            status: EventStatus::Draft,
            metrics: EventMetrics::default(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Returns `true` if the event currently accepts registrations.
    #[must_use]
    pub fn is_open_for_registration(&self) -> bool {
        self.status == EventStatus::Published
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn new_event_starts_draft() {
        let event = Event::new("RustConf".to_string(), 300);
        assert_eq!(event.status, EventStatus::Draft);
        assert_eq!(event.metrics, EventMetrics::default());
        assert!(!event.is_open_for_registration());
    }

    #[test]
    fn published_event_is_open() {
        let mut event = Event::new("RustConf".to_string(), 300);
        event.status = EventStatus::Published;
        assert!(event.is_open_for_registration());
    }

    #[test]
    fn status_text_round_trip() {
        for status in [
            EventStatus::Draft,
            EventStatus::Published,
            EventStatus::Cancelled,
            EventStatus::Completed,
        ] {
            assert_eq!(EventStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(EventStatus::parse("archived"), None);
    }
}
