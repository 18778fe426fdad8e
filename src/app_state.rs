//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::domain::EventBus;
use crate::service::{
    AttendanceRecorder, MetricsAggregator, RsvpLedger, TicketIssuer, TicketValidator,
    WaitlistPromoter,
};
use crate::store::RecordStore;

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Record store, used directly by the plain event/attendee CRUD
    /// handlers.
    pub store: Arc<dyn RecordStore>,
    /// RSVP lifecycle operations.
    pub ledger: Arc<RsvpLedger>,
    /// Waitlist promotion after capacity changes.
    pub promoter: Arc<WaitlistPromoter>,
    /// Ticket issuance for confirmed RSVPs.
    pub issuer: Arc<TicketIssuer>,
    /// Scan validation and check-in commit.
    pub validator: Arc<TicketValidator>,
    /// Manual check-in path.
    pub recorder: Arc<AttendanceRecorder>,
    /// Metrics recomputation for event mutations done outside the
    /// ledger.
    pub metrics: Arc<MetricsAggregator>,
    /// Event bus for WebSocket subscriptions.
    pub event_bus: EventBus,
}
