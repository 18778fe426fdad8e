//! # gatecheck
//!
//! RSVP lifecycle and QR check-in engine for event management, fronted
//! by a REST and WebSocket gateway.
//!
//! The engine turns a registration into a scannable ticket, validates
//! that ticket at the event entrance, and guarantees that every attendee
//! is checked in at most once while the capacity and waitlist-ordering
//! invariants hold, even with multiple scanners operating concurrently.
//!
//! ## Architecture
//!
//! ```text
//! Clients (HTTP, WebSocket)
//!     │
//!     ├── REST Handlers (api/)
//!     ├── WS Handler (ws/)
//!     │
//!     ├── RsvpLedger / WaitlistPromoter (service/)
//!     ├── TicketIssuer / TicketValidator / AttendanceRecorder (service/)
//!     ├── MetricsAggregator (service/)
//!     ├── EventBus (domain/)
//!     │
//!     └── RecordStore (store/): in-memory or PostgreSQL
//! ```

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod service;
pub mod store;
pub mod ws;
