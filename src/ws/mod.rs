//! WebSocket layer: connection handling, message routing, subscriptions.
//!
//! The WebSocket endpoint at `/ws` provides the live feed for door
//! dashboards (per-event subscriptions) and lets check-in stations
//! submit scans over the same connection.

pub mod connection;
pub mod handler;
pub mod messages;
pub mod subscription;
