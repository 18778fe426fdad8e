//! System endpoints: health check and scan rejection catalog.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde::Serialize;
use utoipa::ToSchema;

use crate::app_state::AppState;

/// Health check response.
#[derive(Debug, Serialize, ToSchema)]
struct HealthResponse {
    status: String,
    timestamp: String,
    version: String,
}

/// `GET /health` — Service health status.
#[utoipa::path(
    get,
    path = "/health",
    tag = "System",
    summary = "Health check",
    description = "Returns service health status, version, and current timestamp.",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
    )
)]
pub async fn health_handler() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "healthy".to_string(),
            timestamp: Utc::now().to_rfc3339(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }),
    )
}

/// One scan rejection reason a door UI can expect.
#[derive(Debug, Serialize, ToSchema)]
struct ScanReasonInfo {
    reason: &'static str,
    description: &'static str,
}

/// `GET /config/scan-reasons` — Catalog of scan rejection reasons.
#[utoipa::path(
    get,
    path = "/config/scan-reasons",
    tag = "System",
    summary = "List scan rejection reasons",
    description = "Returns every rejection reason the scan pipeline can produce, for door UIs that map reasons to messages.",
    responses(
        (status = 200, description = "Rejection reason catalog", body = Vec<ScanReasonInfo>),
    )
)]
pub async fn scan_reasons_handler() -> impl IntoResponse {
    let reasons = vec![
        ScanReasonInfo {
            reason: "malformed_ticket",
            description: "The scanned string does not decode to a ticket payload",
        },
        ScanReasonInfo {
            reason: "expired_ticket",
            description: "The ticket is older than the maximum age, or post-dated",
        },
        ScanReasonInfo {
            reason: "wrong_event",
            description: "The ticket was issued for a different event",
        },
        ScanReasonInfo {
            reason: "unknown_ticket",
            description: "No registration matches the ticket's references",
        },
        ScanReasonInfo {
            reason: "not_confirmed",
            description: "The registration behind the ticket is not confirmed",
        },
        ScanReasonInfo {
            reason: "duplicate_check_in",
            description: "The ticket was already used to check in",
        },
        ScanReasonInfo {
            reason: "unknown_attendee",
            description: "The attendee on the ticket has no record",
        },
    ];
    (StatusCode::OK, Json(reasons))
}

/// System routes mounted at the root level (not under /api/v1).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_handler))
        .route("/config/scan-reasons", get(scan_reasons_handler))
}
