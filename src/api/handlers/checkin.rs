//! Check-in handlers: ticket issuance, scan validation, manual
//! check-in, and the attendance log.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::api::dto::{
    AttendanceResponse, IssueTicketResponse, ManualCheckInRequest, ScanRequest,
};
use crate::app_state::AppState;
use crate::domain::{CheckInMethod, EventId, RsvpId};
use crate::error::{EngineError, ErrorResponse};

/// `POST /rsvps/:id/ticket` — Issue a ticket for a confirmed RSVP.
///
/// # Errors
///
/// Returns [`EngineError`] when the RSVP is missing or not confirmed.
#[utoipa::path(
    post,
    path = "/api/v1/rsvps/{id}/ticket",
    tag = "Check-in",
    summary = "Issue a ticket",
    description = "Builds the ticket payload for a confirmed RSVP and returns its JSON wire form, ready to render as a QR code.",
    params(
        ("id" = uuid::Uuid, Path, description = "RSVP UUID"),
    ),
    responses(
        (status = 201, description = "Ticket issued", body = IssueTicketResponse),
        (status = 404, description = "RSVP not found", body = ErrorResponse),
        (status = 422, description = "RSVP not confirmed", body = ErrorResponse),
    )
)]
pub async fn issue_ticket(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, EngineError> {
    let rsvp_id = RsvpId::from_uuid(id);
    // Resolve the RSVP's own references; the issuer re-checks that they
    // line up.
    let rsvp = state.ledger.get(rsvp_id).await?;
    let ticket = state
        .issuer
        .issue(rsvp.event_id, rsvp.attendee_id, rsvp_id)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(IssueTicketResponse {
            rsvp_id,
            event_id: ticket.payload.event_id,
            encoded: ticket.encoded,
            issued_at_ms: ticket.payload.issued_at_ms,
        }),
    ))
}

/// `POST /events/:id/scans` — Validate a scanned ticket and check in.
///
/// # Errors
///
/// Returns one of the scan rejections; each carries a distinct code so
/// the door UI can show a specific message. A rejection never prevents
/// the next scan from being processed.
#[utoipa::path(
    post,
    path = "/api/v1/events/{id}/scans",
    tag = "Check-in",
    summary = "Scan a ticket",
    description = "Runs the raw decoded string through the validation pipeline and, on success, commits the check-in. Re-scans of an already checked-in ticket return a duplicate rejection and never create a second attendance record.",
    params(
        ("id" = uuid::Uuid, Path, description = "Event UUID the scanner operates at"),
    ),
    request_body = ScanRequest,
    responses(
        (status = 201, description = "Checked in", body = AttendanceResponse),
        (status = 400, description = "Malformed ticket", body = ErrorResponse),
        (status = 404, description = "Unknown ticket or attendee", body = ErrorResponse),
        (status = 409, description = "Wrong event, not confirmed, or already checked in", body = ErrorResponse),
        (status = 410, description = "Expired ticket", body = ErrorResponse),
    )
)]
pub async fn scan_ticket(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
    Json(req): Json<ScanRequest>,
) -> Result<impl IntoResponse, EngineError> {
    let attendance = state
        .validator
        .validate(&req.raw, EventId::from_uuid(id), &req.operator_id, req.note)
        .await?;
    Ok((StatusCode::CREATED, Json(AttendanceResponse::from(attendance))))
}

/// `POST /events/:id/check-ins` — Check in without a ticket.
///
/// # Errors
///
/// Returns [`EngineError`] when the RSVP is missing, belongs to another
/// event, is not confirmed, or is already checked in.
#[utoipa::path(
    post,
    path = "/api/v1/events/{id}/check-ins",
    tag = "Check-in",
    summary = "Manual check-in",
    description = "Checks in a confirmed RSVP by id, for attendees without a scannable ticket. Same at-most-once guarantee as a scan.",
    params(
        ("id" = uuid::Uuid, Path, description = "Event UUID"),
    ),
    request_body = ManualCheckInRequest,
    responses(
        (status = 201, description = "Checked in", body = AttendanceResponse),
        (status = 404, description = "RSVP not found", body = ErrorResponse),
        (status = 409, description = "Not confirmed or already checked in", body = ErrorResponse),
    )
)]
pub async fn manual_check_in(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
    Json(req): Json<ManualCheckInRequest>,
) -> Result<impl IntoResponse, EngineError> {
    let event_id = EventId::from_uuid(id);
    let rsvp = state.ledger.get(req.rsvp_id).await?;
    if rsvp.event_id != event_id {
        return Err(EngineError::NotEligible(format!(
            "rsvp {} belongs to another event",
            req.rsvp_id
        )));
    }

    let attendance = state
        .recorder
        .record(
            event_id,
            rsvp.attendee_id,
            rsvp.id,
            CheckInMethod::Manual,
            req.operator_id,
            req.note,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(AttendanceResponse::from(attendance))))
}

/// `GET /events/:id/attendance` — The event's attendance log.
///
/// # Errors
///
/// Returns [`EngineError::Store`] on store failure.
#[utoipa::path(
    get,
    path = "/api/v1/events/{id}/attendance",
    tag = "Check-in",
    summary = "List attendance",
    description = "Returns the append-only attendance log for the event, oldest check-in first.",
    params(
        ("id" = uuid::Uuid, Path, description = "Event UUID"),
    ),
    responses(
        (status = 200, description = "Attendance records", body = Vec<AttendanceResponse>),
    )
)]
pub async fn list_attendance(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, EngineError> {
    let records = state
        .store
        .list_attendance_by_event(EventId::from_uuid(id))
        .await?;
    let response: Vec<AttendanceResponse> =
        records.into_iter().map(AttendanceResponse::from).collect();
    Ok(Json(response))
}

/// Check-in routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/rsvps/{id}/ticket", post(issue_ticket))
        .route("/events/{id}/scans", post(scan_ticket))
        .route("/events/{id}/check-ins", post(manual_check_in))
        .route("/events/{id}/attendance", get(list_attendance))
}
