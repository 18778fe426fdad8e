//! RSVP handlers: register, confirm, cancel, and read projections.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::api::dto::{
    PaginationParams, RegisterRequest, RsvpListResponse, RsvpResponse, paginate,
};
use crate::app_state::AppState;
use crate::domain::{AttendeeId, EventId, RsvpId};
use crate::error::{EngineError, ErrorResponse};

/// `POST /events/:id/rsvps` — Register an attendee for an event.
///
/// # Errors
///
/// Returns [`EngineError`] when the event is missing or not published,
/// the attendee is missing, or the pair already holds an active RSVP.
#[utoipa::path(
    post,
    path = "/api/v1/events/{id}/rsvps",
    tag = "RSVPs",
    summary = "Register for an event",
    description = "Creates a waitlisted RSVP for the attendee. Confirmation happens separately, through organizer approval or waitlist promotion.",
    params(
        ("id" = uuid::Uuid, Path, description = "Event UUID"),
    ),
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "RSVP created (waitlisted)", body = RsvpResponse),
        (status = 404, description = "Event or attendee not found", body = ErrorResponse),
        (status = 409, description = "Pair already has an active RSVP", body = ErrorResponse),
        (status = 422, description = "Event not open for registration", body = ErrorResponse),
    )
)]
pub async fn register(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, EngineError> {
    let rsvp = state
        .ledger
        .register(EventId::from_uuid(id), req.attendee_id)
        .await?;
    Ok((StatusCode::CREATED, Json(RsvpResponse::from(rsvp))))
}

/// `POST /rsvps/:id/confirm` — Approve a waitlisted RSVP.
///
/// # Errors
///
/// Returns [`EngineError`] when the RSVP is missing, not waitlisted, or
/// the event is at capacity.
#[utoipa::path(
    post,
    path = "/api/v1/rsvps/{id}/confirm",
    tag = "RSVPs",
    summary = "Confirm an RSVP",
    description = "Moves a waitlisted RSVP to confirmed, taking one capacity slot. Rejected when the event is full.",
    params(
        ("id" = uuid::Uuid, Path, description = "RSVP UUID"),
    ),
    responses(
        (status = 200, description = "RSVP confirmed", body = RsvpResponse),
        (status = 404, description = "RSVP not found", body = ErrorResponse),
        (status = 409, description = "Not waitlisted, or event at capacity", body = ErrorResponse),
    )
)]
pub async fn confirm(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, EngineError> {
    let rsvp = state.ledger.confirm(RsvpId::from_uuid(id)).await?;
    Ok(Json(RsvpResponse::from(rsvp)))
}

/// `POST /rsvps/:id/cancel` — Cancel an RSVP.
///
/// # Errors
///
/// Returns [`EngineError`] when the RSVP is missing or already
/// cancelled.
#[utoipa::path(
    post,
    path = "/api/v1/rsvps/{id}/cancel",
    tag = "RSVPs",
    summary = "Cancel an RSVP",
    description = "Cancels a live RSVP. When a confirmed slot is freed, the earliest waitlisted RSVP is promoted automatically.",
    params(
        ("id" = uuid::Uuid, Path, description = "RSVP UUID"),
    ),
    responses(
        (status = 200, description = "RSVP cancelled", body = RsvpResponse),
        (status = 404, description = "RSVP not found", body = ErrorResponse),
        (status = 409, description = "RSVP already cancelled", body = ErrorResponse),
    )
)]
pub async fn cancel(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, EngineError> {
    let rsvp = state.ledger.cancel(RsvpId::from_uuid(id)).await?;
    Ok(Json(RsvpResponse::from(rsvp)))
}

/// `GET /rsvps/:id` — Get one RSVP.
///
/// # Errors
///
/// Returns [`EngineError::NotFound`] if the RSVP does not exist.
#[utoipa::path(
    get,
    path = "/api/v1/rsvps/{id}",
    tag = "RSVPs",
    summary = "Get RSVP details",
    params(
        ("id" = uuid::Uuid, Path, description = "RSVP UUID"),
    ),
    responses(
        (status = 200, description = "RSVP details", body = RsvpResponse),
        (status = 404, description = "RSVP not found", body = ErrorResponse),
    )
)]
pub async fn get_rsvp(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, EngineError> {
    let rsvp = state.ledger.get(RsvpId::from_uuid(id)).await?;
    Ok(Json(RsvpResponse::from(rsvp)))
}

/// `GET /events/:id/rsvps` — List an event's RSVPs in registration order.
///
/// # Errors
///
/// Returns [`EngineError::Store`] on store failure.
#[utoipa::path(
    get,
    path = "/api/v1/events/{id}/rsvps",
    tag = "RSVPs",
    summary = "List RSVPs for an event",
    params(
        ("id" = uuid::Uuid, Path, description = "Event UUID"),
        PaginationParams,
    ),
    responses(
        (status = 200, description = "Paginated RSVP list", body = RsvpListResponse),
    )
)]
pub async fn list_by_event(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
    Query(params): Query<PaginationParams>,
) -> Result<impl IntoResponse, EngineError> {
    let params = params.clamped();
    let rsvps = state.ledger.list_by_event(EventId::from_uuid(id)).await?;
    let (page, pagination) = paginate(rsvps, &params);
    Ok(Json(RsvpListResponse {
        data: page.into_iter().map(RsvpResponse::from).collect(),
        pagination,
    }))
}

/// `GET /attendees/:id/rsvps` — List an attendee's RSVPs.
///
/// # Errors
///
/// Returns [`EngineError::Store`] on store failure.
#[utoipa::path(
    get,
    path = "/api/v1/attendees/{id}/rsvps",
    tag = "RSVPs",
    summary = "List RSVPs for an attendee",
    params(
        ("id" = uuid::Uuid, Path, description = "Attendee UUID"),
        PaginationParams,
    ),
    responses(
        (status = 200, description = "Paginated RSVP list", body = RsvpListResponse),
    )
)]
pub async fn list_by_attendee(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
    Query(params): Query<PaginationParams>,
) -> Result<impl IntoResponse, EngineError> {
    let params = params.clamped();
    let rsvps = state
        .ledger
        .list_by_attendee(AttendeeId::from_uuid(id))
        .await?;
    let (page, pagination) = paginate(rsvps, &params);
    Ok(Json(RsvpListResponse {
        data: page.into_iter().map(RsvpResponse::from).collect(),
        pagination,
    }))
}

/// RSVP routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/events/{id}/rsvps", post(register).get(list_by_event))
        .route("/rsvps/{id}", get(get_rsvp))
        .route("/rsvps/{id}/confirm", post(confirm))
        .route("/rsvps/{id}/cancel", post(cancel))
        .route("/attendees/{id}/rsvps", get(list_by_attendee))
}
