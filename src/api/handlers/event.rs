//! Event handlers: create, list, get, publish, capacity changes.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, patch, post};
use axum::{Json, Router};

use crate::api::dto::{
    CreateEventRequest, EventListResponse, EventResponse, PaginationParams, UpdateCapacityRequest,
    paginate,
};
use crate::app_state::AppState;
use crate::domain::{Event, EventId, EventStatus};
use crate::error::{EngineError, ErrorResponse};

/// `POST /events` — Create a new event in draft status.
///
/// # Errors
///
/// Returns [`EngineError::InvalidRequest`] on an empty title or zero
/// capacity.
#[utoipa::path(
    post,
    path = "/api/v1/events",
    tag = "Events",
    summary = "Create an event",
    description = "Creates a draft event with the given title and capacity. Publish it before taking registrations.",
    request_body = CreateEventRequest,
    responses(
        (status = 201, description = "Event created", body = EventResponse),
        (status = 400, description = "Invalid title or capacity", body = ErrorResponse),
    )
)]
pub async fn create_event(
    State(state): State<AppState>,
    Json(req): Json<CreateEventRequest>,
) -> Result<impl IntoResponse, EngineError> {
    if req.title.trim().is_empty() {
        return Err(EngineError::InvalidRequest(
            "title must not be empty".to_string(),
        ));
    }
    if req.capacity == 0 {
        return Err(EngineError::InvalidRequest(
            "capacity must be positive".to_string(),
        ));
    }

    let event = state
        .store
        .insert_event(Event::new(req.title, req.capacity))
        .await?;
    tracing::info!(event_id = %event.id, capacity = event.capacity, "event created");

    Ok((StatusCode::CREATED, Json(EventResponse::from(event))))
}

/// `GET /events` — List all events with pagination.
///
/// # Errors
///
/// Returns [`EngineError::Store`] on store failure.
#[utoipa::path(
    get,
    path = "/api/v1/events",
    tag = "Events",
    summary = "List events",
    description = "Returns a paginated list of all events, oldest first.",
    params(PaginationParams),
    responses(
        (status = 200, description = "Paginated event list", body = EventListResponse),
    )
)]
pub async fn list_events(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> Result<impl IntoResponse, EngineError> {
    let params = params.clamped();
    let events = state.store.list_events().await?;
    let (page, pagination) = paginate(events, &params);

    Ok(Json(EventListResponse {
        data: page.into_iter().map(EventResponse::from).collect(),
        pagination,
    }))
}

/// `GET /events/:id` — Get one event with its metrics snapshot.
///
/// # Errors
///
/// Returns [`EngineError::NotFound`] if the event does not exist.
#[utoipa::path(
    get,
    path = "/api/v1/events/{id}",
    tag = "Events",
    summary = "Get event details",
    description = "Returns the event including its derived metrics (RSVP counts and attendance).",
    params(
        ("id" = uuid::Uuid, Path, description = "Event UUID"),
    ),
    responses(
        (status = 200, description = "Event details", body = EventResponse),
        (status = 404, description = "Event not found", body = ErrorResponse),
    )
)]
pub async fn get_event(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, EngineError> {
    let event_id = EventId::from_uuid(id);
    let event = state
        .store
        .get_event(event_id)
        .await?
        .ok_or_else(|| EngineError::NotFound(format!("event {event_id}")))?;
    Ok(Json(EventResponse::from(event)))
}

/// `POST /events/:id/publish` — Open an event for registration.
///
/// # Errors
///
/// Returns [`EngineError::NotFound`] if the event does not exist.
#[utoipa::path(
    post,
    path = "/api/v1/events/{id}/publish",
    tag = "Events",
    summary = "Publish an event",
    description = "Moves the event to published status so attendees can register.",
    params(
        ("id" = uuid::Uuid, Path, description = "Event UUID"),
    ),
    responses(
        (status = 200, description = "Event published", body = EventResponse),
        (status = 404, description = "Event not found", body = ErrorResponse),
    )
)]
pub async fn publish_event(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, EngineError> {
    let event_id = EventId::from_uuid(id);
    let event = state
        .store
        .update_event_status(event_id, EventStatus::Published)
        .await?;
    tracing::info!(%event_id, "event published");
    Ok(Json(EventResponse::from(event)))
}

/// `PATCH /events/:id/capacity` — Change an event's capacity.
///
/// Raising the capacity promotes waitlisted RSVPs into the new slots in
/// registration order. Lowering it below the current confirmed count is
/// rejected: confirmed RSVPs are never demoted.
///
/// # Errors
///
/// Returns [`EngineError::InvalidRequest`] on zero capacity,
/// [`EngineError::NotFound`] if the event does not exist, or
/// [`EngineError::CapacityExceeded`] when the new capacity is below the
/// confirmed count.
#[utoipa::path(
    patch,
    path = "/api/v1/events/{id}/capacity",
    tag = "Events",
    summary = "Change event capacity",
    description = "Sets a new capacity. Newly freed slots are filled from the waitlist in FIFO order; shrinking below the confirmed count is rejected.",
    params(
        ("id" = uuid::Uuid, Path, description = "Event UUID"),
    ),
    request_body = UpdateCapacityRequest,
    responses(
        (status = 200, description = "Capacity updated", body = EventResponse),
        (status = 400, description = "Invalid capacity", body = ErrorResponse),
        (status = 404, description = "Event not found", body = ErrorResponse),
        (status = 409, description = "New capacity below confirmed count", body = ErrorResponse),
    )
)]
pub async fn update_capacity(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
    Json(req): Json<UpdateCapacityRequest>,
) -> Result<impl IntoResponse, EngineError> {
    if req.capacity == 0 {
        return Err(EngineError::InvalidRequest(
            "capacity must be positive".to_string(),
        ));
    }

    let event_id = EventId::from_uuid(id);
    state
        .store
        .update_event_capacity(event_id, req.capacity)
        .await?;
    tracing::info!(%event_id, capacity = req.capacity, "event capacity changed");

    let promoted = state.promoter.promote_until_full(event_id).await?;
    if !promoted.is_empty() {
        tracing::info!(%event_id, count = promoted.len(), "waitlist drained into new capacity");
    }

    // Re-read after promotion so the response carries fresh metrics.
    let event = state
        .store
        .get_event(event_id)
        .await?
        .ok_or_else(|| EngineError::NotFound(format!("event {event_id}")))?;
    Ok(Json(EventResponse::from(event)))
}

/// Event management routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/events", post(create_event).get(list_events))
        .route("/events/{id}", get(get_event))
        .route("/events/{id}/publish", post(publish_event))
        .route("/events/{id}/capacity", patch(update_capacity))
}
