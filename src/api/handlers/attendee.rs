//! Attendee handlers: create and get.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::api::dto::{AttendeeResponse, CreateAttendeeRequest};
use crate::app_state::AppState;
use crate::domain::{Attendee, AttendeeId};
use crate::error::EngineError;

/// `POST /attendees` — Create an attendee record.
async fn create_attendee(
    State(state): State<AppState>,
    Json(req): Json<CreateAttendeeRequest>,
) -> Result<impl IntoResponse, EngineError> {
    if req.name.trim().is_empty() {
        return Err(EngineError::InvalidRequest(
            "name must not be empty".to_string(),
        ));
    }
    if !req.email.contains('@') {
        return Err(EngineError::InvalidRequest(format!(
            "invalid email: {}",
            req.email
        )));
    }

    let attendee = state
        .store
        .insert_attendee(Attendee::new(req.name, req.email))
        .await?;
    Ok((StatusCode::CREATED, Json(AttendeeResponse::from(attendee))))
}

/// `GET /attendees/:id` — Get an attendee record.
async fn get_attendee(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, EngineError> {
    let attendee_id = AttendeeId::from_uuid(id);
    let attendee = state
        .store
        .get_attendee(attendee_id)
        .await?
        .ok_or_else(|| EngineError::NotFound(format!("attendee {attendee_id}")))?;
    Ok(Json(AttendeeResponse::from(attendee)))
}

/// Attendee routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/attendees", post(create_attendee))
        .route("/attendees/{id}", get(get_attendee))
}
