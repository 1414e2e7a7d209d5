//! Event handlers: the caller's own calendar.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, patch, put};
use axum::{Json, Router};
use chrono::Utc;

use crate::api::auth::CurrentUser;
use crate::api::dto::{CreateEventRequest, EventDto, UpdateEventRequest, UpdateStatusRequest};
use crate::app_state::AppState;
use crate::domain::EventId;
use crate::error::{ErrorResponse, SwapError};

/// `GET /events`: List the caller's events.
///
/// # Errors
///
/// Returns [`SwapError`] on missing identity or store failure.
#[utoipa::path(
    get,
    path = "/api/v1/events",
    tag = "Events",
    summary = "List my events",
    description = "Returns the caller's events ordered by start time.",
    responses(
        (status = 200, description = "Caller's events", body = Vec<EventDto>),
        (status = 401, description = "Missing identity", body = ErrorResponse),
    )
)]
pub async fn list_events(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<impl IntoResponse, SwapError> {
    let events = state.event_service.list_events(user).await?;
    Ok(Json(events.into_iter().map(EventDto::from).collect::<Vec<_>>()))
}

/// `POST /events`: Create an event.
///
/// # Errors
///
/// Returns [`SwapError::InvalidRequest`] on a blank title or bad time window.
#[utoipa::path(
    post,
    path = "/api/v1/events",
    tag = "Events",
    summary = "Create an event",
    description = "Creates a BUSY event owned by the caller.",
    request_body = CreateEventRequest,
    responses(
        (status = 201, description = "Event created", body = EventDto),
        (status = 400, description = "Invalid event", body = ErrorResponse),
        (status = 401, description = "Missing identity", body = ErrorResponse),
    )
)]
pub async fn create_event(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(req): Json<CreateEventRequest>,
) -> Result<impl IntoResponse, SwapError> {
    let event = state.event_service.create_event(user, req.into()).await?;
    Ok((StatusCode::CREATED, Json(EventDto::from(event))))
}

/// `GET /events/upcoming`: Events starting soon.
///
/// # Errors
///
/// Returns [`SwapError`] on missing identity or store failure.
#[utoipa::path(
    get,
    path = "/api/v1/events/upcoming",
    tag = "Events",
    summary = "Upcoming events",
    description = "Returns the caller's events starting within the reminder window.",
    responses(
        (status = 200, description = "Upcoming events", body = Vec<EventDto>),
        (status = 401, description = "Missing identity", body = ErrorResponse),
    )
)]
pub async fn upcoming_events(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<impl IntoResponse, SwapError> {
    let events = state.event_service.upcoming_events(user, Utc::now()).await?;
    Ok(Json(events.into_iter().map(EventDto::from).collect::<Vec<_>>()))
}

/// `PUT /events/{id}`: Update an event.
///
/// # Errors
///
/// Returns [`SwapError`] if the event is missing, pending, or invalid.
#[utoipa::path(
    put,
    path = "/api/v1/events/{id}",
    tag = "Events",
    summary = "Update an event",
    description = "Partially updates title, description or time window. Refused while a swap is pending.",
    params(
        ("id" = uuid::Uuid, Path, description = "Event UUID"),
    ),
    request_body = UpdateEventRequest,
    responses(
        (status = 200, description = "Event updated", body = EventDto),
        (status = 400, description = "Invalid update", body = ErrorResponse),
        (status = 404, description = "Event not found", body = ErrorResponse),
        (status = 409, description = "Swap pending", body = ErrorResponse),
    )
)]
pub async fn update_event(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<uuid::Uuid>,
    Json(req): Json<UpdateEventRequest>,
) -> Result<impl IntoResponse, SwapError> {
    let event = state
        .event_service
        .update_event(EventId::from_uuid(id), user, req.into())
        .await?;
    Ok(Json(EventDto::from(event)))
}

/// `PATCH /events/{id}/status`: Toggle BUSY / SWAPPABLE.
///
/// # Errors
///
/// Returns [`SwapError`] if the event is missing or pending, or the
/// status is not user-settable.
#[utoipa::path(
    patch,
    path = "/api/v1/events/{id}/status",
    tag = "Events",
    summary = "Set event status",
    description = "Marks an event BUSY or SWAPPABLE. SWAP_PENDING is reserved for the swap workflow.",
    params(
        ("id" = uuid::Uuid, Path, description = "Event UUID"),
    ),
    request_body = UpdateStatusRequest,
    responses(
        (status = 200, description = "Status changed", body = EventDto),
        (status = 400, description = "Status not settable", body = ErrorResponse),
        (status = 404, description = "Event not found", body = ErrorResponse),
        (status = 409, description = "Swap pending", body = ErrorResponse),
    )
)]
pub async fn update_status(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<uuid::Uuid>,
    Json(req): Json<UpdateStatusRequest>,
) -> Result<impl IntoResponse, SwapError> {
    let event = state
        .event_service
        .set_status(EventId::from_uuid(id), user, req.status)
        .await?;
    Ok(Json(EventDto::from(event)))
}

/// `DELETE /events/{id}`: Delete an event.
///
/// # Errors
///
/// Returns [`SwapError`] if the event is missing or pending.
#[utoipa::path(
    delete,
    path = "/api/v1/events/{id}",
    tag = "Events",
    summary = "Delete an event",
    description = "Deletes one of the caller's events. Refused while a swap is pending.",
    params(
        ("id" = uuid::Uuid, Path, description = "Event UUID"),
    ),
    responses(
        (status = 204, description = "Event deleted"),
        (status = 404, description = "Event not found", body = ErrorResponse),
        (status = 409, description = "Swap pending", body = ErrorResponse),
    )
)]
pub async fn delete_event(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, SwapError> {
    state
        .event_service
        .delete_event(EventId::from_uuid(id), user)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Event routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/events", get(list_events).post(create_event))
        .route("/events/upcoming", get(upcoming_events))
        .route("/events/{id}", put(update_event).delete(delete_event))
        .route("/events/{id}/status", patch(update_status))
}
