//! Swap marketplace handlers: browse slots, request and respond to swaps.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::api::auth::CurrentUser;
use crate::api::dto::{
    CreateSwapRequest, EventDto, PaginationParams, RespondSwapRequest, SlotListResponse,
    SwapDecisionResponse, SwapRequestDto,
};
use crate::app_state::AppState;
use crate::domain::SwapRequestId;
use crate::error::{ErrorResponse, SwapError};

/// `GET /swaps/swappable-slots`: Browse the marketplace.
///
/// # Errors
///
/// Returns [`SwapError`] on missing identity or store failure.
#[utoipa::path(
    get,
    path = "/api/v1/swaps/swappable-slots",
    tag = "Swaps",
    summary = "List swappable slots",
    description = "Returns SWAPPABLE events owned by other users, ordered by start time.",
    params(PaginationParams),
    responses(
        (status = 200, description = "Paginated slots", body = SlotListResponse),
        (status = 401, description = "Missing identity", body = ErrorResponse),
    )
)]
pub async fn swappable_slots(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(params): Query<PaginationParams>,
) -> Result<impl IntoResponse, SwapError> {
    let slots = state.event_service.swappable_slots(user).await?;
    let (page, pagination) = params.paginate(slots);
    Ok(Json(SlotListResponse {
        data: page.into_iter().map(EventDto::from).collect(),
        pagination,
    }))
}

/// `POST /swaps/requests`: Propose a swap.
///
/// # Errors
///
/// Returns [`SwapError::EventNotFound`] or [`SwapError::InvalidState`] when
/// the slots cannot be swapped.
#[utoipa::path(
    post,
    path = "/api/v1/swaps/requests",
    tag = "Swaps",
    summary = "Request a swap",
    description = "Offers one of the caller's SWAPPABLE slots for another user's SWAPPABLE slot. Both become SWAP_PENDING.",
    request_body = CreateSwapRequest,
    responses(
        (status = 201, description = "Swap requested", body = SwapRequestDto),
        (status = 404, description = "Slot not found", body = ErrorResponse),
        (status = 409, description = "Slot not swappable or concurrent update", body = ErrorResponse),
    )
)]
pub async fn request_swap(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(req): Json<CreateSwapRequest>,
) -> Result<impl IntoResponse, SwapError> {
    let request = state
        .swap_coordinator
        .request_swap(req.my_slot_id, req.their_slot_id, user)
        .await?;
    Ok((StatusCode::CREATED, Json(SwapRequestDto::from(request))))
}

/// `GET /swaps/requests/{id}`: Fetch a request the caller is party to.
///
/// # Errors
///
/// Returns [`SwapError::SwapRequestNotFound`] if absent or not visible.
#[utoipa::path(
    get,
    path = "/api/v1/swaps/requests/{id}",
    tag = "Swaps",
    summary = "Get a swap request",
    params(
        ("id" = uuid::Uuid, Path, description = "Swap request UUID"),
    ),
    responses(
        (status = 200, description = "Swap request", body = SwapRequestDto),
        (status = 404, description = "Request not found", body = ErrorResponse),
    )
)]
pub async fn get_request(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, SwapError> {
    let request = state
        .swap_coordinator
        .get_request(SwapRequestId::from_uuid(id), user)
        .await?;
    Ok(Json(SwapRequestDto::from(request)))
}

/// `POST /swaps/requests/{id}/response`: Accept or reject.
///
/// # Errors
///
/// Returns [`SwapError::SwapRequestNotFound`] if the request is not a
/// pending request addressed to the caller.
#[utoipa::path(
    post,
    path = "/api/v1/swaps/requests/{id}/response",
    tag = "Swaps",
    summary = "Respond to a swap request",
    description = "Accepting exchanges slot owners and marks both BUSY; rejecting returns both slots to SWAPPABLE.",
    params(
        ("id" = uuid::Uuid, Path, description = "Swap request UUID"),
    ),
    request_body = RespondSwapRequest,
    responses(
        (status = 200, description = "Request resolved", body = SwapDecisionResponse),
        (status = 404, description = "Request not found", body = ErrorResponse),
        (status = 409, description = "Concurrent update", body = ErrorResponse),
    )
)]
pub async fn respond_to_swap(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<uuid::Uuid>,
    Json(req): Json<RespondSwapRequest>,
) -> Result<impl IntoResponse, SwapError> {
    let request = state
        .swap_coordinator
        .respond_to_swap(SwapRequestId::from_uuid(id), user, req.accept)
        .await?;
    let message = if req.accept {
        "Swap accepted"
    } else {
        "Swap rejected"
    };
    Ok(Json(SwapDecisionResponse {
        message: message.to_string(),
        request: SwapRequestDto::from(request),
    }))
}

/// `GET /swaps/incoming`: Pending requests awaiting the caller.
///
/// # Errors
///
/// Returns [`SwapError`] on missing identity or store failure.
#[utoipa::path(
    get,
    path = "/api/v1/swaps/incoming",
    tag = "Swaps",
    summary = "Incoming swap requests",
    responses(
        (status = 200, description = "Pending requests, newest first", body = Vec<SwapRequestDto>),
        (status = 401, description = "Missing identity", body = ErrorResponse),
    )
)]
pub async fn incoming_requests(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<impl IntoResponse, SwapError> {
    let requests = state.swap_coordinator.incoming_requests(user).await?;
    Ok(Json(
        requests
            .into_iter()
            .map(SwapRequestDto::from)
            .collect::<Vec<_>>(),
    ))
}

/// `GET /swaps/outgoing`: Requests the caller has made.
///
/// # Errors
///
/// Returns [`SwapError`] on missing identity or store failure.
#[utoipa::path(
    get,
    path = "/api/v1/swaps/outgoing",
    tag = "Swaps",
    summary = "Outgoing swap requests",
    responses(
        (status = 200, description = "All requests created by the caller, newest first", body = Vec<SwapRequestDto>),
        (status = 401, description = "Missing identity", body = ErrorResponse),
    )
)]
pub async fn outgoing_requests(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<impl IntoResponse, SwapError> {
    let requests = state.swap_coordinator.outgoing_requests(user).await?;
    Ok(Json(
        requests
            .into_iter()
            .map(SwapRequestDto::from)
            .collect::<Vec<_>>(),
    ))
}

/// Swap routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/swaps/swappable-slots", get(swappable_slots))
        .route("/swaps/requests", post(request_swap))
        .route("/swaps/requests/{id}", get(get_request))
        .route("/swaps/requests/{id}/response", post(respond_to_swap))
        .route("/swaps/incoming", get(incoming_requests))
        .route("/swaps/outgoing", get(outgoing_requests))
}
