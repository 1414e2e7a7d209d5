//! Swap request DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{EventId, SwapRequest, SwapRequestId, SwapStatus, UserId};

/// Request body for `POST /swaps/requests`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateSwapRequest {
    /// Slot the caller offers; must be owned by the caller.
    pub my_slot_id: EventId,
    /// Slot the caller wants.
    pub their_slot_id: EventId,
}

/// Request body for `POST /swaps/requests/{id}/response`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct RespondSwapRequest {
    /// `true` to accept, `false` to reject.
    pub accept: bool,
}

/// Swap request as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SwapRequestDto {
    /// Request identifier.
    pub id: SwapRequestId,
    /// Slot offered by the requester.
    pub requester_slot_id: EventId,
    /// Slot the requester wants.
    pub requested_slot_id: EventId,
    /// User who created the request.
    pub requester_id: UserId,
    /// User asked to respond.
    pub requestee_id: UserId,
    /// Current status.
    pub status: SwapStatus,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

impl From<SwapRequest> for SwapRequestDto {
    fn from(r: SwapRequest) -> Self {
        Self {
            id: r.id,
            requester_slot_id: r.requester_slot_id,
            requested_slot_id: r.requested_slot_id,
            requester_id: r.requester_id,
            requestee_id: r.requestee_id,
            status: r.status,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

/// Response body for `POST /swaps/requests/{id}/response`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SwapDecisionResponse {
    /// Human-readable outcome (`"Swap accepted"` / `"Swap rejected"`).
    pub message: String,
    /// The resolved request.
    pub request: SwapRequestDto,
}
