//! Swap requests: one-to-one trade proposals between two events.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{Event, EventId, SwapRequestId, UserId};
use crate::error::SwapError;

/// Status of a swap request. `ACCEPTED` and `REJECTED` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SwapStatus {
    /// Awaiting a response from the requestee.
    Pending,
    /// Owners were exchanged.
    Accepted,
    /// Both slots returned to the marketplace.
    Rejected,
}

impl SwapStatus {
    /// Returns the wire / database representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Accepted => "ACCEPTED",
            Self::Rejected => "REJECTED",
        }
    }
}

impl fmt::Display for SwapStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SwapStatus {
    type Err = SwapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(Self::Pending),
            "ACCEPTED" => Ok(Self::Accepted),
            "REJECTED" => Ok(Self::Rejected),
            other => Err(SwapError::InvalidRequest(format!(
                "unknown swap status: {other}"
            ))),
        }
    }
}

/// A proposal to exchange `requester_slot_id` for `requested_slot_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapRequest {
    /// Request identifier.
    pub id: SwapRequestId,
    /// Slot offered by the requester.
    pub requester_slot_id: EventId,
    /// Slot the requester wants.
    pub requested_slot_id: EventId,
    /// User who created the request.
    pub requester_id: UserId,
    /// Owner of the requested slot at creation time.
    pub requestee_id: UserId,
    /// Current status.
    pub status: SwapStatus,
    /// Optimistic-concurrency version; `0` until first persisted.
    pub version: i64,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

impl SwapRequest {
    /// Builds a new unsaved `PENDING` request offering `offered` for `wanted`.
    #[must_use]
    pub fn pending(offered: &Event, wanted: &Event, requester_id: UserId) -> Self {
        let now = Utc::now();
        Self {
            id: SwapRequestId::new(),
            requester_slot_id: offered.id,
            requested_slot_id: wanted.id,
            requester_id,
            requestee_id: wanted.owner_id,
            status: SwapStatus::Pending,
            version: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Returns `true` if `event_id` is one of the two slots in this request.
    #[must_use]
    pub fn references(&self, event_id: EventId) -> bool {
        self.requester_slot_id == event_id || self.requested_slot_id == event_id
    }

    /// Returns `true` if `user` is the requester or the requestee.
    #[must_use]
    pub fn involves(&self, user: UserId) -> bool {
        self.requester_id == user || self.requestee_id == user
    }

    /// Moves the request to its terminal status.
    ///
    /// # Errors
    ///
    /// Returns [`SwapError::InvalidState`] if the request is already
    /// resolved.
    pub fn resolve(&mut self, accept: bool) -> Result<(), SwapError> {
        if self.status != SwapStatus::Pending {
            return Err(SwapError::InvalidState(format!(
                "swap request {} is already {}",
                self.id, self.status
            )));
        }
        self.status = if accept {
            SwapStatus::Accepted
        } else {
            SwapStatus::Rejected
        };
        Ok(())
    }
}
