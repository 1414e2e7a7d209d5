//! Notifications emitted after every committed swap transition.
//!
//! Each [`SwapNotification`] is published on the [`super::EventBus`] and
//! forwarded to the WebSocket connections of the two users involved.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{EventId, SwapRequest, SwapRequestId, UserId};

/// Domain notification describing a swap state change.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum SwapNotification {
    /// A new pending request was created.
    SwapRequested {
        /// Request identifier.
        request_id: SwapRequestId,
        /// User who proposed the swap.
        requester_id: UserId,
        /// User asked to respond.
        requestee_id: UserId,
        /// Slot offered by the requester.
        requester_slot_id: EventId,
        /// Slot the requester wants.
        requested_slot_id: EventId,
        /// Commit timestamp.
        timestamp: DateTime<Utc>,
    },

    /// The requestee accepted; slot owners were exchanged.
    SwapAccepted {
        /// Request identifier.
        request_id: SwapRequestId,
        /// User who proposed the swap.
        requester_id: UserId,
        /// User who accepted.
        requestee_id: UserId,
        /// Slot now owned by the requestee.
        requester_slot_id: EventId,
        /// Slot now owned by the requester.
        requested_slot_id: EventId,
        /// Commit timestamp.
        timestamp: DateTime<Utc>,
    },

    /// The requestee rejected; both slots are swappable again.
    SwapRejected {
        /// Request identifier.
        request_id: SwapRequestId,
        /// User who proposed the swap.
        requester_id: UserId,
        /// User who rejected.
        requestee_id: UserId,
        /// Commit timestamp.
        timestamp: DateTime<Utc>,
    },
}

impl SwapNotification {
    /// Notification for a freshly created request.
    #[must_use]
    pub fn requested(req: &SwapRequest) -> Self {
        Self::SwapRequested {
            request_id: req.id,
            requester_id: req.requester_id,
            requestee_id: req.requestee_id,
            requester_slot_id: req.requester_slot_id,
            requested_slot_id: req.requested_slot_id,
            timestamp: Utc::now(),
        }
    }

    /// Notification for a resolved request.
    #[must_use]
    pub fn resolved(req: &SwapRequest, accepted: bool) -> Self {
        if accepted {
            Self::SwapAccepted {
                request_id: req.id,
                requester_id: req.requester_id,
                requestee_id: req.requestee_id,
                requester_slot_id: req.requester_slot_id,
                requested_slot_id: req.requested_slot_id,
                timestamp: Utc::now(),
            }
        } else {
            Self::SwapRejected {
                request_id: req.id,
                requester_id: req.requester_id,
                requestee_id: req.requestee_id,
                timestamp: Utc::now(),
            }
        }
    }

    /// Returns the request this notification is about.
    #[must_use]
    pub fn request_id(&self) -> SwapRequestId {
        match self {
            Self::SwapRequested { request_id, .. }
            | Self::SwapAccepted { request_id, .. }
            | Self::SwapRejected { request_id, .. } => *request_id,
        }
    }

    /// Returns `true` if `user` is the requester or requestee.
    #[must_use]
    pub fn involves(&self, user: UserId) -> bool {
        match self {
            Self::SwapRequested {
                requester_id,
                requestee_id,
                ..
            }
            | Self::SwapAccepted {
                requester_id,
                requestee_id,
                ..
            }
            | Self::SwapRejected {
                requester_id,
                requestee_id,
                ..
            } => *requester_id == user || *requestee_id == user,
        }
    }

    /// Returns the notification type as a static string slice.
    #[must_use]
    pub const fn event_type_str(&self) -> &'static str {
        match self {
            Self::SwapRequested { .. } => "swap_requested",
            Self::SwapAccepted { .. } => "swap_accepted",
            Self::SwapRejected { .. } => "swap_rejected",
        }
    }
}
