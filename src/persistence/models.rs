//! Database row models for the `events` and `swap_requests` tables.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{Event, EventId, SwapRequest, SwapRequestId, UserId};
use crate::error::SwapError;

/// A row from the `events` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct EventRow {
    /// Primary key.
    pub id: Uuid,
    /// Event title.
    pub title: String,
    /// Event description.
    pub description: String,
    /// Start of the time block.
    pub start_time: DateTime<Utc>,
    /// End of the time block.
    pub end_time: DateTime<Utc>,
    /// Status string (`BUSY`, `SWAPPABLE`, `SWAP_PENDING`).
    pub status: String,
    /// Current owner.
    pub owner_id: Uuid,
    /// Optimistic-concurrency version.
    pub version: i64,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<EventRow> for Event {
    type Error = SwapError;

    fn try_from(row: EventRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: EventId::from_uuid(row.id),
            title: row.title,
            description: row.description,
            start_time: row.start_time,
            end_time: row.end_time,
            status: row
                .status
                .parse()
                .map_err(|e: SwapError| SwapError::Persistence(e.to_string()))?,
            owner_id: UserId::from_uuid(row.owner_id),
            version: row.version,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// A row from the `swap_requests` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SwapRequestRow {
    /// Primary key.
    pub id: Uuid,
    /// Slot offered by the requester.
    pub requester_slot_id: Uuid,
    /// Slot the requester wants.
    pub requested_slot_id: Uuid,
    /// User who created the request.
    pub requester_id: Uuid,
    /// User asked to respond.
    pub requestee_id: Uuid,
    /// Status string (`PENDING`, `ACCEPTED`, `REJECTED`).
    pub status: String,
    /// Optimistic-concurrency version.
    pub version: i64,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<SwapRequestRow> for SwapRequest {
    type Error = SwapError;

    fn try_from(row: SwapRequestRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: SwapRequestId::from_uuid(row.id),
            requester_slot_id: EventId::from_uuid(row.requester_slot_id),
            requested_slot_id: EventId::from_uuid(row.requested_slot_id),
            requester_id: UserId::from_uuid(row.requester_id),
            requestee_id: UserId::from_uuid(row.requestee_id),
            status: row
                .status
                .parse()
                .map_err(|e: SwapError| SwapError::Persistence(e.to_string()))?,
            version: row.version,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}
