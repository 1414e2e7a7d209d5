//! Event request and response DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::PaginationMeta;
use crate::domain::{Event, EventId, EventPatch, EventStatus, NewEvent, UserId};

/// Request body for `POST /events`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateEventRequest {
    /// Event title.
    pub title: String,
    /// Optional description.
    #[serde(default)]
    pub description: Option<String>,
    /// Start of the time block (ISO-8601).
    pub start_time: DateTime<Utc>,
    /// End of the time block (ISO-8601); must be after `start_time`.
    pub end_time: DateTime<Utc>,
}

impl From<CreateEventRequest> for NewEvent {
    fn from(req: CreateEventRequest) -> Self {
        Self {
            title: req.title,
            description: req.description.unwrap_or_default(),
            start_time: req.start_time,
            end_time: req.end_time,
        }
    }
}

/// Request body for `PUT /events/{id}`. Absent fields are left unchanged.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateEventRequest {
    /// New title.
    #[serde(default)]
    pub title: Option<String>,
    /// New description.
    #[serde(default)]
    pub description: Option<String>,
    /// New start time.
    #[serde(default)]
    pub start_time: Option<DateTime<Utc>>,
    /// New end time.
    #[serde(default)]
    pub end_time: Option<DateTime<Utc>>,
}

impl From<UpdateEventRequest> for EventPatch {
    fn from(req: UpdateEventRequest) -> Self {
        Self {
            title: req.title,
            description: req.description,
            start_time: req.start_time,
            end_time: req.end_time,
        }
    }
}

/// Request body for `PATCH /events/{id}/status`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateStatusRequest {
    /// Target status: `BUSY` or `SWAPPABLE`.
    pub status: EventStatus,
}

/// Event as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EventDto {
    /// Event identifier.
    pub id: EventId,
    /// Event title.
    pub title: String,
    /// Event description.
    pub description: String,
    /// Start of the time block.
    pub start_time: DateTime<Utc>,
    /// End of the time block.
    pub end_time: DateTime<Utc>,
    /// Lifecycle status.
    pub status: EventStatus,
    /// Current owner.
    pub owner_id: UserId,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

impl From<Event> for EventDto {
    fn from(e: Event) -> Self {
        Self {
            id: e.id,
            title: e.title,
            description: e.description,
            start_time: e.start_time,
            end_time: e.end_time,
            status: e.status,
            owner_id: e.owner_id,
            created_at: e.created_at,
            updated_at: e.updated_at,
        }
    }
}

/// Paginated response for `GET /swaps/swappable-slots`.
#[derive(Debug, Serialize, ToSchema)]
pub struct SlotListResponse {
    /// Slots on the current page.
    pub data: Vec<EventDto>,
    /// Pagination metadata.
    pub pagination: PaginationMeta,
}
