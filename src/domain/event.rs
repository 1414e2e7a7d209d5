//! Calendar events and their lifecycle status.
//!
//! An [`Event`] is a block of time owned by exactly one user. Its
//! [`EventStatus`] drives the swap workflow:
//!
//! ```text
//! BUSY <──user──> SWAPPABLE ──request──> SWAP_PENDING ──accept──> BUSY
//!                     ^                       │
//!                     └───────reject──────────┘
//! ```

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{EventId, UserId};
use crate::error::SwapError;

/// Lifecycle status of a calendar event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventStatus {
    /// Default idle state; the slot is not on the marketplace.
    Busy,
    /// Offered on the marketplace; may be requested or used as an offer.
    Swappable,
    /// Party to exactly one pending swap request.
    SwapPending,
}

impl EventStatus {
    /// Returns the wire / database representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Busy => "BUSY",
            Self::Swappable => "SWAPPABLE",
            Self::SwapPending => "SWAP_PENDING",
        }
    }

    /// Returns `true` if an owner may set this status directly.
    ///
    /// `SWAP_PENDING` is only ever entered through a swap request.
    #[must_use]
    pub const fn is_user_settable(&self) -> bool {
        matches!(self, Self::Busy | Self::Swappable)
    }
}

impl fmt::Display for EventStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventStatus {
    type Err = SwapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "BUSY" => Ok(Self::Busy),
            "SWAPPABLE" => Ok(Self::Swappable),
            "SWAP_PENDING" => Ok(Self::SwapPending),
            other => Err(SwapError::InvalidRequest(format!(
                "unknown event status: {other}"
            ))),
        }
    }
}

/// Validated input for creating an event.
#[derive(Debug, Clone)]
pub struct NewEvent {
    /// Event title (trimmed, non-empty).
    pub title: String,
    /// Free-form description, empty when absent.
    pub description: String,
    /// Start of the time block.
    pub start_time: DateTime<Utc>,
    /// End of the time block; strictly after `start_time`.
    pub end_time: DateTime<Utc>,
}

/// Partial update of an event's descriptive fields.
#[derive(Debug, Clone, Default)]
pub struct EventPatch {
    /// New title, if changing.
    pub title: Option<String>,
    /// New description, if changing.
    pub description: Option<String>,
    /// New start time, if changing.
    pub start_time: Option<DateTime<Utc>>,
    /// New end time, if changing.
    pub end_time: Option<DateTime<Utc>>,
}

/// A calendar event owned by a single user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
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
    /// Current lifecycle status.
    pub status: EventStatus,
    /// Current owner. Reassigned only by an accepted swap.
    pub owner_id: UserId,
    /// Optimistic-concurrency version; `0` until first persisted.
    pub version: i64,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Event {
    /// Builds a new unsaved `BUSY` event for `owner_id`.
    ///
    /// # Errors
    ///
    /// Returns [`SwapError::InvalidRequest`] if the title is blank or the
    /// end time is not after the start time.
    pub fn new(owner_id: UserId, input: NewEvent) -> Result<Self, SwapError> {
        let title = normalize_title(&input.title)?;
        validate_window(input.start_time, input.end_time)?;
        let now = Utc::now();
        Ok(Self {
            id: EventId::new(),
            title,
            description: input.description.trim().to_string(),
            start_time: input.start_time,
            end_time: input.end_time,
            status: EventStatus::Busy,
            owner_id,
            version: 0,
            created_at: now,
            updated_at: now,
        })
    }

    /// Returns `true` if `user` currently owns this event.
    #[must_use]
    pub fn is_owned_by(&self, user: UserId) -> bool {
        self.owner_id == user
    }

    /// Applies a partial update.
    ///
    /// # Errors
    ///
    /// Returns [`SwapError::InvalidState`] while the event is part of a
    /// pending swap, or [`SwapError::InvalidRequest`] if the result would
    /// violate the title or time-window rules.
    pub fn apply_patch(&mut self, patch: EventPatch) -> Result<(), SwapError> {
        self.ensure_not_pending("edit")?;
        let title = match patch.title {
            Some(t) => normalize_title(&t)?,
            None => self.title.clone(),
        };
        let start = patch.start_time.unwrap_or(self.start_time);
        let end = patch.end_time.unwrap_or(self.end_time);
        validate_window(start, end)?;

        self.title = title;
        if let Some(description) = patch.description {
            self.description = description.trim().to_string();
        }
        self.start_time = start;
        self.end_time = end;
        Ok(())
    }

    /// Sets a user-settable status (`BUSY` or `SWAPPABLE`).
    ///
    /// # Errors
    ///
    /// Returns [`SwapError::InvalidRequest`] for `SWAP_PENDING` and
    /// [`SwapError::InvalidState`] while the event is part of a pending swap.
    pub fn set_status(&mut self, status: EventStatus) -> Result<(), SwapError> {
        if !status.is_user_settable() {
            return Err(SwapError::InvalidRequest(format!(
                "status {status} cannot be set directly"
            )));
        }
        self.ensure_not_pending("change the status of")?;
        self.status = status;
        Ok(())
    }

    /// Moves a `SWAPPABLE` event into `SWAP_PENDING`.
    ///
    /// # Errors
    ///
    /// Returns [`SwapError::InvalidState`] if the event is not `SWAPPABLE`.
    pub fn mark_pending(&mut self) -> Result<(), SwapError> {
        if self.status != EventStatus::Swappable {
            return Err(SwapError::InvalidState(format!(
                "event {} is {}, expected SWAPPABLE",
                self.id, self.status
            )));
        }
        self.status = EventStatus::SwapPending;
        Ok(())
    }

    /// Resolves a `SWAP_PENDING` event to `status`.
    ///
    /// # Errors
    ///
    /// Returns [`SwapError::InvalidState`] if the event is not `SWAP_PENDING`.
    pub fn settle(&mut self, status: EventStatus) -> Result<(), SwapError> {
        if self.status != EventStatus::SwapPending {
            return Err(SwapError::InvalidState(format!(
                "event {} is {}, expected SWAP_PENDING",
                self.id, self.status
            )));
        }
        self.status = status;
        Ok(())
    }

    /// Guards owner-driven mutations of an event.
    ///
    /// # Errors
    ///
    /// Returns [`SwapError::InvalidState`] if the event is `SWAP_PENDING`.
    pub fn ensure_not_pending(&self, action: &str) -> Result<(), SwapError> {
        if self.status == EventStatus::SwapPending {
            return Err(SwapError::InvalidState(format!(
                "cannot {action} event {} while a swap is pending",
                self.id
            )));
        }
        Ok(())
    }
}

fn normalize_title(raw: &str) -> Result<String, SwapError> {
    let title = raw.trim();
    if title.is_empty() {
        return Err(SwapError::InvalidRequest("title must not be empty".to_string()));
    }
    Ok(title.to_string())
}

fn validate_window(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<(), SwapError> {
    if end <= start {
        return Err(SwapError::InvalidRequest(
            "end time must be after start time".to_string(),
        ));
    }
    Ok(())
}
