//! Persistence layer: transactional stores for events and swap requests.
//!
//! [`SwapStore`] is the seam between the services and the database. All
//! swap transitions run inside a [`StoreTransaction`] obtained from
//! [`SwapStore::begin`]; dropping a transaction without calling
//! [`StoreTransaction::commit`] rolls it back.
//!
//! Both implementations use optimistic concurrency: every row carries a
//! `version`, and saving a row whose version no longer matches the stored
//! one fails with [`SwapError::Conflict`].
//!
//! - [`MemoryStore`]: in-process maps, used for tests and
//!   `PERSISTENCE_ENABLED=false`.
//! - [`PostgresStore`]: `sqlx::PgPool` backed.

pub mod memory;
pub mod models;
pub mod postgres;

use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{Event, EventId, SwapRequest, SwapRequestId, UserId};
use crate::error::SwapError;

pub use memory::MemoryStore;
pub use postgres::PostgresStore;

/// A unit of atomicity over events and swap requests.
///
/// Reads see the transaction's own writes. Saves of a row with
/// `version == 0` insert; any other version is a conditional update that
/// fails with [`SwapError::Conflict`] when the stored version differs.
#[async_trait]
pub trait StoreTransaction: Send + fmt::Debug {
    /// Loads an event by id.
    async fn load_event(&mut self, id: EventId) -> Result<Option<Event>, SwapError>;

    /// Inserts or conditionally updates an event, returning the stored copy
    /// with its new version.
    async fn save_event(&mut self, event: &Event) -> Result<Event, SwapError>;

    /// Deletes an event if its version still matches. Swap requests that
    /// reference it are kept.
    async fn delete_event(&mut self, event: &Event) -> Result<(), SwapError>;

    /// Loads a swap request by id.
    async fn load_swap_request(&mut self, id: SwapRequestId)
    -> Result<Option<SwapRequest>, SwapError>;

    /// Inserts or conditionally updates a swap request, returning the
    /// stored copy with its new version.
    async fn save_swap_request(&mut self, request: &SwapRequest)
    -> Result<SwapRequest, SwapError>;

    /// Returns `true` if a `PENDING` request references `event_id` as
    /// either slot.
    async fn has_pending_request(&mut self, event_id: EventId) -> Result<bool, SwapError>;

    /// Commits all writes atomically.
    async fn commit(&mut self) -> Result<(), SwapError>;
}

/// Event and swap request storage with transactional writes.
///
/// Query methods run outside any transaction and see committed state only.
#[async_trait]
pub trait SwapStore: Send + Sync + fmt::Debug {
    /// Opens a new transaction.
    async fn begin(&self) -> Result<Box<dyn StoreTransaction>, SwapError>;

    /// Events owned by `owner`, ordered by start time.
    async fn events_by_owner(&self, owner: UserId) -> Result<Vec<Event>, SwapError>;

    /// `SWAPPABLE` events not owned by `viewer`, ordered by start time.
    async fn swappable_events(&self, viewer: UserId) -> Result<Vec<Event>, SwapError>;

    /// Events owned by `owner` starting in `(after, until]`, ordered by
    /// start time.
    async fn events_starting_between(
        &self,
        owner: UserId,
        after: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<Vec<Event>, SwapError>;

    /// Looks up a swap request by id.
    async fn swap_request(&self, id: SwapRequestId) -> Result<Option<SwapRequest>, SwapError>;

    /// `PENDING` requests addressed to `requestee`, newest first.
    async fn incoming_requests(&self, requestee: UserId) -> Result<Vec<SwapRequest>, SwapError>;

    /// All requests created by `requester`, newest first.
    async fn outgoing_requests(&self, requester: UserId) -> Result<Vec<SwapRequest>, SwapError>;
}
