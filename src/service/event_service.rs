//! Event service: owner-driven lifecycle of calendar events.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::domain::{Event, EventId, EventPatch, EventStatus, NewEvent, UserId};
use crate::error::SwapError;
use crate::persistence::{StoreTransaction, SwapStore};
use crate::service::RetryPolicy;

/// CRUD and marketplace queries for calendar events.
///
/// Owners may edit, delete and toggle `BUSY`/`SWAPPABLE` on their own
/// events, but never while the event is `SWAP_PENDING`; that status is
/// owned by the [`super::SwapCoordinator`].
#[derive(Debug, Clone)]
pub struct EventService {
    store: Arc<dyn SwapStore>,
    retry: RetryPolicy,
    upcoming_window: chrono::Duration,
}

impl EventService {
    /// Creates a new `EventService`.
    #[must_use]
    pub fn new(
        store: Arc<dyn SwapStore>,
        retry: RetryPolicy,
        upcoming_window: chrono::Duration,
    ) -> Self {
        Self {
            store,
            retry,
            upcoming_window,
        }
    }

    /// Creates a `BUSY` event owned by `owner`.
    ///
    /// # Errors
    ///
    /// Returns [`SwapError::InvalidRequest`] on a blank title or an end
    /// time not after the start time.
    pub async fn create_event(&self, owner: UserId, input: NewEvent) -> Result<Event, SwapError> {
        let event = Event::new(owner, input)?;
        let mut tx = self.store.begin().await?;
        let event = tx.save_event(&event).await?;
        tx.commit().await?;
        tracing::info!(event_id = %event.id, %owner, "event created");
        Ok(event)
    }

    /// Events owned by `owner`, ordered by start time.
    ///
    /// # Errors
    ///
    /// Returns a [`SwapError::Persistence`] on store failure.
    pub async fn list_events(&self, owner: UserId) -> Result<Vec<Event>, SwapError> {
        self.store.events_by_owner(owner).await
    }

    /// Applies a partial update to an owned event.
    ///
    /// # Errors
    ///
    /// - [`SwapError::EventNotFound`] if missing or not owned by `owner`.
    /// - [`SwapError::InvalidState`] while the event is `SWAP_PENDING`.
    /// - [`SwapError::InvalidRequest`] if the update breaks validation.
    pub async fn update_event(
        &self,
        id: EventId,
        owner: UserId,
        patch: EventPatch,
    ) -> Result<Event, SwapError> {
        let event = self
            .retry
            .run("update_event", || {
                let patch = patch.clone();
                self.mutate_owned(id, owner, move |event| event.apply_patch(patch))
            })
            .await?;
        tracing::info!(event_id = %id, %owner, "event updated");
        Ok(event)
    }

    /// Sets an owned event to `BUSY` or `SWAPPABLE`.
    ///
    /// # Errors
    ///
    /// - [`SwapError::EventNotFound`] if missing or not owned by `owner`.
    /// - [`SwapError::InvalidRequest`] when asked for `SWAP_PENDING`.
    /// - [`SwapError::InvalidState`] while the event is `SWAP_PENDING`.
    pub async fn set_status(
        &self,
        id: EventId,
        owner: UserId,
        status: EventStatus,
    ) -> Result<Event, SwapError> {
        if !status.is_user_settable() {
            return Err(SwapError::InvalidRequest(format!(
                "status {status} cannot be set directly"
            )));
        }
        let event = self
            .retry
            .run("set_status", || {
                self.mutate_owned(id, owner, move |event| event.set_status(status))
            })
            .await?;
        tracing::info!(event_id = %id, %owner, %status, "event status changed");
        Ok(event)
    }

    /// Deletes an owned event.
    ///
    /// # Errors
    ///
    /// - [`SwapError::EventNotFound`] if missing or not owned by `owner`.
    /// - [`SwapError::InvalidState`] while the event is `SWAP_PENDING`.
    pub async fn delete_event(&self, id: EventId, owner: UserId) -> Result<(), SwapError> {
        self.retry
            .run("delete_event", || async move {
                let mut tx = self.store.begin().await?;
                let event = load_owned(tx.as_mut(), id, owner).await?;
                event.ensure_not_pending("delete")?;
                tx.delete_event(&event).await?;
                tx.commit().await
            })
            .await?;
        tracing::info!(event_id = %id, %owner, "event deleted");
        Ok(())
    }

    /// `SWAPPABLE` events offered by users other than `viewer`.
    ///
    /// # Errors
    ///
    /// Returns a [`SwapError::Persistence`] on store failure.
    pub async fn swappable_slots(&self, viewer: UserId) -> Result<Vec<Event>, SwapError> {
        self.store.swappable_events(viewer).await
    }

    /// Owned events starting within the configured window after `now`.
    ///
    /// # Errors
    ///
    /// Returns a [`SwapError::Persistence`] on store failure.
    pub async fn upcoming_events(
        &self,
        owner: UserId,
        now: DateTime<Utc>,
    ) -> Result<Vec<Event>, SwapError> {
        let until = now
            .checked_add_signed(self.upcoming_window)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        self.store.events_starting_between(owner, now, until).await
    }

    async fn mutate_owned<F>(&self, id: EventId, owner: UserId, apply: F) -> Result<Event, SwapError>
    where
        F: FnOnce(&mut Event) -> Result<(), SwapError>,
    {
        let mut tx = self.store.begin().await?;
        let mut event = load_owned(tx.as_mut(), id, owner).await?;
        apply(&mut event)?;
        let event = tx.save_event(&event).await?;
        tx.commit().await?;
        Ok(event)
    }
}

async fn load_owned(
    tx: &mut dyn StoreTransaction,
    id: EventId,
    owner: UserId,
) -> Result<Event, SwapError> {
    tx.load_event(id)
        .await?
        .filter(|e| e.is_owned_by(owner))
        .ok_or(SwapError::EventNotFound(id))
}
