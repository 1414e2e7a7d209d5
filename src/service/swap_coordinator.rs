//! Swap coordinator: validates, creates and resolves swap requests.

use std::sync::Arc;

use crate::domain::{
    Event, EventBus, EventId, EventStatus, SwapNotification, SwapRequest, SwapRequestId,
    SwapStatus, UserId,
};
use crate::error::SwapError;
use crate::persistence::{StoreTransaction, SwapStore};
use crate::service::RetryPolicy;

/// Runs the swap negotiation state machine.
///
/// Every mutation follows the pattern: begin transaction → load rows →
/// apply domain transitions → save the two events and the request →
/// commit → publish a [`SwapNotification`]. Any error before the commit
/// drops the transaction, so no partial state is persisted.
#[derive(Debug, Clone)]
pub struct SwapCoordinator {
    store: Arc<dyn SwapStore>,
    event_bus: EventBus,
    retry: RetryPolicy,
}

impl SwapCoordinator {
    /// Creates a new `SwapCoordinator`.
    #[must_use]
    pub fn new(store: Arc<dyn SwapStore>, event_bus: EventBus, retry: RetryPolicy) -> Self {
        Self {
            store,
            event_bus,
            retry,
        }
    }

    /// Proposes trading `requester_slot_id` (owned by `requester_id`) for
    /// `requested_slot_id`.
    ///
    /// On success both events are `SWAP_PENDING` and a `PENDING` request
    /// addressed to the owner of the requested slot exists.
    ///
    /// # Errors
    ///
    /// - [`SwapError::EventNotFound`] if either event is missing or the
    ///   requester does not own the offered slot.
    /// - [`SwapError::InvalidState`] if either event is not `SWAPPABLE`,
    ///   both ids are the same, or the requester already owns the
    ///   requested slot.
    /// - [`SwapError::Conflict`] if concurrent writers kept winning.
    pub async fn request_swap(
        &self,
        requester_slot_id: EventId,
        requested_slot_id: EventId,
        requester_id: UserId,
    ) -> Result<SwapRequest, SwapError> {
        let request = self
            .retry
            .run("request_swap", || {
                self.try_request_swap(requester_slot_id, requested_slot_id, requester_id)
            })
            .await?;

        self.event_bus.publish(SwapNotification::requested(&request));
        tracing::info!(
            request_id = %request.id,
            %requester_id,
            requestee_id = %request.requestee_id,
            "swap requested"
        );
        Ok(request)
    }

    /// Accepts or rejects a pending request addressed to `requestee_id`.
    ///
    /// Accepting exchanges the owners of both slots and sets them `BUSY`;
    /// rejecting returns both to `SWAPPABLE`.
    ///
    /// # Errors
    ///
    /// - [`SwapError::SwapRequestNotFound`] if the request is missing, not
    ///   addressed to `requestee_id`, or no longer `PENDING`.
    /// - [`SwapError::EventNotFound`] / [`SwapError::InvalidState`] if a
    ///   referenced slot vanished or left `SWAP_PENDING`.
    /// - [`SwapError::Conflict`] if concurrent writers kept winning.
    pub async fn respond_to_swap(
        &self,
        request_id: SwapRequestId,
        requestee_id: UserId,
        accept: bool,
    ) -> Result<SwapRequest, SwapError> {
        let request = self
            .retry
            .run("respond_to_swap", || {
                self.try_respond(request_id, requestee_id, accept)
            })
            .await?;

        self.event_bus
            .publish(SwapNotification::resolved(&request, accept));
        tracing::info!(%request_id, %requestee_id, status = %request.status, "swap resolved");
        Ok(request)
    }

    /// Returns a request if `user` is its requester or requestee.
    ///
    /// # Errors
    ///
    /// Returns [`SwapError::SwapRequestNotFound`] if it does not exist or
    /// `user` is not a party to it.
    pub async fn get_request(
        &self,
        request_id: SwapRequestId,
        user: UserId,
    ) -> Result<SwapRequest, SwapError> {
        self.store
            .swap_request(request_id)
            .await?
            .filter(|r| r.involves(user))
            .ok_or(SwapError::SwapRequestNotFound(request_id))
    }

    /// Pending requests awaiting `user`'s response, newest first.
    ///
    /// # Errors
    ///
    /// Returns a [`SwapError::Persistence`] on store failure.
    pub async fn incoming_requests(&self, user: UserId) -> Result<Vec<SwapRequest>, SwapError> {
        self.store.incoming_requests(user).await
    }

    /// Requests created by `user` in any status, newest first.
    ///
    /// # Errors
    ///
    /// Returns a [`SwapError::Persistence`] on store failure.
    pub async fn outgoing_requests(&self, user: UserId) -> Result<Vec<SwapRequest>, SwapError> {
        self.store.outgoing_requests(user).await
    }

    async fn try_request_swap(
        &self,
        requester_slot_id: EventId,
        requested_slot_id: EventId,
        requester_id: UserId,
    ) -> Result<SwapRequest, SwapError> {
        let mut tx = self.store.begin().await?;

        let mut offered = tx
            .load_event(requester_slot_id)
            .await?
            .filter(|e| e.is_owned_by(requester_id))
            .ok_or(SwapError::EventNotFound(requester_slot_id))?;
        let mut wanted = tx
            .load_event(requested_slot_id)
            .await?
            .ok_or(SwapError::EventNotFound(requested_slot_id))?;

        if requester_slot_id == requested_slot_id {
            return Err(SwapError::InvalidState(
                "cannot swap a slot with itself".to_string(),
            ));
        }
        if wanted.is_owned_by(requester_id) {
            return Err(SwapError::InvalidState(format!(
                "event {requested_slot_id} already belongs to the requester"
            )));
        }

        offered.mark_pending()?;
        wanted.mark_pending()?;
        ensure_no_pending(tx.as_mut(), &[offered.id, wanted.id]).await?;

        let request = SwapRequest::pending(&offered, &wanted, requester_id);
        tx.save_event(&offered).await?;
        tx.save_event(&wanted).await?;
        let request = tx.save_swap_request(&request).await?;
        tx.commit().await?;
        Ok(request)
    }

    async fn try_respond(
        &self,
        request_id: SwapRequestId,
        requestee_id: UserId,
        accept: bool,
    ) -> Result<SwapRequest, SwapError> {
        let mut tx = self.store.begin().await?;

        let mut request = tx
            .load_swap_request(request_id)
            .await?
            .filter(|r| r.requestee_id == requestee_id && r.status == SwapStatus::Pending)
            .ok_or(SwapError::SwapRequestNotFound(request_id))?;

        let mut offered = load_required(tx.as_mut(), request.requester_slot_id).await?;
        let mut wanted = load_required(tx.as_mut(), request.requested_slot_id).await?;

        if accept {
            std::mem::swap(&mut offered.owner_id, &mut wanted.owner_id);
            offered.settle(EventStatus::Busy)?;
            wanted.settle(EventStatus::Busy)?;
        } else {
            offered.settle(EventStatus::Swappable)?;
            wanted.settle(EventStatus::Swappable)?;
        }
        request.resolve(accept)?;

        tx.save_event(&offered).await?;
        tx.save_event(&wanted).await?;
        let request = tx.save_swap_request(&request).await?;
        tx.commit().await?;
        Ok(request)
    }
}

async fn load_required(tx: &mut dyn StoreTransaction, id: EventId) -> Result<Event, SwapError> {
    tx.load_event(id).await?.ok_or(SwapError::EventNotFound(id))
}

async fn ensure_no_pending(tx: &mut dyn StoreTransaction, ids: &[EventId]) -> Result<(), SwapError> {
    for id in ids {
        if tx.has_pending_request(*id).await? {
            return Err(SwapError::InvalidState(format!(
                "event {id} is already part of a pending swap"
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::NewEvent;
    use crate::persistence::MemoryStore;
    use async_trait::async_trait;
    use chrono::{DateTime, Duration, Utc};
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration as StdDuration;

    struct Fixture {
        store: Arc<MemoryStore>,
        bus: EventBus,
        coordinator: SwapCoordinator,
    }

    fn fixture() -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let bus = EventBus::new(64);
        let coordinator = SwapCoordinator::new(
            Arc::clone(&store) as Arc<dyn SwapStore>,
            bus.clone(),
            RetryPolicy::new(3, StdDuration::ZERO),
        );
        Fixture {
            store,
            bus,
            coordinator,
        }
    }

    async fn seed(store: &MemoryStore, owner: UserId, status: EventStatus) -> Event {
        let start = Utc::now() + Duration::days(1);
        let Ok(mut event) = Event::new(
            owner,
            NewEvent {
                title: "slot".to_string(),
                description: String::new(),
                start_time: start,
                end_time: start + Duration::hours(1),
            },
        ) else {
            panic!("valid event");
        };
        event.status = status;
        let Ok(mut tx) = store.begin().await else {
            panic!("begin failed");
        };
        let Ok(saved) = tx.save_event(&event).await else {
            panic!("save failed");
        };
        let Ok(()) = tx.commit().await else {
            panic!("commit failed");
        };
        saved
    }

    async fn reload(store: &MemoryStore, id: EventId) -> Event {
        let Ok(mut tx) = store.begin().await else {
            panic!("begin failed");
        };
        let Ok(Some(event)) = tx.load_event(id).await else {
            panic!("event {id} missing");
        };
        event
    }

    #[tokio::test]
    async fn accepted_swap_exchanges_owners() {
        let f = fixture();
        let (u1, u2) = (UserId::new(), UserId::new());
        let a = seed(&f.store, u1, EventStatus::Swappable).await;
        let b = seed(&f.store, u2, EventStatus::Swappable).await;

        let Ok(req) = f.coordinator.request_swap(a.id, b.id, u1).await else {
            panic!("request failed");
        };
        assert_eq!(req.status, SwapStatus::Pending);
        assert_eq!(req.requestee_id, u2);
        assert_eq!(reload(&f.store, a.id).await.status, EventStatus::SwapPending);
        assert_eq!(reload(&f.store, b.id).await.status, EventStatus::SwapPending);

        let Ok(done) = f.coordinator.respond_to_swap(req.id, u2, true).await else {
            panic!("respond failed");
        };
        assert_eq!(done.status, SwapStatus::Accepted);

        let (a, b) = (reload(&f.store, a.id).await, reload(&f.store, b.id).await);
        assert_eq!(a.owner_id, u2);
        assert_eq!(b.owner_id, u1);
        assert_eq!(a.status, EventStatus::Busy);
        assert_eq!(b.status, EventStatus::Busy);
    }

    #[tokio::test]
    async fn rejected_swap_restores_slots() {
        let f = fixture();
        let (u1, u2) = (UserId::new(), UserId::new());
        let a = seed(&f.store, u1, EventStatus::Swappable).await;
        let b = seed(&f.store, u2, EventStatus::Swappable).await;

        let Ok(req) = f.coordinator.request_swap(a.id, b.id, u1).await else {
            panic!("request failed");
        };
        let Ok(done) = f.coordinator.respond_to_swap(req.id, u2, false).await else {
            panic!("respond failed");
        };
        assert_eq!(done.status, SwapStatus::Rejected);

        let (a, b) = (reload(&f.store, a.id).await, reload(&f.store, b.id).await);
        assert_eq!((a.owner_id, a.status), (u1, EventStatus::Swappable));
        assert_eq!((b.owner_id, b.status), (u2, EventStatus::Swappable));
    }

    #[tokio::test]
    async fn request_requires_both_swappable() {
        let f = fixture();
        let (u1, u2) = (UserId::new(), UserId::new());
        let a = seed(&f.store, u1, EventStatus::Swappable).await;
        let b = seed(&f.store, u2, EventStatus::Busy).await;

        let result = f.coordinator.request_swap(a.id, b.id, u1).await;
        assert!(matches!(result, Err(SwapError::InvalidState(_))));
        // Nothing persisted: the offered slot is still swappable.
        assert_eq!(reload(&f.store, a.id).await.status, EventStatus::Swappable);
        let Ok(outgoing) = f.coordinator.outgoing_requests(u1).await else {
            panic!("query failed");
        };
        assert!(outgoing.is_empty());
    }

    #[tokio::test]
    async fn missing_or_foreign_slot_is_not_found() {
        let f = fixture();
        let (u1, u2) = (UserId::new(), UserId::new());
        let a = seed(&f.store, u1, EventStatus::Swappable).await;
        let b = seed(&f.store, u2, EventStatus::Swappable).await;

        let missing = f.coordinator.request_swap(a.id, EventId::new(), u1).await;
        assert!(matches!(missing, Err(SwapError::EventNotFound(_))));

        // u2 cannot offer u1's slot.
        let foreign = f.coordinator.request_swap(a.id, b.id, u2).await;
        assert!(matches!(foreign, Err(SwapError::EventNotFound(id)) if id == a.id));
    }

    #[tokio::test]
    async fn cannot_swap_with_own_slot_or_itself() {
        let f = fixture();
        let u1 = UserId::new();
        let a = seed(&f.store, u1, EventStatus::Swappable).await;
        let b = seed(&f.store, u1, EventStatus::Swappable).await;

        let same = f.coordinator.request_swap(a.id, a.id, u1).await;
        assert!(matches!(same, Err(SwapError::InvalidState(_))));
        let own = f.coordinator.request_swap(a.id, b.id, u1).await;
        assert!(matches!(own, Err(SwapError::InvalidState(_))));
    }

    #[tokio::test]
    async fn missing_slot_paired_with_itself_is_not_found() {
        let f = fixture();
        let ghost = EventId::new();
        let result = f.coordinator.request_swap(ghost, ghost, UserId::new()).await;
        assert!(matches!(result, Err(SwapError::EventNotFound(id)) if id == ghost));
    }

    #[tokio::test]
    async fn deleting_event_keeps_resolved_requests() {
        let f = fixture();
        let (u1, u2) = (UserId::new(), UserId::new());
        let a = seed(&f.store, u1, EventStatus::Swappable).await;
        let b = seed(&f.store, u2, EventStatus::Swappable).await;
        let Ok(req) = f.coordinator.request_swap(a.id, b.id, u1).await else {
            panic!("request failed");
        };
        let Ok(_) = f.coordinator.respond_to_swap(req.id, u2, false).await else {
            panic!("respond failed");
        };

        let current = reload(&f.store, a.id).await;
        let Ok(mut tx) = f.store.begin().await else {
            panic!("begin failed");
        };
        assert!(tx.delete_event(&current).await.is_ok());
        assert!(tx.commit().await.is_ok());

        let Ok(outgoing) = f.coordinator.outgoing_requests(u1).await else {
            panic!("query failed");
        };
        assert_eq!(outgoing.len(), 1);
        assert!(outgoing.iter().all(|r| r.id == req.id && r.status == SwapStatus::Rejected));
        assert!(f.coordinator.get_request(req.id, u2).await.is_ok());
    }

    #[tokio::test]
    async fn slot_cannot_join_two_pending_requests() {
        let f = fixture();
        let (u1, u2, u3) = (UserId::new(), UserId::new(), UserId::new());
        let a = seed(&f.store, u1, EventStatus::Swappable).await;
        let b = seed(&f.store, u2, EventStatus::Swappable).await;
        let c = seed(&f.store, u3, EventStatus::Swappable).await;

        assert!(f.coordinator.request_swap(a.id, b.id, u1).await.is_ok());
        let second = f.coordinator.request_swap(c.id, b.id, u3).await;
        assert!(matches!(second, Err(SwapError::InvalidState(_))));
        assert_eq!(reload(&f.store, c.id).await.status, EventStatus::Swappable);
    }

    #[tokio::test]
    async fn only_requestee_may_respond_once() {
        let f = fixture();
        let (u1, u2) = (UserId::new(), UserId::new());
        let a = seed(&f.store, u1, EventStatus::Swappable).await;
        let b = seed(&f.store, u2, EventStatus::Swappable).await;
        let Ok(req) = f.coordinator.request_swap(a.id, b.id, u1).await else {
            panic!("request failed");
        };

        let by_requester = f.coordinator.respond_to_swap(req.id, u1, true).await;
        assert!(matches!(by_requester, Err(SwapError::SwapRequestNotFound(_))));

        assert!(f.coordinator.respond_to_swap(req.id, u2, false).await.is_ok());
        let again = f.coordinator.respond_to_swap(req.id, u2, true).await;
        assert!(matches!(again, Err(SwapError::SwapRequestNotFound(_))));
        assert_eq!(reload(&f.store, a.id).await.owner_id, u1);
    }

    #[tokio::test]
    async fn concurrent_requests_for_same_slot_admit_one() {
        let f = fixture();
        let (u1, u2, u3) = (UserId::new(), UserId::new(), UserId::new());
        let a = seed(&f.store, u1, EventStatus::Swappable).await;
        let b = seed(&f.store, u2, EventStatus::Swappable).await;
        let c = seed(&f.store, u3, EventStatus::Swappable).await;

        let (first, second) = tokio::join!(
            f.coordinator.request_swap(a.id, b.id, u1),
            f.coordinator.request_swap(c.id, b.id, u3),
        );
        assert_eq!(
            usize::from(first.is_ok()) + usize::from(second.is_ok()),
            1,
            "exactly one request may win the slot"
        );
        let Ok(pending) = f.coordinator.incoming_requests(u2).await else {
            panic!("query failed");
        };
        assert_eq!(pending.len(), 1);
    }

    #[tokio::test]
    async fn notifications_follow_commits() {
        let f = fixture();
        let mut rx = f.bus.subscribe();
        let (u1, u2) = (UserId::new(), UserId::new());
        let a = seed(&f.store, u1, EventStatus::Swappable).await;
        let b = seed(&f.store, u2, EventStatus::Swappable).await;

        let Ok(req) = f.coordinator.request_swap(a.id, b.id, u1).await else {
            panic!("request failed");
        };
        let Ok(n) = rx.recv().await else {
            panic!("no notification");
        };
        assert_eq!(n.event_type_str(), "swap_requested");
        assert!(n.involves(u2));

        let Ok(_) = f.coordinator.respond_to_swap(req.id, u2, true).await else {
            panic!("respond failed");
        };
        let Ok(n) = rx.recv().await else {
            panic!("no notification");
        };
        assert_eq!(n.event_type_str(), "swap_accepted");
        assert_eq!(n.request_id(), req.id);
    }

    #[tokio::test]
    async fn get_request_hides_from_outsiders() {
        let f = fixture();
        let (u1, u2) = (UserId::new(), UserId::new());
        let a = seed(&f.store, u1, EventStatus::Swappable).await;
        let b = seed(&f.store, u2, EventStatus::Swappable).await;
        let Ok(req) = f.coordinator.request_swap(a.id, b.id, u1).await else {
            panic!("request failed");
        };

        assert!(f.coordinator.get_request(req.id, u1).await.is_ok());
        assert!(f.coordinator.get_request(req.id, u2).await.is_ok());
        let outsider = f.coordinator.get_request(req.id, UserId::new()).await;
        assert!(matches!(outsider, Err(SwapError::SwapRequestNotFound(_))));
    }

    /// Store whose next `conflicts` commits fail as if another writer won.
    #[derive(Debug, Default)]
    struct ContendedStore {
        inner: MemoryStore,
        conflicts: Arc<AtomicU32>,
        commits: Arc<AtomicU32>,
    }

    #[derive(Debug)]
    struct ContendedTransaction {
        inner: Box<dyn StoreTransaction>,
        conflicts: Arc<AtomicU32>,
        commits: Arc<AtomicU32>,
    }

    #[async_trait]
    impl StoreTransaction for ContendedTransaction {
        async fn load_event(&mut self, id: EventId) -> Result<Option<Event>, SwapError> {
            self.inner.load_event(id).await
        }

        async fn save_event(&mut self, event: &Event) -> Result<Event, SwapError> {
            self.inner.save_event(event).await
        }

        async fn delete_event(&mut self, event: &Event) -> Result<(), SwapError> {
            self.inner.delete_event(event).await
        }

        async fn load_swap_request(
            &mut self,
            id: SwapRequestId,
        ) -> Result<Option<SwapRequest>, SwapError> {
            self.inner.load_swap_request(id).await
        }

        async fn save_swap_request(
            &mut self,
            request: &SwapRequest,
        ) -> Result<SwapRequest, SwapError> {
            self.inner.save_swap_request(request).await
        }

        async fn has_pending_request(&mut self, event_id: EventId) -> Result<bool, SwapError> {
            self.inner.has_pending_request(event_id).await
        }

        async fn commit(&mut self) -> Result<(), SwapError> {
            self.commits.fetch_add(1, Ordering::SeqCst);
            let lost = self
                .conflicts
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok();
            if lost {
                return Err(SwapError::Conflict("row changed concurrently".to_string()));
            }
            self.inner.commit().await
        }
    }

    #[async_trait]
    impl SwapStore for ContendedStore {
        async fn begin(&self) -> Result<Box<dyn StoreTransaction>, SwapError> {
            Ok(Box::new(ContendedTransaction {
                inner: self.inner.begin().await?,
                conflicts: Arc::clone(&self.conflicts),
                commits: Arc::clone(&self.commits),
            }))
        }

        async fn events_by_owner(&self, owner: UserId) -> Result<Vec<Event>, SwapError> {
            self.inner.events_by_owner(owner).await
        }

        async fn swappable_events(&self, viewer: UserId) -> Result<Vec<Event>, SwapError> {
            self.inner.swappable_events(viewer).await
        }

        async fn events_starting_between(
            &self,
            owner: UserId,
            after: DateTime<Utc>,
            until: DateTime<Utc>,
        ) -> Result<Vec<Event>, SwapError> {
            self.inner.events_starting_between(owner, after, until).await
        }

        async fn swap_request(&self, id: SwapRequestId) -> Result<Option<SwapRequest>, SwapError> {
            self.inner.swap_request(id).await
        }

        async fn incoming_requests(&self, requestee: UserId) -> Result<Vec<SwapRequest>, SwapError> {
            self.inner.incoming_requests(requestee).await
        }

        async fn outgoing_requests(&self, requester: UserId) -> Result<Vec<SwapRequest>, SwapError> {
            self.inner.outgoing_requests(requester).await
        }
    }

    fn contended() -> (Arc<ContendedStore>, SwapCoordinator) {
        let store = Arc::new(ContendedStore::default());
        let coordinator = SwapCoordinator::new(
            Arc::clone(&store) as Arc<dyn SwapStore>,
            EventBus::new(16),
            RetryPolicy::new(3, StdDuration::ZERO),
        );
        (store, coordinator)
    }

    #[tokio::test]
    async fn conflicting_commit_is_retried() {
        let (store, coordinator) = contended();
        let (u1, u2) = (UserId::new(), UserId::new());
        let a = seed(&store.inner, u1, EventStatus::Swappable).await;
        let b = seed(&store.inner, u2, EventStatus::Swappable).await;

        store.conflicts.store(1, Ordering::SeqCst);
        let Ok(req) = coordinator.request_swap(a.id, b.id, u1).await else {
            panic!("request should succeed on the second attempt");
        };
        assert_eq!(store.commits.load(Ordering::SeqCst), 2);
        assert_eq!(reload(&store.inner, a.id).await.status, EventStatus::SwapPending);

        store.conflicts.store(1, Ordering::SeqCst);
        let Ok(done) = coordinator.respond_to_swap(req.id, u2, true).await else {
            panic!("respond should succeed on the second attempt");
        };
        assert_eq!(done.status, SwapStatus::Accepted);
        assert_eq!(store.commits.load(Ordering::SeqCst), 4);
        assert_eq!(reload(&store.inner, a.id).await.owner_id, u2);
        assert_eq!(reload(&store.inner, b.id).await.owner_id, u1);
    }

    #[tokio::test]
    async fn persistent_conflict_surfaces_after_last_attempt() {
        let (store, coordinator) = contended();
        let (u1, u2) = (UserId::new(), UserId::new());
        let a = seed(&store.inner, u1, EventStatus::Swappable).await;
        let b = seed(&store.inner, u2, EventStatus::Swappable).await;

        store.conflicts.store(3, Ordering::SeqCst);
        let result = coordinator.request_swap(a.id, b.id, u1).await;
        assert!(matches!(result, Err(SwapError::Conflict(_))));
        assert_eq!(store.commits.load(Ordering::SeqCst), 3);
        assert_eq!(reload(&store.inner, a.id).await.status, EventStatus::Swappable);
        let Ok(outgoing) = coordinator.outgoing_requests(u1).await else {
            panic!("query failed");
        };
        assert!(outgoing.is_empty());

        let Ok(req) = coordinator.request_swap(a.id, b.id, u1).await else {
            panic!("request failed");
        };
        store.conflicts.store(3, Ordering::SeqCst);
        let result = coordinator.respond_to_swap(req.id, u2, true).await;
        assert!(matches!(result, Err(SwapError::Conflict(_))));
        assert_eq!(reload(&store.inner, a.id).await.owner_id, u1);
        let Ok(still_pending) = coordinator.get_request(req.id, u2).await else {
            panic!("request vanished");
        };
        assert_eq!(still_pending.status, SwapStatus::Pending);
    }
}
