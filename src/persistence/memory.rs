//! In-memory store with optimistic transactions.
//!
//! Committed rows live in a single [`RwLock`]-guarded pair of maps. A
//! [`MemoryTransaction`] buffers its writes and remembers, for each row it
//! touched, the committed version it started from. `commit` re-checks those
//! versions under the write lock and applies everything or nothing.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use super::{StoreTransaction, SwapStore};
use crate::domain::{Event, EventId, EventStatus, SwapRequest, SwapRequestId, SwapStatus, UserId};
use crate::error::SwapError;

#[derive(Debug, Default)]
struct Tables {
    events: HashMap<EventId, Event>,
    requests: HashMap<SwapRequestId, SwapRequest>,
}

/// Process-local [`SwapStore`].
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

/// Buffered transaction over a [`MemoryStore`].
#[derive(Debug)]
pub struct MemoryTransaction {
    tables: Arc<RwLock<Tables>>,
    /// Pending event writes; `None` marks a delete.
    events: HashMap<EventId, Option<Event>>,
    requests: HashMap<SwapRequestId, SwapRequest>,
    /// Committed version each written row started from (`0` = absent).
    event_bases: HashMap<EventId, i64>,
    request_bases: HashMap<SwapRequestId, i64>,
    finished: bool,
}

impl MemoryTransaction {
    fn new(tables: Arc<RwLock<Tables>>) -> Self {
        Self {
            tables,
            events: HashMap::new(),
            requests: HashMap::new(),
            event_bases: HashMap::new(),
            request_bases: HashMap::new(),
            finished: false,
        }
    }

    fn ensure_open(&self) -> Result<(), SwapError> {
        if self.finished {
            return Err(SwapError::Internal("transaction already committed".to_string()));
        }
        Ok(())
    }

    /// Version of the event as seen by this transaction (`0` = absent).
    async fn visible_event_version(&self, id: EventId) -> Result<i64, SwapError> {
        match self.events.get(&id) {
            Some(Some(event)) => Ok(event.version),
            Some(None) => Err(SwapError::Conflict(format!(
                "event {id} was deleted in this transaction"
            ))),
            None => Ok(self
                .tables
                .read()
                .await
                .events
                .get(&id)
                .map_or(0, |e| e.version)),
        }
    }

    async fn visible_request_version(&self, id: SwapRequestId) -> i64 {
        match self.requests.get(&id) {
            Some(req) => req.version,
            None => self
                .tables
                .read()
                .await
                .requests
                .get(&id)
                .map_or(0, |r| r.version),
        }
    }
}

#[async_trait]
impl StoreTransaction for MemoryTransaction {
    async fn load_event(&mut self, id: EventId) -> Result<Option<Event>, SwapError> {
        self.ensure_open()?;
        if let Some(buffered) = self.events.get(&id) {
            return Ok(buffered.clone());
        }
        Ok(self.tables.read().await.events.get(&id).cloned())
    }

    async fn save_event(&mut self, event: &Event) -> Result<Event, SwapError> {
        self.ensure_open()?;
        let visible = self.visible_event_version(event.id).await?;
        if event.version != visible {
            return Err(SwapError::Conflict(format!(
                "event {} is at version {visible}, write expected {}",
                event.id, event.version
            )));
        }
        self.event_bases.entry(event.id).or_insert(visible);

        let mut stored = event.clone();
        stored.version = visible + 1;
        stored.updated_at = Utc::now();
        self.events.insert(stored.id, Some(stored.clone()));
        Ok(stored)
    }

    async fn delete_event(&mut self, event: &Event) -> Result<(), SwapError> {
        self.ensure_open()?;
        let visible = self.visible_event_version(event.id).await?;
        if visible == 0 {
            return Err(SwapError::EventNotFound(event.id));
        }
        if event.version != visible {
            return Err(SwapError::Conflict(format!(
                "event {} is at version {visible}, delete expected {}",
                event.id, event.version
            )));
        }
        self.event_bases.entry(event.id).or_insert(visible);
        self.events.insert(event.id, None);
        Ok(())
    }

    async fn load_swap_request(
        &mut self,
        id: SwapRequestId,
    ) -> Result<Option<SwapRequest>, SwapError> {
        self.ensure_open()?;
        if let Some(buffered) = self.requests.get(&id) {
            return Ok(Some(buffered.clone()));
        }
        Ok(self.tables.read().await.requests.get(&id).cloned())
    }

    async fn save_swap_request(
        &mut self,
        request: &SwapRequest,
    ) -> Result<SwapRequest, SwapError> {
        self.ensure_open()?;
        let visible = self.visible_request_version(request.id).await;
        if request.version != visible {
            return Err(SwapError::Conflict(format!(
                "swap request {} is at version {visible}, write expected {}",
                request.id, request.version
            )));
        }
        self.request_bases.entry(request.id).or_insert(visible);

        let mut stored = request.clone();
        stored.version = visible + 1;
        stored.updated_at = Utc::now();
        self.requests.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn has_pending_request(&mut self, event_id: EventId) -> Result<bool, SwapError> {
        self.ensure_open()?;
        let pending = |r: &SwapRequest| r.status == SwapStatus::Pending && r.references(event_id);
        if self.requests.values().any(pending) {
            return Ok(true);
        }
        let tables = self.tables.read().await;
        Ok(tables
            .requests
            .values()
            .filter(|r| !self.requests.contains_key(&r.id))
            .any(pending))
    }

    async fn commit(&mut self) -> Result<(), SwapError> {
        self.ensure_open()?;
        let mut tables = self.tables.write().await;

        for (id, base) in &self.event_bases {
            let current = tables.events.get(id).map_or(0, |e| e.version);
            if current != *base {
                return Err(SwapError::Conflict(format!(
                    "event {id} changed concurrently"
                )));
            }
        }
        for (id, base) in &self.request_bases {
            let current = tables.requests.get(id).map_or(0, |r| r.version);
            if current != *base {
                return Err(SwapError::Conflict(format!(
                    "swap request {id} changed concurrently"
                )));
            }
        }

        for (id, write) in self.events.drain() {
            match write {
                Some(event) => {
                    tables.events.insert(id, event);
                }
                None => {
                    tables.events.remove(&id);
                }
            }
        }
        for (id, request) in self.requests.drain() {
            tables.requests.insert(id, request);
        }
        self.finished = true;
        Ok(())
    }
}

#[async_trait]
impl SwapStore for MemoryStore {
    async fn begin(&self) -> Result<Box<dyn StoreTransaction>, SwapError> {
        Ok(Box::new(MemoryTransaction::new(Arc::clone(&self.tables))))
    }

    async fn events_by_owner(&self, owner: UserId) -> Result<Vec<Event>, SwapError> {
        let tables = self.tables.read().await;
        Ok(sorted_by_start(
            tables.events.values().filter(|e| e.owner_id == owner),
        ))
    }

    async fn swappable_events(&self, viewer: UserId) -> Result<Vec<Event>, SwapError> {
        let tables = self.tables.read().await;
        Ok(sorted_by_start(tables.events.values().filter(|e| {
            e.status == EventStatus::Swappable && e.owner_id != viewer
        })))
    }

    async fn events_starting_between(
        &self,
        owner: UserId,
        after: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<Vec<Event>, SwapError> {
        let tables = self.tables.read().await;
        Ok(sorted_by_start(tables.events.values().filter(|e| {
            e.owner_id == owner && e.start_time > after && e.start_time <= until
        })))
    }

    async fn swap_request(&self, id: SwapRequestId) -> Result<Option<SwapRequest>, SwapError> {
        Ok(self.tables.read().await.requests.get(&id).cloned())
    }

    async fn incoming_requests(&self, requestee: UserId) -> Result<Vec<SwapRequest>, SwapError> {
        let tables = self.tables.read().await;
        Ok(newest_first(tables.requests.values().filter(|r| {
            r.requestee_id == requestee && r.status == SwapStatus::Pending
        })))
    }

    async fn outgoing_requests(&self, requester: UserId) -> Result<Vec<SwapRequest>, SwapError> {
        let tables = self.tables.read().await;
        Ok(newest_first(
            tables
                .requests
                .values()
                .filter(|r| r.requester_id == requester),
        ))
    }
}

fn sorted_by_start<'a>(events: impl Iterator<Item = &'a Event>) -> Vec<Event> {
    let mut out: Vec<Event> = events.cloned().collect();
    out.sort_by(|a, b| a.start_time.cmp(&b.start_time).then(a.id.cmp(&b.id)));
    out
}

fn newest_first<'a>(requests: impl Iterator<Item = &'a SwapRequest>) -> Vec<SwapRequest> {
    let mut out: Vec<SwapRequest> = requests.cloned().collect();
    out.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
    out
}
