//! PostgreSQL implementation of the persistence layer.

use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgConnection, PgPool, Postgres, Transaction};

use super::models::{EventRow, SwapRequestRow};
use super::{StoreTransaction, SwapStore};
use crate::config::AppConfig;
use crate::domain::{Event, EventId, EventStatus, SwapRequest, SwapRequestId, SwapStatus, UserId};
use crate::error::SwapError;

const EVENT_COLUMNS: &str =
    "id, title, description, start_time, end_time, status, owner_id, version, created_at, updated_at";

const SWAP_REQUEST_COLUMNS: &str = "id, requester_slot_id, requested_slot_id, requester_id, \
     requestee_id, status, version, created_at, updated_at";

/// PostgreSQL-backed store using `sqlx::PgPool`.
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Creates a store over an existing connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Opens a connection pool sized from `config`.
    ///
    /// # Errors
    ///
    /// Returns a [`SwapError::Persistence`] if the database is unreachable.
    pub async fn connect(config: &AppConfig) -> Result<Self, SwapError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .min_connections(config.database_min_connections)
            .acquire_timeout(config.database_connect_timeout())
            .connect(&config.database_url)
            .await?;
        Ok(Self::new(pool))
    }

    /// Applies the embedded schema migrations.
    ///
    /// # Errors
    ///
    /// Returns a [`SwapError::Persistence`] if a migration fails.
    pub async fn migrate(&self) -> Result<(), SwapError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| SwapError::Persistence(e.to_string()))
    }

    async fn fetch_events(
        &self,
        sql: &str,
        owner: UserId,
        bounds: Option<(DateTime<Utc>, DateTime<Utc>)>,
    ) -> Result<Vec<Event>, SwapError> {
        let mut query = sqlx::query_as::<_, EventRow>(sql).bind(*owner.as_uuid());
        if let Some((after, until)) = bounds {
            query = query.bind(after).bind(until);
        }
        query
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(Event::try_from)
            .collect()
    }

    async fn fetch_requests(&self, sql: &str, user: UserId) -> Result<Vec<SwapRequest>, SwapError> {
        sqlx::query_as::<_, SwapRequestRow>(sql)
            .bind(*user.as_uuid())
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(SwapRequest::try_from)
            .collect()
    }
}

/// A [`StoreTransaction`] over a `sqlx` Postgres transaction.
///
/// Dropped without [`StoreTransaction::commit`], the underlying
/// transaction is rolled back by `sqlx`.
pub struct PostgresTransaction {
    tx: Option<Transaction<'static, Postgres>>,
}

impl fmt::Debug for PostgresTransaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PostgresTransaction")
            .field("open", &self.tx.is_some())
            .finish()
    }
}

impl PostgresTransaction {
    fn conn(&mut self) -> Result<&mut PgConnection, SwapError> {
        match self.tx.as_mut() {
            Some(tx) => Ok(&mut **tx),
            None => Err(SwapError::Internal(
                "transaction already committed".to_string(),
            )),
        }
    }
}

impl Drop for PostgresTransaction {
    fn drop(&mut self) {
        if self.tx.is_some() {
            tracing::debug!("transaction dropped without commit, rolling back");
        }
    }
}

#[async_trait]
impl StoreTransaction for PostgresTransaction {
    async fn load_event(&mut self, id: EventId) -> Result<Option<Event>, SwapError> {
        let sql = format!("SELECT {EVENT_COLUMNS} FROM events WHERE id = $1");
        sqlx::query_as::<_, EventRow>(&sql)
            .bind(*id.as_uuid())
            .fetch_optional(self.conn()?)
            .await?
            .map(Event::try_from)
            .transpose()
    }

    async fn save_event(&mut self, event: &Event) -> Result<Event, SwapError> {
        let row = if event.version == 0 {
            let sql = format!(
                "INSERT INTO events (id, title, description, start_time, end_time, status, \
                 owner_id, version, created_at, updated_at) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, 1, $8, NOW()) RETURNING {EVENT_COLUMNS}"
            );
            sqlx::query_as::<_, EventRow>(&sql)
                .bind(*event.id.as_uuid())
                .bind(&event.title)
                .bind(&event.description)
                .bind(event.start_time)
                .bind(event.end_time)
                .bind(event.status.as_str())
                .bind(*event.owner_id.as_uuid())
                .bind(event.created_at)
                .fetch_one(self.conn()?)
                .await?
        } else {
            let sql = format!(
                "UPDATE events SET title = $2, description = $3, start_time = $4, \
                 end_time = $5, status = $6, owner_id = $7, version = version + 1, \
                 updated_at = NOW() WHERE id = $1 AND version = $8 RETURNING {EVENT_COLUMNS}"
            );
            sqlx::query_as::<_, EventRow>(&sql)
                .bind(*event.id.as_uuid())
                .bind(&event.title)
                .bind(&event.description)
                .bind(event.start_time)
                .bind(event.end_time)
                .bind(event.status.as_str())
                .bind(*event.owner_id.as_uuid())
                .bind(event.version)
                .fetch_optional(self.conn()?)
                .await?
                .ok_or_else(|| {
                    SwapError::Conflict(format!("event {} changed concurrently", event.id))
                })?
        };
        Event::try_from(row)
    }

    async fn delete_event(&mut self, event: &Event) -> Result<(), SwapError> {
        let result = sqlx::query("DELETE FROM events WHERE id = $1 AND version = $2")
            .bind(*event.id.as_uuid())
            .bind(event.version)
            .execute(self.conn()?)
            .await?;
        if result.rows_affected() == 0 {
            return Err(SwapError::Conflict(format!(
                "event {} changed concurrently",
                event.id
            )));
        }
        Ok(())
    }

    async fn load_swap_request(
        &mut self,
        id: SwapRequestId,
    ) -> Result<Option<SwapRequest>, SwapError> {
        let sql = format!("SELECT {SWAP_REQUEST_COLUMNS} FROM swap_requests WHERE id = $1");
        sqlx::query_as::<_, SwapRequestRow>(&sql)
            .bind(*id.as_uuid())
            .fetch_optional(self.conn()?)
            .await?
            .map(SwapRequest::try_from)
            .transpose()
    }

    async fn save_swap_request(
        &mut self,
        request: &SwapRequest,
    ) -> Result<SwapRequest, SwapError> {
        let row = if request.version == 0 {
            let sql = format!(
                "INSERT INTO swap_requests (id, requester_slot_id, requested_slot_id, \
                 requester_id, requestee_id, status, version, created_at, updated_at) \
                 VALUES ($1, $2, $3, $4, $5, $6, 1, $7, NOW()) RETURNING {SWAP_REQUEST_COLUMNS}"
            );
            sqlx::query_as::<_, SwapRequestRow>(&sql)
                .bind(*request.id.as_uuid())
                .bind(*request.requester_slot_id.as_uuid())
                .bind(*request.requested_slot_id.as_uuid())
                .bind(*request.requester_id.as_uuid())
                .bind(*request.requestee_id.as_uuid())
                .bind(request.status.as_str())
                .bind(request.created_at)
                .fetch_one(self.conn()?)
                .await?
        } else {
            let sql = format!(
                "UPDATE swap_requests SET status = $2, version = version + 1, updated_at = NOW() \
                 WHERE id = $1 AND version = $3 RETURNING {SWAP_REQUEST_COLUMNS}"
            );
            sqlx::query_as::<_, SwapRequestRow>(&sql)
                .bind(*request.id.as_uuid())
                .bind(request.status.as_str())
                .bind(request.version)
                .fetch_optional(self.conn()?)
                .await?
                .ok_or_else(|| {
                    SwapError::Conflict(format!(
                        "swap request {} changed concurrently",
                        request.id
                    ))
                })?
        };
        SwapRequest::try_from(row)
    }

    async fn has_pending_request(&mut self, event_id: EventId) -> Result<bool, SwapError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM swap_requests WHERE status = $2 \
             AND (requester_slot_id = $1 OR requested_slot_id = $1))",
        )
        .bind(*event_id.as_uuid())
        .bind(SwapStatus::Pending.as_str())
        .fetch_one(self.conn()?)
        .await?;
        Ok(exists)
    }

    async fn commit(&mut self) -> Result<(), SwapError> {
        let tx = self
            .tx
            .take()
            .ok_or_else(|| SwapError::Internal("transaction already committed".to_string()))?;
        tx.commit().await?;
        Ok(())
    }
}

#[async_trait]
impl SwapStore for PostgresStore {
    async fn begin(&self) -> Result<Box<dyn StoreTransaction>, SwapError> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PostgresTransaction { tx: Some(tx) }))
    }

    async fn events_by_owner(&self, owner: UserId) -> Result<Vec<Event>, SwapError> {
        let sql = format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE owner_id = $1 ORDER BY start_time, id"
        );
        self.fetch_events(&sql, owner, None).await
    }

    async fn swappable_events(&self, viewer: UserId) -> Result<Vec<Event>, SwapError> {
        let sql = format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE owner_id <> $1 AND status = '{}' \
             ORDER BY start_time, id",
            EventStatus::Swappable.as_str()
        );
        self.fetch_events(&sql, viewer, None).await
    }

    async fn events_starting_between(
        &self,
        owner: UserId,
        after: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<Vec<Event>, SwapError> {
        let sql = format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE owner_id = $1 \
             AND start_time > $2 AND start_time <= $3 ORDER BY start_time, id"
        );
        self.fetch_events(&sql, owner, Some((after, until))).await
    }

    async fn swap_request(&self, id: SwapRequestId) -> Result<Option<SwapRequest>, SwapError> {
        let sql = format!("SELECT {SWAP_REQUEST_COLUMNS} FROM swap_requests WHERE id = $1");
        sqlx::query_as::<_, SwapRequestRow>(&sql)
            .bind(*id.as_uuid())
            .fetch_optional(&self.pool)
            .await?
            .map(SwapRequest::try_from)
            .transpose()
    }

    async fn incoming_requests(&self, requestee: UserId) -> Result<Vec<SwapRequest>, SwapError> {
        let sql = format!(
            "SELECT {SWAP_REQUEST_COLUMNS} FROM swap_requests WHERE requestee_id = $1 \
             AND status = '{}' ORDER BY created_at DESC, id",
            SwapStatus::Pending.as_str()
        );
        self.fetch_requests(&sql, requestee).await
    }

    async fn outgoing_requests(&self, requester: UserId) -> Result<Vec<SwapRequest>, SwapError> {
        let sql = format!(
            "SELECT {SWAP_REQUEST_COLUMNS} FROM swap_requests WHERE requester_id = $1 \
             ORDER BY created_at DESC, id"
        );
        self.fetch_requests(&sql, requester).await
    }
}
