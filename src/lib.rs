//! # slot-swapper
//!
//! REST API and WebSocket backend for a calendar slot swap marketplace.
//!
//! Users keep calendar events, mark some of them `SWAPPABLE`, and propose
//! one-for-one swaps against slots other users have offered. Accepting a
//! request exchanges the owners of both slots atomically; rejecting it
//! returns both slots to the marketplace.
//!
//! ## Architecture
//!
//! ```text
//! Clients (HTTP, WebSocket)
//!     │
//!     ├── REST Handlers (api/)
//!     ├── WS Handler (ws/)
//!     │
//!     ├── EventService / SwapCoordinator (service/)
//!     ├── EventBus (domain/)
//!     │
//!     └── SwapStore (persistence/)
//!          ├── MemoryStore
//!          └── PostgresStore
//! ```

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod persistence;
pub mod service;
pub mod ws;
