//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::config::AppConfig;
use crate::domain::EventBus;
use crate::persistence::SwapStore;
use crate::service::{EventService, RetryPolicy, SwapCoordinator};

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Event CRUD and marketplace queries.
    pub event_service: Arc<EventService>,
    /// Swap negotiation state machine.
    pub swap_coordinator: Arc<SwapCoordinator>,
    /// Notification bus for WebSocket subscriptions.
    pub event_bus: EventBus,
}

impl AppState {
    /// Wires the service layer over `store` using `config`.
    #[must_use]
    pub fn new(store: Arc<dyn SwapStore>, config: &AppConfig) -> Self {
        let event_bus = EventBus::new(config.event_bus_capacity);
        let retry = RetryPolicy::from_config(config);
        let event_service = Arc::new(EventService::new(
            Arc::clone(&store),
            retry,
            config.upcoming_window(),
        ));
        let swap_coordinator = Arc::new(SwapCoordinator::new(store, event_bus.clone(), retry));
        Self {
            event_service,
            swap_coordinator,
            event_bus,
        }
    }
}
