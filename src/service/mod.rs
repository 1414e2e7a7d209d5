//! Service layer: business logic orchestration.
//!
//! [`SwapCoordinator`] runs the swap negotiation state machine and
//! [`EventService`] handles the owner-driven event lifecycle. Both run each
//! mutation as a single store transaction under a [`RetryPolicy`].

pub mod event_service;
pub mod retry;
pub mod swap_coordinator;

pub use event_service::EventService;
pub use retry::RetryPolicy;
pub use swap_coordinator::SwapCoordinator;
