//! Domain layer: identifiers, events, swap requests and notifications.
//!
//! The status transitions of the swap state machine live on [`Event`] and
//! [`SwapRequest`] themselves; the service layer only orchestrates them
//! inside a store transaction.

pub mod event;
pub mod event_bus;
pub mod ids;
pub mod swap_notification;
pub mod swap_request;

pub use event::{Event, EventPatch, EventStatus, NewEvent};
pub use event_bus::EventBus;
pub use ids::{EventId, SwapRequestId, UserId};
pub use swap_notification::SwapNotification;
pub use swap_request::{SwapRequest, SwapStatus};
