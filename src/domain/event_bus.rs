//! Broadcast channel for swap notifications.
//!
//! [`EventBus`] wraps a [`tokio::sync::broadcast`] channel. Every committed
//! swap transition publishes a [`SwapNotification`], and every WebSocket
//! connection subscribes to receive the ones addressed to its user.

use tokio::sync::broadcast;

use super::SwapNotification;

/// Broadcast bus for [`SwapNotification`]s.
///
/// When the ring buffer is full, the oldest notifications are dropped for
/// lagging receivers.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<SwapNotification>,
}

impl EventBus {
    /// Creates a new `EventBus` with the given channel capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Publishes a notification to all subscribers.
    ///
    /// Returns the number of receivers. With no receivers the notification
    /// is silently dropped.
    pub fn publish(&self, notification: SwapNotification) -> usize {
        self.sender.send(notification).unwrap_or(0)
    }

    /// Creates a new receiver for all future notifications.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<SwapNotification> {
        self.sender.subscribe()
    }

    /// Returns the current number of active receivers.
    #[must_use]
    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::{SwapRequestId, UserId};
    use chrono::Utc;

    fn make_notification(request_id: SwapRequestId) -> SwapNotification {
        SwapNotification::SwapRejected {
            request_id,
            requester_id: UserId::new(),
            requestee_id: UserId::new(),
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn publish_without_receivers_returns_zero() {
        let bus = EventBus::new(16);
        assert_eq!(bus.publish(make_notification(SwapRequestId::new())), 0);
    }

    #[tokio::test]
    async fn every_subscriber_receives_notification() {
        let bus = EventBus::new(16);
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        let id = SwapRequestId::new();
        assert_eq!(bus.publish(make_notification(id)), 2);

        let Ok(n1) = rx1.recv().await else {
            panic!("rx1 failed");
        };
        let Ok(n2) = rx2.recv().await else {
            panic!("rx2 failed");
        };
        assert_eq!(n1.request_id(), id);
        assert_eq!(n2.request_id(), id);
    }

    #[test]
    fn receiver_count_tracks_subscribers() {
        let bus = EventBus::new(16);
        let rx = bus.subscribe();
        assert_eq!(bus.receiver_count(), 1);
        drop(rx);
        assert_eq!(bus.receiver_count(), 0);
    }
}
