//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`EventBus`] is shared via `Arc<EventBus>` across the application.
//! Publishing never blocks and never fails: with no subscribers the event
//! is simply dropped.

use chrono::{DateTime, Utc};
use rsvp_core::types::DbId;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Default buffer per subscriber before lagging receivers lose events.
const DEFAULT_CAPACITY: usize = 256;

/// What happened to a registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegistrationEventKind {
    Confirmed,
    Waitlisted,
    Cancelled,
}

/// A registration lifecycle event.
///
/// Carries everything a notification subscriber needs to compose a
/// message; the core does not format or send anything itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistrationEvent {
    pub kind: RegistrationEventKind,
    pub registration_id: DbId,
    pub event_id: DbId,
    pub confirmation_code: String,
    pub cancellation_token: String,
    /// When the event was published (UTC).
    pub timestamp: DateTime<Utc>,
}

impl RegistrationEvent {
    pub fn new(
        kind: RegistrationEventKind,
        registration_id: DbId,
        event_id: DbId,
        confirmation_code: impl Into<String>,
        cancellation_token: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            registration_id,
            event_id,
            confirmation_code: confirmation_code.into(),
            cancellation_token: cancellation_token.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Central publish/subscribe hub for [`RegistrationEvent`]s.
pub struct EventBus {
    sender: broadcast::Sender<RegistrationEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all current subscribers.
    pub fn publish(&self, event: RegistrationEvent) {
        let receivers = self.sender.receiver_count();
        if self.sender.send(event.clone()).is_err() {
            tracing::trace!(kind = ?event.kind, "no subscribers for registration event");
        } else {
            tracing::debug!(
                kind = ?event.kind,
                registration_id = event.registration_id,
                event_id = event.event_id,
                receivers,
                "published registration event",
            );
        }
    }

    /// Open a new subscription. Each subscriber sees every event published
    /// after it subscribed.
    pub fn subscribe(&self) -> broadcast::Receiver<RegistrationEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn subscriber_receives_published_event() {
        let bus = EventBus::default();
        let mut rx = bus.subscribe();

        bus.publish(RegistrationEvent::new(
            RegistrationEventKind::Confirmed,
            1,
            2,
            "ABC123",
            "token",
        ));

        let event = rx.recv().await.unwrap();
        assert_eq!(event.kind, RegistrationEventKind::Confirmed);
        assert_eq!(event.registration_id, 1);
        assert_eq!(event.event_id, 2);
    }

    #[tokio::test]
    async fn publish_without_subscribers_is_a_noop() {
        let bus = EventBus::default();
        bus.publish(RegistrationEvent::new(
            RegistrationEventKind::Cancelled,
            1,
            2,
            "ABC123",
            "token",
        ));
    }

    #[tokio::test]
    async fn late_subscriber_misses_earlier_events() {
        let bus = EventBus::default();
        bus.publish(RegistrationEvent::new(
            RegistrationEventKind::Waitlisted,
            1,
            2,
            "ABC123",
            "token",
        ));

        let mut rx = bus.subscribe();
        bus.publish(RegistrationEvent::new(
            RegistrationEventKind::Confirmed,
            3,
            2,
            "DEF456",
            "token2",
        ));

        let event = rx.recv().await.unwrap();
        assert_eq!(event.registration_id, 3);
        assert!(rx.try_recv().is_err());
    }
}
