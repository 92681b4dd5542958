//! Generic Publisher/Subscriber Traits
//!
//! Core traits for the event bus that decouples the control plane from the
//! observers of its events.

use std::sync::Arc;
use async_trait::async_trait;
use crate::notifications::error::NotificationResult;
use crate::notifications::events::NotificationEvent;

/// Generic subscriber trait for components that handle events
#[async_trait]
pub trait Subscriber<T>: Send + Sync
where
    T: NotificationEvent
{
    /// Handle an incoming event
    async fn handle_event(&self, event: T) -> NotificationResult<()>;

    /// Get the subscriber identifier (must be unique)
    fn subscriber_id(&self) -> &str;

    /// Check if this subscriber should receive the event
    fn should_receive(&self, _event: &T) -> bool {
        true
    }
}

/// Generic notification manager trait
#[async_trait]
pub trait NotificationManager<T>: Send + Sync
where
    T: NotificationEvent
{
    /// Subscribe a component to receive events
    async fn subscribe(&self, subscriber: Arc<dyn Subscriber<T>>) -> NotificationResult<()>;

    /// Unsubscribe a component from receiving events
    async fn unsubscribe(&self, subscriber_id: &str) -> NotificationResult<()>;

    /// Publish an event to all subscribers
    async fn publish(&self, event: T) -> NotificationResult<()>;

    /// Publish an event to a specific subscriber
    async fn publish_to(&self, event: T, subscriber_id: &str) -> NotificationResult<()>;

    /// Get the number of active subscribers
    async fn subscriber_count(&self) -> usize;

    /// Check if a subscriber exists
    async fn has_subscriber(&self, subscriber_id: &str) -> bool;

    /// Shutdown the notification manager
    async fn shutdown(&self) -> NotificationResult<()>;

    /// Get delivery statistics
    async fn get_stats(&self) -> DeliveryStats;
}

/// Statistics about notification delivery
#[derive(Debug, Clone, Default)]
pub struct DeliveryStats {
    /// Total events published
    pub events_published: u64,

    /// Total events delivered successfully
    pub events_delivered: u64,

    /// Total delivery failures
    pub delivery_failures: u64,

    /// Average delivery time in microseconds
    pub avg_delivery_time_us: u64,
}
