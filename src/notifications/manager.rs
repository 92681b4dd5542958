//! Generic Async Notification Manager
//!
//! Central coordinator for the event bus. Manages subscriber registration,
//! event routing, delivery timeouts and delivery statistics.
//!
//! Delivery works from a snapshot of the subscriber list taken under the read
//! lock, so a handler may itself publish or (un)subscribe.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime};
use futures::future::join_all;
use log::{debug, error, warn};
use parking_lot::Mutex;
use tokio::sync::RwLock;
use tokio::time::timeout;

use crate::notifications::error::{NotificationError, NotificationResult};
use crate::notifications::events::NotificationEvent;
use crate::notifications::traits::{DeliveryStats, NotificationManager, Subscriber};

/// Default per-delivery timeout
pub const DEFAULT_DELIVERY_TIMEOUT: Duration = Duration::from_secs(5);

/// Default subscriber limit
pub const DEFAULT_MAX_SUBSCRIBERS: usize = 1000;

/// Subscriber with its delivery statistics
struct SubscriberInfo<T>
where
    T: NotificationEvent
{
    subscriber: Arc<dyn Subscriber<T>>,
    stats: Arc<Mutex<SubscriberStats>>,
}

/// Statistics for individual subscribers
#[derive(Debug, Clone, Default)]
pub struct SubscriberStats {
    pub events_received: u64,
    pub events_processed: u64,
    pub processing_failures: u64,
    pub total_processing_time_us: u64,
    pub last_event_at: Option<SystemTime>,
}

/// Generic async notification manager
pub struct AsyncNotificationManager<T>
where
    T: NotificationEvent
{
    subscribers: Arc<RwLock<HashMap<String, SubscriberInfo<T>>>>,
    global_stats: Arc<Mutex<DeliveryStats>>,
    default_timeout: Duration,
    shutdown: Arc<RwLock<bool>>,
    max_subscribers: Option<usize>,
}

impl<T> AsyncNotificationManager<T>
where
    T: NotificationEvent
{
    /// Create a new notification manager
    pub fn new() -> Self {
        Self::with_config(DEFAULT_DELIVERY_TIMEOUT, Some(DEFAULT_MAX_SUBSCRIBERS))
    }

    /// Create a new notification manager with custom configuration
    pub fn with_config(default_timeout: Duration, max_subscribers: Option<usize>) -> Self {
        Self {
            subscribers: Arc::new(RwLock::new(HashMap::new())),
            global_stats: Arc::new(Mutex::new(DeliveryStats::default())),
            default_timeout,
            shutdown: Arc::new(RwLock::new(false)),
            max_subscribers,
        }
    }

    pub fn default_timeout(&self) -> Duration {
        self.default_timeout
    }

    async fn is_shutting_down(&self) -> bool {
        *self.shutdown.read().await
    }

    /// Deliver an event to a single subscriber, recording its statistics
    async fn deliver_to_subscriber(
        subscriber: &dyn Subscriber<T>,
        stats: &Mutex<SubscriberStats>,
        event: T,
        timeout_duration: Duration,
    ) -> NotificationResult<()> {
        let subscriber_id = subscriber.subscriber_id().to_string();

        {
            let mut stats = stats.lock();
            stats.events_received += 1;
            stats.last_event_at = Some(SystemTime::now());
        }

        let start_time = Instant::now();
        let delivery_result = timeout(timeout_duration, subscriber.handle_event(event)).await;
        let processing_time = start_time.elapsed();

        let mut stats = stats.lock();
        stats.total_processing_time_us += processing_time.as_micros() as u64;

        match delivery_result {
            Ok(Ok(())) => {
                stats.events_processed += 1;
                debug!("Delivered event to '{}' in {:?}", subscriber_id, processing_time);
                Ok(())
            }
            Ok(Err(e)) => {
                stats.processing_failures += 1;
                error!("Subscriber '{}' failed to process event: {}", subscriber_id, e);
                Err(NotificationError::delivery_failed(subscriber_id, e.to_string()))
            }
            Err(_) => {
                stats.processing_failures += 1;
                error!("Timeout delivering event to subscriber '{}'", subscriber_id);
                Err(NotificationError::timeout("event_delivery", timeout_duration.as_millis() as u64))
            }
        }
    }

    /// Get subscriber-specific statistics
    pub async fn get_subscriber_stats(&self, subscriber_id: &str) -> Option<SubscriberStats> {
        let subscribers = self.subscribers.read().await;
        subscribers.get(subscriber_id).map(|info| info.stats.lock().clone())
    }

    /// List all subscriber IDs
    pub async fn list_subscribers(&self) -> Vec<String> {
        let subscribers = self.subscribers.read().await;
        subscribers.keys().cloned().collect()
    }

    /// Clear all statistics
    pub async fn clear_stats(&self) {
        *self.global_stats.lock() = DeliveryStats::default();

        let subscribers = self.subscribers.read().await;
        for info in subscribers.values() {
            *info.stats.lock() = SubscriberStats::default();
        }
    }
}

#[async_trait::async_trait]
impl<T> NotificationManager<T> for AsyncNotificationManager<T>
where
    T: NotificationEvent
{
    async fn subscribe(&self, subscriber: Arc<dyn Subscriber<T>>) -> NotificationResult<()> {
        if self.is_shutting_down().await {
            return Err(NotificationError::SystemShutdown);
        }

        let subscriber_id = subscriber.subscriber_id().to_string();
        let mut subscribers = self.subscribers.write().await;

        if let Some(max) = self.max_subscribers {
            if subscribers.len() >= max {
                return Err(NotificationError::SubscriberLimitReached(max));
            }
        }

        if subscribers.contains_key(&subscriber_id) {
            return Err(NotificationError::subscriber_already_exists(subscriber_id));
        }

        subscribers.insert(subscriber_id.clone(), SubscriberInfo {
            subscriber,
            stats: Arc::new(Mutex::new(SubscriberStats::default())),
        });
        debug!("Subscribed '{}' to notifications", subscriber_id);

        Ok(())
    }

    async fn unsubscribe(&self, subscriber_id: &str) -> NotificationResult<()> {
        let mut subscribers = self.subscribers.write().await;

        if subscribers.remove(subscriber_id).is_some() {
            debug!("Unsubscribed '{}' from notifications", subscriber_id);
            Ok(())
        } else {
            Err(NotificationError::subscriber_not_found(subscriber_id))
        }
    }

    async fn publish(&self, event: T) -> NotificationResult<()> {
        if self.is_shutting_down().await {
            return Err(NotificationError::SystemShutdown);
        }

        let targets: Vec<(Arc<dyn Subscriber<T>>, Arc<Mutex<SubscriberStats>>)> = {
            let subscribers = self.subscribers.read().await;
            subscribers
                .values()
                .filter(|info| info.subscriber.should_receive(&event))
                .map(|info| (Arc::clone(&info.subscriber), Arc::clone(&info.stats)))
                .collect()
        };

        let start_time = Instant::now();
        let results = join_all(targets.iter().map(|(subscriber, stats)| {
            Self::deliver_to_subscriber(subscriber.as_ref(), stats, event.clone(), self.default_timeout)
        }))
        .await;

        let mut delivery_count = 0u64;
        let mut failure_count = 0u64;
        for ((subscriber, _), result) in targets.iter().zip(results) {
            match result {
                Ok(()) => delivery_count += 1,
                Err(e) => {
                    failure_count += 1;
                    warn!("Failed to deliver event to '{}': {}", subscriber.subscriber_id(), e);
                }
            }
        }

        let total_time = start_time.elapsed();
        let mut global_stats = self.global_stats.lock();
        global_stats.events_published += 1;
        global_stats.events_delivered += delivery_count;
        global_stats.delivery_failures += failure_count;
        if delivery_count > 0 {
            let avg_time = total_time.as_micros() as u64 / delivery_count;
            global_stats.avg_delivery_time_us = (global_stats.avg_delivery_time_us + avg_time) / 2;
        }

        debug!("Published event to {} subscribers ({} successful, {} failed) in {:?}",
               targets.len(), delivery_count, failure_count, total_time);

        Ok(())
    }

    async fn publish_to(&self, event: T, subscriber_id: &str) -> NotificationResult<()> {
        if self.is_shutting_down().await {
            return Err(NotificationError::SystemShutdown);
        }

        let target = {
            let subscribers = self.subscribers.read().await;
            subscribers
                .get(subscriber_id)
                .map(|info| (Arc::clone(&info.subscriber), Arc::clone(&info.stats)))
        };
        let (subscriber, stats) = target
            .ok_or_else(|| NotificationError::subscriber_not_found(subscriber_id))?;

        let result = Self::deliver_to_subscriber(subscriber.as_ref(), &stats, event, self.default_timeout).await;

        let mut global_stats = self.global_stats.lock();
        global_stats.events_published += 1;
        match &result {
            Ok(()) => global_stats.events_delivered += 1,
            Err(_) => global_stats.delivery_failures += 1,
        }
        result
    }

    async fn subscriber_count(&self) -> usize {
        self.subscribers.read().await.len()
    }

    async fn has_subscriber(&self, subscriber_id: &str) -> bool {
        self.subscribers.read().await.contains_key(subscriber_id)
    }

    async fn shutdown(&self) -> NotificationResult<()> {
        debug!("Shutting down notification manager");

        *self.shutdown.write().await = true;

        let mut subscribers = self.subscribers.write().await;
        let subscriber_count = subscribers.len();
        subscribers.clear();

        debug!("Notification manager shutdown complete ({} subscribers removed)", subscriber_count);
        Ok(())
    }

    async fn get_stats(&self) -> DeliveryStats {
        self.global_stats.lock().clone()
    }
}

impl<T> Default for AsyncNotificationManager<T>
where
    T: NotificationEvent
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for AsyncNotificationManager<T>
where
    T: NotificationEvent
{
    fn clone(&self) -> Self {
        Self {
            subscribers: Arc::clone(&self.subscribers),
            global_stats: Arc::clone(&self.global_stats),
            default_timeout: self.default_timeout,
            shutdown: Arc::clone(&self.shutdown),
            max_subscribers: self.max_subscribers,
        }
    }
}
