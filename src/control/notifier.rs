//! Event Notifier
//!
//! Emits control events on the event bus. Callers emit only after the state
//! change committed and after releasing the table and ledger locks; bus
//! failures are logged and never reach the caller.

use std::sync::Arc;
use log::{debug, warn};
use crate::notifications::{ControlEvent, NotificationManager};

pub struct EventNotifier {
    bus: Arc<dyn NotificationManager<ControlEvent>>,
}

impl EventNotifier {
    pub fn new(bus: Arc<dyn NotificationManager<ControlEvent>>) -> Self {
        Self { bus }
    }

    /// The underlying bus, for registering observers
    pub fn bus(&self) -> Arc<dyn NotificationManager<ControlEvent>> {
        Arc::clone(&self.bus)
    }

    pub async fn emit(&self, event: ControlEvent) {
        let name = event.event_name();
        match self.bus.publish(event).await {
            Ok(()) => debug!("Emitted {} event", name),
            Err(e) => warn!("Failed to emit {} event: {}", name, e),
        }
    }
}
