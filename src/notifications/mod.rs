//! Event Bus
//!
//! A generic pub/sub notification system. The control plane publishes
//! `ControlEvent`s through it; observers register `Subscriber`s.
//!
//! # Example Usage
//!
//! ```no_run
//! use pulse_control::notifications::{AsyncNotificationManager, ControlEvent, NotificationManager};
//! use pulse_control::plugin::PluginIdentity;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let manager = AsyncNotificationManager::<ControlEvent>::new();
//!
//! let event = ControlEvent::LoadPlugin { plugin: PluginIdentity::new("collector", "cpu", 1) };
//! manager.publish(event).await?;
//! # Ok(())
//! # }
//! ```

pub mod traits;
pub mod manager;
pub mod events;
pub mod error;


pub use traits::{NotificationManager, Subscriber, DeliveryStats};
pub use manager::{AsyncNotificationManager, SubscriberStats};
pub use events::{ControlEvent, NotificationEvent};
pub use error::{NotificationError, NotificationResult};
