//! Notification Event Types
//!
//! Events broadcast by the control plane after a state change has taken
//! effect. Events are immutable values.

use serde::{Deserialize, Serialize};
use crate::plugin::traits::PluginIdentity;

/// Base trait for all notification events
pub trait NotificationEvent: Send + Sync + Clone + std::fmt::Debug + 'static {}

/// Control plane lifecycle and subscription events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ControlEvent {
    /// A plugin was loaded into the registry
    LoadPlugin {
        plugin: PluginIdentity,
    },

    /// A plugin was removed from the registry
    UnloadPlugin {
        plugin: PluginIdentity,
    },

    /// A plugin was atomically replaced by another
    SwapPlugins {
        loaded: PluginIdentity,
        unloaded: PluginIdentity,
    },

    /// A metric gained a subscriber
    MetricSubscription {
        namespace: Vec<String>,
    },

    /// A metric lost a subscriber
    MetricUnsubscription {
        namespace: Vec<String>,
    },
}

impl NotificationEvent for ControlEvent {}

impl ControlEvent {
    /// Short event name for logging
    pub fn event_name(&self) -> &'static str {
        match self {
            ControlEvent::LoadPlugin { .. } => "load_plugin",
            ControlEvent::UnloadPlugin { .. } => "unload_plugin",
            ControlEvent::SwapPlugins { .. } => "swap_plugins",
            ControlEvent::MetricSubscription { .. } => "metric_subscription",
            ControlEvent::MetricUnsubscription { .. } => "metric_unsubscription",
        }
    }

    /// Check if this event concerns plugin lifecycle rather than subscriptions
    pub fn is_plugin_event(&self) -> bool {
        matches!(self,
            ControlEvent::LoadPlugin { .. } |
            ControlEvent::UnloadPlugin { .. } |
            ControlEvent::SwapPlugins { .. }
        )
    }
}
