//! Plugin Control
//!
//! The control plane facade. `PluginControl` gates every mutation on its
//! lifecycle state, coordinates plugin loads, unloads and swaps with the
//! plugin manager, keeps metric subscription counts and emits a
//! `ControlEvent` for each change that took effect.
//!
//! # Example Usage
//!
//! ```no_run
//! use std::path::Path;
//! use pulse_control::control::{PluginControl, config::ControlConfig};
//!
//! # #[tokio::main]
//! # async fn main() -> anyhow::Result<()> {
//! let control = PluginControl::from_config(&ControlConfig::default())?;
//! control.start();
//!
//! control.load(Path::new("/opt/pulse/plugins/collector-cpu-v1")).await?;
//! control.subscribe_metric(["intel", "cpu", "percent"]).await?;
//!
//! for plugin in control.plugin_catalog().await.iter() {
//!     println!("{} v{} ({})", plugin.name(), plugin.version(), plugin.status());
//! }
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod lifecycle;
pub mod registry;
pub mod subscriptions;
pub mod notifier;
pub mod catalog;
pub mod config;

#[cfg(test)]
mod tests;

use std::path::Path;
use std::sync::Arc;
use log::{debug, error};

use crate::notifications::{ControlEvent, NotificationManager};
use crate::plugin::{CatalogedPlugin, ExecutablePluginManager, ManagesPlugins, PluginArgs};

pub use error::{ControlError, ControlResult, FatalFault, SwapPhase};
pub use lifecycle::{LifecycleGate, LifecycleState};
pub use registry::{PluginRegistry, SwapOutcome};
pub use subscriptions::{MetricKey, MetricNamespace, SubscriptionLedger};
pub use notifier::EventNotifier;
pub use catalog::PluginCatalog;
pub use config::ControlConfig;

/// Control plane facade shared by management tooling
pub struct PluginControl {
    gate: LifecycleGate,
    registry: PluginRegistry,
    subscriptions: SubscriptionLedger,
    notifier: EventNotifier,
    args: PluginArgs,
}

impl PluginControl {
    /// Create a stopped control plane around the given collaborators
    pub fn new(
        manager: Arc<dyn ManagesPlugins>,
        bus: Arc<dyn NotificationManager<ControlEvent>>,
        args: PluginArgs,
    ) -> Self {
        Self {
            gate: LifecycleGate::new(),
            registry: PluginRegistry::new(manager),
            subscriptions: SubscriptionLedger::new(),
            notifier: EventNotifier::new(bus),
            args,
        }
    }

    /// Create a stopped control plane with an `ExecutablePluginManager` and an
    /// event bus built from `config`
    pub fn from_config(config: &ControlConfig) -> anyhow::Result<Self> {
        config.validate()?;
        let args = config.launch_args()?;
        let manager = Arc::new(ExecutablePluginManager::new(args.clone()));
        let bus = Arc::new(config.event_bus::<ControlEvent>());
        Ok(Self::new(manager, bus, args))
    }

    /// Begin accepting load, unload, swap and subscription requests
    pub fn start(&self) {
        self.gate.start();
    }

    pub fn stop(&self) {
        self.gate.stop();
    }

    pub fn is_started(&self) -> bool {
        self.gate.is_running()
    }

    pub fn state(&self) -> LifecycleState {
        self.gate.state()
    }

    /// Launch arguments handed to plugins
    pub fn launch_args(&self) -> &PluginArgs {
        &self.args
    }

    /// Event bus on which control events are published
    pub fn events(&self) -> Arc<dyn NotificationManager<ControlEvent>> {
        self.notifier.bus()
    }

    /// Load the plugin at `path` and emit `LoadPlugin`
    pub async fn load(&self, path: &Path) -> ControlResult<()> {
        self.gate.ensure_running("load")?;

        let plugin = self.registry.load(path).await?;
        self.notifier
            .emit(ControlEvent::LoadPlugin { plugin: plugin.identity() })
            .await;
        Ok(())
    }

    /// Unload `plugin` and emit `UnloadPlugin`
    pub async fn unload(&self, plugin: &dyn CatalogedPlugin) -> ControlResult<()> {
        self.gate.ensure_running("unload")?;

        let identity = self.registry.unload(plugin).await?;
        self.notifier
            .emit(ControlEvent::UnloadPlugin { plugin: identity })
            .await;
        Ok(())
    }

    /// Replace `out` with the plugin at `in_path` and emit `SwapPlugins`.
    ///
    /// On error nothing changed, except for `ControlError::RollbackFailed`:
    /// the incoming plugin could not be unloaded again, the catalog may not
    /// match the plugin manager, and `reconcile` should be called.
    pub async fn swap(&self, in_path: &Path, out: &dyn CatalogedPlugin) -> ControlResult<()> {
        self.gate.ensure_running("swap")?;

        let outcome = self.registry.swap(in_path, out).await?;
        self.notifier
            .emit(ControlEvent::SwapPlugins {
                loaded: outcome.loaded.identity(),
                unloaded: outcome.unloaded,
            })
            .await;
        Ok(())
    }

    /// Rebuild the catalog from the plugin manager's inventory
    pub async fn reconcile(&self) -> ControlResult<usize> {
        self.gate.ensure_running("reconcile")?;
        Ok(self.registry.reconcile().await)
    }

    /// Add a subscription to `namespace` and emit `MetricSubscription`
    pub async fn subscribe_metric<N: Into<MetricNamespace>>(&self, namespace: N) -> ControlResult<()> {
        self.gate.ensure_running("subscribe_metric")?;

        let namespace = namespace.into();
        let count = self.subscriptions.subscribe(&namespace.key());
        debug!("Subscribed metric {} (count {})", namespace, count);

        self.notifier
            .emit(ControlEvent::MetricSubscription { namespace: namespace.into_segments() })
            .await;
        Ok(())
    }

    /// Drop a subscription to `namespace` and emit `MetricUnsubscription`.
    ///
    /// # Panics
    ///
    /// Panics with a `FatalFault::SubscriptionUnderflow` payload when
    /// `namespace` has no subscription; that means a subscribe/unsubscribe
    /// mismatch elsewhere in the system.
    pub async fn unsubscribe_metric<N: Into<MetricNamespace>>(&self, namespace: N) -> ControlResult<()> {
        self.gate.ensure_running("unsubscribe_metric")?;

        let namespace = namespace.into();
        let count = match self.subscriptions.unsubscribe(&namespace.key()) {
            Ok(count) => count,
            Err(fault) => {
                error!("Fatal: {}", fault);
                std::panic::panic_any(fault);
            }
        };
        debug!("Unsubscribed metric {} (count {})", namespace, count);

        self.notifier
            .emit(ControlEvent::MetricUnsubscription { namespace: namespace.into_segments() })
            .await;
        Ok(())
    }

    /// Current subscription count for `namespace`
    pub fn subscription_count<N: Into<MetricNamespace>>(&self, namespace: N) -> u64 {
        self.subscriptions.count(&namespace.into().key())
    }

    /// Number of metric namespaces with at least one subscription
    pub fn active_subscriptions(&self) -> usize {
        self.subscriptions.len()
    }

    /// Snapshot of the loaded plugins in load order
    pub async fn plugin_catalog(&self) -> PluginCatalog {
        PluginCatalog::capture(&self.registry).await
    }
}
