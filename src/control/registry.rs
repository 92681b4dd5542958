//! Plugin Registry Coordinator
//!
//! Owns the table of loaded plugins. Every load, unload, swap and reconcile
//! runs its plugin manager calls and its table update under one lock, so a
//! catalog snapshot never observes a half-applied change.

use std::path::Path;
use std::sync::Arc;
use log::{debug, error, info, warn};
use tokio::sync::{Mutex, MutexGuard};

use crate::control::error::{ControlError, ControlResult, SwapPhase};
use crate::plugin::manager::ManagesPlugins;
use crate::plugin::traits::{CatalogedPlugin, PluginIdentity};

/// Table of loaded plugins in insertion order
pub type PluginTable = Vec<Arc<dyn CatalogedPlugin>>;

/// Result of a successful swap
#[derive(Debug, Clone)]
pub struct SwapOutcome {
    pub loaded: Arc<dyn CatalogedPlugin>,
    pub unloaded: PluginIdentity,
}

/// Coordinates the plugin manager with the loaded-plugin table
pub struct PluginRegistry {
    manager: Arc<dyn ManagesPlugins>,
    table: Mutex<PluginTable>,
}

impl PluginRegistry {
    pub fn new(manager: Arc<dyn ManagesPlugins>) -> Self {
        Self {
            manager,
            table: Mutex::new(Vec::new()),
        }
    }

    /// Lock the table. Readers must copy what they need while holding it.
    pub(crate) async fn table(&self) -> MutexGuard<'_, PluginTable> {
        self.table.lock().await
    }

    pub async fn len(&self) -> usize {
        self.table.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.table.lock().await.is_empty()
    }

    /// Load a plugin and append it to the table
    pub async fn load(&self, path: &Path) -> ControlResult<Arc<dyn CatalogedPlugin>> {
        let mut table = self.table.lock().await;
        let plugin = self.load_with_manager(path).await?;
        table.push(Arc::clone(&plugin));
        info!("Registered plugin {} from {}", plugin.identity(), path.display());
        Ok(plugin)
    }

    /// Unload a plugin and remove it from the table
    pub async fn unload(&self, target: &dyn CatalogedPlugin) -> ControlResult<PluginIdentity> {
        let mut table = self.table.lock().await;
        let identity = self.unload_with_manager(target).await?;
        Self::remove_entry(&mut table, &identity);
        info!("Deregistered plugin {}", identity);
        Ok(identity)
    }

    /// Replace `out` with the plugin at `in_path`.
    ///
    /// If `out` cannot be unloaded the incoming plugin is unloaded again and
    /// the table is left exactly as it was. If that rollback also fails the
    /// incoming plugin stays in the table, since the manager still holds it,
    /// and `RollbackFailed` is returned.
    pub async fn swap(&self, in_path: &Path, out: &dyn CatalogedPlugin) -> ControlResult<SwapOutcome> {
        let mut table = self.table.lock().await;

        let incoming = self
            .load_with_manager(in_path)
            .await
            .map_err(|e| ControlError::swap(SwapPhase::LoadIncoming, e))?;

        match self.unload_with_manager(out).await {
            Ok(unloaded) => {
                match table.iter().position(|p| p.identity() == unloaded) {
                    Some(index) => table[index] = Arc::clone(&incoming),
                    None => table.push(Arc::clone(&incoming)),
                }
                info!("Swapped plugin {} for {}", unloaded, incoming.identity());
                Ok(SwapOutcome { loaded: incoming, unloaded })
            }
            Err(unload_error) => {
                warn!("Swap of {} failed, rolling back {}: {}",
                      out.identity(), incoming.identity(), unload_error);

                match self.unload_with_manager(incoming.as_ref()).await {
                    Ok(_) => {
                        debug!("Rolled back {}", incoming.identity());
                        Err(ControlError::swap(SwapPhase::UnloadOutgoing, unload_error))
                    }
                    Err(rollback_error) => {
                        table.push(Arc::clone(&incoming));
                        error!("Rollback of {} failed, catalog needs reconciliation: {}",
                               incoming.identity(), rollback_error);
                        Err(ControlError::rollback_failed(unload_error, rollback_error))
                    }
                }
            }
        }
    }

    /// Rebuild the table from the plugin manager's inventory.
    ///
    /// Entries the manager still holds keep their relative order; plugins
    /// unknown to the table are appended. Returns the new table length.
    pub async fn reconcile(&self) -> usize {
        let mut table = self.table.lock().await;
        let held = self.manager.loaded_plugins().await;

        let mut reconciled: PluginTable = table
            .iter()
            .filter(|p| {
                let identity = p.identity();
                held.iter().any(|h| h.identity() == identity)
            })
            .cloned()
            .collect();

        for plugin in held {
            let identity = plugin.identity();
            if !reconciled.iter().any(|p| p.identity() == identity) {
                reconciled.push(Arc::new(plugin));
            }
        }

        info!("Reconciled plugin table with manager: {} -> {} entries", table.len(), reconciled.len());
        *table = reconciled;
        table.len()
    }

    async fn load_with_manager(&self, path: &Path) -> ControlResult<Arc<dyn CatalogedPlugin>> {
        debug!("Loading plugin from {}", path.display());
        match self.manager.load_plugin(path).await {
            Ok(plugin) => Ok(Arc::new(plugin)),
            Err(e) => {
                warn!("Plugin manager rejected {}: {}", path.display(), e);
                Err(ControlError::load(path, e))
            }
        }
    }

    async fn unload_with_manager(&self, target: &dyn CatalogedPlugin) -> ControlResult<PluginIdentity> {
        let identity = target.identity();
        debug!("Unloading plugin {}", identity);
        match self.manager.unload_plugin(target).await {
            Ok(()) => Ok(identity),
            Err(e) => {
                warn!("Plugin manager could not unload {}: {}", identity, e);
                Err(ControlError::unload(identity, e))
            }
        }
    }

    fn remove_entry(table: &mut PluginTable, identity: &PluginIdentity) {
        if let Some(index) = table.iter().position(|p| &p.identity() == identity) {
            table.remove(index);
        }
    }
}
