//! Plugin Manager
//!
//! The `ManagesPlugins` trait is the seam between the control plane and
//! whatever actually validates, launches and terminates plugin executables.
//! `ExecutablePluginManager` is the default implementation: it validates
//! plugin files and keeps an inventory, leaving process execution to the
//! execution layer that consumes its `PluginArgs`.

use std::path::Path;
use async_trait::async_trait;
use log::{debug, info};
use parking_lot::Mutex;
use tokio::fs;

use crate::plugin::args::PluginArgs;
use crate::plugin::error::{PluginError, PluginResult};
use crate::plugin::loaded::LoadedPlugin;
use crate::plugin::traits::{CatalogedPlugin, PluginType};

/// Loads and unloads plugins on behalf of the control plane
#[async_trait]
pub trait ManagesPlugins: Send + Sync {
    /// Validate and load the plugin at `path`
    async fn load_plugin(&self, path: &Path) -> PluginResult<LoadedPlugin>;

    /// Unload the plugin identified by `plugin`
    async fn unload_plugin(&self, plugin: &dyn CatalogedPlugin) -> PluginResult<()>;

    /// Plugins the manager currently holds
    async fn loaded_plugins(&self) -> Vec<LoadedPlugin>;
}

/// Default manager for executable plugins
pub struct ExecutablePluginManager {
    args: PluginArgs,
    loaded: Mutex<Vec<LoadedPlugin>>,
}

impl ExecutablePluginManager {
    pub fn new(args: PluginArgs) -> Self {
        Self {
            args,
            loaded: Mutex::new(Vec::new()),
        }
    }

    /// Launch arguments handed to the execution layer
    pub fn args(&self) -> &PluginArgs {
        &self.args
    }

    async fn validate_executable(path: &Path) -> PluginResult<()> {
        let metadata = fs::metadata(path)
            .await
            .map_err(|e| PluginError::loading_failed(path, e.to_string()))?;

        if !metadata.is_file() {
            return Err(PluginError::invalid_executable(path, "not a regular file"));
        }

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if metadata.permissions().mode() & 0o111 == 0 {
                return Err(PluginError::invalid_executable(path, "missing execute permission"));
            }
        }

        Ok(())
    }
}

/// Derive type, name and version from a plugin file name.
///
/// Accepts `[<type>-]<name>[-v<version>]`; the type defaults to collector and
/// the version to 1.
pub fn parse_plugin_file_name(path: &Path) -> PluginResult<(PluginType, String, i32)> {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| PluginError::invalid_executable(path, "file name is not valid UTF-8"))?;

    let mut parts: Vec<&str> = stem.split('-').collect();

    let plugin_type = match parts.first().map(|p| p.parse::<PluginType>()) {
        Some(Ok(plugin_type)) if parts.len() > 1 => {
            parts.remove(0);
            plugin_type
        }
        _ => PluginType::Collector,
    };

    let mut version = 1;
    if parts.len() > 1 {
        if let Some(parsed) = parts
            .last()
            .and_then(|p| p.strip_prefix('v'))
            .and_then(|v| v.parse::<i32>().ok())
        {
            version = parsed;
            parts.pop();
        }
    }

    let name = parts.join("-");
    if name.is_empty() {
        return Err(PluginError::invalid_executable(path, "cannot derive plugin name from file name"));
    }

    Ok((plugin_type, name, version))
}

#[async_trait]
impl ManagesPlugins for ExecutablePluginManager {
    async fn load_plugin(&self, path: &Path) -> PluginResult<LoadedPlugin> {
        debug!("Validating plugin executable: {}", path.display());
        Self::validate_executable(path).await?;

        let (plugin_type, name, version) = parse_plugin_file_name(path)?;
        let plugin = LoadedPlugin::new(name, version, plugin_type, path);
        let identity = plugin.identity();

        let mut loaded = self.loaded.lock();
        if loaded.iter().any(|p| p.identity() == identity) {
            return Err(PluginError::already_loaded(identity.to_string()));
        }
        loaded.push(plugin.clone());

        info!("Loaded plugin {} (log: {})", identity, self.args.plugin_log_path.display());
        Ok(plugin)
    }

    async fn unload_plugin(&self, plugin: &dyn CatalogedPlugin) -> PluginResult<()> {
        let identity = plugin.identity();
        let mut loaded = self.loaded.lock();

        let position = loaded
            .iter()
            .position(|p| p.identity() == identity)
            .ok_or_else(|| PluginError::plugin_not_found(identity.to_string()))?;
        loaded.remove(position);

        info!("Unloaded plugin {}", identity);
        Ok(())
    }

    async fn loaded_plugins(&self) -> Vec<LoadedPlugin> {
        self.loaded.lock().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::tempdir;

    fn write_plugin(dir: &Path, file_name: &str, executable: bool) -> PathBuf {
        let path = dir.join(file_name);
        std::fs::write(&path, b"#!/bin/sh\nexit 0\n").unwrap();
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = if executable { 0o755 } else { 0o644 };
            std::fs::set_permissions(&path, std::fs::Permissions::from_mode(mode)).unwrap();
        }
        #[cfg(not(unix))]
        let _ = executable;
        path
    }

    #[test]
    fn test_parse_plugin_file_name() {
        let (plugin_type, name, version) = parse_plugin_file_name(Path::new("/p/collector-cpu-v2")).unwrap();
        assert_eq!(plugin_type, PluginType::Collector);
        assert_eq!(name, "cpu");
        assert_eq!(version, 2);

        let (plugin_type, name, version) = parse_plugin_file_name(Path::new("/p/publisher-influx-db")).unwrap();
        assert_eq!(plugin_type, PluginType::Publisher);
        assert_eq!(name, "influx-db");
        assert_eq!(version, 1);

        let (plugin_type, name, version) = parse_plugin_file_name(Path::new("/p/memory")).unwrap();
        assert_eq!(plugin_type, PluginType::Collector);
        assert_eq!(name, "memory");
        assert_eq!(version, 1);

        // A lone type word is a name, not a type prefix
        let (_, name, _) = parse_plugin_file_name(Path::new("/p/processor")).unwrap();
        assert_eq!(name, "processor");

        let (_, name, version) = parse_plugin_file_name(Path::new("/p/v2")).unwrap();
        assert_eq!(name, "v2");
        assert_eq!(version, 1);
    }

    #[test]
    fn test_parse_rejects_empty_name() {
        assert!(parse_plugin_file_name(Path::new("/p/collector--v3")).is_err());
    }

    #[tokio::test]
    async fn test_load_and_unload_executable() {
        let dir = tempdir().unwrap();
        let path = write_plugin(dir.path(), "collector-cpu-v1", true);
        let manager = ExecutablePluginManager::new(PluginArgs::default());

        let plugin = manager.load_plugin(&path).await.unwrap();
        assert_eq!(plugin.name(), "cpu");
        assert_eq!(manager.loaded_plugins().await.len(), 1);

        manager.unload_plugin(&plugin).await.unwrap();
        assert!(manager.loaded_plugins().await.is_empty());
    }

    #[tokio::test]
    async fn test_load_missing_path() {
        let manager = ExecutablePluginManager::new(PluginArgs::default());
        let result = manager.load_plugin(Path::new("/nonexistent/collector-cpu")).await;
        assert!(matches!(result, Err(PluginError::LoadingFailed { .. })));
    }

    #[tokio::test]
    async fn test_load_directory_rejected() {
        let dir = tempdir().unwrap();
        let manager = ExecutablePluginManager::new(PluginArgs::default());
        let result = manager.load_plugin(dir.path()).await;
        assert!(matches!(result, Err(PluginError::InvalidExecutable { .. })));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_load_non_executable_rejected() {
        let dir = tempdir().unwrap();
        let path = write_plugin(dir.path(), "collector-cpu", false);
        let manager = ExecutablePluginManager::new(PluginArgs::default());
        let result = manager.load_plugin(&path).await;
        assert!(matches!(result, Err(PluginError::InvalidExecutable { .. })));
    }

    #[tokio::test]
    async fn test_duplicate_load_rejected() {
        let dir = tempdir().unwrap();
        let path = write_plugin(dir.path(), "collector-cpu", true);
        let manager = ExecutablePluginManager::new(PluginArgs::default());

        manager.load_plugin(&path).await.unwrap();
        let result = manager.load_plugin(&path).await;
        assert!(matches!(result, Err(PluginError::AlreadyLoaded { .. })));
        assert_eq!(manager.loaded_plugins().await.len(), 1);
    }

    #[tokio::test]
    async fn test_unload_unknown_plugin() {
        let manager = ExecutablePluginManager::new(PluginArgs::default());
        let stranger = LoadedPlugin::new("disk", 1, PluginType::Collector, "/p/collector-disk");
        let result = manager.unload_plugin(&stranger).await;
        assert!(matches!(result, Err(PluginError::PluginNotFound { .. })));
    }
}
