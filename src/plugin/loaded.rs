//! Loaded Plugin Entity

use std::path::{Path, PathBuf};
use chrono::{DateTime, Utc};
use crate::plugin::traits::{CatalogedPlugin, PluginStatus, PluginType};

/// A plugin that a manager has successfully loaded
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedPlugin {
    name: String,
    version: i32,
    plugin_type: PluginType,
    status: PluginStatus,
    path: PathBuf,
    loaded_at: DateTime<Utc>,
}

impl LoadedPlugin {
    /// Create a loaded plugin stamped with the current time
    pub fn new<S: Into<String>, P: Into<PathBuf>>(
        name: S,
        version: i32,
        plugin_type: PluginType,
        path: P,
    ) -> Self {
        Self {
            name: name.into(),
            version,
            plugin_type,
            status: PluginStatus::Loaded,
            path: path.into(),
            loaded_at: Utc::now(),
        }
    }

    /// Override the load time
    pub fn with_loaded_at(mut self, loaded_at: DateTime<Utc>) -> Self {
        self.loaded_at = loaded_at;
        self
    }

    pub fn plugin_type(&self) -> PluginType {
        self.plugin_type
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }
}

impl CatalogedPlugin for LoadedPlugin {
    fn name(&self) -> &str {
        &self.name
    }

    fn version(&self) -> i32 {
        self.version
    }

    fn type_name(&self) -> &str {
        self.plugin_type.as_str()
    }

    fn status(&self) -> &str {
        self.status.as_str()
    }

    fn loaded_timestamp(&self) -> i64 {
        self.loaded_at.timestamp()
    }
}
