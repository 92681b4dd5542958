//! Cataloged Plugin Contract
//!
//! The capability set management code uses to know a plugin. The registry
//! stores and hands out plugins only through `CatalogedPlugin`.

use std::fmt;
use std::str::FromStr;
use serde::{Deserialize, Serialize};

/// Public contract for a loaded plugin
pub trait CatalogedPlugin: Send + Sync + fmt::Debug {
    fn name(&self) -> &str;

    fn version(&self) -> i32;

    fn type_name(&self) -> &str;

    fn status(&self) -> &str;

    /// Unix timestamp (seconds) at which the plugin entered the registry
    fn loaded_timestamp(&self) -> i64;

    /// Identity used to match this plugin against the loaded table
    fn identity(&self) -> PluginIdentity {
        PluginIdentity::new(self.type_name(), self.name(), self.version())
    }
}

/// Identifies a plugin by type, name and version
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PluginIdentity {
    pub type_name: String,
    pub name: String,
    pub version: i32,
}

impl PluginIdentity {
    pub fn new<T: Into<String>, N: Into<String>>(type_name: T, name: N, version: i32) -> Self {
        Self {
            type_name: type_name.into(),
            name: name.into(),
            version,
        }
    }
}

impl fmt::Display for PluginIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:v{}", self.type_name, self.name, self.version)
    }
}

/// Plugin type classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PluginType {
    /// Gathers metrics
    Collector,
    /// Transforms collected metrics
    Processor,
    /// Sends metrics to an external sink
    Publisher,
}

impl PluginType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PluginType::Collector => "collector",
            PluginType::Processor => "processor",
            PluginType::Publisher => "publisher",
        }
    }
}

impl fmt::Display for PluginType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PluginType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "collector" => Ok(PluginType::Collector),
            "processor" => Ok(PluginType::Processor),
            "publisher" => Ok(PluginType::Publisher),
            _ => Err(format!("Invalid plugin type: {}. Valid options: collector, processor, publisher", s)),
        }
    }
}

/// Runtime status of a plugin known to a manager
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PluginStatus {
    Loaded,
}

impl PluginStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PluginStatus::Loaded => "loaded",
        }
    }
}
