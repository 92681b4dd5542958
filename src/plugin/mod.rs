//! Plugin Module
//!
//! Types shared between the control plane and plugin managers: the
//! `CatalogedPlugin` contract, the `LoadedPlugin` entity, launch arguments and
//! the `ManagesPlugins` collaborator trait.
//!
//! # Example Usage
//!
//! ```no_run
//! use std::path::Path;
//! use pulse_control::plugin::{ExecutablePluginManager, ManagesPlugins, PluginArgs, CatalogedPlugin};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let manager = ExecutablePluginManager::new(PluginArgs::default());
//! let plugin = manager.load_plugin(Path::new("/opt/pulse/plugins/collector-cpu-v1")).await?;
//! println!("{} v{}", plugin.name(), plugin.version());
//! # Ok(())
//! # }
//! ```

pub mod traits;
pub mod error;
pub mod loaded;
pub mod args;
pub mod manager;

pub use traits::{CatalogedPlugin, PluginIdentity, PluginType, PluginStatus};
pub use error::{PluginError, PluginResult};
pub use loaded::LoadedPlugin;
pub use args::{PluginArgs, ControlPublicKey, DEFAULT_PLUGIN_LOG_PATH};
pub use manager::{ManagesPlugins, ExecutablePluginManager};
