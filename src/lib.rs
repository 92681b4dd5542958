pub mod config;
pub mod logging;
pub mod notifications;
pub mod plugin;
pub mod control;

pub use control::{ControlError, ControlResult, FatalFault, PluginCatalog, PluginControl};
