//! Control Plane Configuration
//!
//! Settings for plugin launch arguments and the event bus. Values normally
//! come from the `[control]` and `[events]` sections of the configuration
//! file via `ConfigManager::get_control_config`.
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use pulse_control::control::config::ControlConfig;
//!
//! let config = ControlConfig::builder()
//!     .with_plugin_log_path("/var/log/pulse/plugins.log")
//!     .with_event_timeout(Duration::from_secs(2))
//!     .build()?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::notifications::{AsyncNotificationManager, NotificationEvent};
use crate::notifications::manager::{DEFAULT_DELIVERY_TIMEOUT, DEFAULT_MAX_SUBSCRIBERS};
use crate::plugin::args::{ControlPublicKey, PluginArgs, DEFAULT_PLUGIN_LOG_PATH};

/// Control plane configuration parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlConfig {
    /// Log file handed to plugins at launch
    pub plugin_log_path: PathBuf,

    /// File holding the control public key, reserved for plugin authentication
    pub control_public_key_file: Option<PathBuf>,

    /// Per-subscriber event delivery timeout
    pub event_timeout: Duration,

    /// Maximum number of event subscribers (None for unlimited)
    pub max_event_subscribers: Option<usize>,
}

/// Configuration validation error
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Event delivery timeout must be greater than zero")]
    InvalidEventTimeout,
    #[error("Maximum event subscribers must be greater than zero")]
    InvalidMaxSubscribers,
    #[error("Plugin log path must not be empty")]
    EmptyPluginLogPath,
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            plugin_log_path: PathBuf::from(DEFAULT_PLUGIN_LOG_PATH),
            control_public_key_file: None,
            event_timeout: DEFAULT_DELIVERY_TIMEOUT,
            max_event_subscribers: Some(DEFAULT_MAX_SUBSCRIBERS),
        }
    }
}

impl ControlConfig {
    pub fn builder() -> ControlConfigBuilder {
        ControlConfigBuilder {
            config: ControlConfig::default(),
        }
    }

    /// Validate configuration parameters
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.event_timeout.is_zero() {
            return Err(ConfigError::InvalidEventTimeout);
        }

        if self.max_event_subscribers == Some(0) {
            return Err(ConfigError::InvalidMaxSubscribers);
        }

        if self.plugin_log_path.as_os_str().is_empty() {
            return Err(ConfigError::EmptyPluginLogPath);
        }

        Ok(())
    }

    /// Build plugin launch arguments, reading the public key file if configured
    pub fn launch_args(&self) -> Result<PluginArgs> {
        let mut args = PluginArgs::new(self.plugin_log_path.clone());

        if let Some(key_file) = &self.control_public_key_file {
            let bytes = fs::read(key_file)
                .with_context(|| format!("Failed to read control public key: {}", key_file.display()))?;
            args = args.with_control_public_key(ControlPublicKey::from_bytes(bytes));
        }

        Ok(args)
    }

    /// Create an event bus with the configured delivery settings
    pub fn event_bus<T: NotificationEvent>(&self) -> AsyncNotificationManager<T> {
        AsyncNotificationManager::with_config(self.event_timeout, self.max_event_subscribers)
    }
}

/// Builder for `ControlConfig`
#[derive(Debug, Clone)]
pub struct ControlConfigBuilder {
    config: ControlConfig,
}

impl ControlConfigBuilder {
    pub fn with_plugin_log_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.config.plugin_log_path = path.into();
        self
    }

    pub fn with_control_public_key_file<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.config.control_public_key_file = Some(path.into());
        self
    }

    pub fn with_event_timeout(mut self, timeout: Duration) -> Self {
        self.config.event_timeout = timeout;
        self
    }

    pub fn with_max_event_subscribers(mut self, max: Option<usize>) -> Self {
        self.config.max_event_subscribers = max;
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<ControlConfig, ConfigError> {
        self.config.validate()?;
        Ok(self.config)
    }
}
