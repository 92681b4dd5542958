//! Plugin Error Types
//!
//! Errors raised by plugin managers while validating, loading and unloading
//! plugin executables.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for plugin operations
pub type PluginResult<T> = Result<T, PluginError>;

/// Error types for plugin manager operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PluginError {
    /// Plugin loading error
    #[error("Plugin loading error for {}: {message}", path.display())]
    LoadingFailed { path: PathBuf, message: String },

    /// Path exists but cannot be run as a plugin
    #[error("Invalid plugin executable {}: {message}", path.display())]
    InvalidExecutable { path: PathBuf, message: String },

    /// A plugin with the same identity is already loaded
    #[error("Plugin already loaded: {plugin}")]
    AlreadyLoaded { plugin: String },

    /// Plugin not found
    #[error("Plugin not found: {plugin}")]
    PluginNotFound { plugin: String },

    /// Plugin unloading error
    #[error("Plugin unloading error for {plugin}: {message}")]
    UnloadFailed { plugin: String, message: String },

    /// IO error
    #[error("IO error: {message}")]
    Io { message: String },
}

impl PluginError {
    /// Create a loading failed error
    pub fn loading_failed<P: Into<PathBuf>, S: Into<String>>(path: P, message: S) -> Self {
        Self::LoadingFailed { path: path.into(), message: message.into() }
    }

    /// Create an invalid executable error
    pub fn invalid_executable<P: Into<PathBuf>, S: Into<String>>(path: P, message: S) -> Self {
        Self::InvalidExecutable { path: path.into(), message: message.into() }
    }

    /// Create an already loaded error
    pub fn already_loaded<S: Into<String>>(plugin: S) -> Self {
        Self::AlreadyLoaded { plugin: plugin.into() }
    }

    /// Create a plugin not found error
    pub fn plugin_not_found<S: Into<String>>(plugin: S) -> Self {
        Self::PluginNotFound { plugin: plugin.into() }
    }

    /// Create an unload failed error
    pub fn unload_failed<S: Into<String>, M: Into<String>>(plugin: S, message: M) -> Self {
        Self::UnloadFailed { plugin: plugin.into(), message: message.into() }
    }
}

impl From<std::io::Error> for PluginError {
    fn from(err: std::io::Error) -> Self {
        PluginError::Io { message: err.to_string() }
    }
}
