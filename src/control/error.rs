//! Control Plane Error Types
//!
//! Recoverable faults are returned as `ControlError`. Invariant violations are
//! `FatalFault`s and never travel through the `Result` channel.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;
use crate::plugin::error::PluginError;
use crate::plugin::traits::PluginIdentity;

/// Result type for control plane operations
pub type ControlResult<T> = Result<T, ControlError>;

/// Phase of a swap that failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwapPhase {
    /// Loading the incoming plugin; nothing changed
    LoadIncoming,
    /// Unloading the outgoing plugin; the incoming plugin was rolled back
    UnloadOutgoing,
}

impl fmt::Display for SwapPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SwapPhase::LoadIncoming => f.write_str("loading incoming plugin"),
            SwapPhase::UnloadOutgoing => f.write_str("unloading outgoing plugin"),
        }
    }
}

/// Recoverable control plane errors.
///
/// Every variant except `RollbackFailed` means no state change occurred.
#[derive(Error, Debug, Clone)]
pub enum ControlError {
    /// Mutating call made while the control plane is stopped
    #[error("Must start plugin control before calling {operation}()")]
    NotStarted { operation: &'static str },

    /// Plugin manager rejected the load
    #[error("Failed to load plugin from {}: {source}", path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: PluginError,
    },

    /// Plugin manager could not unload the target
    #[error("Failed to unload plugin {plugin}: {source}")]
    Unload {
        plugin: PluginIdentity,
        #[source]
        source: PluginError,
    },

    /// Swap failed and the catalog is unchanged
    #[error("Swap failed while {phase}: {source}")]
    Swap {
        phase: SwapPhase,
        #[source]
        source: Box<ControlError>,
    },

    /// Swap rollback failed; the catalog may no longer match the plugin manager
    #[error("Failed to rollback after error: {rollback} -- {unload}")]
    RollbackFailed {
        unload: Box<ControlError>,
        rollback: Box<ControlError>,
    },
}

impl ControlError {
    /// Create a not started error
    pub fn not_started(operation: &'static str) -> Self {
        Self::NotStarted { operation }
    }

    /// Create a load error
    pub fn load<P: Into<PathBuf>>(path: P, source: PluginError) -> Self {
        Self::Load { path: path.into(), source }
    }

    /// Create an unload error
    pub fn unload(plugin: PluginIdentity, source: PluginError) -> Self {
        Self::Unload { plugin, source }
    }

    /// Wrap an error raised during a swap phase
    pub fn swap(phase: SwapPhase, source: ControlError) -> Self {
        Self::Swap { phase, source: Box::new(source) }
    }

    /// Create a rollback failure carrying both underlying errors
    pub fn rollback_failed(unload: ControlError, rollback: ControlError) -> Self {
        Self::RollbackFailed { unload: Box::new(unload), rollback: Box::new(rollback) }
    }

    /// The plugin manager error behind this fault, if any.
    ///
    /// For `RollbackFailed` this is the original unload error.
    pub fn plugin_error(&self) -> Option<&PluginError> {
        match self {
            ControlError::NotStarted { .. } => None,
            ControlError::Load { source, .. } | ControlError::Unload { source, .. } => Some(source),
            ControlError::Swap { source, .. } => source.plugin_error(),
            ControlError::RollbackFailed { unload, .. } => unload.plugin_error(),
        }
    }

    /// False only when the catalog may disagree with the plugin manager
    pub fn is_consistent(&self) -> bool {
        !matches!(self, ControlError::RollbackFailed { .. })
    }
}

/// Unrecoverable invariant violations.
///
/// These are escalated with `std::panic::panic_any` so a supervisor can catch
/// the unwind and downcast the payload to `FatalFault`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FatalFault {
    /// Unsubscribe without a matching subscribe
    #[error("Subscription count for '{key}' would fall below zero")]
    SubscriptionUnderflow { key: String },
}

impl FatalFault {
    pub fn subscription_underflow<S: Into<String>>(key: S) -> Self {
        Self::SubscriptionUnderflow { key: key.into() }
    }
}
