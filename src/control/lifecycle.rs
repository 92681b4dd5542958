//! Lifecycle Gate

use std::fmt;
use log::info;
use parking_lot::RwLock;
use crate::control::error::{ControlError, ControlResult};

/// Control plane lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LifecycleState {
    #[default]
    Stopped,
    Running,
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LifecycleState::Stopped => f.write_str("stopped"),
            LifecycleState::Running => f.write_str("running"),
        }
    }
}

/// Guards every mutating operation on the control plane
#[derive(Debug, Default)]
pub struct LifecycleGate {
    state: RwLock<LifecycleState>,
}

impl LifecycleGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Transition to running. Idempotent.
    pub fn start(&self) {
        let mut state = self.state.write();
        if *state != LifecycleState::Running {
            info!("Plugin control started");
        }
        *state = LifecycleState::Running;
    }

    /// Transition to stopped. Idempotent.
    pub fn stop(&self) {
        let mut state = self.state.write();
        if *state != LifecycleState::Stopped {
            info!("Plugin control stopped");
        }
        *state = LifecycleState::Stopped;
    }

    pub fn state(&self) -> LifecycleState {
        *self.state.read()
    }

    pub fn is_running(&self) -> bool {
        self.state() == LifecycleState::Running
    }

    /// Fail with `NotStarted` unless running
    pub fn ensure_running(&self, operation: &'static str) -> ControlResult<()> {
        if self.is_running() {
            Ok(())
        } else {
            Err(ControlError::not_started(operation))
        }
    }
}
