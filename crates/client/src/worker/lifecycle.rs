//! Worker lifecycle states.

use serde::{Deserialize, Serialize};

/// Where the worker is in the install/activate lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum LifecycleState {
    /// Registered, install not yet run.
    Parsed,
    /// Precache population in progress.
    Installing,
    /// Installed, waiting for activation.
    Waiting,
    /// Stale stores being purged.
    Activating,
    /// Controlling pages and intercepting fetches.
    Active,
    /// Install failed; install may be retried.
    Redundant,
}

impl LifecycleState {
    /// Only an active worker controls pages.
    pub fn can_intercept_fetch(&self) -> bool {
        matches!(self, LifecycleState::Active)
    }

    pub fn can_install(&self) -> bool {
        matches!(self, LifecycleState::Parsed | LifecycleState::Redundant)
    }

    pub fn can_activate(&self) -> bool {
        matches!(self, LifecycleState::Waiting)
    }
}

impl std::fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LifecycleState::Parsed => write!(f, "parsed"),
            LifecycleState::Installing => write!(f, "installing"),
            LifecycleState::Waiting => write!(f, "waiting"),
            LifecycleState::Activating => write!(f, "activating"),
            LifecycleState::Active => write!(f, "active"),
            LifecycleState::Redundant => write!(f, "redundant"),
        }
    }
}
