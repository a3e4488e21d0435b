//! Value types shared by the gating registry and its callers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Precondition tag an action can be gated behind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockerType {
    /// A registered, signed-in user.
    Authentication,
    /// No credential refresh in flight.
    RenewAuthentication,
}

impl BlockerType {
    pub const ALL: [BlockerType; 2] = [BlockerType::Authentication, BlockerType::RenewAuthentication];

    pub fn as_str(&self) -> &'static str {
        match self {
            BlockerType::Authentication => "authentication",
            BlockerType::RenewAuthentication => "renew_authentication",
        }
    }
}

impl fmt::Display for BlockerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a gated continuation is released.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Release {
    Proceed,
    Cancelled,
}

impl Release {
    pub fn is_proceed(&self) -> bool {
        matches!(self, Release::Proceed)
    }
}

/// Result of [`ActionGatingRegistry::guard`](super::ActionGatingRegistry::guard).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardOutcome {
    /// The precondition held and the action already ran.
    Executed,
    /// The action is queued until the next resume or cancel.
    Suspended { sequence: u64 },
}

impl GuardOutcome {
    pub fn is_suspended(&self) -> bool {
        matches!(self, GuardOutcome::Suspended { .. })
    }
}

/// A gated action waiting for its precondition.
pub type Continuation = Box<dyn FnOnce(Release) + Send + 'static>;

/// Evaluated under the blocker's lock; must not call back into the registry.
pub type Precondition = Box<dyn Fn() -> bool + Send + Sync + 'static>;

/// Notified after an action was suspended, outside every registry lock.
pub type SuspendListener = std::sync::Arc<dyn Fn(BlockerType, u64) + Send + Sync + 'static>;
