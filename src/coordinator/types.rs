//! Identifiers and small enums shared by coordinators and routers.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::traits::PresentStyle;

/// Opaque identity of one coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CoordinatorId(Uuid);

impl CoordinatorId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for CoordinatorId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CoordinatorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Where a coordinator puts its screen. Fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresentationMode {
    /// Replace the whole stack
    Root,
    /// Push onto the current stack
    Push,
    /// Present modally over the current stack
    Present(PresentStyle),
}

/// Lifecycle of a coordinator activation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinatorState {
    NotStarted,
    Active,
    Completed,
}

impl fmt::Display for CoordinatorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoordinatorState::NotStarted => write!(f, "not_started"),
            CoordinatorState::Active => write!(f, "active"),
            CoordinatorState::Completed => write!(f, "completed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_unique() {
        assert_ne!(CoordinatorId::new(), CoordinatorId::new());
    }

    #[test]
    fn test_id_display_is_uuid() {
        let id = CoordinatorId::new();
        assert_eq!(id.to_string(), id.as_uuid().to_string());
    }

    #[test]
    fn test_id_serializes_as_uuid_string() {
        let id = CoordinatorId::new();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", id));
        assert_eq!(serde_json::from_str::<CoordinatorId>(&json).unwrap(), id);
    }
}
