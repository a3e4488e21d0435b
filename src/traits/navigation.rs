//! Navigation host trait abstraction.
//!
//! The host application renders screens; the core only decides which screen
//! comes next and listens for the moment it goes away.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::Credentials;

/// Identifier of one presented screen.
pub type ScreenId = Uuid;

/// Which screen the host should render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScreenKind {
    /// The host's login UI
    Login,
    /// Reason picker shown before a comment is reported
    ReportReason,
    /// Appeal form for a moderated commenter
    CommenterAppeal,
    /// The conversation itself
    Conversation,
}

/// Everything the host needs to build a screen.
#[derive(Debug, Clone, PartialEq)]
pub struct ScreenDescriptor {
    pub id: ScreenId,
    pub kind: ScreenKind,
    /// Opaque screen input (post id, comment id, ...).
    pub payload: serde_json::Value,
}

impl ScreenDescriptor {
    pub fn new(kind: ScreenKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            payload: serde_json::Value::Null,
        }
    }

    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }
}

/// How a modal screen is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PresentStyle {
    #[default]
    FullScreen,
    Sheet,
}

/// What a screen hands back when it finishes.
#[derive(Debug, Clone, PartialEq)]
pub enum ScreenOutput {
    None,
    Credentials(Credentials),
    Value(serde_json::Value),
}

/// Why a screen went away.
#[derive(Debug, Clone, PartialEq)]
pub enum DismissSignal {
    /// User navigated back
    Back,
    /// User swiped a modal away
    ModalDismissed,
    /// Screen finished with an output and is still on the stack
    Done(ScreenOutput),
    /// Screen was removed programmatically
    Aborted,
}

impl DismissSignal {
    /// Whether the host has already taken the screen off the stack.
    pub fn removes_screen(&self) -> bool {
        !matches!(self, DismissSignal::Done(_))
    }
}

impl fmt::Display for DismissSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DismissSignal::Back => write!(f, "back"),
            DismissSignal::ModalDismissed => write!(f, "modal_dismissed"),
            DismissSignal::Done(_) => write!(f, "done"),
            DismissSignal::Aborted => write!(f, "aborted"),
        }
    }
}

/// Called by the host for every dismissal signal of a screen.
///
/// Hosts may call it more than once; receivers keep only the first signal.
pub type DismissHandler = Arc<dyn Fn(DismissSignal) + Send + Sync>;

/// The host's navigation stack.
///
/// `dismiss` removes the top screen and must call that screen's handler with
/// [`DismissSignal::Aborted`]. User-driven removals call it with `Back` or
/// `ModalDismissed`.
pub trait NavigationHost: Send + Sync {
    fn push_screen(&self, screen: ScreenDescriptor, on_dismiss: DismissHandler);

    fn present_screen(&self, screen: ScreenDescriptor, style: PresentStyle, on_dismiss: DismissHandler);

    /// Replace the whole stack with `screen`.
    fn set_root(&self, screen: ScreenDescriptor, on_dismiss: DismissHandler);

    fn dismiss(&self);

    fn is_stack_empty(&self) -> bool;
}
