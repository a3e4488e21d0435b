use std::sync::Arc;

use super::registry::ActionGatingRegistry;
use super::types::BlockerType;

/// An explicit hold on a blocker.
///
/// While any handle for a blocker type is alive, new actions of that type are
/// suspended regardless of the precondition. Dropping a handle without
/// completing it cancels the queued actions.
#[must_use = "dropping a BlockerHandle cancels the actions it holds back"]
pub struct BlockerHandle {
    registry: Arc<ActionGatingRegistry>,
    blocker: BlockerType,
    released: bool,
}

impl BlockerHandle {
    pub(super) fn new(registry: Arc<ActionGatingRegistry>, blocker: BlockerType) -> Self {
        Self {
            registry,
            blocker,
            released: false,
        }
    }

    pub fn blocker(&self) -> BlockerType {
        self.blocker
    }

    /// Release the hold. Queued actions resume once no other handle remains.
    pub fn complete(mut self) -> usize {
        self.released = true;
        if self.registry.unblock(self.blocker) {
            self.registry.resume(self.blocker)
        } else {
            0
        }
    }

    /// Release the hold and cancel everything queued behind this blocker.
    pub fn cancel(mut self) -> usize {
        self.released = true;
        self.registry.unblock(self.blocker);
        self.registry.cancel_all(self.blocker)
    }
}

impl Drop for BlockerHandle {
    fn drop(&mut self) {
        if !self.released {
            tracing::debug!(blocker = %self.blocker, "Blocker dropped without completion");
            self.registry.unblock(self.blocker);
            self.registry.cancel_all(self.blocker);
        }
    }
}

impl std::fmt::Debug for BlockerHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlockerHandle")
            .field("blocker", &self.blocker)
            .field("released", &self.released)
            .finish()
    }
}
