//! Action gating registry.
//!
//! Each [`BlockerType`] owns one queue behind its own mutex. Continuations
//! never run while a queue lock is held, so a continuation may freely call
//! back into the registry (guard again, block, resume another type).

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use tokio::sync::oneshot;

use super::handle::BlockerHandle;
use super::types::{
    BlockerType, Continuation, GuardOutcome, Precondition, Release, SuspendListener,
};
use crate::util::lock;

struct PendingAction {
    sequence: u64,
    action: Continuation,
}

#[derive(Default)]
struct Gate {
    queue: VecDeque<PendingAction>,
    next_sequence: u64,
    active_blocks: usize,
    precondition: Option<Precondition>,
}

impl Gate {
    fn is_open(&self) -> bool {
        self.active_blocks == 0 && self.precondition.as_ref().map_or(true, |check| check())
    }

    fn enqueue(&mut self, action: Continuation) -> u64 {
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        self.queue.push_back(PendingAction { sequence, action });
        sequence
    }
}

/// Suspends actions until their precondition is met and releases each
/// exactly once.
pub struct ActionGatingRegistry {
    authentication: Mutex<Gate>,
    renew_authentication: Mutex<Gate>,
    listeners: Mutex<Vec<SuspendListener>>,
}

impl Default for ActionGatingRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ActionGatingRegistry {
    /// Registry with no preconditions; every gate is open until blocked.
    pub fn new() -> Self {
        Self {
            authentication: Mutex::new(Gate::default()),
            renew_authentication: Mutex::new(Gate::default()),
            listeners: Mutex::new(Vec::new()),
        }
    }

    fn gate(&self, blocker: BlockerType) -> &Mutex<Gate> {
        match blocker {
            BlockerType::Authentication => &self.authentication,
            BlockerType::RenewAuthentication => &self.renew_authentication,
        }
    }

    /// Install the check that decides whether `blocker` is satisfied.
    pub fn set_precondition<F>(&self, blocker: BlockerType, precondition: F)
    where
        F: Fn() -> bool + Send + Sync + 'static,
    {
        lock(self.gate(blocker)).precondition = Some(Box::new(precondition));
    }

    /// Register a listener called whenever an action is suspended.
    pub fn on_suspend<F>(&self, listener: F)
    where
        F: Fn(BlockerType, u64) + Send + Sync + 'static,
    {
        lock(&self.listeners).push(Arc::new(listener));
    }

    /// Run `action` now if `blocker` is satisfied, otherwise queue it.
    pub fn guard<F>(&self, blocker: BlockerType, action: F) -> GuardOutcome
    where
        F: FnOnce(Release) + Send + 'static,
    {
        let mut gate = lock(self.gate(blocker));
        if gate.is_open() {
            drop(gate);
            tracing::trace!(blocker = %blocker, "Gate open, running action");
            action(Release::Proceed);
            return GuardOutcome::Executed;
        }

        let sequence = gate.enqueue(Box::new(action));
        let pending = gate.queue.len();
        drop(gate);

        tracing::debug!(blocker = %blocker, sequence, pending, "Action suspended");
        self.notify_suspended(blocker, sequence);
        GuardOutcome::Suspended { sequence }
    }

    /// Wait until `blocker` releases a continuation for this caller.
    pub async fn wait(&self, blocker: BlockerType) -> Release {
        let (tx, rx) = oneshot::channel();
        self.guard(blocker, move |release| {
            let _ = tx.send(release);
        });
        // A dropped continuation never ran; report it as cancelled.
        rx.await.unwrap_or(Release::Cancelled)
    }

    /// Release every queued action for `blocker` with `Proceed`.
    ///
    /// The queue is taken as a whole; actions suspended while the drain runs
    /// wait for the next call. Returns the number of actions released.
    pub fn resume(&self, blocker: BlockerType) -> usize {
        let released = self.drain(blocker, Release::Proceed);
        if released > 0 {
            tracing::info!(blocker = %blocker, released, "Resumed suspended actions");
        }
        released
    }

    /// Release every queued action for `blocker` with `Cancelled`.
    pub fn cancel_all(&self, blocker: BlockerType) -> usize {
        let cancelled = self.drain(blocker, Release::Cancelled);
        if cancelled > 0 {
            tracing::info!(blocker = %blocker, cancelled, "Cancelled suspended actions");
        }
        cancelled
    }

    /// Cancel the queues of every blocker type.
    pub fn invalidate_all(&self) -> usize {
        BlockerType::ALL
            .iter()
            .map(|blocker| self.cancel_all(*blocker))
            .sum()
    }

    /// Hold `blocker` closed until the returned handle is released.
    pub fn block(self: &Arc<Self>, blocker: BlockerType) -> BlockerHandle {
        let active = {
            let mut gate = lock(self.gate(blocker));
            gate.active_blocks += 1;
            gate.active_blocks
        };
        tracing::debug!(blocker = %blocker, active, "Blocker added");
        BlockerHandle::new(Arc::clone(self), blocker)
    }

    /// Drop one explicit block. Returns true if it was the last one.
    pub(super) fn unblock(&self, blocker: BlockerType) -> bool {
        let mut gate = lock(self.gate(blocker));
        gate.active_blocks = gate.active_blocks.saturating_sub(1);
        gate.active_blocks == 0
    }

    /// Whether `blocker` would currently suspend a new action.
    pub fn is_blocked(&self, blocker: BlockerType) -> bool {
        !lock(self.gate(blocker)).is_open()
    }

    /// Number of explicit blocks currently held on `blocker`.
    pub fn active_blocks(&self, blocker: BlockerType) -> usize {
        lock(self.gate(blocker)).active_blocks
    }

    pub fn pending_count(&self, blocker: BlockerType) -> usize {
        lock(self.gate(blocker)).queue.len()
    }

    fn drain(&self, blocker: BlockerType, release: Release) -> usize {
        let pending = std::mem::take(&mut lock(self.gate(blocker)).queue);
        let count = pending.len();
        for entry in pending {
            tracing::trace!(blocker = %blocker, sequence = entry.sequence, ?release, "Releasing action");
            (entry.action)(release);
        }
        count
    }

    fn notify_suspended(&self, blocker: BlockerType, sequence: u64) {
        let listeners = lock(&self.listeners).clone();
        for listener in listeners {
            listener(blocker, sequence);
        }
    }
}
