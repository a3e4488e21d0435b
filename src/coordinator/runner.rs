//! Generic coordinator driving one [`Flow`].

use std::collections::HashMap;
use std::sync::{Arc, Mutex, Weak};

use crate::config::ProgrammerErrorPolicy;
use crate::error::CoordinatorError;
use crate::traits::{DismissHandler, DismissSignal, ScreenId};
use crate::util::lock;

use super::{CoordinatorId, CoordinatorState, Flow, PresentationMode, ResultSlot, Router, TerminalResult};

enum Phase {
    NotStarted,
    Active { screen: Option<ScreenId> },
    Completed,
}

/// Type-erased view of a running child.
trait ChildHandle: Send + Sync {
    fn flow_name(&self) -> &'static str;
    fn cancel(&self) -> bool;
}

type ChildTable = Mutex<HashMap<CoordinatorId, Box<dyn ChildHandle>>>;

struct CoordinatorInner<F: Flow> {
    id: CoordinatorId,
    parent: Option<CoordinatorId>,
    flow: F,
    router: Router,
    mode: PresentationMode,
    policy: ProgrammerErrorPolicy,
    phase: Mutex<Phase>,
    slot: ResultSlot<F::Output>,
    children: Arc<ChildTable>,
}

impl<F: Flow> CoordinatorInner<F> {
    /// Leave `Active` for `Completed`, returning the screen that was shown.
    /// `None` when the coordinator was not active.
    fn close(&self) -> Option<Option<ScreenId>> {
        let mut phase = lock(&self.phase);
        match std::mem::replace(&mut *phase, Phase::Completed) {
            Phase::Active { screen } => Some(screen),
            previous => {
                *phase = previous;
                None
            }
        }
    }

    fn handle_signal(self: &Arc<Self>, screen: ScreenId, signal: DismissSignal) {
        if self.close().is_none() {
            tracing::trace!(coordinator = %self.id, %signal, "Ignoring signal after completion");
            return;
        }

        tracing::debug!(coordinator = %self.id, flow = self.flow.name(), %signal, "Screen dismissed");
        let keep_screen = !signal.removes_screen();
        let output = self.flow.map_dismissal(signal);

        if keep_screen {
            let inner = Arc::clone(self);
            self.router.on_removed(screen, move || inner.finish(output));
            self.router.dismiss(screen);
        } else {
            self.finish(output);
        }
    }

    fn finish(&self, output: F::Output) {
        self.cancel_children();
        self.flow.on_complete(&output);
        tracing::info!(coordinator = %self.id, flow = self.flow.name(), "Coordinator completed");
        self.slot.complete(output);
    }

    fn cancel_children(&self) {
        let children = std::mem::take(&mut *lock(&self.children));
        for (id, child) in children {
            if child.cancel() {
                tracing::debug!(coordinator = %self.id, child = %id, flow = child.flow_name(), "Cancelled child");
            }
        }
    }

    fn programmer_error(&self, err: &CoordinatorError) {
        match self.policy {
            ProgrammerErrorPolicy::Panic => panic!("{}", err),
            ProgrammerErrorPolicy::Dismiss => {
                tracing::error!(
                    coordinator = %self.id,
                    flow = self.flow.name(),
                    error = %err,
                    code = err.error_code(),
                    "Programmer error, dismissing flow"
                );
            }
        }
    }
}

/// Runs a [`Flow`] on a [`Router`] and yields its one terminal result.
///
/// Cloning gives another handle to the same coordinator.
pub struct Coordinator<F: Flow> {
    inner: Arc<CoordinatorInner<F>>,
}

impl<F: Flow> Clone for Coordinator<F> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<F: Flow> Coordinator<F> {
    pub fn new(flow: F, router: Router, mode: PresentationMode) -> Self {
        Self::build(flow, router, mode, ProgrammerErrorPolicy::default(), None)
    }

    fn build(
        flow: F,
        router: Router,
        mode: PresentationMode,
        policy: ProgrammerErrorPolicy,
        parent: Option<CoordinatorId>,
    ) -> Self {
        Self {
            inner: Arc::new(CoordinatorInner {
                id: CoordinatorId::new(),
                parent,
                flow,
                router,
                mode,
                policy,
                phase: Mutex::new(Phase::NotStarted),
                slot: ResultSlot::new(),
                children: Arc::new(Mutex::new(HashMap::new())),
            }),
        }
    }

    /// Set how programmer errors are handled. Only before `start`.
    pub fn with_policy(self, policy: ProgrammerErrorPolicy) -> Self {
        match Arc::try_unwrap(self.inner) {
            Ok(inner) => Self {
                inner: Arc::new(CoordinatorInner { policy, ..inner }),
            },
            Err(inner) => {
                tracing::warn!(coordinator = %inner.id, "Policy change ignored on shared coordinator");
                Self { inner }
            }
        }
    }

    /// A coordinator for `flow` sharing this coordinator's router and policy.
    pub fn child<C: Flow>(&self, flow: C, mode: PresentationMode) -> Coordinator<C> {
        Coordinator::build(
            flow,
            self.inner.router.clone(),
            mode,
            self.inner.policy,
            Some(self.inner.id),
        )
    }

    pub fn id(&self) -> CoordinatorId {
        self.inner.id
    }

    pub fn parent(&self) -> Option<CoordinatorId> {
        self.inner.parent
    }

    pub fn flow(&self) -> &F {
        &self.inner.flow
    }

    pub fn router(&self) -> &Router {
        &self.inner.router
    }

    pub fn mode(&self) -> PresentationMode {
        self.inner.mode
    }

    pub fn state(&self) -> CoordinatorState {
        match *lock(&self.inner.phase) {
            Phase::NotStarted => CoordinatorState::NotStarted,
            Phase::Active { .. } => CoordinatorState::Active,
            Phase::Completed => CoordinatorState::Completed,
        }
    }

    pub fn is_active(&self) -> bool {
        self.state() == CoordinatorState::Active
    }

    pub fn result(&self) -> Option<F::Output> {
        self.inner.slot.get()
    }

    /// Number of children still running.
    pub fn child_count(&self) -> usize {
        lock(&self.inner.children).len()
    }

    /// Call `listener` with the terminal result, replaying it if already set.
    pub fn on_result(&self, listener: impl FnOnce(F::Output) + Send + 'static) {
        self.inner.slot.subscribe(listener);
    }

    /// Show the flow's screen and resolve once it is dismissed.
    ///
    /// Starting twice is a programmer error; under
    /// [`ProgrammerErrorPolicy::Dismiss`] the existing result is replayed.
    pub fn start(&self, context: F::Context) -> TerminalResult<F::Output> {
        let inner = &self.inner;
        {
            let mut phase = lock(&inner.phase);
            if !matches!(*phase, Phase::NotStarted) {
                drop(phase);
                inner.programmer_error(&CoordinatorError::AlreadyStarted {
                    coordinator: inner.id,
                });
                return inner.slot.wait(inner.flow.cancelled());
            }
            *phase = Phase::Active { screen: None };
        }

        let terminal = inner.slot.wait(inner.flow.cancelled());

        let screen = match inner.flow.screen(&context) {
            Ok(screen) => screen,
            Err(err) => {
                inner.programmer_error(&err);
                if inner.close().is_some() {
                    inner.finish(inner.flow.map_dismissal(DismissSignal::Aborted));
                }
                return terminal;
            }
        };

        let screen_id = screen.id;
        if let Phase::Active { screen } = &mut *lock(&inner.phase) {
            *screen = Some(screen_id);
        }

        tracing::info!(
            coordinator = %inner.id,
            flow = inner.flow.name(),
            screen = %screen_id,
            parent = ?inner.parent,
            "Coordinator started"
        );

        let handler_inner = Arc::clone(inner);
        let on_dismiss: DismissHandler =
            Arc::new(move |signal| handler_inner.handle_signal(screen_id, signal));
        inner.router.show(screen, inner.mode, on_dismiss);

        terminal
    }

    /// Start `child` as part of this flow.
    ///
    /// The child stays in this coordinator's child table until it completes,
    /// and is cancelled if this coordinator finishes first.
    pub fn start_child<C: Flow>(&self, child: Coordinator<C>, context: C::Context) -> TerminalResult<C::Output> {
        let child_id = child.id();
        lock(&self.inner.children).insert(child_id, Box::new(child.clone()));

        let table: Weak<ChildTable> = Arc::downgrade(&self.inner.children);
        child.on_result(move |_| {
            if let Some(table) = table.upgrade() {
                lock(&table).remove(&child_id);
            }
        });

        tracing::debug!(
            coordinator = %self.inner.id,
            child = %child_id,
            flow = child.flow().name(),
            "Starting child"
        );
        child.start(context)
    }

    /// Complete an active coordinator with the flow's cancellation result
    /// and take its screen off the stack. Returns false if it was not active.
    pub fn cancel(&self) -> bool {
        let Some(screen) = self.inner.close() else {
            return false;
        };

        tracing::info!(coordinator = %self.inner.id, flow = self.inner.flow.name(), "Cancelling coordinator");
        self.inner.cancel_children();
        if let Some(screen) = screen {
            self.inner.router.dismiss(screen);
        }
        self.inner.finish(self.inner.flow.cancelled());
        true
    }
}

impl<F: Flow> ChildHandle for Coordinator<F> {
    fn flow_name(&self) -> &'static str {
        self.inner.flow.name()
    }

    fn cancel(&self) -> bool {
        Coordinator::cancel(self)
    }
}

impl<F: Flow> std::fmt::Debug for Coordinator<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Coordinator")
            .field("id", &self.inner.id)
            .field("flow", &self.inner.flow.name())
            .field("state", &self.state())
            .finish()
    }
}
