//! Mock navigation host for testing.
//!
//! Keeps a screen stack and lets tests play the user: finish a screen, go
//! back, swipe a modal away, or replay a signal to check it is ignored.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::traits::{
    DismissHandler, DismissSignal, NavigationHost, PresentStyle, ScreenDescriptor, ScreenId,
    ScreenKind, ScreenOutput,
};
use crate::util::lock;

/// How a screen entered the mock stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presentation {
    Root,
    Pushed,
    Presented(PresentStyle),
}

struct Entry {
    screen: ScreenDescriptor,
    presentation: Presentation,
    on_dismiss: DismissHandler,
}

#[derive(Clone, Default)]
pub struct MockNavigator {
    stack: Arc<Mutex<Vec<Entry>>>,
    /// Every screen ever shown, in order
    history: Arc<Mutex<Vec<(ScreenDescriptor, Presentation)>>>,
    /// Handlers of every screen ever shown, for replaying signals
    handlers: Arc<Mutex<Vec<(ScreenId, DismissHandler)>>>,
}

impl MockNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn top(&self) -> Option<ScreenDescriptor> {
        lock(&self.stack).last().map(|entry| entry.screen.clone())
    }

    pub fn top_presentation(&self) -> Option<Presentation> {
        lock(&self.stack).last().map(|entry| entry.presentation)
    }

    /// Kinds of the screens on the stack, bottom first.
    pub fn stack_kinds(&self) -> Vec<ScreenKind> {
        lock(&self.stack).iter().map(|entry| entry.screen.kind).collect()
    }

    pub fn depth(&self) -> usize {
        lock(&self.stack).len()
    }

    pub fn history(&self) -> Vec<(ScreenDescriptor, Presentation)> {
        lock(&self.history).clone()
    }

    /// Number of times a screen of `kind` was shown.
    pub fn shown_count(&self, kind: ScreenKind) -> usize {
        lock(&self.history)
            .iter()
            .filter(|(screen, _)| screen.kind == kind)
            .count()
    }

    /// The top screen finishes with `output`; it stays on the stack until
    /// its coordinator dismisses it.
    pub fn complete_top(&self, output: ScreenOutput) -> Option<ScreenId> {
        let (id, handler) = {
            let stack = lock(&self.stack);
            let entry = stack.last()?;
            (entry.screen.id, Arc::clone(&entry.on_dismiss))
        };
        handler(DismissSignal::Done(output));
        Some(id)
    }

    /// The user navigates back from the top screen.
    pub fn back(&self) -> Option<ScreenId> {
        self.pop_with(DismissSignal::Back)
    }

    /// The user swipes the top modal away.
    pub fn swipe_down(&self) -> Option<ScreenId> {
        self.pop_with(DismissSignal::ModalDismissed)
    }

    /// Deliver `signal` to a screen's handler without touching the stack.
    ///
    /// Works for screens that already left the stack, which is how hosts
    /// produce duplicate signals.
    pub fn fire(&self, screen: ScreenId, signal: DismissSignal) -> bool {
        let handler = lock(&self.handlers)
            .iter()
            .find(|(id, _)| *id == screen)
            .map(|(_, handler)| Arc::clone(handler));
        match handler {
            Some(handler) => {
                handler(signal);
                true
            }
            None => false,
        }
    }

    /// Wait until a screen of `kind` is on top of the stack.
    pub async fn wait_for_top(&self, kind: ScreenKind, timeout: Duration) -> Option<ScreenDescriptor> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            if let Some(top) = self.top().filter(|screen| screen.kind == kind) {
                return Some(top);
            }
            if tokio::time::Instant::now() >= deadline {
                return None;
            }
            tokio::time::sleep(Duration::from_millis(2)).await;
        }
    }

    fn pop_with(&self, signal: DismissSignal) -> Option<ScreenId> {
        let entry = lock(&self.stack).pop()?;
        (entry.on_dismiss)(signal);
        Some(entry.screen.id)
    }

    fn record(&self, screen: ScreenDescriptor, presentation: Presentation, on_dismiss: DismissHandler) {
        tracing::debug!(screen = %screen.id, kind = ?screen.kind, ?presentation, "Mock screen shown");
        lock(&self.history).push((screen.clone(), presentation));
        lock(&self.handlers).push((screen.id, Arc::clone(&on_dismiss)));
        lock(&self.stack).push(Entry {
            screen,
            presentation,
            on_dismiss,
        });
    }
}

impl NavigationHost for MockNavigator {
    fn push_screen(&self, screen: ScreenDescriptor, on_dismiss: DismissHandler) {
        self.record(screen, Presentation::Pushed, on_dismiss);
    }

    fn present_screen(&self, screen: ScreenDescriptor, style: PresentStyle, on_dismiss: DismissHandler) {
        self.record(screen, Presentation::Presented(style), on_dismiss);
    }

    fn set_root(&self, screen: ScreenDescriptor, on_dismiss: DismissHandler) {
        let replaced = std::mem::take(&mut *lock(&self.stack));
        for entry in replaced.into_iter().rev() {
            (entry.on_dismiss)(DismissSignal::Aborted);
        }
        self.record(screen, Presentation::Root, on_dismiss);
    }

    fn dismiss(&self) {
        self.pop_with(DismissSignal::Aborted);
    }

    fn is_stack_empty(&self) -> bool {
        lock(&self.stack).is_empty()
    }
}
