//! Shared handle to the host's navigation stack.
//!
//! The router tracks which of its screens are still live and runs a
//! completion for each screen exactly once when it leaves the stack, whether
//! the user popped it or a coordinator dismissed it.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, Weak};

use crate::traits::{DismissHandler, NavigationHost, ScreenDescriptor, ScreenId};
use crate::util::lock;

use super::PresentationMode;

type Completion = Box<dyn FnOnce() + Send + 'static>;

#[derive(Default)]
struct RouterState {
    /// Screens shown through this router, bottom first
    live: Vec<ScreenId>,
    completions: HashMap<ScreenId, Completion>,
}

struct RouterInner {
    host: Arc<dyn NavigationHost>,
    state: Mutex<RouterState>,
}

impl RouterInner {
    fn removed(&self, screen: ScreenId) {
        let completion = {
            let mut state = lock(&self.state);
            state.live.retain(|id| *id != screen);
            state.completions.remove(&screen)
        };
        tracing::trace!(%screen, "Screen left the stack");
        if let Some(completion) = completion {
            completion();
        }
    }

    /// Drop every live screen except `keep`, running their completions.
    fn retain_only(&self, keep: ScreenId) {
        let completions: Vec<Completion> = {
            let mut state = lock(&self.state);
            let gone: Vec<ScreenId> = state.live.iter().copied().filter(|id| *id != keep).collect();
            state.live.retain(|id| *id == keep);
            gone.iter()
                .filter_map(|id| state.completions.remove(id))
                .collect()
        };
        for completion in completions {
            completion();
        }
    }
}

/// Cloneable; children share their parent's router.
#[derive(Clone)]
pub struct Router {
    inner: Arc<RouterInner>,
}

impl Router {
    pub fn new(host: Arc<dyn NavigationHost>) -> Self {
        Self {
            inner: Arc::new(RouterInner {
                host,
                state: Mutex::new(RouterState::default()),
            }),
        }
    }

    pub fn host(&self) -> &Arc<dyn NavigationHost> {
        &self.inner.host
    }

    /// Show `screen` on the host. `on_dismiss` receives every signal the
    /// host delivers for it.
    pub fn show(
        &self,
        screen: ScreenDescriptor,
        mode: PresentationMode,
        on_dismiss: DismissHandler,
    ) -> ScreenId {
        let id = screen.id;
        lock(&self.inner.state).live.push(id);

        let router: Weak<RouterInner> = Arc::downgrade(&self.inner);
        let handler: DismissHandler = Arc::new(move |signal| {
            if signal.removes_screen() {
                if let Some(router) = router.upgrade() {
                    router.removed(id);
                }
            }
            on_dismiss(signal);
        });

        tracing::debug!(screen = %id, kind = ?screen.kind, ?mode, "Showing screen");
        match mode {
            PresentationMode::Root => {
                self.inner.host.set_root(screen, handler);
                self.inner.retain_only(id);
            }
            PresentationMode::Push => self.inner.host.push_screen(screen, handler),
            PresentationMode::Present(style) => self.inner.host.present_screen(screen, style, handler),
        }
        id
    }

    /// Run `completion` once `screen` leaves the stack.
    ///
    /// Runs it immediately and returns false when the screen is not live.
    pub fn on_removed(&self, screen: ScreenId, completion: impl FnOnce() + Send + 'static) -> bool {
        {
            let mut state = lock(&self.inner.state);
            if state.live.contains(&screen) {
                state.completions.insert(screen, Box::new(completion));
                return true;
            }
        }
        completion();
        false
    }

    /// Remove `screen` and everything shown above it.
    ///
    /// No-op when the screen already left the stack.
    pub fn dismiss(&self, screen: ScreenId) -> bool {
        let depth = {
            let state = lock(&self.inner.state);
            match state.live.iter().position(|id| *id == screen) {
                Some(index) => state.live.len() - index,
                None => return false,
            }
        };

        tracing::debug!(%screen, depth, "Dismissing screen");
        for _ in 0..depth {
            self.inner.host.dismiss();
        }
        // Hosts that do not report programmatic removals
        if self.is_live(screen) {
            let above: Vec<ScreenId> = {
                let state = lock(&self.inner.state);
                state
                    .live
                    .iter()
                    .skip_while(|id| **id != screen)
                    .copied()
                    .collect()
            };
            for id in above.into_iter().rev() {
                self.inner.removed(id);
            }
        }
        true
    }

    pub fn is_live(&self, screen: ScreenId) -> bool {
        lock(&self.inner.state).live.contains(&screen)
    }

    pub fn live_count(&self) -> usize {
        lock(&self.inner.state).live.len()
    }
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router")
            .field("live", &self.live_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::mock::MockNavigator;
    use crate::traits::{DismissSignal, PresentStyle, ScreenKind};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn noop() -> DismissHandler {
        Arc::new(|_| {})
    }

    fn counter() -> (Arc<AtomicUsize>, impl FnOnce() + Send + 'static) {
        let count = Arc::new(AtomicUsize::new(0));
        let count_in = Arc::clone(&count);
        (count, move || {
            count_in.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[test]
    fn test_completion_runs_on_user_pop() {
        let nav = Arc::new(MockNavigator::new());
        let router = Router::new(nav.clone());
        let id = router.show(ScreenDescriptor::new(ScreenKind::Conversation), PresentationMode::Push, noop());

        let (count, completion) = counter();
        assert!(router.on_removed(id, completion));
        nav.back();

        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert!(!router.is_live(id));
    }

    #[test]
    fn test_completion_runs_once_on_dismiss() {
        let nav = Arc::new(MockNavigator::new());
        let router = Router::new(nav.clone());
        let id = router.show(
            ScreenDescriptor::new(ScreenKind::Login),
            PresentationMode::Present(PresentStyle::Sheet),
            noop(),
        );

        let (count, completion) = counter();
        router.on_removed(id, completion);
        assert!(router.dismiss(id));
        assert!(!router.dismiss(id));
        nav.fire(id, DismissSignal::Back);

        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert!(nav.is_stack_empty());
    }

    #[test]
    fn test_completion_for_removed_screen_runs_now() {
        let nav = Arc::new(MockNavigator::new());
        let router = Router::new(nav);
        let (count, completion) = counter();
        assert!(!router.on_removed(uuid::Uuid::new_v4(), completion));
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_dismiss_pops_screens_above() {
        let nav = Arc::new(MockNavigator::new());
        let router = Router::new(nav.clone());
        let bottom = router.show(ScreenDescriptor::new(ScreenKind::Conversation), PresentationMode::Root, noop());
        router.show(ScreenDescriptor::new(ScreenKind::ReportReason), PresentationMode::Push, noop());
        router.show(ScreenDescriptor::new(ScreenKind::Login), PresentationMode::Push, noop());

        assert_eq!(router.live_count(), 3);
        router.dismiss(bottom);
        assert_eq!(router.live_count(), 0);
        assert!(nav.is_stack_empty());
    }

    #[test]
    fn test_root_replaces_live_screens() {
        let nav = Arc::new(MockNavigator::new());
        let router = Router::new(nav.clone());
        let first = router.show(ScreenDescriptor::new(ScreenKind::Conversation), PresentationMode::Push, noop());
        let (count, completion) = counter();
        router.on_removed(first, completion);

        let root = router.show(ScreenDescriptor::new(ScreenKind::Login), PresentationMode::Root, noop());
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert!(router.is_live(root));
        assert_eq!(router.live_count(), 1);
    }
}
