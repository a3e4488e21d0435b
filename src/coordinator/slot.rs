//! Single-assignment result cell and the future that awaits it.

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};

use futures::future::{BoxFuture, FutureExt};
use tokio::sync::oneshot;

use crate::util::lock;

type Listener<T> = Box<dyn FnOnce(T) + Send + 'static>;

struct SlotInner<T> {
    value: Option<T>,
    listeners: Vec<Listener<T>>,
}

/// Holds at most one value. Listeners registered before completion are
/// called once with it; listeners registered afterwards get the stored value
/// replayed immediately.
pub struct ResultSlot<T> {
    inner: Arc<Mutex<SlotInner<T>>>,
}

impl<T> Clone for ResultSlot<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Clone + Send + 'static> ResultSlot<T> {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(SlotInner {
                value: None,
                listeners: Vec::new(),
            })),
        }
    }

    /// Store `value` if the slot is empty. Returns false and drops `value`
    /// when a result was already set.
    pub fn complete(&self, value: T) -> bool {
        let listeners = {
            let mut inner = lock(&self.inner);
            if inner.value.is_some() {
                return false;
            }
            inner.value = Some(value.clone());
            std::mem::take(&mut inner.listeners)
        };

        for listener in listeners {
            listener(value.clone());
        }
        true
    }

    pub fn get(&self) -> Option<T> {
        lock(&self.inner).value.clone()
    }

    pub fn is_complete(&self) -> bool {
        lock(&self.inner).value.is_some()
    }

    pub fn subscribe(&self, listener: impl FnOnce(T) + Send + 'static) {
        let replay = {
            let mut inner = lock(&self.inner);
            match &inner.value {
                Some(value) => value.clone(),
                None => {
                    inner.listeners.push(Box::new(listener));
                    return;
                }
            }
        };
        listener(replay);
    }

    /// Future for the stored value. Resolves to `abandoned` if the slot is
    /// dropped without ever being completed.
    pub fn wait(&self, abandoned: T) -> TerminalResult<T> {
        let (tx, rx) = oneshot::channel();
        self.subscribe(move |value| {
            let _ = tx.send(value);
        });
        TerminalResult::from_future(async move { rx.await.unwrap_or(abandoned) })
    }
}

impl<T: Clone + Send + 'static> Default for ResultSlot<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// The one terminal result of a coordinator activation.
#[must_use = "a TerminalResult does nothing unless awaited"]
pub struct TerminalResult<T> {
    inner: BoxFuture<'static, T>,
}

impl<T: Send + 'static> TerminalResult<T> {
    pub fn ready(value: T) -> Self {
        Self::from_future(futures::future::ready(value))
    }

    fn from_future(future: impl Future<Output = T> + Send + 'static) -> Self {
        Self {
            inner: future.boxed(),
        }
    }
}

impl<T> Future for TerminalResult<T> {
    type Output = T;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<T> {
        self.inner.poll_unpin(cx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_value_wins() {
        let slot = ResultSlot::new();
        assert!(slot.complete(1));
        assert!(!slot.complete(2));
        assert_eq!(slot.get(), Some(1));
    }

    #[test]
    fn test_listeners_called_once() {
        let slot = ResultSlot::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_in = Arc::clone(&seen);
        slot.subscribe(move |v| seen_in.lock().unwrap().push(v));

        slot.complete("done");
        slot.complete("again");
        assert_eq!(*seen.lock().unwrap(), vec!["done"]);
    }

    #[test]
    fn test_late_subscriber_gets_replay() {
        let slot = ResultSlot::new();
        slot.complete(7);

        let seen = Arc::new(Mutex::new(None));
        let seen_in = Arc::clone(&seen);
        slot.subscribe(move |v| *seen_in.lock().unwrap() = Some(v));
        assert_eq!(*seen.lock().unwrap(), Some(7));
    }

    #[tokio::test]
    async fn test_wait_resolves_on_complete() {
        let slot = ResultSlot::new();
        let result = slot.wait(0);
        slot.complete(42);
        assert_eq!(result.await, 42);
    }

    #[tokio::test]
    async fn test_wait_on_dropped_slot_is_abandoned() {
        let slot: ResultSlot<i32> = ResultSlot::new();
        let result = slot.wait(-1);
        drop(slot);
        assert_eq!(result.await, -1);
    }

    #[tokio::test]
    async fn test_ready() {
        assert_eq!(TerminalResult::ready("x").await, "x");
    }
}
