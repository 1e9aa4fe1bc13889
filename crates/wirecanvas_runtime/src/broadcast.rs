// SPDX-License-Identifier: MIT OR Apache-2.0
//! Minimal typed publish/subscribe channel.
//!
//! A failing listener never stops the remaining listeners and never reaches
//! the code that called [`Broadcast::broadcast`]; the failure is logged.

use indexmap::IndexMap;
use std::cell::{Cell, RefCell};
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;

/// Handle returned by [`Broadcast::add`], used to remove the listener again
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Error a listener may report back to the channel
#[derive(Debug, thiserror::Error)]
pub enum ListenerError {
    /// The listener rejected the payload
    #[error("listener rejected payload: {0}")]
    Rejected(String),

    /// The listener depends on state that no longer exists
    #[error("listener target is gone")]
    TargetGone,
}

/// Result type returned by listeners
pub type ListenerResult = Result<(), ListenerError>;

type Listener<T> = Rc<dyn Fn(&T) -> ListenerResult>;

/// A set of listeners that all receive every broadcast payload
pub struct Broadcast<T> {
    listeners: RefCell<IndexMap<ListenerId, Listener<T>>>,
    next_id: Cell<u64>,
}

impl<T> Broadcast<T> {
    /// Create a channel without listeners
    pub fn new() -> Self {
        Self {
            listeners: RefCell::new(IndexMap::new()),
            next_id: Cell::new(0),
        }
    }

    /// Register a listener
    pub fn add(&self, listener: impl Fn(&T) -> ListenerResult + 'static) -> ListenerId {
        let id = ListenerId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.listeners.borrow_mut().insert(id, Rc::new(listener));
        id
    }

    /// Remove a listener, returning whether it was registered
    pub fn remove(&self, id: ListenerId) -> bool {
        self.listeners.borrow_mut().shift_remove(&id).is_some()
    }

    /// Number of registered listeners
    pub fn len(&self) -> usize {
        self.listeners.borrow().len()
    }

    /// Whether no listener is registered
    pub fn is_empty(&self) -> bool {
        self.listeners.borrow().is_empty()
    }

    /// Deliver `payload` to every listener.
    ///
    /// Listeners added or removed while broadcasting take effect on the next call.
    pub fn broadcast(&self, payload: &T) {
        let snapshot: Vec<(ListenerId, Listener<T>)> = self
            .listeners
            .borrow()
            .iter()
            .map(|(id, listener)| (*id, Rc::clone(listener)))
            .collect();

        for (id, listener) in snapshot {
            match panic::catch_unwind(AssertUnwindSafe(|| listener(payload))) {
                Ok(Ok(())) => {}
                Ok(Err(e)) => tracing::warn!("Broadcast listener {:?} failed: {e}", id),
                Err(_) => tracing::error!("Broadcast listener {:?} panicked", id),
            }
        }
    }
}

impl<T> Default for Broadcast<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Debug for Broadcast<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Broadcast")
            .field("listeners", &self.len())
            .finish()
    }
}
