//! Store - Reactive value cell with replay-on-subscribe.
//!
//! A `Store<T>` holds one value and a list of subscribers:
//! - `get()` - Read the current value (clone, no side effects)
//! - `update(f)` - Replace the value with `f(current)` and notify everyone
//! - `subscribe(listener)` - Register, replay the current value, get an [`Unsubscribe`]
//!
//! Notification is synchronous and happens in subscription order. There is no
//! deduplication: every `update` notifies, even if the value is unchanged.
//!
//! # Re-entrancy
//!
//! Listeners are called with no internal borrow held, so a listener may read,
//! update, subscribe to or unsubscribe from the same store. A listener removed
//! during a notification pass is skipped for the rest of that pass. Guarding
//! against unbounded update chains is the caller's job.
//!
//! # Example
//!
//! ```ignore
//! use spark_elements::store::Store;
//!
//! let count = Store::new(0);
//! let sub = count.subscribe(|v| println!("count = {v}")); // prints "count = 0"
//! count.update(|v| v + 1);                                // prints "count = 1"
//! sub.unsubscribe();
//! ```

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use serde::{Deserialize, Serialize};

use crate::types::Cleanup;

// =============================================================================
// Store Id
// =============================================================================

/// Store identifier, unique within the creating thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StoreId(pub u64);

impl fmt::Display for StoreId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

thread_local! {
    static NEXT_STORE_ID: Cell<u64> = const { Cell::new(1) };
}

fn next_store_id() -> StoreId {
    NEXT_STORE_ID.with(|next| {
        let id = next.get();
        next.set(id + 1);
        StoreId(id)
    })
}

// =============================================================================
// Store
// =============================================================================

struct Subscriber<T> {
    id: usize,
    active: Cell<bool>,
    listener: Box<dyn Fn(&T)>,
}

struct StoreInner<T> {
    id: StoreId,
    value: RefCell<T>,
    subscribers: RefCell<Vec<Rc<Subscriber<T>>>>,
    next_subscriber: Cell<usize>,
}

impl<T> StoreInner<T> {
    fn remove(&self, id: usize) {
        let mut subscribers = self.subscribers.borrow_mut();
        if let Some(pos) = subscribers.iter().position(|s| s.id == id) {
            subscribers.remove(pos).active.set(false);
        }
    }
}

/// Reactive value cell.
///
/// Cloning a `Store` clones the handle, not the value.
pub struct Store<T> {
    inner: Rc<StoreInner<T>>,
}

impl<T> Clone for Store<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Store<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("id", &self.inner.id)
            .field("value", &*self.inner.value.borrow())
            .field("subscribers", &self.inner.subscribers.borrow().len())
            .finish()
    }
}

impl<T: Clone + 'static> Store<T> {
    /// Create a store holding `initial`.
    pub fn new(initial: T) -> Self {
        Self {
            inner: Rc::new(StoreInner {
                id: next_store_id(),
                value: RefCell::new(initial),
                subscribers: RefCell::new(Vec::new()),
                next_subscriber: Cell::new(0),
            }),
        }
    }

    pub fn id(&self) -> StoreId {
        self.inner.id
    }

    /// Current value.
    pub fn get(&self) -> T {
        self.inner.value.borrow().clone()
    }

    /// Read the current value without cloning it.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.inner.value.borrow())
    }

    /// Replace the value with `f(current)` and notify all subscribers.
    pub fn update(&self, f: impl FnOnce(T) -> T) {
        let current = self.get();
        let next = f(current);
        *self.inner.value.borrow_mut() = next.clone();
        self.notify(&next);
    }

    /// Replace the value and notify all subscribers.
    pub fn set(&self, value: T) {
        self.update(move |_| value);
    }

    /// Register `listener` and call it once with the current value.
    pub fn subscribe(&self, listener: impl Fn(&T) + 'static) -> Unsubscribe {
        let id = self.inner.next_subscriber.get();
        self.inner.next_subscriber.set(id + 1);

        let subscriber = Rc::new(Subscriber {
            id,
            active: Cell::new(true),
            listener: Box::new(listener),
        });
        self.inner.subscribers.borrow_mut().push(subscriber.clone());

        // Replay
        let current = self.get();
        (subscriber.listener)(&current);

        let weak: Weak<StoreInner<T>> = Rc::downgrade(&self.inner);
        Unsubscribe {
            release: Some(Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    inner.remove(id);
                }
            })),
        }
    }

    /// Number of live subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.inner.subscribers.borrow().len()
    }

    /// Snapshot of the value as JSON, for inspection.
    ///
    /// The returned closure holds only a weak reference and yields `Null`
    /// once the store is gone.
    pub fn inspector(&self) -> impl Fn() -> serde_json::Value + 'static
    where
        T: Serialize,
    {
        let weak = Rc::downgrade(&self.inner);
        move || match weak.upgrade() {
            Some(inner) => serde_json::to_value(&*inner.value.borrow())
                .unwrap_or(serde_json::Value::Null),
            None => serde_json::Value::Null,
        }
    }

    fn notify(&self, value: &T) {
        // Snapshot so listeners can (un)subscribe while we iterate
        let subscribers: Vec<Rc<Subscriber<T>>> = self.inner.subscribers.borrow().clone();
        for subscriber in subscribers {
            if subscriber.active.get() {
                (subscriber.listener)(value);
            }
        }
    }
}

// =============================================================================
// Unsubscribe
// =============================================================================

/// Handle returned by [`Store::subscribe`].
///
/// Dropping the handle keeps the subscription; call [`Unsubscribe::unsubscribe`]
/// to remove the listener.
#[must_use = "dropping the handle leaves the listener subscribed"]
pub struct Unsubscribe {
    release: Option<Box<dyn FnOnce()>>,
}

impl Unsubscribe {
    /// Remove the listener. Safe to call after the store is gone.
    pub fn unsubscribe(mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }

    /// Convert into a plain cleanup function.
    pub fn into_cleanup(self) -> Cleanup {
        Box::new(move || self.unsubscribe())
    }
}

impl fmt::Debug for Unsubscribe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Unsubscribe").finish_non_exhaustive()
    }
}
