// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Observable single-value cell.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::{Rc, Weak};

type Callback<T> = Rc<RefCell<dyn FnMut(&T)>>;

struct Subscriber<T> {
    id: u64,
    callback: Callback<T>,
}

struct Shared<T> {
    value: RefCell<T>,
    subscribers: RefCell<Vec<Subscriber<T>>>,
    /// Values waiting to be delivered, oldest first
    pending: RefCell<VecDeque<T>>,
    flushing: Cell<bool>,
    next_id: Cell<u64>,
}

/// A value that notifies subscribers whenever it changes.
///
/// Single-threaded. Clones share the same cell. Every `set` is delivered to
/// every subscriber in subscription order; a `set` made from inside a
/// callback is delivered after the current round finishes, so no subscriber
/// ever sees states out of order.
pub struct Writable<T> {
    shared: Rc<Shared<T>>,
}

impl<T> Clone for Writable<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Rc::clone(&self.shared),
        }
    }
}

impl<T: Default + Clone + 'static> Default for Writable<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: Clone + 'static> Writable<T> {
    pub fn new(value: T) -> Self {
        Self {
            shared: Rc::new(Shared {
                value: RefCell::new(value),
                subscribers: RefCell::new(Vec::new()),
                pending: RefCell::new(VecDeque::new()),
                flushing: Cell::new(false),
                next_id: Cell::new(0),
            }),
        }
    }

    /// Current value.
    pub fn get(&self) -> T {
        self.shared.value.borrow().clone()
    }

    /// Replace the value and notify subscribers.
    pub fn set(&self, value: T) {
        *self.shared.value.borrow_mut() = value.clone();
        self.shared.pending.borrow_mut().push_back(value);
        self.flush();
    }

    /// Derive the next value from the current one.
    pub fn update(&self, f: impl FnOnce(&T) -> T) {
        // `f` may itself set this store, so no borrow is held while it runs
        let current = self.get();
        self.set(f(&current));
    }

    /// Register a callback. It runs immediately with the current value and
    /// again after every change, until the returned handle is dropped or
    /// `unsubscribe`d.
    pub fn subscribe(&self, callback: impl FnMut(&T) + 'static) -> Subscription {
        let id = self.shared.next_id.get();
        self.shared.next_id.set(id + 1);

        let callback: Callback<T> = Rc::new(RefCell::new(callback));
        self.shared.subscribers.borrow_mut().push(Subscriber {
            id,
            callback: Rc::clone(&callback),
        });

        // Sets made by the first call queue up behind it
        let was_flushing = self.shared.flushing.replace(true);
        let current = self.get();
        (&mut *callback.borrow_mut())(&current);
        if !was_flushing {
            self.shared.flushing.set(false);
            self.flush();
        }

        let weak: Weak<Shared<T>> = Rc::downgrade(&self.shared);
        Subscription {
            cancel: Some(Box::new(move || {
                if let Some(shared) = weak.upgrade() {
                    shared.subscribers.borrow_mut().retain(|s| s.id != id);
                }
            })),
        }
    }

    /// Number of live subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.shared.subscribers.borrow().len()
    }

    fn flush(&self) {
        if self.shared.flushing.replace(true) {
            return;
        }

        loop {
            let next = self.shared.pending.borrow_mut().pop_front();
            let Some(value) = next else { break };

            // Snapshot so callbacks may subscribe or unsubscribe freely
            let callbacks: Vec<Callback<T>> = self
                .shared
                .subscribers
                .borrow()
                .iter()
                .map(|s| Rc::clone(&s.callback))
                .collect();

            for callback in callbacks {
                (&mut *callback.borrow_mut())(&value);
            }
        }

        self.shared.flushing.set(false);
    }
}

/// Handle for a live subscription. Dropping it unsubscribes.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    pub fn unsubscribe(mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}
