//! Test utilities for scope-dispatch stores
//!
//! - [`TestHarness`]: a store wired up to record every dispatched action and
//!   every state observers were notified with, plus a mailbox for simulating
//!   async completions
//! - [`RecordingMiddleware`]: the middleware the harness uses, usable on its own
//! - Assertion macros for verifying dispatched actions
//!
//! # Example
//!
//! ```ignore
//! use scope_dispatch::testing::TestHarness;
//!
//! let mut harness = TestHarness::new(0_i64, reducer);
//!
//! harness.send(Action::Increment);
//! harness.sender().send(Action::Increment).unwrap();
//! harness.pump();
//!
//! assert_eq!(harness.drain_observed(), vec![1, 2]);
//! assert_dispatched!(harness.drain_dispatched(), Action::Increment);
//! ```

use std::cell::RefCell;
use std::rc::Rc;

use crate::mailbox::{ActionSender, Mailbox};
use crate::store::{Middleware, Store};
use crate::Action;

/// Middleware that records a clone of every action before it is reduced
pub struct RecordingMiddleware<A> {
    log: Rc<RefCell<Vec<A>>>,
}

impl<A> RecordingMiddleware<A> {
    /// Create a recorder writing into `log`
    pub fn new(log: Rc<RefCell<Vec<A>>>) -> Self {
        Self { log }
    }
}

impl<A: Action> Middleware<A> for RecordingMiddleware<A> {
    fn before(&mut self, action: &A) {
        self.log.borrow_mut().push(action.clone());
    }

    fn after(&mut self, _action: &A, _state_changed: bool) {}
}

/// Store test harness
///
/// Provides:
/// - A [`Store`] under test, reachable through the public `store` field
/// - A log of dispatched actions (in processing order, including queued
///   reentrant sends)
/// - A log of states delivered to observers
/// - A [`Mailbox`] standing in for the app's async hand-off
pub struct TestHarness<S: 'static, A: Action> {
    /// The store under test
    pub store: Store<S, A>,
    observed: Rc<RefCell<Vec<S>>>,
    dispatched: Rc<RefCell<Vec<A>>>,
    mailbox: Mailbox<A>,
}

impl<S: Clone + 'static, A: Action> TestHarness<S, A> {
    /// Create a harness around a fresh store
    pub fn new<R>(state: S, reducer: R) -> Self
    where
        R: Fn(&mut S, A) -> bool + 'static,
    {
        let dispatched = Rc::new(RefCell::new(Vec::new()));
        let store = Store::with_middleware(
            state,
            reducer,
            RecordingMiddleware::new(Rc::clone(&dispatched)),
        );

        let observed = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&observed);
        store.subscribe(move |state: &S| sink.borrow_mut().push(state.clone()));

        Self {
            store,
            observed,
            dispatched,
            mailbox: Mailbox::new(),
        }
    }

    /// Send an action straight to the store
    pub fn send(&self, action: A) {
        self.store.send(action);
    }

    /// Get a sender, as async work would hold
    pub fn sender(&self) -> ActionSender<A> {
        self.mailbox.sender()
    }

    /// Deliver every action queued through [`TestHarness::sender`]
    pub fn pump(&mut self) -> usize {
        self.mailbox.drain_into(&self.store)
    }

    /// Copy of the current state
    pub fn state(&self) -> S {
        self.store.current_state()
    }

    /// Take all states observers were notified with so far
    pub fn drain_observed(&self) -> Vec<S> {
        std::mem::take(&mut *self.observed.borrow_mut())
    }

    /// Take all actions dispatched so far
    pub fn drain_dispatched(&self) -> Vec<A> {
        std::mem::take(&mut *self.dispatched.borrow_mut())
    }
}

/// Assert that a specific action was dispatched.
///
/// # Example
///
/// ```ignore
/// let actions = harness.drain_dispatched();
/// assert_dispatched!(actions, Action::Increment);
/// assert_dispatched!(actions, Action::SetValue(42));
/// ```
#[macro_export]
macro_rules! assert_dispatched {
    ($actions:expr, $pattern:pat $(if $guard:expr)?) => {
        assert!(
            $actions.iter().any(|a| matches!(a, $pattern $(if $guard)?)),
            "Expected action matching `{}` to be dispatched, but got: {:?}",
            stringify!($pattern),
            $actions
        );
    };
}

/// Assert that a specific action was NOT dispatched.
#[macro_export]
macro_rules! assert_not_dispatched {
    ($actions:expr, $pattern:pat $(if $guard:expr)?) => {
        assert!(
            !$actions.iter().any(|a| matches!(a, $pattern $(if $guard)?)),
            "Expected action matching `{}` NOT to be dispatched, but it was: {:?}",
            stringify!($pattern),
            $actions
        );
    };
}

/// Count how many dispatched actions match a pattern.
///
/// # Example
///
/// ```ignore
/// let actions = harness.drain_dispatched();
/// assert_eq!(count_dispatched!(actions, Action::Increment), 3);
/// ```
#[macro_export]
macro_rules! count_dispatched {
    ($actions:expr, $pattern:pat $(if $guard:expr)?) => {
        $actions.iter().filter(|a| matches!(a, $pattern $(if $guard)?)).count()
    };
}
