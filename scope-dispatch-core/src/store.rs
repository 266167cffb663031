//! Single-owner state store with reducer pattern and observer registry

use std::cell::{Cell, Ref, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use crate::scope::{Layer, Link, RootLink, ScopedStore};
use crate::Action;

pub(crate) type BoxedObserver<S> = Box<dyn FnMut(&S)>;

type SharedObserver<S> = Rc<RefCell<dyn FnMut(&S)>>;

/// A registered observer. `depth` is 0 for observers of the store itself
/// and the number of scope layers for observers of a scoped store.
struct Registration<S> {
    id: SubscriptionId,
    depth: usize,
    observer: SharedObserver<S>,
}

/// Handle returned by `subscribe`, used to unregister the observer.
///
/// Handles are unique per root store. Subscriptions made through a
/// [`ScopedStore`] are registered on the root, so the same handle can be
/// released through the root or through any scope derived from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

pub(crate) struct StoreInner<S, A> {
    state: RefCell<S>,
    reducer: Box<dyn Fn(&mut S, A) -> bool>,
    middleware: RefCell<Box<dyn Middleware<A>>>,
    observers: RefCell<Vec<Registration<S>>>,
    next_id: Cell<u64>,
    queue: RefCell<VecDeque<A>>,
    dispatching: Cell<bool>,
}

/// Clears the dispatching flag even if a reducer or observer panics.
struct DispatchGuard<'a>(&'a Cell<bool>);

impl<'a> DispatchGuard<'a> {
    fn enter(flag: &'a Cell<bool>) -> Self {
        flag.set(true);
        Self(flag)
    }
}

impl Drop for DispatchGuard<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

impl<S: 'static, A: Action> StoreInner<S, A> {
    pub(crate) fn state(&self) -> Ref<'_, S> {
        self.state.borrow()
    }

    pub(crate) fn send(&self, action: A) {
        self.queue.borrow_mut().push_back(action);

        if self.dispatching.get() {
            tracing::trace!(
                queued = self.queue.borrow().len(),
                "Send during dispatch, action queued"
            );
            return;
        }

        let _guard = DispatchGuard::enter(&self.dispatching);
        loop {
            let next = self.queue.borrow_mut().pop_front();
            match next {
                Some(action) => self.process(action),
                None => break,
            }
        }
    }

    fn process(&self, action: A) {
        self.middleware.borrow_mut().before(&action);

        let changed = {
            let mut state = self.state.borrow_mut();
            (self.reducer)(&mut *state, action.clone())
        };

        self.middleware.borrow_mut().after(&action, changed);
        self.notify();
    }

    /// Call observers layer by layer: the store's own observers first, then
    /// those of its scopes, then those of scopes of scopes. Within a layer,
    /// registration order.
    fn notify(&self) {
        // Observers may subscribe or unsubscribe while being notified, so
        // iterate over a snapshot and re-check membership before each call.
        let mut snapshot: Vec<(usize, SubscriptionId, SharedObserver<S>)> = self
            .observers
            .borrow()
            .iter()
            .map(|entry| (entry.depth, entry.id, Rc::clone(&entry.observer)))
            .collect();
        snapshot.sort_by_key(|(depth, _, _)| *depth);

        let state = self.state.borrow();
        for (_, id, observer) in snapshot {
            if !self.is_registered(id) {
                continue;
            }
            let mut callback = observer.borrow_mut();
            (&mut *callback)(&*state);
        }
    }

    pub(crate) fn subscribe(&self, observer: BoxedObserver<S>, depth: usize) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.get());
        self.next_id.set(id.0 + 1);

        let observer: SharedObserver<S> = Rc::new(RefCell::new(observer));
        self.observers.borrow_mut().push(Registration {
            id,
            depth,
            observer,
        });
        id
    }

    pub(crate) fn unsubscribe(&self, id: SubscriptionId) {
        self.observers.borrow_mut().retain(|entry| entry.id != id);
    }

    fn is_registered(&self, id: SubscriptionId) -> bool {
        self.observers.borrow().iter().any(|entry| entry.id == id)
    }

    fn observer_count(&self) -> usize {
        self.observers.borrow().len()
    }
}

/// Single-owner state store with Redux-like reducer pattern
///
/// The store holds the authoritative state and is the only place it can
/// change: every mutation goes through [`Store::send`]. After each action
/// the reducer runs, then every registered observer is called with the new
/// state, in registration order.
///
/// A store is not `Clone`, `Send` or `Sync`. Views of it are
/// created with [`Store::scope`] and hold only a weak reference.
///
/// # Reentrancy
///
/// An action sent while the store is already dispatching (for example from
/// inside an observer) is queued. It is processed after the current
/// notification pass finishes, before the outermost `send` returns, and
/// queued actions run in the order they were sent.
///
/// # Example
/// ```
/// use scope_dispatch_core::{Action, Store};
///
/// #[derive(Clone, Debug)]
/// enum CounterAction {
///     Increment,
///     Decrement,
/// }
///
/// impl Action for CounterAction {
///     fn name(&self) -> &'static str {
///         match self {
///             CounterAction::Increment => "Increment",
///             CounterAction::Decrement => "Decrement",
///         }
///     }
/// }
///
/// fn reducer(count: &mut i64, action: CounterAction) -> bool {
///     match action {
///         CounterAction::Increment => *count += 1,
///         CounterAction::Decrement => *count -= 1,
///     }
///     true
/// }
///
/// let store = Store::new(0_i64, reducer);
/// store.send(CounterAction::Increment);
/// assert_eq!(store.current_state(), 1);
/// ```
pub struct Store<S: 'static, A: Action> {
    inner: Rc<StoreInner<S, A>>,
}

impl<S: 'static, A: Action> Store<S, A> {
    /// Create a new store with initial state and reducer
    pub fn new<R>(state: S, reducer: R) -> Self
    where
        R: Fn(&mut S, A) -> bool + 'static,
    {
        Self::with_middleware(state, reducer, NoopMiddleware)
    }

    /// Create a new store whose reducer calls are wrapped by `middleware`
    pub fn with_middleware<R, M>(state: S, reducer: R, middleware: M) -> Self
    where
        R: Fn(&mut S, A) -> bool + 'static,
        M: Middleware<A> + 'static,
    {
        Self {
            inner: Rc::new(StoreInner {
                state: RefCell::new(state),
                reducer: Box::new(reducer),
                middleware: RefCell::new(Box::new(middleware)),
                observers: RefCell::new(Vec::new()),
                next_id: Cell::new(0),
                queue: RefCell::new(VecDeque::new()),
                dispatching: Cell::new(false),
            }),
        }
    }

    /// Send an action to the store
    ///
    /// Runs the reducer and notifies every registered observer before
    /// returning. When called during a dispatch the action is queued
    /// instead; see the type-level docs.
    pub fn send(&self, action: A) {
        self.inner.send(action);
    }

    /// Borrow the current state
    ///
    /// The guard must be released before calling [`Store::send`] from the
    /// same scope.
    pub fn state(&self) -> Ref<'_, S> {
        self.inner.state()
    }

    /// Get a copy of the current state
    pub fn current_state(&self) -> S
    where
        S: Clone,
    {
        self.inner.state().clone()
    }

    /// Register an observer for future state changes
    ///
    /// The observer is not called with the current state. It is called once
    /// per processed action from then on, until it is unsubscribed or the
    /// store is dropped. Observers of the store run before any observer
    /// registered through a [`ScopedStore`].
    pub fn subscribe<F>(&self, observer: F) -> SubscriptionId
    where
        F: FnMut(&S) + 'static,
    {
        self.inner.subscribe(Box::new(observer), 0)
    }

    /// Unregister an observer. Unknown or already-removed handles are ignored.
    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.inner.unsubscribe(id);
    }

    /// Number of currently registered observers
    pub fn observer_count(&self) -> usize {
        self.inner.observer_count()
    }

    /// Create a view of this store
    ///
    /// `project` derives the child state from this store's state; `embed`
    /// lifts child actions into this store's action type. The returned
    /// [`ScopedStore`] does not keep this store alive.
    pub fn scope<CS, CA, P, E>(&self, project: P, embed: E) -> ScopedStore<CS, CA>
    where
        CS: 'static,
        CA: 'static,
        P: Fn(&S) -> CS + 'static,
        E: Fn(CA) -> A + 'static,
    {
        let root: Rc<dyn Link<S, A>> = Rc::new(RootLink::new(Rc::downgrade(&self.inner)));
        ScopedStore::from_layer(Layer::new(root, project, embed))
    }
}

impl<S: std::fmt::Debug + 'static, A: Action> std::fmt::Debug for Store<S, A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.inner.state.try_borrow() {
            Ok(state) => f
                .debug_struct("Store")
                .field("state", &*state)
                .field("observers", &self.observer_count())
                .finish(),
            Err(_) => f
                .debug_struct("Store")
                .field("state", &"<dispatching>")
                .finish(),
        }
    }
}

/// Middleware trait for intercepting actions
///
/// Implement this trait to add logging, recording, or other
/// cross-cutting concerns to your store.
pub trait Middleware<A: Action> {
    /// Called before the action is dispatched to the reducer
    fn before(&mut self, action: &A);

    /// Called after the action is processed by the reducer, before observers
    /// are notified
    fn after(&mut self, action: &A, state_changed: bool);
}

/// A no-op middleware that does nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopMiddleware;

impl<A: Action> Middleware<A> for NoopMiddleware {
    fn before(&mut self, _action: &A) {}
    fn after(&mut self, _action: &A, _state_changed: bool) {}
}

/// Middleware that logs actions through `tracing`
#[derive(Debug, Clone, Default)]
pub struct LoggingMiddleware {
    /// Whether to log before dispatch
    pub log_before: bool,
    /// Whether to log after dispatch
    pub log_after: bool,
}

impl LoggingMiddleware {
    /// Create a new logging middleware with default settings (log after only)
    pub fn new() -> Self {
        Self {
            log_before: false,
            log_after: true,
        }
    }

    /// Create a logging middleware that logs both before and after
    pub fn verbose() -> Self {
        Self {
            log_before: true,
            log_after: true,
        }
    }
}

impl<A: Action> Middleware<A> for LoggingMiddleware {
    fn before(&mut self, action: &A) {
        if self.log_before {
            tracing::debug!(action = %action.name(), "Dispatching action");
        }
    }

    fn after(&mut self, action: &A, state_changed: bool) {
        if self.log_after {
            tracing::debug!(
                action = %action.name(),
                state_changed = state_changed,
                "Action processed"
            );
        }
    }
}

/// Compose multiple middleware into a single middleware
pub struct ComposedMiddleware<A: Action> {
    middlewares: Vec<Box<dyn Middleware<A>>>,
}

impl<A: Action> std::fmt::Debug for ComposedMiddleware<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComposedMiddleware")
            .field("middlewares_count", &self.middlewares.len())
            .finish()
    }
}

impl<A: Action> Default for ComposedMiddleware<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: Action> ComposedMiddleware<A> {
    /// Create a new composed middleware
    pub fn new() -> Self {
        Self {
            middlewares: Vec::new(),
        }
    }

    /// Add a middleware to the composition
    pub fn add<M: Middleware<A> + 'static>(&mut self, middleware: M) {
        self.middlewares.push(Box::new(middleware));
    }
}

impl<A: Action> Middleware<A> for ComposedMiddleware<A> {
    fn before(&mut self, action: &A) {
        for middleware in &mut self.middlewares {
            middleware.before(action);
        }
    }

    fn after(&mut self, action: &A, state_changed: bool) {
        // Reverse order for proper nesting
        for middleware in self.middlewares.iter_mut().rev() {
            middleware.after(action, state_changed);
        }
    }
}
