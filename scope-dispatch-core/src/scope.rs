//! Scoped stores: non-owning, projected views of a root store
//!
//! A [`ScopedStore`] is built from a parent plus two transforms:
//!
//! - `project: Fn(&ParentState) -> ChildState` derives the child's state
//! - `embed: Fn(ChildAction) -> ParentAction` lifts child actions into the
//!   parent's vocabulary
//!
//! It holds no state of its own. Reads are recomputed from the root on every
//! call and every send is forwarded to the root's reducer, so a scope can
//! never drift out of sync with its parent. Scopes can be scoped again:
//! `parent.scope(p1, e1).scope(p2, e2)` reads `p2(p1(root))` and sends
//! `e1(e2(action))`.
//!
//! The root is referenced weakly. Once the root [`Store`](crate::Store) is
//! dropped, every operation on a scope derived from it returns
//! [`StoreError::Released`].

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::error::StoreError;
use crate::store::{BoxedObserver, StoreInner, SubscriptionId};
use crate::Action;

/// One hop between a scope and the root store.
///
/// Implemented by the weak root handle and by every projection layer, so a
/// chain of scopes is a chain of links ending at the root.
pub(crate) trait Link<S, A> {
    fn read(&self, visit: &mut dyn FnMut(&S)) -> Result<(), StoreError>;
    fn send(&self, action: A) -> Result<(), StoreError>;
    /// Register with the root; `depth` counts the layers already passed.
    fn subscribe(
        &self,
        observer: BoxedObserver<S>,
        depth: usize,
    ) -> Result<SubscriptionId, StoreError>;
    fn unsubscribe(&self, id: SubscriptionId) -> Result<(), StoreError>;
    fn is_alive(&self) -> bool;
}

pub(crate) struct RootLink<S, A> {
    store: Weak<StoreInner<S, A>>,
}

impl<S, A> RootLink<S, A> {
    pub(crate) fn new(store: Weak<StoreInner<S, A>>) -> Self {
        Self { store }
    }

    fn upgrade(&self) -> Result<Rc<StoreInner<S, A>>, StoreError> {
        self.store.upgrade().ok_or(StoreError::Released)
    }
}

impl<S: 'static, A: Action> Link<S, A> for RootLink<S, A> {
    fn read(&self, visit: &mut dyn FnMut(&S)) -> Result<(), StoreError> {
        let store = self.upgrade()?;
        let state = store.state();
        visit(&*state);
        Ok(())
    }

    fn send(&self, action: A) -> Result<(), StoreError> {
        self.upgrade()?.send(action);
        Ok(())
    }

    fn subscribe(
        &self,
        observer: BoxedObserver<S>,
        depth: usize,
    ) -> Result<SubscriptionId, StoreError> {
        Ok(self.upgrade()?.subscribe(observer, depth))
    }

    fn unsubscribe(&self, id: SubscriptionId) -> Result<(), StoreError> {
        self.upgrade()?.unsubscribe(id);
        Ok(())
    }

    fn is_alive(&self) -> bool {
        self.store.strong_count() > 0
    }
}

pub(crate) struct Layer<PS, PA, S, A> {
    parent: Rc<dyn Link<PS, PA>>,
    project: Rc<dyn Fn(&PS) -> S>,
    embed: Rc<dyn Fn(A) -> PA>,
}

impl<PS, PA, S, A> Layer<PS, PA, S, A> {
    pub(crate) fn new<P, E>(parent: Rc<dyn Link<PS, PA>>, project: P, embed: E) -> Self
    where
        P: Fn(&PS) -> S + 'static,
        E: Fn(A) -> PA + 'static,
    {
        Self {
            parent,
            project: Rc::new(project),
            embed: Rc::new(embed),
        }
    }
}

impl<PS, PA, S, A> Link<S, A> for Layer<PS, PA, S, A>
where
    PS: 'static,
    PA: 'static,
    S: 'static,
    A: 'static,
{
    fn read(&self, visit: &mut dyn FnMut(&S)) -> Result<(), StoreError> {
        let project = &self.project;
        self.parent.read(&mut |parent: &PS| visit(&project(parent)))
    }

    fn send(&self, action: A) -> Result<(), StoreError> {
        self.parent.send((self.embed)(action))
    }

    fn subscribe(
        &self,
        mut observer: BoxedObserver<S>,
        depth: usize,
    ) -> Result<SubscriptionId, StoreError> {
        let project = Rc::clone(&self.project);
        self.parent.subscribe(
            Box::new(move |parent: &PS| observer(&project(parent))),
            depth + 1,
        )
    }

    fn unsubscribe(&self, id: SubscriptionId) -> Result<(), StoreError> {
        self.parent.unsubscribe(id)
    }

    fn is_alive(&self) -> bool {
        self.parent.is_alive()
    }
}

/// A projected view of a parent store
///
/// Created with [`Store::scope`](crate::Store::scope) or
/// [`ScopedStore::scope`]. Cloning a scoped store is cheap and yields another
/// handle to the same view.
///
/// # Example
/// ```
/// use scope_dispatch_core::{Action, Store};
///
/// #[derive(Clone, Debug, Default)]
/// struct AppState {
///     count: i64,
///     title: String,
/// }
///
/// #[derive(Clone, Debug)]
/// enum AppAction {
///     Add(i64),
/// }
///
/// impl Action for AppAction {
///     fn name(&self) -> &'static str {
///         "Add"
///     }
/// }
///
/// fn reducer(state: &mut AppState, action: AppAction) -> bool {
///     let AppAction::Add(n) = action;
///     state.count += n;
///     true
/// }
///
/// let store = Store::new(AppState::default(), reducer);
/// let count = store.scope(|s: &AppState| s.count, AppAction::Add);
///
/// count.send(5).unwrap();
/// assert_eq!(count.current_state().unwrap(), 5);
/// assert_eq!(store.state().count, 5);
/// ```
pub struct ScopedStore<S, A> {
    link: Rc<dyn Link<S, A>>,
}

impl<S, A> Clone for ScopedStore<S, A> {
    fn clone(&self) -> Self {
        Self {
            link: Rc::clone(&self.link),
        }
    }
}

impl<S: 'static, A: 'static> ScopedStore<S, A> {
    pub(crate) fn from_layer<PS: 'static, PA: 'static>(layer: Layer<PS, PA, S, A>) -> Self {
        Self {
            link: Rc::new(layer),
        }
    }

    /// Run `f` against the projected state without cloning it
    ///
    /// The root state stays borrowed while `f` runs, so `f` must not send
    /// through this scope or any other handle on the same store; that panics.
    pub fn with_state<R>(&self, f: impl FnOnce(&S) -> R) -> Result<R, StoreError> {
        let mut f = Some(f);
        let mut out = None;
        self.link.read(&mut |state: &S| {
            if let Some(f) = f.take() {
                out = Some(f(state));
            }
        })?;
        out.ok_or(StoreError::Released)
    }

    /// Get the projected state, recomputed from the root
    pub fn current_state(&self) -> Result<S, StoreError>
    where
        S: Clone,
    {
        self.with_state(S::clone)
    }

    /// Embed `action` and send it to the parent
    pub fn send(&self, action: A) -> Result<(), StoreError> {
        self.link.send(action)
    }

    /// Register an observer that receives the projected state after every
    /// action processed by the root store
    ///
    /// The observer runs only after every observer of the parent has been
    /// notified of the same action.
    pub fn subscribe<F>(&self, observer: F) -> Result<SubscriptionId, StoreError>
    where
        F: FnMut(&S) + 'static,
    {
        self.link.subscribe(Box::new(observer), 0)
    }

    /// Like [`ScopedStore::subscribe`], but skips deliveries whose projection
    /// equals the last one seen
    ///
    /// The baseline is the projection at the time of subscribing, so an
    /// action that leaves this view untouched produces no call.
    pub fn subscribe_distinct<F>(&self, mut observer: F) -> Result<SubscriptionId, StoreError>
    where
        S: Clone + PartialEq,
        F: FnMut(&S) + 'static,
    {
        let last = RefCell::new(self.current_state()?);
        self.link.subscribe(
            Box::new(move |state: &S| {
                if *last.borrow() == *state {
                    return;
                }
                last.replace(state.clone());
                observer(state);
            }),
            0,
        )
    }

    /// Unregister an observer. Unknown or already-removed handles are ignored.
    pub fn unsubscribe(&self, id: SubscriptionId) -> Result<(), StoreError> {
        self.link.unsubscribe(id)
    }

    /// Whether the root store is still alive
    pub fn is_alive(&self) -> bool {
        self.link.is_alive()
    }

    /// Scope this view further
    ///
    /// The result reads `project(self.current_state())` and sends
    /// `self.send(embed(action))`.
    pub fn scope<CS, CA, P, E>(&self, project: P, embed: E) -> ScopedStore<CS, CA>
    where
        CS: 'static,
        CA: 'static,
        P: Fn(&S) -> CS + 'static,
        E: Fn(CA) -> A + 'static,
    {
        ScopedStore::from_layer(Layer::new(Rc::clone(&self.link), project, embed))
    }
}

impl<S, A> std::fmt::Debug for ScopedStore<S, A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScopedStore")
            .field("alive", &self.link.is_alive())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Store;
    use std::cell::Cell;

    #[derive(Clone, Debug, Default, PartialEq)]
    struct Parent {
        count: i64,
        label: String,
        favorites: Vec<i64>,
    }

    #[derive(Clone, Debug, PartialEq)]
    enum ParentAction {
        Count(CountAction),
        Rename(String),
    }

    #[derive(Clone, Debug, PartialEq)]
    enum CountAction {
        Increment,
        Decrement,
        Favorite,
    }

    impl Action for ParentAction {
        fn name(&self) -> &'static str {
            match self {
                ParentAction::Count(_) => "Count",
                ParentAction::Rename(_) => "Rename",
            }
        }
    }

    fn reducer(state: &mut Parent, action: ParentAction) -> bool {
        match action {
            ParentAction::Count(CountAction::Increment) => state.count += 1,
            ParentAction::Count(CountAction::Decrement) => state.count -= 1,
            ParentAction::Count(CountAction::Favorite) => state.favorites.push(state.count),
            ParentAction::Rename(label) => state.label = label,
        }
        true
    }

    #[derive(Clone, Debug, PartialEq)]
    struct CountView {
        count: i64,
        favorites: Vec<i64>,
    }

    fn project(parent: &Parent) -> CountView {
        CountView {
            count: parent.count,
            favorites: parent.favorites.clone(),
        }
    }

    #[test]
    fn test_scoped_send_goes_through_parent() {
        let store = Store::new(Parent::default(), reducer);
        let scoped = store.scope(project, ParentAction::Count);

        scoped.send(CountAction::Increment).unwrap();
        scoped.send(CountAction::Increment).unwrap();
        scoped.send(CountAction::Favorite).unwrap();

        assert_eq!(store.state().count, 2);
        assert_eq!(store.state().favorites, vec![2]);
    }

    #[test]
    fn test_projection_never_stale() {
        let store = Store::new(Parent::default(), reducer);
        let scoped = store.scope(project, ParentAction::Count);

        store.send(ParentAction::Count(CountAction::Decrement));
        assert_eq!(scoped.current_state().unwrap().count, -1);

        store.send(ParentAction::Count(CountAction::Favorite));
        assert_eq!(
            scoped.current_state().unwrap(),
            project(&store.current_state())
        );
    }

    #[test]
    fn test_scoped_subscribe_receives_projection() {
        let store = Store::new(Parent::default(), reducer);
        let scoped = store.scope(project, ParentAction::Count);
        let seen = Rc::new(RefCell::new(Vec::new()));

        let sink = Rc::clone(&seen);
        scoped
            .subscribe(move |view: &CountView| sink.borrow_mut().push(view.count))
            .unwrap();

        scoped.send(CountAction::Increment).unwrap();
        store.send(ParentAction::Rename("x".into()));

        // Every parent notification is forwarded, even when the view is unchanged.
        assert_eq!(*seen.borrow(), vec![1, 1]);
    }

    #[test]
    fn test_subscribe_distinct_skips_unchanged() {
        let store = Store::new(Parent::default(), reducer);
        let scoped = store.scope(project, ParentAction::Count);
        let calls = Rc::new(Cell::new(0));

        let sink = Rc::clone(&calls);
        scoped
            .subscribe_distinct(move |_: &CountView| sink.set(sink.get() + 1))
            .unwrap();

        store.send(ParentAction::Rename("a".into()));
        assert_eq!(calls.get(), 0);

        scoped.send(CountAction::Increment).unwrap();
        store.send(ParentAction::Rename("b".into()));
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_unsubscribe_through_scope_and_root() {
        let store = Store::new(Parent::default(), reducer);
        let scoped = store.scope(project, ParentAction::Count);
        let calls = Rc::new(Cell::new(0));

        let sink = Rc::clone(&calls);
        let id = scoped
            .subscribe(move |_: &CountView| sink.set(sink.get() + 1))
            .unwrap();
        assert_eq!(store.observer_count(), 1);

        scoped.unsubscribe(id).unwrap();
        scoped.unsubscribe(id).unwrap();
        store.unsubscribe(id);

        store.send(ParentAction::Count(CountAction::Increment));
        assert_eq!(calls.get(), 0);
        assert_eq!(store.observer_count(), 0);
    }

    #[test]
    fn test_nested_scope_composes() {
        let store = Store::new(Parent::default(), reducer);
        let view = store.scope(project, ParentAction::Count);
        let count_only = view.scope(|v: &CountView| v.count, |a: CountAction| a);

        count_only.send(CountAction::Increment).unwrap();
        count_only.send(CountAction::Increment).unwrap();

        assert_eq!(count_only.current_state().unwrap(), 2);
        assert_eq!(view.current_state().unwrap().count, 2);
        assert_eq!(store.state().count, 2);
    }

    #[test]
    fn test_released_after_root_dropped() {
        let store = Store::new(Parent::default(), reducer);
        let scoped = store.scope(project, ParentAction::Count);
        let nested = scoped.scope(|v: &CountView| v.count, |a: CountAction| a);
        let id = nested.subscribe(|_: &i64| {}).unwrap();

        drop(store);

        assert!(!nested.is_alive());
        assert_eq!(scoped.current_state(), Err(StoreError::Released));
        assert_eq!(
            nested.send(CountAction::Increment),
            Err(StoreError::Released)
        );
        assert_eq!(
            scoped.subscribe(|_: &CountView| {}).unwrap_err(),
            StoreError::Released
        );
        assert_eq!(
            nested.unsubscribe(id),
            Err(StoreError::Released)
        );
    }

    #[test]
    fn test_scope_does_not_keep_root_alive() {
        let store = Store::new(Parent::default(), reducer);
        let scoped = store.scope(project, ParentAction::Count);
        let clone = scoped.clone();
        drop(scoped);

        assert!(clone.is_alive());
        drop(store);
        assert!(!clone.is_alive());
    }

    #[test]
    fn test_scoped_observer_sees_completed_parent_dispatch() {
        let store = Rc::new(Store::new(Parent::default(), reducer));
        let scoped = store.scope(project, ParentAction::Count);
        let root_calls = Rc::new(Cell::new(0));
        let seen = Rc::new(RefCell::new(Vec::new()));

        let sink = Rc::clone(&root_calls);
        store.subscribe(move |_| sink.set(sink.get() + 1));

        let calls = Rc::clone(&root_calls);
        let log = Rc::clone(&seen);
        scoped
            .subscribe(move |view: &CountView| log.borrow_mut().push((calls.get(), view.count)))
            .unwrap();

        scoped.send(CountAction::Increment).unwrap();
        assert_eq!(*seen.borrow(), vec![(1, 1)]);
    }

    #[test]
    fn test_parent_observers_run_before_earlier_scoped_observers() {
        let store = Store::new(Parent::default(), reducer);
        let scoped = store.scope(project, ParentAction::Count);
        let nested = scoped.scope(|view: &CountView| view.count, |a: CountAction| a);
        let order = Rc::new(RefCell::new(Vec::new()));

        let log = Rc::clone(&order);
        nested
            .subscribe(move |_: &i64| log.borrow_mut().push("nested"))
            .unwrap();
        let log = Rc::clone(&order);
        scoped
            .subscribe(move |_: &CountView| log.borrow_mut().push("scoped"))
            .unwrap();
        let log = Rc::clone(&order);
        store.subscribe(move |_| log.borrow_mut().push("root"));

        nested.send(CountAction::Increment).unwrap();
        assert_eq!(*order.borrow(), vec!["root", "scoped", "nested"]);

        store.send(ParentAction::Rename("x".into()));
        assert_eq!(
            *order.borrow(),
            vec!["root", "scoped", "nested", "root", "scoped", "nested"]
        );
    }

    #[test]
    fn test_scoped_observer_registered_first_still_sees_finished_pass() {
        let store = Store::new(Parent::default(), reducer);
        let scoped = store.scope(project, ParentAction::Count);
        let root_calls = Rc::new(Cell::new(0));
        let seen = Rc::new(RefCell::new(Vec::new()));

        let calls = Rc::clone(&root_calls);
        let log = Rc::clone(&seen);
        scoped
            .subscribe(move |view: &CountView| log.borrow_mut().push((calls.get(), view.count)))
            .unwrap();
        let sink = Rc::clone(&root_calls);
        store.subscribe(move |_| sink.set(sink.get() + 1));

        scoped.send(CountAction::Increment).unwrap();
        scoped.send(CountAction::Increment).unwrap();
        assert_eq!(*seen.borrow(), vec![(1, 1), (2, 2)]);
    }

    #[test]
    #[should_panic]
    fn test_send_inside_with_state_panics() {
        let store = Store::new(Parent::default(), reducer);
        let scoped = store.scope(project, ParentAction::Count);

        let _ = scoped.with_state(|_| scoped.send(CountAction::Increment));
    }
}
