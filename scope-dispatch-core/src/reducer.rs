//! Reducer combinators
//!
//! Feature reducers are written against their own small state and action
//! types. [`pullback`] lifts one into a larger state/action pair, and
//! [`combine`] runs several lifted reducers as one:
//!
//! ```
//! use scope_dispatch_core::{combine, pullback, BoxedReducer};
//!
//! #[derive(Default)]
//! struct AppState {
//!     count: i64,
//!     visits: u32,
//! }
//!
//! #[derive(Clone)]
//! enum AppAction {
//!     Count(i64),
//!     Visit,
//! }
//!
//! fn add(count: &mut i64, delta: i64) -> bool {
//!     *count += delta;
//!     delta != 0
//! }
//!
//! fn visit(visits: &mut u32, _: ()) -> bool {
//!     *visits += 1;
//!     true
//! }
//!
//! let reducers: Vec<BoxedReducer<AppState, AppAction>> = vec![
//!     Box::new(pullback(add, |s: &mut AppState| &mut s.count, |a: AppAction| match a {
//!         AppAction::Count(delta) => Some(delta),
//!         _ => None,
//!     })),
//!     Box::new(pullback(visit, |s: &mut AppState| &mut s.visits, |a: AppAction| match a {
//!         AppAction::Visit => Some(()),
//!         _ => None,
//!     })),
//! ];
//! let app = combine(reducers);
//!
//! let mut state = AppState::default();
//! assert!(app(&mut state, AppAction::Count(3)));
//! assert!(app(&mut state, AppAction::Visit));
//! assert_eq!((state.count, state.visits), (3, 1));
//! ```

/// Type-erased reducer, as accepted by [`combine`]
pub type BoxedReducer<S, A> = Box<dyn Fn(&mut S, A) -> bool>;

/// Lift a reducer over local state and actions into a global one
///
/// `focus` selects the local slice of the global state; `extract` picks the
/// local action out of a global one. Global actions that `extract` rejects
/// leave the state untouched and report no change.
pub fn pullback<LS, LA, GS, GA, R, F, X>(
    reducer: R,
    focus: F,
    extract: X,
) -> impl Fn(&mut GS, GA) -> bool
where
    R: Fn(&mut LS, LA) -> bool,
    F: Fn(&mut GS) -> &mut LS,
    X: Fn(GA) -> Option<LA>,
{
    move |state: &mut GS, action: GA| match extract(action) {
        Some(local) => reducer(focus(state), local),
        None => false,
    }
}

/// Run several reducers over the same state, in order
///
/// Every reducer sees every action. The result reports a change if any
/// reducer did.
pub fn combine<S, A>(reducers: Vec<BoxedReducer<S, A>>) -> impl Fn(&mut S, A) -> bool
where
    A: Clone,
{
    move |state: &mut S, action: A| {
        let mut changed = false;
        for reducer in &reducers {
            changed |= reducer(&mut *state, action.clone());
        }
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default, PartialEq)]
    struct State {
        count: i64,
        log: Vec<&'static str>,
    }

    #[derive(Clone, Debug)]
    enum GlobalAction {
        Counter(CounterAction),
        Note(&'static str),
    }

    #[derive(Clone, Debug)]
    enum CounterAction {
        Increment,
        Decrement,
    }

    fn counter(count: &mut i64, action: CounterAction) -> bool {
        match action {
            CounterAction::Increment => *count += 1,
            CounterAction::Decrement => *count -= 1,
        }
        true
    }

    fn extract_counter(action: GlobalAction) -> Option<CounterAction> {
        match action {
            GlobalAction::Counter(action) => Some(action),
            _ => None,
        }
    }

    #[test]
    fn test_pullback_routes_matching_actions() {
        let reducer = pullback(counter, |s: &mut State| &mut s.count, extract_counter);
        let mut state = State::default();

        assert!(reducer(&mut state, GlobalAction::Counter(CounterAction::Increment)));
        assert!(reducer(&mut state, GlobalAction::Counter(CounterAction::Increment)));
        assert!(reducer(&mut state, GlobalAction::Counter(CounterAction::Decrement)));
        assert_eq!(state.count, 1);
    }

    #[test]
    fn test_pullback_ignores_foreign_actions() {
        let reducer = pullback(counter, |s: &mut State| &mut s.count, extract_counter);
        let mut state = State::default();

        assert!(!reducer(&mut state, GlobalAction::Note("hi")));
        assert_eq!(state, State::default());
    }

    #[test]
    fn test_combine_runs_in_order() {
        let reducers: Vec<BoxedReducer<State, GlobalAction>> = vec![
            Box::new(|s: &mut State, _: GlobalAction| {
                s.log.push("first");
                false
            }),
            Box::new(pullback(counter, |s: &mut State| &mut s.count, extract_counter)),
            Box::new(|s: &mut State, _: GlobalAction| {
                s.log.push("last");
                false
            }),
        ];
        let reducer = combine(reducers);
        let mut state = State::default();

        assert!(reducer(&mut state, GlobalAction::Counter(CounterAction::Decrement)));
        assert_eq!(state.count, -1);
        assert_eq!(state.log, vec!["first", "last"]);

        assert!(!reducer(&mut state, GlobalAction::Note("x")));
    }

    #[test]
    fn test_counter_arithmetic_is_exact() {
        let reducer = pullback(counter, |s: &mut State| &mut s.count, extract_counter);

        for start in [-3_i64, 0, 2] {
            let mut state = State {
                count: start,
                ..State::default()
            };
            let actions = [
                CounterAction::Decrement,
                CounterAction::Decrement,
                CounterAction::Increment,
                CounterAction::Decrement,
                CounterAction::Decrement,
            ];
            for action in actions {
                reducer(&mut state, GlobalAction::Counter(action));
            }
            assert_eq!(state.count, start + 1 - 4);
        }
    }
}
