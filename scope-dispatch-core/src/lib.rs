//! Core traits and types for scope-dispatch
//!
//! This crate provides a single-owner, observable state store and the
//! machinery for composing independent features into it, following a
//! Redux/Elm-inspired architecture.
//!
//! # Core Concepts
//!
//! - **Action**: Tagged values that describe state changes
//! - **Store**: The one owner of the state; runs the reducer and notifies observers
//! - **ScopedStore**: A non-owning view that projects state out of a parent
//!   and embeds its own actions into the parent's action type
//! - **pullback / combine**: Lift feature reducers into the app's state and
//!   run them together
//! - **Mailbox**: Hands results from async work back to the store's thread
//!
//! # Basic Example
//!
//! ```ignore
//! use scope_dispatch_core::prelude::*;
//!
//! #[derive(Action, Clone, Debug)]
//! enum CounterAction {
//!     Increment,
//!     Decrement,
//! }
//!
//! fn counter(count: &mut i64, action: CounterAction) -> bool {
//!     match action {
//!         CounterAction::Increment => *count += 1,
//!         CounterAction::Decrement => *count -= 1,
//!     }
//!     true
//! }
//!
//! let store = Store::new(0, counter);
//! let id = store.subscribe(|count| println!("count is {count}"));
//! store.send(CounterAction::Increment);
//! store.unsubscribe(id);
//! ```
//!
//! # Composing features
//!
//! Each feature owns a reducer over its own state slice and action enum. The
//! app action is an enum with one variant per feature, and the app reducer is
//! the combination of every feature reducer pulled back along its variant:
//!
//! ```ignore
//! #[derive(Action, Clone, Debug)]
//! enum AppAction {
//!     #[action(embed)]
//!     Counter(CounterAction),
//!     #[action(embed)]
//!     Favorites(FavoritesAction),
//! }
//!
//! let reducers: Vec<BoxedReducer<AppState, AppAction>> = vec![
//!     Box::new(pullback(counter, |s: &mut AppState| &mut s.count, AppAction::extract_counter)),
//!     Box::new(pullback(favorites, |s: &mut AppState| &mut s.favorites, AppAction::extract_favorites)),
//! ];
//! let store = Store::new(AppState::default(), combine(reducers));
//!
//! // The counter view sees only the count and speaks only CounterAction.
//! let counter_view = store.scope(|s: &AppState| s.count, AppAction::Counter);
//! counter_view.send(CounterAction::Increment)?;
//! ```

pub mod action;
pub mod error;
pub mod mailbox;
pub mod reducer;
pub mod scope;
pub mod store;
pub mod testing;

// Core trait exports
pub use action::Action;
pub use error::StoreError;

// Store exports
pub use scope::ScopedStore;
pub use store::{
    ComposedMiddleware, LoggingMiddleware, Middleware, NoopMiddleware, Store,
    SubscriptionId,
};

// Composition exports
pub use reducer::{combine, pullback, BoxedReducer};

// Async hand-off exports
pub use mailbox::{channel, ActionSender, Mailbox};

// Testing exports
pub use testing::{RecordingMiddleware, TestHarness};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::action::Action;
    pub use crate::error::StoreError;
    pub use crate::mailbox::{channel, ActionSender, Mailbox};
    pub use crate::reducer::{combine, pullback, BoxedReducer};
    pub use crate::scope::ScopedStore;
    pub use crate::store::{
        ComposedMiddleware, LoggingMiddleware, Middleware, NoopMiddleware, Store,
        SubscriptionId,
    };
}
