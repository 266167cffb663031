//! scope-dispatch: Composable single-owner state stores
//!
//! Like Redux/Elm, but with scoped views: one store owns the state, features
//! talk to it through projected [`ScopedStore`]s, and every mutation happens
//! through a sent action.
//!
//! # Example
//! ```ignore
//! use scope_dispatch::prelude::*;
//!
//! #[derive(Action, Clone, Debug)]
//! enum CounterAction {
//!     Increment,
//!     Decrement,
//! }
//!
//! #[derive(Action, Clone, Debug)]
//! enum AppAction {
//!     #[action(embed)]
//!     Counter(CounterAction),
//! }
//! ```

// Re-export everything from core
pub use scope_dispatch_core::*;

// Re-export derive macros
pub use scope_dispatch_macros::Action;

/// Prelude for convenient imports
pub mod prelude {
    // Traits
    pub use scope_dispatch_core::Action;

    // Store
    pub use scope_dispatch_core::{
        ComposedMiddleware, LoggingMiddleware, Middleware, NoopMiddleware, ScopedStore,
        Store, StoreError, SubscriptionId,
    };

    // Composition
    pub use scope_dispatch_core::{combine, pullback, BoxedReducer};

    // Async hand-off
    pub use scope_dispatch_core::{channel, ActionSender, Mailbox};

    // Derive macros
    pub use scope_dispatch_macros::Action;
}
