//! Wiring: root store, mailbox, lookup
//!
//! The lookup is started by [`LookupMiddleware`] when an
//! `NthPrime(Requested(n))` action has been reduced. Its callback sends the
//! `Response` into the mailbox, which the main loop drains back into the
//! store on the UI thread.

use scope_dispatch::{
    channel, ActionSender, ComposedMiddleware, LoggingMiddleware, Mailbox, Middleware,
    ScopedStore, Store,
};

use crate::action::{AppAction, CounterViewAction, NthPrimeAction};
use crate::lookup::NthPrimeLookup;
use crate::reducer::app_reducer;
use crate::state::{AppState, CounterViewState};

/// Starts a lookup for every `NthPrime(Requested(n))`
pub struct LookupMiddleware {
    lookup: Box<dyn NthPrimeLookup>,
    tx: ActionSender<AppAction>,
}

impl LookupMiddleware {
    pub fn new(lookup: Box<dyn NthPrimeLookup>, tx: ActionSender<AppAction>) -> Self {
        Self { lookup, tx }
    }
}

impl Middleware<AppAction> for LookupMiddleware {
    fn before(&mut self, _action: &AppAction) {}

    fn after(&mut self, action: &AppAction, _state_changed: bool) {
        let AppAction::NthPrime(NthPrimeAction::Requested(n)) = action else {
            return;
        };
        let n = *n;
        let tx = self.tx.clone();
        tracing::debug!(n, "Starting nth prime lookup");
        self.lookup.nth_prime(
            n,
            Box::new(move |prime| {
                let _ = tx.send(AppAction::NthPrime(NthPrimeAction::Response { n, prime }));
            }),
        );
    }
}

/// The running application: one store, one mailbox
pub struct App {
    pub store: Store<AppState, AppAction>,
    pub mailbox: Mailbox<AppAction>,
}

impl App {
    pub fn new(initial: AppState, lookup: Box<dyn NthPrimeLookup>) -> Self {
        let (tx, mailbox) = channel();

        let mut middleware = ComposedMiddleware::new();
        middleware.add(LoggingMiddleware::new());
        middleware.add(LookupMiddleware::new(lookup, tx));

        let store = Store::with_middleware(initial, app_reducer(), middleware);
        Self { store, mailbox }
    }

    /// Scoped store for the counter screen
    pub fn counter_view(&self) -> ScopedStore<CounterViewState, CounterViewAction> {
        self.store.scope(CounterViewState::project, |action: CounterViewAction| {
            AppAction::from(action)
        })
    }

    /// Deliver finished lookups without waiting
    pub fn pump(&mut self) -> usize {
        self.mailbox.drain_into(&self.store)
    }
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("store", &self.store)
            .finish_non_exhaustive()
    }
}
