//! Feature reducers and the app reducer built from them
//!
//! Each feature reducer only knows its own slice of state and its own action
//! enum. `app_reducer` lifts them with `pullback` and runs them with `combine`.

use scope_dispatch::{combine, pullback, BoxedReducer};

use crate::action::{AppAction, CounterAction, NthPrimeAction, PrimeModalAction};
use crate::state::{AppState, NthPrimeAlert, NthPrimeState};

/// Counter: no clamping, the count may go negative
pub fn counter(count: &mut i64, action: CounterAction) -> bool {
    match action {
        CounterAction::Increment => *count += 1,
        CounterAction::Decrement => *count -= 1,
    }
    true
}

/// Favorites: saving or removing the current count
///
/// Both actions are idempotent; the change flag reports whether membership
/// actually changed.
pub fn prime_modal(state: &mut AppState, action: PrimeModalAction) -> bool {
    match action {
        PrimeModalAction::SaveFavoritePrime => state.favorite_primes.insert(state.count),
        PrimeModalAction::RemoveFavoritePrime => state.favorite_primes.remove(&state.count),
    }
}

pub fn nth_prime(state: &mut NthPrimeState, action: NthPrimeAction) -> bool {
    match action {
        NthPrimeAction::Requested(_) => {
            state.is_loading = true;
            state.alert = None;
            true
        }
        NthPrimeAction::Response { n, prime } => {
            state.is_loading = false;
            state.alert = Some(NthPrimeAlert { n, prime });
            true
        }
        NthPrimeAction::AlertDismissed => state.alert.take().is_some(),
    }
}

/// The root reducer: every feature, pulled back into `AppState`/`AppAction`
pub fn app_reducer() -> impl Fn(&mut AppState, AppAction) -> bool {
    let reducers: Vec<BoxedReducer<AppState, AppAction>> = vec![
        Box::new(pullback(
            counter,
            |state: &mut AppState| &mut state.count,
            AppAction::extract_counter,
        )),
        Box::new(pullback(
            prime_modal,
            |state: &mut AppState| state,
            AppAction::extract_prime_modal,
        )),
        Box::new(pullback(
            nth_prime,
            |state: &mut AppState| &mut state.nth_prime,
            AppAction::extract_nth_prime,
        )),
    ];
    combine(reducers)
}

/// Trial division; anything below 2 is not prime
pub fn is_prime(n: i64) -> bool {
    if n < 2 {
        return false;
    }
    let mut divisor = 2_i64;
    while divisor <= n / divisor {
        if n % divisor == 0 {
            return false;
        }
        divisor += 1;
    }
    true
}
