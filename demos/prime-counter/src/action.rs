//! Actions, one enum per feature
//!
//! Feature enums are embedded into the app vocabulary with `#[action(embed)]`,
//! which gives each wrapping enum a `From` impl (used by scoped stores) and an
//! `extract_*` method (used by `pullback`).

use scope_dispatch::Action;

#[derive(Action, Clone, Debug, PartialEq, Eq)]
pub enum CounterAction {
    Increment,
    Decrement,
}

/// Actions from the "is this prime?" modal
#[derive(Action, Clone, Debug, PartialEq, Eq)]
pub enum PrimeModalAction {
    /// Add the current count to the favorites
    SaveFavoritePrime,
    /// Remove the current count from the favorites
    RemoveFavoritePrime,
}

/// Nth-prime lookup lifecycle
#[derive(Action, Clone, Debug, PartialEq, Eq)]
pub enum NthPrimeAction {
    /// Intent: look up the nth prime (starts the async lookup)
    Requested(i64),
    /// Result: lookup finished; `None` means the answer is unknown
    Response { n: i64, prime: Option<i64> },
    /// The alert was closed
    AlertDismissed,
}

/// Everything the counter screen can say
#[derive(Action, Clone, Debug, PartialEq, Eq)]
pub enum CounterViewAction {
    #[action(embed)]
    Counter(CounterAction),
    #[action(embed)]
    PrimeModal(PrimeModalAction),
    #[action(embed)]
    NthPrime(NthPrimeAction),
}

/// Root action vocabulary
#[derive(Action, Clone, Debug, PartialEq, Eq)]
pub enum AppAction {
    #[action(embed)]
    Counter(CounterAction),
    #[action(embed)]
    PrimeModal(PrimeModalAction),
    #[action(embed)]
    NthPrime(NthPrimeAction),
}

impl From<CounterViewAction> for AppAction {
    fn from(action: CounterViewAction) -> Self {
        match action {
            CounterViewAction::Counter(action) => AppAction::Counter(action),
            CounterViewAction::PrimeModal(action) => AppAction::PrimeModal(action),
            CounterViewAction::NthPrime(action) => AppAction::NthPrime(action),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_view_actions_embed_into_app_actions() {
        let action: AppAction = CounterViewAction::from(CounterAction::Increment).into();
        assert_eq!(action, AppAction::Counter(CounterAction::Increment));

        let action: AppAction = CounterViewAction::NthPrime(NthPrimeAction::Requested(3)).into();
        assert_eq!(action.name(), "NthPrime");
        assert_eq!(
            action.extract_nth_prime(),
            Some(NthPrimeAction::Requested(3))
        );
    }
}
