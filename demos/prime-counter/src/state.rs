//! Application state - single source of truth
//!
//! The root store owns one [`AppState`]. Views never see it whole: each one
//! reads a projection ([`CounterViewState`], [`PrimeModalState`]) through a
//! scoped store.

use std::collections::BTreeSet;

/// Outcome of an nth-prime lookup, shown as an alert
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NthPrimeAlert {
    /// Which prime was asked for
    pub n: i64,
    /// The answer, or `None` when the lookup could not produce one
    pub prime: Option<i64>,
}

impl NthPrimeAlert {
    pub fn message(&self) -> String {
        match self.prime {
            Some(prime) => format!("The {} prime is {}", ordinal(self.n), prime),
            None => format!("The {} prime is unknown", ordinal(self.n)),
        }
    }
}

/// Nth-prime lookup progress
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NthPrimeState {
    pub is_loading: bool,
    pub alert: Option<NthPrimeAlert>,
}

/// Application state - everything the UI needs to render
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AppState {
    /// Current counter value (may go negative)
    pub count: i64,

    /// Numbers saved from the prime modal
    pub favorite_primes: BTreeSet<i64>,

    pub nth_prime: NthPrimeState,
}

impl AppState {
    pub fn new(count: i64) -> Self {
        Self {
            count,
            ..Self::default()
        }
    }
}

/// What the counter screen reads
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CounterViewState {
    pub count: i64,
    pub favorite_primes: BTreeSet<i64>,
    pub nth_prime: NthPrimeState,
}

impl CounterViewState {
    pub fn project(state: &AppState) -> Self {
        Self {
            count: state.count,
            favorite_primes: state.favorite_primes.clone(),
            nth_prime: state.nth_prime.clone(),
        }
    }
}

/// What the prime modal reads
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PrimeModalState {
    pub count: i64,
    pub favorite_primes: BTreeSet<i64>,
}

impl PrimeModalState {
    pub fn project(state: &CounterViewState) -> Self {
        Self {
            count: state.count,
            favorite_primes: state.favorite_primes.clone(),
        }
    }

    pub fn is_favorite(&self) -> bool {
        self.favorite_primes.contains(&self.count)
    }
}

/// English ordinal: 1st, 2nd, 3rd, 4th, 11th, 21st, ...
pub fn ordinal(n: i64) -> String {
    let suffix = match (n.rem_euclid(10), n.rem_euclid(100)) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{n}{suffix}")
}
