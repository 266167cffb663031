//! End-to-end scenarios across store, scopes, lookup and mailbox

use std::time::Duration;

use prime_counter::action::{
    AppAction, CounterAction, CounterViewAction, NthPrimeAction, PrimeModalAction,
};
use prime_counter::app::App;
use prime_counter::lookup::{PrimeCallback, SieveLookup};
use prime_counter::reducer::app_reducer;
use prime_counter::state::{AppState, CounterViewState, NthPrimeAlert, PrimeModalState};
use scope_dispatch::testing::TestHarness;
use scope_dispatch::{assert_dispatched, count_dispatched, StoreError};

#[test]
fn three_increments_and_a_decrement() {
    let harness = TestHarness::new(AppState::new(0), app_reducer());

    for _ in 0..3 {
        harness.send(AppAction::Counter(CounterAction::Increment));
    }
    harness.send(AppAction::Counter(CounterAction::Decrement));

    assert_eq!(harness.state().count, 2);
    let observed: Vec<i64> = harness
        .drain_observed()
        .iter()
        .map(|state| state.count)
        .collect();
    assert_eq!(observed, vec![1, 2, 3, 2]);
    assert_eq!(
        count_dispatched!(
            harness.drain_dispatched(),
            AppAction::Counter(CounterAction::Increment)
        ),
        3
    );
}

#[test]
fn mailbox_result_becomes_alert() {
    let mut harness = TestHarness::new(AppState::new(5), app_reducer());

    harness.send(AppAction::NthPrime(NthPrimeAction::Requested(5)));
    harness
        .sender()
        .send(AppAction::NthPrime(NthPrimeAction::Response {
            n: 5,
            prime: Some(11),
        }))
        .unwrap();
    assert_eq!(harness.pump(), 1);

    let state = harness.state();
    assert!(!state.nth_prime.is_loading);
    assert_eq!(
        state.nth_prime.alert,
        Some(NthPrimeAlert {
            n: 5,
            prime: Some(11)
        })
    );
    let dispatched = harness.drain_dispatched();
    assert_dispatched!(
        dispatched,
        AppAction::NthPrime(NthPrimeAction::Response { prime: Some(11), .. })
    );
}

#[test]
fn failed_lookup_shows_unknown() {
    let failing = |_n: i64, callback: PrimeCallback| callback(None);
    let mut app = App::new(AppState::new(5), Box::new(failing));
    let view = app.counter_view();

    view.send(NthPrimeAction::Requested(5).into()).unwrap();
    app.pump();

    let alert = view
        .with_state(|state| state.nth_prime.alert.clone())
        .unwrap()
        .unwrap();
    assert_eq!(alert.prime, None);
    assert_eq!(alert.message(), "The 5th prime is unknown");
}

#[tokio::test]
async fn lookup_on_another_thread_reports_back() {
    let threaded = |n: i64, callback: PrimeCallback| {
        std::thread::spawn(move || callback(SieveLookup::compute(n)));
    };
    let mut app = App::new(AppState::new(5), Box::new(threaded));

    app.store
        .send(AppAction::NthPrime(NthPrimeAction::Requested(5)));

    let action = tokio::time::timeout(Duration::from_secs(1), app.mailbox.recv())
        .await
        .expect("timeout")
        .expect("mailbox closed");
    app.store.send(action);

    assert_eq!(
        app.store.state().nth_prime.alert,
        Some(NthPrimeAlert {
            n: 5,
            prime: Some(11)
        })
    );
}

#[test]
fn favorites_through_nested_scopes() {
    let app = App::new(AppState::new(7), Box::new(SieveLookup));
    let counter = app.counter_view();
    let modal = counter.scope(PrimeModalState::project, CounterViewAction::PrimeModal);

    modal.send(PrimeModalAction::SaveFavoritePrime).unwrap();
    modal.send(PrimeModalAction::SaveFavoritePrime).unwrap();
    assert!(modal.current_state().unwrap().is_favorite());
    assert_eq!(app.store.state().favorite_primes.len(), 1);

    counter.send(CounterAction::Increment.into()).unwrap();
    assert!(!modal.current_state().unwrap().is_favorite());

    modal.send(PrimeModalAction::RemoveFavoritePrime).unwrap();
    assert_eq!(app.store.state().favorite_primes.len(), 1);
}

#[test]
fn nested_scope_matches_direct_scope() {
    let app = App::new(AppState::new(3), Box::new(SieveLookup));
    let nested = app
        .counter_view()
        .scope(PrimeModalState::project, CounterViewAction::PrimeModal);
    let direct = app.store.scope(
        |state: &AppState| PrimeModalState::project(&CounterViewState::project(state)),
        AppAction::PrimeModal,
    );

    nested.send(PrimeModalAction::SaveFavoritePrime).unwrap();
    assert_eq!(nested.current_state(), direct.current_state());

    direct.send(PrimeModalAction::RemoveFavoritePrime).unwrap();
    assert_eq!(nested.current_state(), direct.current_state());
}

#[test]
fn unsubscribe_twice_is_harmless() {
    let app = App::new(AppState::new(0), Box::new(SieveLookup));
    let view = app.counter_view();
    let before = app.store.observer_count();

    let id = view.subscribe(|_: &CounterViewState| {}).unwrap();
    assert_eq!(app.store.observer_count(), before + 1);

    view.unsubscribe(id).unwrap();
    view.unsubscribe(id).unwrap();
    app.store.unsubscribe(id);
    assert_eq!(app.store.observer_count(), before);
}

#[test]
fn views_outliving_the_app_are_released() {
    let app = App::new(AppState::new(0), Box::new(SieveLookup));
    let view = app.counter_view();
    drop(app);

    assert!(!view.is_alive());
    assert_eq!(
        view.send(CounterAction::Increment.into()),
        Err(StoreError::Released)
    );
}
