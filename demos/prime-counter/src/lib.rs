//! Prime counter: a counter with prime favorites and an nth-prime lookup
//!
//! Three features share one store:
//! - **counter**: increment/decrement
//! - **prime modal**: save or remove the current count as a favorite prime
//! - **nth prime**: ask a lookup for the nth prime and show the answer
//!
//! Each feature has its own reducer and action enum; [`reducer::app_reducer`]
//! combines them, and the view talks to the store through scoped stores.

pub mod action;
pub mod app;
pub mod config;
pub mod events;
pub mod lookup;
pub mod reducer;
pub mod state;
pub mod view;
