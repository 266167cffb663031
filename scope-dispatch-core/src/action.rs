//! Action trait for type-safe state mutations

use std::fmt::Debug;

/// Marker trait for actions that can be sent to a store
///
/// Actions represent intents to change state. They should be:
/// - Clone: Actions may be logged, recorded, or sent to multiple reducers
/// - Debug: For debugging and logging
/// - Send + 'static: So async work can hand results back through an
///   [`ActionSender`](crate::ActionSender)
///
/// Use `#[derive(Action)]` from `scope-dispatch-macros` to auto-implement this trait.
pub trait Action: Clone + Debug + Send + 'static {
    /// Get the action name for logging and filtering
    fn name(&self) -> &'static str;
}
