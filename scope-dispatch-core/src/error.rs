//! Errors surfaced by scoped stores and action senders

use thiserror::Error;

/// Failure modes of store handles that do not own their target
///
/// A root [`Store`](crate::Store) never fails. Only handles that point at a
/// store they do not own can find it gone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The root store behind a scoped store has been dropped
    #[error("root store has been dropped")]
    Released,

    /// The mailbox an [`ActionSender`](crate::ActionSender) feeds has been dropped or closed
    #[error("action mailbox is closed")]
    MailboxClosed,
}
