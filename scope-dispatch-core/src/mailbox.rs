//! Action mailbox for results produced off the store's thread
//!
//! A [`Store`] is single-threaded, but async work (network lookups, timers)
//! finishes wherever its runtime runs it. The mailbox is the hand-off point:
//! async code holds a cloneable, `Send` [`ActionSender`]; the thread that owns
//! the store drains the [`Mailbox`] and feeds each action through
//! [`Store::send`].
//!
//! # Example
//!
//! ```ignore
//! use scope_dispatch::{Mailbox, Store};
//!
//! let store = Store::new(AppState::default(), reducer);
//! let mut mailbox = Mailbox::new();
//!
//! let tx = mailbox.sender();
//! tokio::spawn(async move {
//!     let prime = lookup(5).await;
//!     let _ = tx.send(AppAction::NthPrimeResponse(prime));
//! });
//!
//! loop {
//!     tokio::select! {
//!         Some(action) = mailbox.recv() => store.send(action),
//!         // ... input events
//!     }
//! }
//! ```

use tokio::sync::mpsc;

use crate::error::StoreError;
use crate::store::Store;
use crate::Action;

/// Create a mailbox together with a first sender
pub fn channel<A: Action>() -> (ActionSender<A>, Mailbox<A>) {
    let mailbox = Mailbox::new();
    (mailbox.sender(), mailbox)
}

/// Cloneable, thread-safe handle that queues actions into a [`Mailbox`]
pub struct ActionSender<A> {
    tx: mpsc::UnboundedSender<A>,
}

impl<A> Clone for ActionSender<A> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

impl<A> std::fmt::Debug for ActionSender<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionSender")
            .field("closed", &self.tx.is_closed())
            .finish()
    }
}

impl<A: Action> ActionSender<A> {
    /// Queue an action for the store
    ///
    /// Fails with [`StoreError::MailboxClosed`] once the mailbox is gone.
    pub fn send(&self, action: A) -> Result<(), StoreError> {
        let name = action.name();
        self.tx.send(action).map_err(|_| {
            tracing::debug!(action = %name, "Mailbox closed, action dropped");
            StoreError::MailboxClosed
        })
    }

    /// Whether the receiving mailbox has been dropped or closed
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Receiving end of the action hand-off
///
/// The mailbox keeps one sender of its own so that [`Mailbox::recv`] waits
/// for the next action instead of ending when the last external sender is
/// dropped.
pub struct Mailbox<A> {
    tx: mpsc::UnboundedSender<A>,
    rx: mpsc::UnboundedReceiver<A>,
}

impl<A: Action> Default for Mailbox<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> std::fmt::Debug for Mailbox<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mailbox").finish_non_exhaustive()
    }
}

impl<A: Action> Mailbox<A> {
    /// Create an empty mailbox
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self { tx, rx }
    }

    /// Get a sender for async work to report back through
    pub fn sender(&self) -> ActionSender<A> {
        ActionSender {
            tx: self.tx.clone(),
        }
    }

    /// Wait for the next queued action
    pub async fn recv(&mut self) -> Option<A> {
        self.rx.recv().await
    }

    /// Take the next queued action without waiting
    pub fn try_recv(&mut self) -> Option<A> {
        self.rx.try_recv().ok()
    }

    /// Send every queued action to `store`, in arrival order
    ///
    /// Returns how many actions were delivered. Actions queued while
    /// draining (for example by an observer) are delivered in the same call.
    pub fn drain_into<S: 'static>(&mut self, store: &Store<S, A>) -> usize {
        let mut delivered = 0;
        while let Some(action) = self.try_recv() {
            store.send(action);
            delivered += 1;
        }
        delivered
    }

    /// Stop accepting actions
    ///
    /// Senders fail from now on; actions already queued can still be drained.
    pub fn close(&mut self) {
        self.rx.close();
    }
}
