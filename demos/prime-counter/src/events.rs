//! Terminal input polling
//!
//! crossterm's `poll`/`read` block, so they run on a tokio task of their own
//! and forward events over a channel the main loop selects on.

use std::time::Duration;

use crossterm::event::{self, Event, KeyEvent};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Input the app reacts to
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputEvent {
    Key(KeyEvent),
    Resize(u16, u16),
}

impl InputEvent {
    fn from_crossterm(event: Event) -> Option<Self> {
        match event {
            Event::Key(key) => Some(InputEvent::Key(key)),
            Event::Resize(w, h) => Some(InputEvent::Resize(w, h)),
            _ => None,
        }
    }
}

/// Spawn the input poller
///
/// Stops when `cancel_token` is cancelled or the receiver is dropped.
pub fn spawn_event_poller(
    tx: mpsc::UnboundedSender<InputEvent>,
    poll_timeout: Duration,
    loop_sleep: Duration,
    cancel_token: CancellationToken,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        const MAX_EVENTS_PER_BATCH: usize = 20;

        loop {
            tokio::select! {
                _ = cancel_token.cancelled() => {
                    info!("Event poller cancelled, draining buffer");
                    while event::poll(Duration::ZERO).unwrap_or(false) {
                        let _ = event::read();
                    }
                    break;
                }
                _ = tokio::time::sleep(loop_sleep) => {
                    let mut events_processed = 0;
                    while events_processed < MAX_EVENTS_PER_BATCH
                        && event::poll(poll_timeout).unwrap_or(false)
                    {
                        events_processed += 1;
                        let Some(input) = event::read().ok().and_then(InputEvent::from_crossterm)
                        else {
                            continue;
                        };
                        if tx.send(input).is_err() {
                            debug!("Event channel closed, stopping poller");
                            return;
                        }
                    }
                }
            }
        }
    })
}

/// Running input poller, cancelled when dropped
#[derive(Debug)]
pub struct EventPoller {
    handle: Option<tokio::task::JoinHandle<()>>,
    cancel_token: CancellationToken,
}

impl EventPoller {
    /// Start polling with the loop timings the app uses
    pub fn start(tx: mpsc::UnboundedSender<InputEvent>) -> Self {
        let cancel_token = CancellationToken::new();
        let handle = spawn_event_poller(
            tx,
            Duration::from_millis(10),
            Duration::from_millis(16),
            cancel_token.clone(),
        );
        Self {
            handle: Some(handle),
            cancel_token,
        }
    }

    /// Token that stops the poller
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel_token.clone()
    }

    /// Stop the poller and wait for it to finish
    pub async fn shutdown(mut self) {
        self.cancel_token.cancel();
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }
}

impl Drop for EventPoller {
    fn drop(&mut self) {
        self.cancel_token.cancel();
    }
}
