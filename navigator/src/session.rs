//! Admin-session signal.
//!
//! SYSTEM CONTEXT
//! ==============
//! The auth backend owns the session; the navigator only needs to hear when
//! it appears or disappears. [`SessionSignal`] is that seam. [`SessionHub`] is
//! the in-process implementation the auth service publishes into.
//!
//! A subscription yields the value current at subscribe time first, then every
//! published value in order. Dropping the subscription unsubscribes.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::broadcast;
use tracing::warn;

const SESSION_CHANNEL_CAPACITY: usize = 64;

/// Source of "is an admin session active" notifications.
pub trait SessionSignal: Send + Sync {
    fn subscribe(&self) -> SessionSubscription;
}

/// Live handle on a session signal. Drop to unsubscribe.
pub struct SessionSubscription {
    initial: Option<bool>,
    rx: broadcast::Receiver<bool>,
}

impl SessionSubscription {
    #[must_use]
    pub fn new(initial: bool, rx: broadcast::Receiver<bool>) -> Self {
        Self { initial: Some(initial), rx }
    }

    /// Next session value, or `None` once the signal source is gone.
    pub async fn recv(&mut self) -> Option<bool> {
        if let Some(initial) = self.initial.take() {
            return Some(initial);
        }
        loop {
            match self.rx.recv().await {
                Ok(present) => return Some(present),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "session subscriber lagged; continuing with newest events");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}

/// In-process session signal. Cheap to clone; clones share one channel.
#[derive(Clone)]
pub struct SessionHub {
    present: Arc<AtomicBool>,
    tx: broadcast::Sender<bool>,
}

impl Default for SessionHub {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionHub {
    #[must_use]
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(SESSION_CHANNEL_CAPACITY);
        Self { present: Arc::new(AtomicBool::new(false)), tx }
    }

    #[must_use]
    pub fn is_present(&self) -> bool {
        self.present.load(Ordering::SeqCst)
    }

    /// Record a session change and notify subscribers.
    ///
    /// Publishing the value already held is dropped, so subscribers see at
    /// most one event per real change.
    pub fn publish(&self, present: bool) {
        if self.present.swap(present, Ordering::SeqCst) == present {
            return;
        }
        // No receivers is fine: nobody is listening yet.
        let _ = self.tx.send(present);
    }

    /// Number of live subscriptions.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl SessionSignal for SessionHub {
    fn subscribe(&self) -> SessionSubscription {
        let rx = self.tx.subscribe();
        SessionSubscription::new(self.is_present(), rx)
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
