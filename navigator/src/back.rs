//! Platform back-button seam (mobile front end only).
//!
//! The platform keeps at most one handler. The navigator re-registers its
//! handler every time the back stack changes, so the platform always holds a
//! handler bound to the latest history.

use std::sync::{Arc, Mutex, PoisonError};

/// Back-press handler. Returns `true` when the press was consumed.
pub type BackHandler = Arc<dyn Fn() -> bool + Send + Sync>;

/// Registration surface for the hardware/system back gesture.
pub trait BackControl: Send + Sync {
    /// Install `handler`, replacing any previous one.
    fn register(&self, handler: BackHandler);
    /// Remove the installed handler, if any.
    fn unregister(&self);
}

/// In-process back control used by the headless shell and tests.
#[derive(Clone, Default)]
pub struct BackButton {
    inner: Arc<Mutex<BackButtonInner>>,
}

#[derive(Default)]
struct BackButtonInner {
    handler: Option<BackHandler>,
    registrations: u64,
}

impl BackButton {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate a back press. Returns `false` when nothing consumed it.
    pub fn press(&self) -> bool {
        // Clone out of the lock so the handler may re-register re-entrantly.
        let handler = self.lock().handler.clone();
        handler.is_some_and(|h| h())
    }

    #[must_use]
    pub fn is_registered(&self) -> bool {
        self.lock().handler.is_some()
    }

    /// Total number of `register` calls seen.
    #[must_use]
    pub fn registrations(&self) -> u64 {
        self.lock().registrations
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BackButtonInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl BackControl for BackButton {
    fn register(&self, handler: BackHandler) {
        let mut inner = self.lock();
        inner.handler = Some(handler);
        inner.registrations += 1;
    }

    fn unregister(&self) {
        self.lock().handler = None;
    }
}

#[cfg(test)]
#[path = "back_test.rs"]
mod tests;
