//! Async navigator: owns the page state and reacts to timers and sessions.
//!
//! ARCHITECTURE
//! ============
//! `Navigator` is a cheap `Clone` handle over one shared [`NavigationState`].
//! Front ends call the transition methods directly; two background tasks feed
//! it asynchronously:
//! - the bootstrap timer, which leaves the splash screen after a fixed delay;
//! - the session listener, which applies login/logout redirects.
//!
//! Both tasks hold only a `Weak` handle and read state when they fire, never
//! when they were spawned. They are acquired together in [`Navigator::start`]
//! and aborted together on [`Navigator::shutdown`] or when the last handle is
//! dropped.
//!
//! The state mutex is never held across an `.await` or while calling out to
//! the back control, so callbacks may re-enter the navigator.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::back::{BackControl, BackHandler};
use crate::page::{Destination, PageId};
use crate::render::{self, Callback, Mount, PageActions};
use crate::session::SessionSignal;
use crate::state::{NavigationState, Transition};

pub const DEFAULT_BOOTSTRAP_DELAY: Duration = Duration::from_millis(3000);

/// Tuning for a navigator instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NavigatorOptions {
    /// How long the splash screen stays up after `start`.
    pub bootstrap_delay: Duration,
}

impl Default for NavigatorOptions {
    fn default() -> Self {
        Self { bootstrap_delay: DEFAULT_BOOTSTRAP_DELAY }
    }
}

/// Point-in-time copy of the navigation state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Snapshot {
    pub current: PageId,
    pub history: Vec<PageId>,
    pub session_present: bool,
}

/// Shared handle on the page state machine.
#[derive(Clone)]
pub struct Navigator {
    inner: Arc<Inner>,
}

struct Inner {
    options: NavigatorOptions,
    state: Mutex<NavigationState>,
    page_tx: watch::Sender<PageId>,
    back: Option<Arc<dyn BackControl>>,
    tasks: Mutex<Option<Tasks>>,
}

/// Background work scoped to one `start`. Dropping aborts both tasks.
struct Tasks {
    bootstrap: JoinHandle<()>,
    session: JoinHandle<()>,
}

impl Drop for Tasks {
    fn drop(&mut self) {
        self.bootstrap.abort();
        self.session.abort();
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        if let Some(back) = &self.back {
            back.unregister();
        }
    }
}

impl Navigator {
    /// Build a navigator. Pass a back control on platforms with a system
    /// back gesture (mobile); `None` on the web.
    #[must_use]
    pub fn new(options: NavigatorOptions, back: Option<Arc<dyn BackControl>>) -> Self {
        let state = NavigationState::new();
        let (page_tx, _) = watch::channel(state.current());
        Self {
            inner: Arc::new(Inner {
                options,
                state: Mutex::new(state),
                page_tx,
                back,
                tasks: Mutex::new(None),
            }),
        }
    }

    /// Show the splash screen, arm the bootstrap timer, and start listening
    /// to `session`. Calling again restarts from a cold state.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub fn start(&self, session: &dyn SessionSignal) {
        // Release any previous run before resetting state.
        drop(self.lock_tasks().take());

        *self.lock_state() = NavigationState::new();
        self.inner.page_tx.send_replace(PageId::Bootstrap);

        let delay = self.inner.options.bootstrap_delay;
        let weak = Arc::downgrade(&self.inner);
        let bootstrap = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Some(nav) = upgrade(&weak) {
                nav.apply(NavigationState::finish_bootstrap);
            }
        });

        let mut subscription = session.subscribe();
        let weak = Arc::downgrade(&self.inner);
        let listener = tokio::spawn(async move {
            while let Some(present) = subscription.recv().await {
                let Some(nav) = upgrade(&weak) else { break };
                nav.on_session_change(present);
            }
            debug!("session listener stopped");
        });

        *self.lock_tasks() = Some(Tasks { bootstrap, session: listener });
        self.rebind_back();
        info!(delay = ?delay, "navigator started");
    }

    /// Cancel the bootstrap timer, stop the session listener, and release
    /// the back handler. Idempotent.
    pub fn shutdown(&self) {
        // Hold the task slot while unregistering so a concurrent rebind
        // cannot slip a handler back in.
        let mut tasks = self.lock_tasks();
        if tasks.take().is_some() {
            info!("navigator stopped");
        }
        if let Some(back) = &self.inner.back {
            back.unregister();
        }
    }

    /// Whether background tasks from `start` are still held.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.lock_tasks().is_some()
    }

    pub fn navigate_to(&self, target: PageId) -> Option<Transition> {
        self.apply(|state| state.navigate_to(target))
    }

    pub fn go_back(&self) -> Option<Transition> {
        self.apply(NavigationState::go_back)
    }

    pub fn select_destination(&self, destination: Destination) -> Option<Transition> {
        self.apply(|state| state.select_destination(destination))
    }

    /// Entry point for the auth collaborator's change notifications.
    pub fn on_session_change(&self, present: bool) -> Option<Transition> {
        debug!(present, "session change observed");
        self.apply(|state| state.on_session_change(present))
    }

    #[must_use]
    pub fn current(&self) -> PageId {
        self.lock_state().current()
    }

    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        let state = self.lock_state();
        Snapshot {
            current: state.current(),
            history: state.history().to_vec(),
            session_present: state.session_present(),
        }
    }

    /// Watch the current page; the receiver sees every page change.
    #[must_use]
    pub fn subscribe_pages(&self) -> watch::Receiver<PageId> {
        self.inner.page_tx.subscribe()
    }

    /// Screen to mount for the current page, with callbacks bound to this
    /// navigator.
    #[must_use]
    pub fn mount(&self) -> Mount {
        let (current, session_present) = {
            let state = self.lock_state();
            (state.current(), state.session_present())
        };
        let back = Arc::downgrade(&self.inner);
        let login = Arc::downgrade(&self.inner);
        let actions = PageActions {
            on_back: Callback::new(move || {
                if let Some(nav) = upgrade(&back) {
                    nav.go_back();
                }
            }),
            on_login_success: Callback::new(move || {
                if let Some(nav) = upgrade(&login) {
                    nav.apply(NavigationState::complete_login);
                }
            }),
        };
        render::resolve(current, session_present, &actions)
    }

    fn apply(&self, f: impl FnOnce(&mut NavigationState) -> Option<Transition>) -> Option<Transition> {
        let (transition, history_changed) = {
            let mut state = self.lock_state();
            let before = state.history().to_vec();
            let transition = f(&mut state);
            (transition, state.history() != before.as_slice())
        };

        if let Some(t) = transition {
            info!(from = %t.from, to = %t.to, kind = ?t.kind, "page transition");
            self.inner.page_tx.send_replace(t.to);
        }
        if history_changed {
            self.rebind_back();
        }
        transition
    }

    /// Install a fresh back handler. Called on start and on every history
    /// change so the platform never holds a handler from an older stack.
    /// No-op once shut down.
    fn rebind_back(&self) {
        let Some(back) = &self.inner.back else { return };
        let tasks = self.lock_tasks();
        if tasks.is_none() {
            return;
        }
        let weak = Arc::downgrade(&self.inner);
        let handler: BackHandler = Arc::new(move || match upgrade(&weak) {
            Some(nav) => {
                nav.go_back();
                true
            }
            None => false,
        });
        back.register(handler);
        drop(tasks);
    }

    fn lock_state(&self) -> MutexGuard<'_, NavigationState> {
        self.inner.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_tasks(&self) -> MutexGuard<'_, Option<Tasks>> {
        self.inner.tasks.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn upgrade(weak: &Weak<Inner>) -> Option<Navigator> {
    weak.upgrade().map(|inner| Navigator { inner })
}

#[cfg(test)]
#[path = "runtime_test.rs"]
mod tests;
