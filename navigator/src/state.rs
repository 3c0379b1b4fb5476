//! Pure navigation state machine.
//!
//! DESIGN
//! ======
//! `NavigationState` is a plain value with synchronous transitions and no I/O.
//! The async [`Navigator`](crate::Navigator) wraps it, but every rule about
//! which page is visible lives here so it can be exercised without a runtime.
//!
//! Two kinds of page change exist:
//! - a *step* (`navigate_to`, `select_destination`) pushes the page being left
//!   onto the back stack;
//! - a *redirect* (bootstrap timer, session changes) replaces the current page
//!   without recording it, so the user cannot go back into a login form or a
//!   splash screen.
//!
//! INVARIANTS
//! ==========
//! - After any transition, the last history entry is never the current page.
//! - `Bootstrap` never appears in history.

use crate::page::{Destination, PageId};

/// Page every back-navigation falls back to once history is exhausted.
pub const HOME_PAGE: PageId = PageId::Choice;

/// How a transition changed the back stack.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransitionKind {
    /// The previous page was pushed onto history.
    Push,
    /// A history entry was popped and became current.
    Pop,
    /// History was empty; fell back to [`HOME_PAGE`].
    Home,
    /// The current page was replaced without touching the back stack.
    Redirect,
}

/// Record of one completed page change.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Transition {
    pub from: PageId,
    pub to: PageId,
    pub kind: TransitionKind,
}

/// Current page, back stack, and mirrored session flag.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NavigationState {
    current: PageId,
    history: Vec<PageId>,
    session_present: bool,
    bootstrap_pending: bool,
}

impl Default for NavigationState {
    fn default() -> Self {
        Self::new()
    }
}

impl NavigationState {
    /// Cold-start state: splash screen, empty back stack, no session.
    #[must_use]
    pub fn new() -> Self {
        Self { current: PageId::Bootstrap, history: Vec::new(), session_present: false, bootstrap_pending: true }
    }

    #[must_use]
    pub fn current(&self) -> PageId {
        self.current
    }

    /// Prior pages, oldest first.
    #[must_use]
    pub fn history(&self) -> &[PageId] {
        &self.history
    }

    #[must_use]
    pub fn session_present(&self) -> bool {
        self.session_present
    }

    /// True until the bootstrap timer fires or another transition supersedes it.
    #[must_use]
    pub fn bootstrap_pending(&self) -> bool {
        self.bootstrap_pending
    }

    /// Push the current page and show `target`.
    ///
    /// Returns `None` when `target` is already displayed.
    pub fn navigate_to(&mut self, target: PageId) -> Option<Transition> {
        if target == self.current {
            return None;
        }
        let from = self.current;
        if from != PageId::Bootstrap {
            self.history.push(from);
        }
        self.current = target;
        self.bootstrap_pending = false;
        Some(Transition { from, to: target, kind: TransitionKind::Push })
    }

    /// Pop the last history entry, or land on [`HOME_PAGE`] when there is none.
    ///
    /// Safe to call any number of times; returns `None` only when already
    /// home with nothing to pop.
    pub fn go_back(&mut self) -> Option<Transition> {
        let from = self.current;
        let (to, kind) = match self.history.pop() {
            Some(prev) => (prev, TransitionKind::Pop),
            None => (HOME_PAGE, TransitionKind::Home),
        };
        self.bootstrap_pending = false;
        if to == from {
            return None;
        }
        self.current = to;
        Some(Transition { from, to, kind })
    }

    /// Resolve a menu selection and step to it.
    pub fn select_destination(&mut self, destination: Destination) -> Option<Transition> {
        let target = self.resolve_destination(destination);
        self.navigate_to(target)
    }

    /// Page a menu selection would open right now.
    #[must_use]
    pub fn resolve_destination(&self, destination: Destination) -> PageId {
        match destination {
            Destination::Admin if self.session_present => PageId::AdminDashboard,
            Destination::Admin => PageId::AdminLogin,
            Destination::Basic => PageId::RegistrationBasic,
            Destination::Full => PageId::RegistrationFull,
            Destination::Page(page) => page,
        }
    }

    /// Leave the splash screen if nothing else has moved the machine yet.
    pub fn finish_bootstrap(&mut self) -> Option<Transition> {
        if !self.bootstrap_pending {
            return None;
        }
        self.bootstrap_pending = false;
        if self.current != PageId::Bootstrap {
            return None;
        }
        Some(self.redirect(HOME_PAGE))
    }

    /// Mirror a session change and apply the login/logout redirects.
    ///
    /// Only two pages react: a session appearing on the login form opens the
    /// dashboard, and a session disappearing on the dashboard returns home.
    /// Any other page is left alone.
    pub fn on_session_change(&mut self, present: bool) -> Option<Transition> {
        self.session_present = present;
        match (present, self.current) {
            (true, PageId::AdminLogin) => Some(self.redirect(PageId::AdminDashboard)),
            (false, PageId::AdminDashboard) => Some(self.redirect(HOME_PAGE)),
            _ => None,
        }
    }

    /// Replace the login form with the dashboard after a successful sign-in.
    ///
    /// A redirect like the session rule, so back never returns to the form.
    /// No-op anywhere but the login page.
    pub fn complete_login(&mut self) -> Option<Transition> {
        if self.current != PageId::AdminLogin {
            return None;
        }
        Some(self.redirect(PageId::AdminDashboard))
    }

    fn redirect(&mut self, target: PageId) -> Transition {
        let from = self.current;
        self.current = target;
        while self.history.last() == Some(&target) {
            self.history.pop();
        }
        Transition { from, to: target, kind: TransitionKind::Redirect }
    }
}

#[cfg(test)]
#[path = "state_test.rs"]
mod tests;
