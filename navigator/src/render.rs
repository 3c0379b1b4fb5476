//! Page resolution: which screen to mount for the current page.
//!
//! Pure mapping from [`PageId`] to a [`Mount`], with the callbacks each screen
//! needs already bound. Front ends render the `Screen`; they never decide
//! navigation themselves.

use std::fmt;
use std::sync::Arc;

use crate::page::PageId;

/// A bound, argument-less page action (e.g. "back", "login succeeded").
#[derive(Clone)]
pub struct Callback(Arc<dyn Fn() + Send + Sync>);

impl Callback {
    pub fn new(f: impl Fn() + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    pub fn call(&self) {
        (self.0)();
    }
}

impl fmt::Debug for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Callback")
    }
}

/// Registration form flavour.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RegistrationKind {
    Basic,
    Full,
}

/// Screen component a front end mounts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Screen {
    Splash,
    ChoiceMenu,
    CourseMenu,
    RegistrationForm(RegistrationKind),
    WorkshopList,
    ClubList,
    JobApplicationForm,
    InternApplicationForm,
    AdminLogin,
    AdminDashboard,
}

/// Callbacks the navigator hands to mounted screens.
#[derive(Clone, Debug)]
pub struct PageActions {
    pub on_back: Callback,
    pub on_login_success: Callback,
}

/// A screen plus the callbacks wired into it.
#[derive(Clone, Debug)]
pub struct Mount {
    pub page: PageId,
    pub screen: Screen,
    pub on_back: Option<Callback>,
    pub on_login_success: Option<Callback>,
}

/// Resolve the screen for `page`.
///
/// The dashboard only mounts with a live session; without one the splash is
/// shown until the session redirect moves the user home.
#[must_use]
pub fn resolve(page: PageId, session_present: bool, actions: &PageActions) -> Mount {
    let screen = match page {
        PageId::Bootstrap => Screen::Splash,
        PageId::Choice => Screen::ChoiceMenu,
        PageId::CourseCategory => Screen::CourseMenu,
        PageId::RegistrationBasic => Screen::RegistrationForm(RegistrationKind::Basic),
        PageId::RegistrationFull => Screen::RegistrationForm(RegistrationKind::Full),
        PageId::Workshops => Screen::WorkshopList,
        PageId::Clubs => Screen::ClubList,
        PageId::Jobs => Screen::JobApplicationForm,
        PageId::Internship => Screen::InternApplicationForm,
        PageId::AdminLogin => Screen::AdminLogin,
        PageId::AdminDashboard if session_present => Screen::AdminDashboard,
        PageId::AdminDashboard => Screen::Splash,
    };

    let has_back = !matches!(page, PageId::Bootstrap | PageId::Choice | PageId::AdminDashboard);
    Mount {
        page,
        screen,
        on_back: has_back.then(|| actions.on_back.clone()),
        on_login_success: (page == PageId::AdminLogin).then(|| actions.on_login_success.clone()),
    }
}

#[cfg(test)]
#[path = "render_test.rs"]
mod tests;
