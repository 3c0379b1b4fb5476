//! Page identifiers and menu destinations.
//!
//! Every screen the portal can show is a [`PageId`]. Menu buttons speak in
//! [`Destination`]s, which the navigator resolves to a concrete page at call
//! time (the admin entry depends on whether a session exists).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Error returned when a page or destination identifier is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown page identifier: {0}")]
pub struct ParsePageError(pub String);

/// A screen the navigator can display.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PageId {
    /// Splash/loading screen shown at cold start.
    #[default]
    Bootstrap,
    /// Top-level service menu.
    Choice,
    /// Paid-course menu (basic vs full registration).
    CourseCategory,
    /// Preliminary course registration form.
    RegistrationBasic,
    /// Full course registration with documents, payment proof, and signature.
    RegistrationFull,
    Workshops,
    Clubs,
    Jobs,
    Internship,
    AdminLogin,
    AdminDashboard,
}

impl PageId {
    /// All pages, in menu order.
    pub const ALL: [Self; 11] = [
        Self::Bootstrap,
        Self::Choice,
        Self::CourseCategory,
        Self::RegistrationBasic,
        Self::RegistrationFull,
        Self::Workshops,
        Self::Clubs,
        Self::Jobs,
        Self::Internship,
        Self::AdminLogin,
        Self::AdminDashboard,
    ];

    /// Stable kebab-case identifier.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Bootstrap => "bootstrap",
            Self::Choice => "choice",
            Self::CourseCategory => "course-category",
            Self::RegistrationBasic => "registration-basic",
            Self::RegistrationFull => "registration-full",
            Self::Workshops => "workshops",
            Self::Clubs => "clubs",
            Self::Jobs => "jobs",
            Self::Internship => "internship",
            Self::AdminLogin => "admin-login",
            Self::AdminDashboard => "admin-dashboard",
        }
    }

    /// Arabic page title shown in the header.
    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            Self::Bootstrap => "جاري التحميل",
            Self::Choice => "اختر الخدمة",
            Self::CourseCategory => "اختر نوع التسجيل",
            Self::RegistrationBasic => "تسجيل أولي",
            Self::RegistrationFull => "تسجيل كامل",
            Self::Workshops => "الورشات المجانية",
            Self::Clubs => "النوادي",
            Self::Jobs => "طلبات التوظيف",
            Self::Internship => "طلبات التدريب",
            Self::AdminLogin => "دخول الإدارة",
            Self::AdminDashboard => "لوحة التحكم الإدارية",
        }
    }
}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PageId {
    type Err = ParsePageError;

    /// Accepts the kebab-case identifiers plus the legacy names the older
    /// front ends used (`loading`, `courses`, `basic-form`, ...).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let page = match s.trim() {
            "bootstrap" | "loading" => Self::Bootstrap,
            "choice" => Self::Choice,
            "course-category" | "courses" => Self::CourseCategory,
            "registration-basic" | "basic-form" => Self::RegistrationBasic,
            "registration-full" | "full-form" => Self::RegistrationFull,
            "workshops" => Self::Workshops,
            "clubs" => Self::Clubs,
            "jobs" => Self::Jobs,
            "internship" | "internapplication" => Self::Internship,
            "admin-login" => Self::AdminLogin,
            "admin-dashboard" => Self::AdminDashboard,
            other => return Err(ParsePageError(other.to_owned())),
        };
        Ok(page)
    }
}

/// A user-facing menu selection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Destination {
    /// Admin entry: dashboard when a session exists, login otherwise.
    Admin,
    /// Preliminary course registration.
    Basic,
    /// Full course registration.
    Full,
    /// Any page addressed directly.
    Page(PageId),
}

impl From<PageId> for Destination {
    fn from(page: PageId) -> Self {
        Self::Page(page)
    }
}

impl FromStr for Destination {
    type Err = ParsePageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "admin" => Ok(Self::Admin),
            "basic" => Ok(Self::Basic),
            "full" => Ok(Self::Full),
            other => other.parse().map(Self::Page),
        }
    }
}

#[cfg(test)]
#[path = "page_test.rs"]
mod tests;
