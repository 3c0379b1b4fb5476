//! Portal services behind the pages: storage, auth, review, statistics.
//!
//! ERROR HANDLING
//! ==============
//! Page-level failures (submission, sign-in, review) become a [`Notice`]
//! shown by the page. They never reach the navigator: a failed action leaves
//! the user on the same page.

use std::fmt;

pub mod applications;
pub mod auth;
pub mod entries;
pub mod stats;
pub mod store;
pub mod workshops;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Error,
}

/// Transient status message displayed after a page action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Success, message: message.into() }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Error, message: message.into() }
    }

    #[must_use]
    pub fn is_error(&self) -> bool {
        self.level == NoticeLevel::Error
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.level {
            NoticeLevel::Success => "تم",
            NoticeLevel::Error => "خطأ",
        };
        write!(f, "[{tag}] {}", self.message)
    }
}

/// Admin list search: name and email match case-insensitively, phone as typed.
/// A blank term matches everything.
#[must_use]
pub fn matches_search(term: &str, name: &str, phone: &str, email: Option<&str>) -> bool {
    let term = term.trim();
    if term.is_empty() {
        return true;
    }
    let lowered = term.to_lowercase();
    name.to_lowercase().contains(&lowered)
        || phone.contains(term)
        || email.is_some_and(|email| email.to_lowercase().contains(&lowered))
}

impl From<&auth::AuthError> for Notice {
    fn from(err: &auth::AuthError) -> Self {
        match err {
            auth::AuthError::Disabled => Self::error("تسجيل دخول الإدارة غير متاح حالياً"),
            auth::AuthError::InvalidCredentials => Self::error("البريد الإلكتروني أو كلمة المرور غير صحيحة"),
        }
    }
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
