//! Admin authentication.
//!
//! SYSTEM CONTEXT
//! ==============
//! Sign-in state is published on a [`SessionHub`]; the navigator subscribes to
//! that hub and applies the login/logout redirects. Pages never navigate on
//! sign-in themselves beyond the login form's success callback.

use navigator::SessionHub;
use tracing::{info, warn};

use crate::config::AdminCredentials;

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("admin sign-in is not configured")]
    Disabled,
    #[error("invalid email or password")]
    InvalidCredentials,
}

/// Authentication primitives: sign in, sign out, and the session signal.
#[async_trait::async_trait]
pub trait AuthProvider: Send + Sync {
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidCredentials`] on a mismatch and
    /// [`AuthError::Disabled`] when no admin account exists.
    async fn sign_in(&self, email: &str, password: &str) -> Result<(), AuthError>;

    async fn sign_out(&self) -> Result<(), AuthError>;

    /// Session signal this provider publishes into.
    fn session(&self) -> &SessionHub;
}

/// Single-admin auth checked against configured credentials.
pub struct AdminAuth {
    credentials: Option<AdminCredentials>,
    hub: SessionHub,
}

impl AdminAuth {
    #[must_use]
    pub fn new(credentials: Option<AdminCredentials>, hub: SessionHub) -> Self {
        if credentials.is_none() {
            warn!("no admin credentials configured; admin sign-in disabled");
        }
        Self { credentials, hub }
    }
}

#[async_trait::async_trait]
impl AuthProvider for AdminAuth {
    async fn sign_in(&self, email: &str, password: &str) -> Result<(), AuthError> {
        let expected = self.credentials.as_ref().ok_or(AuthError::Disabled)?;
        if !expected.email.eq_ignore_ascii_case(email.trim()) || expected.password != password {
            warn!(email = email.trim(), "admin sign-in rejected");
            return Err(AuthError::InvalidCredentials);
        }
        info!(email = %expected.email, "admin signed in");
        self.hub.publish(true);
        Ok(())
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        if self.hub.is_present() {
            info!("admin signed out");
        }
        self.hub.publish(false);
        Ok(())
    }

    fn session(&self) -> &SessionHub {
        &self.hub
    }
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;
