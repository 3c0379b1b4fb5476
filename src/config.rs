//! Portal configuration parsed from environment variables.

use std::str::FromStr;
use std::time::Duration;

use navigator::NavigatorOptions;

pub const DEFAULT_BOOTSTRAP_DELAY_MS: u64 = 3000;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("unknown PORTAL_VARIANT: {0} (expected 'web' or 'mobile')")]
    UnknownVariant(String),
    #[error("PORTAL_ADMIN_EMAIL is set but PORTAL_ADMIN_PASSWORD is missing")]
    MissingAdminPassword,
}

/// Which front end is running. Only mobile has a system back gesture.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Variant {
    #[default]
    Web,
    Mobile,
}

impl Variant {
    #[must_use]
    pub fn has_back_gesture(self) -> bool {
        matches!(self, Self::Mobile)
    }
}

impl FromStr for Variant {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "web" => Ok(Self::Web),
            "mobile" => Ok(Self::Mobile),
            other => Err(ConfigError::UnknownVariant(other.to_owned())),
        }
    }
}

/// Admin login the auth service accepts.
#[derive(Clone, PartialEq, Eq)]
pub struct AdminCredentials {
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for AdminCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminCredentials").field("email", &self.email).field("password", &"<redacted>").finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortalConfig {
    pub variant: Variant,
    pub bootstrap_delay: Duration,
    /// `None` disables admin sign-in.
    pub admin: Option<AdminCredentials>,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self { variant: Variant::Web, bootstrap_delay: Duration::from_millis(DEFAULT_BOOTSTRAP_DELAY_MS), admin: None }
    }
}

impl PortalConfig {
    /// Build typed portal config from environment variables.
    ///
    /// Optional:
    /// - `PORTAL_VARIANT`: `web` (default) or `mobile`
    /// - `PORTAL_BOOTSTRAP_DELAY_MS`: splash duration, default 3000
    /// - `PORTAL_ADMIN_EMAIL` / `PORTAL_ADMIN_PASSWORD`: admin login; both or neither
    pub fn from_env() -> Result<Self, ConfigError> {
        let variant = std::env::var("PORTAL_VARIANT").ok().as_deref().map_or(Ok(Variant::Web), str::parse)?;
        let bootstrap_delay =
            Duration::from_millis(env_parse("PORTAL_BOOTSTRAP_DELAY_MS", DEFAULT_BOOTSTRAP_DELAY_MS));

        let admin = match std::env::var("PORTAL_ADMIN_EMAIL").ok().filter(|v| !v.trim().is_empty()) {
            Some(email) => {
                let password = std::env::var("PORTAL_ADMIN_PASSWORD").map_err(|_| ConfigError::MissingAdminPassword)?;
                Some(AdminCredentials { email: email.trim().to_owned(), password })
            }
            None => None,
        };

        Ok(Self { variant, bootstrap_delay, admin })
    }

    #[must_use]
    pub fn navigator_options(&self) -> NavigatorOptions {
        NavigatorOptions { bootstrap_delay: self.bootstrap_delay }
    }
}

pub(crate) fn env_parse<T>(key: &str, default: T) -> T
where
    T: FromStr + Copy,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
