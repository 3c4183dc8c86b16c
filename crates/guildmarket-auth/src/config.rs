//! Session engine configuration.

use std::time::Duration;

use guildmarket_core::Role;

/// Configuration for the [`SessionManager`](crate::session::SessionManager).
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// How close to expiry an id token may get before a session read
    /// triggers a proactive refresh (default: 5 minutes).
    pub refresh_threshold: Duration,

    /// Role assigned when the backend has no user row for a fresh login
    /// (default: [`Role::Consumer`]).
    pub default_role: Role,
}

impl SessionConfig {
    /// Creates a configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self {
            refresh_threshold: Duration::from_secs(300),
            default_role: Role::Consumer,
        }
    }

    /// Sets the proactive refresh threshold.
    #[must_use]
    pub fn with_refresh_threshold(mut self, threshold: Duration) -> Self {
        self.refresh_threshold = threshold;
        self
    }

    /// Sets the default role for synthesized sessions.
    #[must_use]
    pub fn with_default_role(mut self, role: Role) -> Self {
        self.default_role = role;
        self
    }

    /// The refresh threshold in milliseconds, for expiry math.
    #[must_use]
    pub(crate) fn refresh_threshold_millis(&self) -> i64 {
        self.refresh_threshold.as_millis() as i64
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::new()
    }
}
