//! Authentication and session error types.
//!
//! This module defines all error types that can occur while authenticating
//! a user or maintaining a bearer-token session.

use crate::classify::FailureKind;

/// Errors that can occur during authentication and session operations.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// The identity provider requires the user to set a new password
    /// before sign-in can complete.
    #[error("Password change required before sign-in can complete")]
    PasswordChangeRequired,

    /// The account exists but its verification code was never confirmed.
    #[error("User account is not confirmed")]
    UserNotConfirmed,

    /// The supplied credentials were rejected.
    ///
    /// This variant deliberately carries no detail: provider internals are
    /// never surfaced to callers for failed sign-ins.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// A token refresh attempt failed; the session must be invalidated.
    #[error("Token refresh failed: {message}")]
    RefreshFailure {
        /// Description of the refresh failure.
        message: String,
    },

    /// The identity provider returned an error outside the sign-in taxonomy.
    #[error("Identity provider error: {message}")]
    Provider {
        /// Description of the provider error.
        message: String,
    },

    /// The backend user store returned an error.
    #[error("Backend error: {message}")]
    Backend {
        /// Description of the backend error.
        message: String,
    },

    /// An unexpected internal error occurred.
    #[error("Internal error: {message}")]
    Internal {
        /// Description of the internal error.
        message: String,
    },
}

impl AuthError {
    /// Creates a new `RefreshFailure` error.
    #[must_use]
    pub fn refresh_failure(message: impl Into<String>) -> Self {
        Self::RefreshFailure {
            message: message.into(),
        }
    }

    /// Creates a new `Provider` error.
    #[must_use]
    pub fn provider(message: impl Into<String>) -> Self {
        Self::Provider {
            message: message.into(),
        }
    }

    /// Creates a new `Backend` error.
    #[must_use]
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend {
            message: message.into(),
        }
    }

    /// Creates a new `Internal` error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Builds the sign-in error for a classified provider failure.
    ///
    /// `PasswordChangeRequired` and `UserNotConfirmed` keep their kind so
    /// callers can surface specific guidance; every other kind collapses to
    /// the generic [`AuthError::InvalidCredentials`].
    #[must_use]
    pub fn from_sign_in_failure(kind: FailureKind) -> Self {
        match kind {
            FailureKind::PasswordChangeRequired => Self::PasswordChangeRequired,
            FailureKind::UserNotConfirmed => Self::UserNotConfirmed,
            FailureKind::InvalidCredentials | FailureKind::Unknown => Self::InvalidCredentials,
        }
    }

    /// Returns `true` if the error requires a specific user action before
    /// sign-in can be retried (password change or account confirmation).
    #[must_use]
    pub fn requires_user_action(&self) -> bool {
        matches!(self, Self::PasswordChangeRequired | Self::UserNotConfirmed)
    }

    /// Returns `true` for the generic rejected-credentials error.
    #[must_use]
    pub fn is_invalid_credentials(&self) -> bool {
        matches!(self, Self::InvalidCredentials)
    }
}
