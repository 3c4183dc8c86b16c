//! Onboarding error types.

use guildmarket_auth::AuthError;

/// Errors that can occur while driving the registration wizard.
#[derive(Debug, thiserror::Error)]
pub enum OnboardingError {
    /// A step-advance validation failed for a specific field.
    #[error("Invalid {field}: {message}")]
    Validation {
        /// The offending form field.
        field: String,
        /// What the user has to fix.
        message: String,
    },

    /// The wizard was driven out of order.
    #[error("Invalid step: {message}")]
    InvalidStep {
        /// Description of the ordering violation.
        message: String,
    },

    /// A draft write failed. Recoverable: the local cache is the durable
    /// fallback, so autosave swallows this after logging it.
    #[error("Draft save failed: {message}")]
    DraftSaveFailure {
        /// Description of the save failure.
        message: String,
    },

    /// A draft read failed. Recoverable: onboarding continues with only
    /// the authenticated email and blank fields.
    #[error("Draft load failed: {message}")]
    DraftLoadFailure {
        /// Description of the load failure.
        message: String,
    },

    /// The profile image upload failed.
    #[error("Asset upload failed: {message}")]
    AssetUpload {
        /// Description of the upload failure.
        message: String,
    },

    /// The account already finished onboarding; there is nothing to resume.
    #[error("Onboarding already finished")]
    AlreadyFinished,

    /// The identity step failed at the provider.
    #[error("Identity step failed: {source}")]
    IdentityStep {
        /// The classified provider failure.
        #[source]
        source: AuthError,
    },

    /// An unexpected internal error occurred.
    #[error("Internal error: {message}")]
    Internal {
        /// Description of the internal error.
        message: String,
    },
}

impl OnboardingError {
    /// Creates a new `Validation` error.
    #[must_use]
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Creates a new `InvalidStep` error.
    #[must_use]
    pub fn invalid_step(message: impl Into<String>) -> Self {
        Self::InvalidStep {
            message: message.into(),
        }
    }

    /// Creates a new `DraftSaveFailure` error.
    #[must_use]
    pub fn draft_save(message: impl Into<String>) -> Self {
        Self::DraftSaveFailure {
            message: message.into(),
        }
    }

    /// Creates a new `DraftLoadFailure` error.
    #[must_use]
    pub fn draft_load(message: impl Into<String>) -> Self {
        Self::DraftLoadFailure {
            message: message.into(),
        }
    }

    /// Creates a new `AssetUpload` error.
    #[must_use]
    pub fn asset_upload(message: impl Into<String>) -> Self {
        Self::AssetUpload {
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

    /// Returns `true` if forward progress is allowed despite the error
    /// (save/load failures are absorbed by the local cache fallback).
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::DraftSaveFailure { .. } | Self::DraftLoadFailure { .. }
        )
    }
}
