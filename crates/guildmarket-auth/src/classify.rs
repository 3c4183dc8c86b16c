//! Provider failure classification.
//!
//! The identity provider reports errors in several loosely structured forms:
//! a machine code, an exception name, or only a human-readable message.
//! [`classify`] maps any of those onto the closed [`FailureKind`] taxonomy so
//! that no call site ever has to do its own substring matching.
//!
//! Classification inspects, in order:
//!
//! 1. the explicit `code` field,
//! 2. the explicit `name` field,
//! 3. a case-insensitive substring match against the message.
//!
//! The first match wins; no match is [`FailureKind::Unknown`].

use serde::Deserialize;

/// A raw failure reported by the identity provider or backend.
///
/// All fields are optional; whatever subset the provider filled in is used
/// for classification. The serde aliases accept Cognito-style error bodies
/// (`__type`) as well as plain `{code, name, message}` shapes.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProviderFailure {
    /// Machine-readable error code, when the provider sets one.
    #[serde(default)]
    pub code: Option<String>,

    /// Exception or error type name.
    #[serde(default, alias = "__type", alias = "errorType")]
    pub name: Option<String>,

    /// Human-readable message.
    #[serde(default, alias = "Message")]
    pub message: Option<String>,
}

impl ProviderFailure {
    /// Builds a failure from a bare message string.
    #[must_use]
    pub fn from_message(message: impl Into<String>) -> Self {
        Self {
            code: None,
            name: None,
            message: Some(message.into()),
        }
    }

    /// One-line summary for logging. Never shown to end users.
    #[must_use]
    pub fn summary(&self) -> String {
        self.code
            .as_deref()
            .or(self.name.as_deref())
            .or(self.message.as_deref())
            .unwrap_or("unspecified provider failure")
            .to_string()
    }
}

/// Closed taxonomy of sign-in failure kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// The provider demands a new password before sign-in completes.
    PasswordChangeRequired,
    /// The account's verification code was never confirmed.
    UserNotConfirmed,
    /// The credentials were rejected.
    InvalidCredentials,
    /// Anything the taxonomy does not recognize.
    Unknown,
}

/// Exact-match patterns for the `code` and `name` fields.
const FIELD_PATTERNS: &[(&str, FailureKind)] = &[
    ("NEW_PASSWORD_REQUIRED", FailureKind::PasswordChangeRequired),
    ("PasswordResetRequiredException", FailureKind::PasswordChangeRequired),
    ("UserNotConfirmedException", FailureKind::UserNotConfirmed),
    ("NotAuthorizedException", FailureKind::InvalidCredentials),
];

/// Case-insensitive substring patterns for the message field.
const MESSAGE_PATTERNS: &[(&str, FailureKind)] = &[
    ("new_password_required", FailureKind::PasswordChangeRequired),
    ("usernotconfirmedexception", FailureKind::UserNotConfirmed),
    ("not confirmed", FailureKind::UserNotConfirmed),
    ("incorrect username or password", FailureKind::InvalidCredentials),
];

/// Classifies a raw provider failure onto the closed taxonomy.
///
/// Pure function; the only place in the codebase where provider error
/// strings are inspected.
#[must_use]
pub fn classify(failure: &ProviderFailure) -> FailureKind {
    for field in [failure.code.as_deref(), failure.name.as_deref()] {
        let Some(value) = field else { continue };
        for (pattern, kind) in FIELD_PATTERNS {
            if value.eq_ignore_ascii_case(pattern) {
                return *kind;
            }
        }
    }

    if let Some(message) = failure.message.as_deref() {
        let lowered = message.to_lowercase();
        for (pattern, kind) in MESSAGE_PATTERNS {
            if lowered.contains(pattern) {
                return *kind;
            }
        }
    }

    FailureKind::Unknown
}
