//! Identity domain types.
//!
//! These types mirror the backend user store's wire shapes. The backend
//! emits camelCase field names; serde aliases accept both spellings so the
//! same types can be rebuilt from locally cached snake_case JSON.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Feature flags attached to an account.
///
/// Keys are backend-defined flag names; a missing key means the flag is off.
pub type FeatureFlags = HashMap<String, bool>;

/// The marketplace role attached to an account.
///
/// Every authenticated account has exactly one role. New accounts default
/// to [`Role::Consumer`] until the backend promotes them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// Ordinary buyer account, the default for new registrations.
    #[default]
    Consumer,
    /// Account allowed to list items for sale.
    Seller,
    /// Account allowed to create and promote events.
    Promoter,
    /// Chapter steward with local moderation duties.
    Steward,
    /// Platform administrator.
    Admin,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Consumer => write!(f, "CONSUMER"),
            Self::Seller => write!(f, "SELLER"),
            Self::Promoter => write!(f, "PROMOTER"),
            Self::Steward => write!(f, "STEWARD"),
            Self::Admin => write!(f, "ADMIN"),
        }
    }
}

/// Progress of an account through the registration wizard.
///
/// Only the backend flips a status to [`Finished`](Self::Finished); the
/// client-side engines treat the status as read-only input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OnboardingStatus {
    /// Identity exists at the provider but no profile work has started.
    #[default]
    PreRegistration,
    /// The profile wizard has been started and a draft exists.
    OnboardingInProgress,
    /// The wizard completed and the profile was finalized.
    Finished,
}

impl OnboardingStatus {
    /// Returns `true` once the registration wizard has completed.
    #[must_use]
    pub fn is_finished(self) -> bool {
        matches!(self, Self::Finished)
    }
}

/// A user row as returned by the backend user store.
///
/// All role-bearing fields are optional on the wire; absent fields mean the
/// account does not hold that capability. Defaulting for display purposes
/// happens at projection time, never here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    /// The identity provider's subject id for this account.
    #[serde(alias = "subjectId")]
    pub subject_id: String,

    /// Primary email address.
    pub email: String,

    /// Marketplace role.
    #[serde(default)]
    pub role: Role,

    /// Guild membership id, present once membership is verified.
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "memberId")]
    pub member_id: Option<String>,

    /// Seller account id, present for accounts allowed to sell.
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "sellerId")]
    pub seller_id: Option<String>,

    /// Promoter account id, present for event promoters.
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "promoterId")]
    pub promoter_id: Option<String>,

    /// Chapter steward id, present for stewards.
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "stewardId")]
    pub steward_id: Option<String>,

    /// Feature flags enabled for this account.
    #[serde(default, alias = "featureFlags")]
    pub feature_flags: FeatureFlags,

    /// Preferred display name, if the user has set one.
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "displayName")]
    pub display_name: Option<String>,

    /// Registration wizard progress.
    #[serde(default, alias = "onboardingStatus")]
    pub onboarding_status: OnboardingStatus,
}
