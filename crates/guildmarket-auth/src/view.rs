//! Session projection.
//!
//! [`Session`] is the externally consumed shape of a login: role flags
//! derived from id-field presence plus passthrough of the bearer tokens
//! for downstream API calls. The projection is a pure function of the
//! [`TokenRecord`] with no I/O, so every page and API layer can call it
//! freely.

use serde::Serialize;

use guildmarket_core::{FeatureFlags, OnboardingStatus, Role};

use crate::token::TokenRecord;

/// The session shape consumed by UI-facing code.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Session {
    /// The identity provider's subject id.
    pub subject_id: String,

    /// Sign-in email.
    pub email: String,

    /// Display name; falls back to the email when the user has not set one.
    pub display_name: String,

    /// Marketplace role.
    pub role: Role,

    /// Registration wizard progress.
    pub onboarding_status: OnboardingStatus,

    /// Whether the account holds a verified guild membership.
    pub is_member: bool,

    /// Whether the account may list items for sale.
    pub is_seller: bool,

    /// Whether the account may promote events.
    pub is_promoter: bool,

    /// Whether the account stewards a chapter.
    pub is_steward: bool,

    /// Feature flags for this account.
    pub feature_flags: FeatureFlags,

    /// Access token for downstream API calls.
    pub access_token: String,

    /// Id token for downstream API calls.
    pub id_token: String,
}

impl Session {
    /// Projects a token record onto the external session shape.
    ///
    /// Pure and idempotent; this is the only place where display defaults
    /// are applied.
    #[must_use]
    pub fn project(record: &TokenRecord) -> Self {
        Self {
            subject_id: record.subject_id.clone(),
            email: record.email.clone(),
            display_name: record
                .display_name
                .clone()
                .unwrap_or_else(|| record.email.clone()),
            role: record.role,
            onboarding_status: record.onboarding_status,
            is_member: record.member_id.is_some(),
            is_seller: record.seller_id.is_some(),
            is_promoter: record.promoter_id.is_some(),
            is_steward: record.steward_id.is_some(),
            feature_flags: record.feature_flags.clone(),
            access_token: record.access_token.clone(),
            id_token: record.id_token.clone(),
        }
    }
}
