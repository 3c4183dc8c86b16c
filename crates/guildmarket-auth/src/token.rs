//! The token record and id-token expiry decoding.
//!
//! A [`TokenRecord`] is the engine's in-memory representation of one active
//! login: the bearer-token triple plus the role-bearing profile fields the
//! UI needs on every request.
//!
//! The expiry decode reads the `exp` claim straight out of the id token's
//! payload segment without verifying the signature. That is deliberate:
//! this decode only schedules refreshes, while the token's authority is
//! verified server-side wherever it is redeemed.

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use serde::Deserialize;

use guildmarket_core::{FeatureFlags, OnboardingStatus, Role, UserProfile};

use crate::provider::{CredentialGrant, TokenTriple};

/// One active login session, exclusively owned by the session context.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenRecord {
    /// The identity provider's subject id.
    pub subject_id: String,

    /// Sign-in email, required for the provider's refresh call.
    pub email: String,

    /// OAuth access token.
    pub access_token: String,

    /// OIDC id token; its `exp` claim drives refresh scheduling.
    pub id_token: String,

    /// Refresh token, absent for grants issued without one.
    pub refresh_token: Option<String>,

    /// Marketplace role.
    pub role: Role,

    /// Guild membership id, if any.
    pub member_id: Option<String>,

    /// Seller account id, if any.
    pub seller_id: Option<String>,

    /// Promoter account id, if any.
    pub promoter_id: Option<String>,

    /// Chapter steward id, if any.
    pub steward_id: Option<String>,

    /// Feature flags for this account.
    pub feature_flags: FeatureFlags,

    /// Preferred display name, if set. Defaulting happens at projection
    /// time, never here.
    pub display_name: Option<String>,

    /// Registration wizard progress.
    pub onboarding_status: OnboardingStatus,
}

impl TokenRecord {
    /// Builds the minimal record for a grant with no backend user row.
    ///
    /// Used when both the login upsert and the fallback fetch fail: the
    /// user still gets a session, with everything defaulted.
    #[must_use]
    pub fn minimal(grant: &CredentialGrant, default_role: Role) -> Self {
        Self {
            subject_id: grant.subject_id.clone(),
            email: grant.email.clone(),
            access_token: grant.access_token.clone(),
            id_token: grant.id_token.clone(),
            refresh_token: Some(grant.refresh_token.clone()),
            role: default_role,
            member_id: None,
            seller_id: None,
            promoter_id: None,
            steward_id: None,
            feature_flags: FeatureFlags::default(),
            display_name: None,
            onboarding_status: OnboardingStatus::PreRegistration,
        }
    }

    /// Builds the record for a grant plus its backend user row.
    #[must_use]
    pub fn from_grant(grant: &CredentialGrant, profile: &UserProfile) -> Self {
        let mut record = Self::minimal(grant, profile.role);
        record.absorb_profile(profile);
        record
    }

    /// Replaces the bearer-token triple as one atomic unit.
    ///
    /// This is the only way the three token fields change after
    /// construction; no reader can ever observe a mixed old/new triple.
    pub fn apply_triple(&mut self, triple: TokenTriple) {
        self.access_token = triple.access_token;
        self.id_token = triple.id_token;
        self.refresh_token = Some(triple.refresh_token);
    }

    /// Overwrites the role-bearing profile fields from a fresh backend fetch.
    ///
    /// Token fields are untouched; this is the best-effort secondary update
    /// after a refresh.
    pub fn absorb_profile(&mut self, profile: &UserProfile) {
        self.role = profile.role;
        self.member_id = profile.member_id.clone();
        self.seller_id = profile.seller_id.clone();
        self.promoter_id = profile.promoter_id.clone();
        self.steward_id = profile.steward_id.clone();
        self.feature_flags = profile.feature_flags.clone();
        self.display_name = profile.display_name.clone();
        self.onboarding_status = profile.onboarding_status;
    }
}

#[derive(Debug, Deserialize)]
struct IdTokenPayload {
    exp: i64,
}

/// Reads the `exp` claim (unix seconds) out of a JWT's payload segment.
///
/// No signature verification: the result is only used to decide when to
/// refresh. Returns `None` for anything that does not decode as a JWT
/// payload with a numeric `exp`.
#[must_use]
pub fn decode_expiry_seconds(token: &str) -> Option<i64> {
    let payload = token.split('.').nth(1)?;
    let bytes = URL_SAFE_NO_PAD.decode(payload).ok()?;
    let payload: IdTokenPayload = serde_json::from_slice(&bytes).ok()?;
    Some(payload.exp)
}


#[cfg(test)]
mod tests {
    use super::*;

    fn grant() -> CredentialGrant {
        CredentialGrant {
            access_token: "at-1".into(),
            id_token: "it-1".into(),
            refresh_token: "rt-1".into(),
            subject_id: "sub-1".into(),
            email: "a@b.com".into(),
        }
    }

    #[test]
    fn test_decode_expiry_seconds() {
        let token = testing::unsigned_token(1_700_000_123);
        assert_eq!(decode_expiry_seconds(&token), Some(1_700_000_123));
    }

    #[test]
    fn test_decode_expiry_rejects_garbage() {
        assert_eq!(decode_expiry_seconds("not-a-jwt"), None);
        assert_eq!(decode_expiry_seconds("a.b.c"), None);
        // Valid base64 but no exp claim.
        let payload = URL_SAFE_NO_PAD.encode(br#"{"sub":"x"}"#);
        assert_eq!(decode_expiry_seconds(&format!("h.{payload}.s")), None);
    }

    #[test]
    fn test_minimal_record_defaults() {
        let record = TokenRecord::minimal(&grant(), Role::Consumer);
        assert_eq!(record.subject_id, "sub-1");
        assert_eq!(record.role, Role::Consumer);
        assert_eq!(record.onboarding_status, OnboardingStatus::PreRegistration);
        assert_eq!(record.seller_id, None);
        assert_eq!(record.refresh_token.as_deref(), Some("rt-1"));
    }

    #[test]
    fn test_apply_triple_swaps_all_three() {
        let mut record = TokenRecord::minimal(&grant(), Role::Consumer);
        record.apply_triple(TokenTriple {
            access_token: "at-2".into(),
            id_token: "it-2".into(),
            refresh_token: "rt-2".into(),
        });
        assert_eq!(record.access_token, "at-2");
        assert_eq!(record.id_token, "it-2");
        assert_eq!(record.refresh_token.as_deref(), Some("rt-2"));
        // Identity fields are untouched by a token swap.
        assert_eq!(record.subject_id, "sub-1");
    }

    #[test]
    fn test_absorb_profile_keeps_tokens() {
        let mut record = TokenRecord::minimal(&grant(), Role::Consumer);
        let profile: UserProfile = serde_json::from_value(serde_json::json!({
            "subjectId": "sub-1",
            "email": "a@b.com",
            "role": "SELLER",
            "sellerId": "slr-7",
            "onboardingStatus": "FINISHED"
        }))
        .unwrap();

        record.absorb_profile(&profile);
        assert_eq!(record.role, Role::Seller);
        assert_eq!(record.seller_id.as_deref(), Some("slr-7"));
        assert!(record.onboarding_status.is_finished());
        assert_eq!(record.access_token, "at-1");
        assert_eq!(record.id_token, "it-1");
    }
}
