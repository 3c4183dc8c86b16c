//! Registration draft model.
//!
//! [`DraftFields`] holds the optional profile scalars collected in wizard
//! steps 2-6 plus the uploaded avatar URL. Secrets (password, confirmation,
//! verification code) live only in [`IdentityForm`], which is never
//! serialized or persisted anywhere, so a draft cannot contain them by
//! construction.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// The step-1 identity form. Never persisted, cached, or serialized.
#[derive(Debug, Clone)]
pub struct IdentityForm {
    /// Email to register.
    pub email: String,
    /// Chosen password.
    pub password: String,
    /// Password confirmation.
    pub confirm_password: String,
}

/// The profile scalars editable in wizard steps 2-6.
///
/// All fields are optional; the wire form (camelCase, absent-if-none)
/// matches the backend draft store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftFields {
    /// Full name (required to leave the Profile step).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,

    /// Guild membership number (required to leave the Profile step).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub membership_number: Option<String>,

    /// Local chapter the member belongs to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chapter_id: Option<String>,

    /// Free-form location.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    /// Short bio.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,

    /// Occupation or craft.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub occupation: Option<String>,

    /// Personal website URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website_url: Option<String>,

    /// Instagram handle.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instagram_handle: Option<String>,

    /// Twitter/X handle.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub twitter_handle: Option<String>,

    /// Contact phone number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,

    /// Birth year.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birth_year: Option<String>,

    /// Preferred pronouns.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pronouns: Option<String>,

    /// How the member heard about the guild.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub referral_source: Option<String>,

    /// Comma-separated interests.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interests: Option<String>,

    /// Spoken languages.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub languages: Option<String>,

    /// URL of the uploaded avatar. Always a URL returned by the asset
    /// store, never binary data.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

/// Names of the editable scalar fields, for the generic edit API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DraftField {
    FullName,
    MembershipNumber,
    ChapterId,
    Location,
    Bio,
    Occupation,
    WebsiteUrl,
    InstagramHandle,
    TwitterHandle,
    Phone,
    BirthYear,
    Pronouns,
    ReferralSource,
    Interests,
    Languages,
}

impl DraftField {
    /// Every editable scalar, in wizard order.
    pub const ALL: [DraftField; 15] = [
        Self::FullName,
        Self::MembershipNumber,
        Self::ChapterId,
        Self::Location,
        Self::Bio,
        Self::Occupation,
        Self::WebsiteUrl,
        Self::InstagramHandle,
        Self::TwitterHandle,
        Self::Phone,
        Self::BirthYear,
        Self::Pronouns,
        Self::ReferralSource,
        Self::Interests,
        Self::Languages,
    ];
}

impl DraftFields {
    /// Returns the current value of a scalar field.
    #[must_use]
    pub fn get(&self, field: DraftField) -> Option<&str> {
        let slot = match field {
            DraftField::FullName => &self.full_name,
            DraftField::MembershipNumber => &self.membership_number,
            DraftField::ChapterId => &self.chapter_id,
            DraftField::Location => &self.location,
            DraftField::Bio => &self.bio,
            DraftField::Occupation => &self.occupation,
            DraftField::WebsiteUrl => &self.website_url,
            DraftField::InstagramHandle => &self.instagram_handle,
            DraftField::TwitterHandle => &self.twitter_handle,
            DraftField::Phone => &self.phone,
            DraftField::BirthYear => &self.birth_year,
            DraftField::Pronouns => &self.pronouns,
            DraftField::ReferralSource => &self.referral_source,
            DraftField::Interests => &self.interests,
            DraftField::Languages => &self.languages,
        };
        slot.as_deref()
    }

    /// Sets a scalar field.
    pub fn set(&mut self, field: DraftField, value: impl Into<String>) {
        let value = Some(value.into());
        match field {
            DraftField::FullName => self.full_name = value,
            DraftField::MembershipNumber => self.membership_number = value,
            DraftField::ChapterId => self.chapter_id = value,
            DraftField::Location => self.location = value,
            DraftField::Bio => self.bio = value,
            DraftField::Occupation => self.occupation = value,
            DraftField::WebsiteUrl => self.website_url = value,
            DraftField::InstagramHandle => self.instagram_handle = value,
            DraftField::TwitterHandle => self.twitter_handle = value,
            DraftField::Phone => self.phone = value,
            DraftField::BirthYear => self.birth_year = value,
            DraftField::Pronouns => self.pronouns = value,
            DraftField::ReferralSource => self.referral_source = value,
            DraftField::Interests => self.interests = value,
            DraftField::Languages => self.languages = value,
        }
    }

    /// Returns a copy with empty and whitespace-only values dropped.
    ///
    /// The remote upsert payload carries only fields the user actually
    /// filled in.
    #[must_use]
    pub fn non_empty(&self) -> Self {
        let mut out = Self::default();
        for field in DraftField::ALL {
            if let Some(value) = self.get(field) {
                if !value.trim().is_empty() {
                    out.set(field, value);
                }
            }
        }
        out.avatar_url = self
            .avatar_url
            .as_deref()
            .filter(|v| !v.trim().is_empty())
            .map(String::from);
        out
    }

    /// Overlays locally cached values onto a remote draft.
    ///
    /// The remote store is authoritative: a local value is used only where
    /// the remote value is absent.
    #[must_use]
    pub fn overlay(remote: Self, local: &Self) -> Self {
        let mut out = remote;
        for field in DraftField::ALL {
            if out.get(field).is_none() {
                if let Some(value) = local.get(field) {
                    out.set(field, value);
                }
            }
        }
        if out.avatar_url.is_none() {
            out.avatar_url = local.avatar_url.clone();
        }
        out
    }
}

/// A persisted registration draft, one per provider subject id.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationDraft {
    /// The identity provider's subject id.
    pub subject_id: String,

    /// The verified email.
    pub email: String,

    /// The collected profile fields.
    #[serde(flatten)]
    pub fields: DraftFields,

    /// When this draft was last written.
    #[serde(with = "time::serde::rfc3339")]
    pub last_saved_at: OffsetDateTime,
}

/// The consolidated submission sent to the finalize endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinalizePayload {
    /// The identity provider's subject id.
    pub subject_id: String,

    /// The verified email.
    pub email: String,

    /// All assembled profile fields plus the avatar URL, if any.
    #[serde(flatten)]
    pub fields: DraftFields,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_empty_drops_blank_values() {
        let mut fields = DraftFields::default();
        fields.set(DraftField::FullName, "Ana Marta");
        fields.set(DraftField::Bio, "   ");
        fields.set(DraftField::Location, "");
        fields.avatar_url = Some("https://cdn.example.com/a.png".into());

        let filtered = fields.non_empty();
        assert_eq!(filtered.full_name.as_deref(), Some("Ana Marta"));
        assert_eq!(filtered.bio, None);
        assert_eq!(filtered.location, None);
        assert!(filtered.avatar_url.is_some());
    }

    #[test]
    fn test_overlay_prefers_remote() {
        let mut remote = DraftFields::default();
        remote.set(DraftField::FullName, "Remote Name");

        let mut local = DraftFields::default();
        local.set(DraftField::FullName, "Local Name");
        local.set(DraftField::Bio, "local bio");
        local.avatar_url = Some("https://cdn.example.com/local.png".into());

        let merged = DraftFields::overlay(remote, &local);
        assert_eq!(merged.full_name.as_deref(), Some("Remote Name"));
        assert_eq!(merged.bio.as_deref(), Some("local bio"));
        assert_eq!(
            merged.avatar_url.as_deref(),
            Some("https://cdn.example.com/local.png")
        );
    }

    #[test]
    fn test_get_set_roundtrip_over_all_fields() {
        let mut fields = DraftFields::default();
        for (i, field) in DraftField::ALL.into_iter().enumerate() {
            assert_eq!(fields.get(field), None);
            fields.set(field, format!("v{i}"));
        }
        for (i, field) in DraftField::ALL.into_iter().enumerate() {
            assert_eq!(fields.get(field), Some(format!("v{i}").as_str()));
        }
    }

    #[test]
    fn test_serialized_draft_never_contains_secret_keys() {
        // Every field populated: the richest possible payload.
        let mut fields = DraftFields::default();
        for field in DraftField::ALL {
            fields.set(field, "value");
        }
        fields.avatar_url = Some("https://cdn.example.com/a.png".into());

        let draft = RegistrationDraft {
            subject_id: "sub-1".into(),
            email: "a@b.com".into(),
            fields,
            last_saved_at: OffsetDateTime::from_unix_timestamp(1_700_000_000).unwrap(),
        };

        let value = serde_json::to_value(&draft).unwrap();
        let keys: Vec<&str> = value.as_object().unwrap().keys().map(String::as_str).collect();
        for secret in ["password", "confirmPassword", "verificationCode"] {
            assert!(!keys.contains(&secret), "draft leaked {secret}");
        }
    }

    #[test]
    fn test_draft_wire_form_is_camel_case() {
        let mut fields = DraftFields::default();
        fields.set(DraftField::MembershipNumber, "GM-1042");
        let value = serde_json::to_value(&fields).unwrap();
        assert_eq!(value["membershipNumber"], "GM-1042");
        assert!(value.get("membership_number").is_none());
    }
}
