//! Storage traits for drafts and assets.
//!
//! The controller never talks to the network directly; it is handed
//! implementations of these traits. Production code uses the reqwest-backed
//! clients in [`crate::http`] plus the in-memory [`MemoryDraftCache`];
//! tests use scripted mocks.

use async_trait::async_trait;
use dashmap::DashMap;

use crate::OnboardingResult;
use crate::draft::{DraftFields, FinalizePayload, RegistrationDraft};

/// Remote draft store. Authoritative on resume; last writer wins.
#[async_trait]
pub trait DraftStore: Send + Sync {
    /// Fetches the draft for a subject id, `None` if none exists yet.
    ///
    /// # Errors
    ///
    /// Returns [`DraftLoadFailure`](crate::OnboardingError::DraftLoadFailure)
    /// when the store is unreachable or responds with an unexpected status.
    async fn get_draft(&self, subject_id: &str) -> OnboardingResult<Option<DraftFields>>;

    /// Creates or replaces the draft for a subject id.
    ///
    /// # Errors
    ///
    /// Returns [`DraftSaveFailure`](crate::OnboardingError::DraftSaveFailure)
    /// on any write failure.
    async fn upsert_draft(&self, subject_id: &str, fields: &DraftFields) -> OnboardingResult<()>;

    /// Submits the consolidated registration payload.
    ///
    /// The backend flips the account's onboarding status on success; this
    /// engine never does.
    ///
    /// # Errors
    ///
    /// Returns [`DraftSaveFailure`](crate::OnboardingError::DraftSaveFailure)
    /// on any submission failure.
    async fn finalize(&self, payload: &FinalizePayload) -> OnboardingResult<()>;
}

/// Local ephemeral draft cache, keyed by subject id.
///
/// Holds at most the profile scalars and already-uploaded asset URLs;
/// secrets and binaries structurally cannot reach it (see
/// [`crate::draft::DraftFields`]).
#[async_trait]
pub trait DraftCache: Send + Sync {
    /// Stores a draft snapshot.
    async fn put(&self, draft: RegistrationDraft);

    /// Reads the cached draft for a subject id.
    async fn get(&self, subject_id: &str) -> Option<RegistrationDraft>;

    /// Purges the cached draft for a subject id.
    async fn remove(&self, subject_id: &str);
}

/// Opaque asset store collaborator.
#[async_trait]
pub trait AssetStore: Send + Sync {
    /// Uploads an image and returns its stable URL.
    ///
    /// # Errors
    ///
    /// Returns [`AssetUpload`](crate::OnboardingError::AssetUpload) on any
    /// upload failure.
    async fn upload_image(&self, bytes: Vec<u8>, filename: &str) -> OnboardingResult<String>;
}

/// In-memory draft cache.
#[derive(Debug, Default)]
pub struct MemoryDraftCache {
    drafts: DashMap<String, RegistrationDraft>,
}

impl MemoryDraftCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DraftCache for MemoryDraftCache {
    async fn put(&self, draft: RegistrationDraft) {
        self.drafts.insert(draft.subject_id.clone(), draft);
    }

    async fn get(&self, subject_id: &str) -> Option<RegistrationDraft> {
        self.drafts.get(subject_id).map(|entry| entry.value().clone())
    }

    async fn remove(&self, subject_id: &str) {
        self.drafts.remove(subject_id);
    }
}

#[cfg(test)]
mod tests {
    use time::OffsetDateTime;

    use super::*;
    use crate::draft::DraftField;

    fn draft(subject_id: &str) -> RegistrationDraft {
        let mut fields = DraftFields::default();
        fields.set(DraftField::FullName, "Ana");
        RegistrationDraft {
            subject_id: subject_id.into(),
            email: "a@b.com".into(),
            fields,
            last_saved_at: OffsetDateTime::now_utc(),
        }
    }

    #[tokio::test]
    async fn test_memory_cache_roundtrip() {
        let cache = MemoryDraftCache::new();
        cache.put(draft("sub-1")).await;

        let cached = cache.get("sub-1").await.unwrap();
        assert_eq!(cached.fields.full_name.as_deref(), Some("Ana"));
        assert!(cache.get("sub-2").await.is_none());
    }

    #[tokio::test]
    async fn test_memory_cache_put_overwrites() {
        let cache = MemoryDraftCache::new();
        cache.put(draft("sub-1")).await;

        let mut updated = draft("sub-1");
        updated.fields.set(DraftField::FullName, "Ana Marta");
        cache.put(updated).await;

        let cached = cache.get("sub-1").await.unwrap();
        assert_eq!(cached.fields.full_name.as_deref(), Some("Ana Marta"));
    }

    #[tokio::test]
    async fn test_memory_cache_remove() {
        let cache = MemoryDraftCache::new();
        cache.put(draft("sub-1")).await;
        cache.remove("sub-1").await;
        assert!(cache.get("sub-1").await.is_none());
    }
}
