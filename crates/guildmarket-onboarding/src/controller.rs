//! The six-step registration wizard controller.
//!
//! Step 1 creates the identity at the provider (sign-up plus verification
//! code). Steps 2-6 collect profile fields with debounced dual-write
//! autosave (local cache plus remote draft store). The wizard is resumable:
//! a caller holding a subject id whose onboarding is unfinished starts
//! directly at step 2 with fields hydrated from the remote draft, local
//! cache overlaid only into absent values.
//!
//! Persistence is last-writer-wins throughout: autosaves are
//! fire-and-forget and in-flight writes are never cancelled by navigation.

use std::sync::Arc;
use std::time::Duration;

use time::OffsetDateTime;

use guildmarket_auth::classify::{FailureKind, ProviderFailure, classify};
use guildmarket_auth::error::AuthError;
use guildmarket_auth::provider::CredentialExchange;
use guildmarket_core::OnboardingStatus;

use crate::OnboardingResult;
use crate::debounce::Debouncer;
use crate::draft::{DraftField, DraftFields, FinalizePayload, IdentityForm, RegistrationDraft};
use crate::error::OnboardingError;
use crate::storage::{AssetStore, DraftCache, DraftStore};

/// The six ordered wizard steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum WizardStep {
    /// Step 1: identity creation and verification at the provider.
    Identity,
    /// Step 2: name and membership number.
    Profile,
    /// Step 3: chapter and location.
    Chapter,
    /// Step 4: bio and background.
    Story,
    /// Step 5: links and contact details.
    Links,
    /// Step 6: review and submit.
    Review,
}

impl WizardStep {
    /// 1-based step number as shown in the wizard chrome.
    #[must_use]
    pub fn number(self) -> u8 {
        match self {
            Self::Identity => 1,
            Self::Profile => 2,
            Self::Chapter => 3,
            Self::Story => 4,
            Self::Links => 5,
            Self::Review => 6,
        }
    }

    fn next(self) -> Option<Self> {
        match self {
            Self::Identity => Some(Self::Profile),
            Self::Profile => Some(Self::Chapter),
            Self::Chapter => Some(Self::Story),
            Self::Story => Some(Self::Links),
            Self::Links => Some(Self::Review),
            Self::Review => None,
        }
    }
}

/// Autosave configuration.
#[derive(Debug, Clone)]
pub struct AutosaveConfig {
    /// Quiet period before an edit is persisted (default: 1 second).
    pub debounce: Duration,
}

impl AutosaveConfig {
    /// Creates a configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self {
            debounce: Duration::from_secs(1),
        }
    }

    /// Sets the autosave debounce delay.
    #[must_use]
    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }
}

impl Default for AutosaveConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Everything needed to resume an interrupted wizard.
#[derive(Debug, Clone)]
pub struct ResumeContext {
    /// The provider subject id from the current session.
    pub subject_id: String,
    /// The authenticated email.
    pub email: String,
    /// The account's onboarding status from the session.
    pub onboarding_status: OnboardingStatus,
}

/// Drives the registration wizard.
pub struct OnboardingController {
    provider: Arc<dyn CredentialExchange>,
    drafts: Arc<dyn DraftStore>,
    cache: Arc<dyn DraftCache>,
    assets: Arc<dyn AssetStore>,
    debouncer: Debouncer,
    step: WizardStep,
    subject_id: Option<String>,
    email: Option<String>,
    confirmed: bool,
    fields: DraftFields,
}

impl std::fmt::Debug for OnboardingController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnboardingController")
            .field("step", &self.step)
            .field("subject_id", &self.subject_id)
            .field("email", &self.email)
            .field("confirmed", &self.confirmed)
            .finish_non_exhaustive()
    }
}

impl OnboardingController {
    /// Starts a fresh wizard at the identity step.
    #[must_use]
    pub fn begin(
        provider: Arc<dyn CredentialExchange>,
        drafts: Arc<dyn DraftStore>,
        cache: Arc<dyn DraftCache>,
        assets: Arc<dyn AssetStore>,
        config: AutosaveConfig,
    ) -> Self {
        Self {
            provider,
            drafts,
            cache,
            assets,
            debouncer: Debouncer::new(config.debounce),
            step: WizardStep::Identity,
            subject_id: None,
            email: None,
            confirmed: false,
            fields: DraftFields::default(),
        }
    }

    /// Resumes an interrupted wizard at the profile step.
    ///
    /// The identity step is never re-run. Fields are hydrated from the
    /// remote draft store, with locally cached values overlaid only where
    /// the remote value is absent; a remote load failure is logged and
    /// swallowed, leaving blank fields.
    ///
    /// # Errors
    ///
    /// Returns [`OnboardingError::AlreadyFinished`] when the account's
    /// onboarding status is already finished.
    pub async fn resume(
        provider: Arc<dyn CredentialExchange>,
        drafts: Arc<dyn DraftStore>,
        cache: Arc<dyn DraftCache>,
        assets: Arc<dyn AssetStore>,
        config: AutosaveConfig,
        context: ResumeContext,
    ) -> OnboardingResult<Self> {
        if context.onboarding_status.is_finished() {
            return Err(OnboardingError::AlreadyFinished);
        }

        let remote = match drafts.get_draft(&context.subject_id).await {
            Ok(fields) => fields.unwrap_or_default(),
            Err(err) => {
                tracing::warn!(
                    subject_id = %context.subject_id,
                    "draft load failed, resuming with blank fields: {err}"
                );
                DraftFields::default()
            }
        };

        let local = cache
            .get(&context.subject_id)
            .await
            .map(|draft| draft.fields)
            .unwrap_or_default();
        let fields = DraftFields::overlay(remote, &local);

        tracing::debug!(subject_id = %context.subject_id, "resuming wizard at profile step");
        Ok(Self {
            provider,
            drafts,
            cache,
            assets,
            debouncer: Debouncer::new(config.debounce),
            step: WizardStep::Profile,
            subject_id: Some(context.subject_id),
            email: Some(context.email),
            confirmed: true,
            fields,
        })
    }

    /// The current step.
    #[must_use]
    pub fn step(&self) -> WizardStep {
        self.step
    }

    /// The subject id, once the identity step has completed.
    #[must_use]
    pub fn subject_id(&self) -> Option<&str> {
        self.subject_id.as_deref()
    }

    /// The current field values.
    #[must_use]
    pub fn fields(&self) -> &DraftFields {
        &self.fields
    }

    /// Submits the identity form to the provider.
    ///
    /// The form is consumed and dropped here; none of its values ever
    /// reach a draft or the cache.
    ///
    /// # Errors
    ///
    /// Returns a field-specific [`OnboardingError::Validation`] for local
    /// form problems, or [`OnboardingError::IdentityStep`] for provider
    /// rejections.
    pub async fn submit_identity(&mut self, form: IdentityForm) -> OnboardingResult<()> {
        if self.step != WizardStep::Identity {
            return Err(OnboardingError::invalid_step(
                "identity was already created for this wizard",
            ));
        }
        if form.email.trim().is_empty() {
            return Err(OnboardingError::validation("email", "must not be empty"));
        }
        if form.password.is_empty() {
            return Err(OnboardingError::validation("password", "must not be empty"));
        }
        if form.password != form.confirm_password {
            return Err(OnboardingError::validation(
                "confirm_password",
                "passwords do not match",
            ));
        }

        let subject_id = self
            .provider
            .sign_up(&form.email, &form.password)
            .await
            .map_err(identity_error)?;

        tracing::info!(subject_id = %subject_id, "identity created, awaiting verification code");
        self.subject_id = Some(subject_id);
        self.email = Some(form.email);
        Ok(())
    }

    /// Confirms the identity with the emailed verification code and moves
    /// the wizard to the profile step, creating the draft.
    ///
    /// # Errors
    ///
    /// Returns [`OnboardingError::InvalidStep`] when no identity submission
    /// is pending, or [`OnboardingError::IdentityStep`] for a rejected code.
    pub async fn confirm_identity(&mut self, code: &str) -> OnboardingResult<()> {
        if self.step != WizardStep::Identity || self.subject_id.is_none() {
            return Err(OnboardingError::invalid_step(
                "no identity submission awaiting confirmation",
            ));
        }
        if code.trim().is_empty() {
            return Err(OnboardingError::validation(
                "verification_code",
                "must not be empty",
            ));
        }

        let email = self.email.clone().unwrap_or_default();
        self.provider
            .confirm_sign_up(&email, code)
            .await
            .map_err(identity_error)?;

        self.confirmed = true;
        self.step = WizardStep::Profile;
        // The draft exists from identity-verification time onward.
        self.spawn_autosave();
        tracing::info!(subject_id = ?self.subject_id, "identity verified, wizard at profile step");
        Ok(())
    }

    /// Edits a profile field and schedules a debounced autosave.
    ///
    /// A superseding edit cancels the previously scheduled save.
    ///
    /// # Errors
    ///
    /// Returns [`OnboardingError::InvalidStep`] before the identity step
    /// has completed.
    pub fn edit(&mut self, field: DraftField, value: impl Into<String>) -> OnboardingResult<()> {
        if self.subject_id.is_none() || !self.confirmed {
            return Err(OnboardingError::invalid_step(
                "profile fields are editable only after identity verification",
            ));
        }
        self.fields.set(field, value);
        self.spawn_autosave();
        Ok(())
    }

    /// Uploads a profile image immediately and records its URL.
    ///
    /// The upload is decoupled from autosave: the binary goes to the asset
    /// store once, and every subsequent autosave references the returned
    /// URL.
    ///
    /// # Errors
    ///
    /// Returns [`OnboardingError::AssetUpload`] when the upload fails;
    /// the draft keeps any previously uploaded URL.
    pub async fn attach_avatar(
        &mut self,
        bytes: Vec<u8>,
        filename: &str,
    ) -> OnboardingResult<String> {
        if self.subject_id.is_none() || !self.confirmed {
            return Err(OnboardingError::invalid_step(
                "an avatar can be attached only after identity verification",
            ));
        }

        let url = self.assets.upload_image(bytes, filename).await?;
        self.fields.avatar_url = Some(url.clone());
        self.spawn_autosave();
        Ok(url)
    }

    /// Advances to the next step after validating the current one.
    ///
    /// # Errors
    ///
    /// Returns a field-specific [`OnboardingError::Validation`] when the
    /// current step is incomplete; the step is left unchanged.
    pub fn advance(&mut self) -> OnboardingResult<WizardStep> {
        match self.step {
            WizardStep::Identity => {
                return Err(OnboardingError::invalid_step(
                    "confirm the account before advancing",
                ));
            }
            WizardStep::Profile => {
                self.require_filled(DraftField::FullName, "full_name")?;
                self.require_filled(DraftField::MembershipNumber, "membership_number")?;
            }
            WizardStep::Review => {
                return Err(OnboardingError::invalid_step(
                    "the wizard is complete; submit with finalize",
                ));
            }
            _ => {}
        }

        self.step = self.step.next().ok_or_else(|| {
            OnboardingError::invalid_step("the wizard is complete; submit with finalize")
        })?;
        Ok(self.step)
    }

    /// Submits the consolidated registration and purges the local cache.
    ///
    /// The backend flips the onboarding status to finished; this engine
    /// never does.
    ///
    /// # Errors
    ///
    /// Returns [`OnboardingError::InvalidStep`] before the review step, or
    /// the draft store's failure when the submission is rejected.
    pub async fn finalize(&mut self) -> OnboardingResult<()> {
        if self.step != WizardStep::Review {
            return Err(OnboardingError::invalid_step(
                "finalize is only available on the review step",
            ));
        }
        let Some(subject_id) = self.subject_id.clone() else {
            return Err(OnboardingError::internal("review step without a subject id"));
        };

        // The consolidated payload supersedes any pending autosave.
        self.debouncer.cancel();

        let payload = FinalizePayload {
            subject_id: subject_id.clone(),
            email: self.email.clone().unwrap_or_default(),
            fields: self.fields.non_empty(),
        };
        self.drafts.finalize(&payload).await?;

        self.cache.remove(&subject_id).await;
        tracing::info!(subject_id = %subject_id, "registration finalized, local cache purged");
        Ok(())
    }

    fn require_filled(&self, field: DraftField, label: &str) -> OnboardingResult<()> {
        match self.fields.get(field) {
            Some(value) if !value.trim().is_empty() => Ok(()),
            _ => Err(OnboardingError::validation(label, "must not be empty")),
        }
    }

    /// Schedules the debounced dual-write autosave for the current fields.
    ///
    /// Fire-and-forget: the scheduled task is never awaited, and an
    /// in-flight save is not cancelled by navigation or drop.
    fn spawn_autosave(&self) {
        let Some(subject_id) = self.subject_id.clone() else {
            return;
        };
        let draft = RegistrationDraft {
            subject_id,
            email: self.email.clone().unwrap_or_default(),
            fields: self.fields.clone(),
            last_saved_at: OffsetDateTime::now_utc(),
        };
        let cache = Arc::clone(&self.cache);
        let drafts = Arc::clone(&self.drafts);

        self.debouncer.call(async move {
            autosave_tick(cache, drafts, draft).await;
        });
    }
}

/// One autosave tick: two independent writes, each failure logged and
/// swallowed. The local cache is the short-term durability story, so a
/// remote save failure never interrupts the user.
async fn autosave_tick(
    cache: Arc<dyn DraftCache>,
    drafts: Arc<dyn DraftStore>,
    draft: RegistrationDraft,
) {
    cache.put(draft.clone()).await;

    let payload = draft.fields.non_empty();
    if let Err(err) = drafts.upsert_draft(&draft.subject_id, &payload).await {
        tracing::warn!(
            subject_id = %draft.subject_id,
            "draft autosave failed, local cache remains the fallback: {err}"
        );
    }
}

/// Maps a provider failure in the identity step onto the wizard taxonomy,
/// keeping the classified kinds callers must surface distinctly.
fn identity_error(failure: ProviderFailure) -> OnboardingError {
    let source = match classify(&failure) {
        FailureKind::PasswordChangeRequired => AuthError::PasswordChangeRequired,
        FailureKind::UserNotConfirmed => AuthError::UserNotConfirmed,
        FailureKind::InvalidCredentials | FailureKind::Unknown => {
            AuthError::provider(failure.summary())
        }
    };
    OnboardingError::IdentityStep { source }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use guildmarket_auth::provider::{CredentialGrant, TokenTriple};

    use super::*;
    use crate::storage::MemoryDraftCache;

    /// Provider mock covering the wizard's sign-up and confirmation calls.
    struct MockProvider {
        sign_up_result: Mutex<Option<Result<String, ProviderFailure>>>,
        confirm_result: Mutex<Option<Result<(), ProviderFailure>>>,
    }

    impl MockProvider {
        fn happy() -> Self {
            Self {
                sign_up_result: Mutex::new(Some(Ok("sub-1".into()))),
                confirm_result: Mutex::new(Some(Ok(()))),
            }
        }
    }

    #[async_trait]
    impl CredentialExchange for MockProvider {
        async fn sign_in(
            &self,
            _email: &str,
            _password: &str,
        ) -> Result<CredentialGrant, ProviderFailure> {
            unimplemented!("not used by wizard tests")
        }

        async fn refresh(
            &self,
            _refresh_token: &str,
            _email: &str,
        ) -> Result<TokenTriple, ProviderFailure> {
            unimplemented!("not used by wizard tests")
        }

        async fn sign_up(&self, _email: &str, _password: &str) -> Result<String, ProviderFailure> {
            self.sign_up_result
                .lock()
                .unwrap()
                .take()
                .expect("unexpected sign_up call")
        }

        async fn confirm_sign_up(&self, _email: &str, _code: &str) -> Result<(), ProviderFailure> {
            self.confirm_result
                .lock()
                .unwrap()
                .take()
                .expect("unexpected confirm_sign_up call")
        }
    }

    /// Draft store mock recording every write.
    #[derive(Default)]
    struct RecordingDraftStore {
        get_result: Mutex<Option<OnboardingResult<Option<DraftFields>>>>,
        upserts: Mutex<Vec<(String, DraftFields)>>,
        finalized: Mutex<Vec<FinalizePayload>>,
        fail_upserts: bool,
    }

    impl RecordingDraftStore {
        fn with_remote(fields: Option<DraftFields>) -> Self {
            Self {
                get_result: Mutex::new(Some(Ok(fields))),
                ..Self::default()
            }
        }

        fn with_load_failure() -> Self {
            Self {
                get_result: Mutex::new(Some(Err(OnboardingError::draft_load("boom")))),
                ..Self::default()
            }
        }

        fn upsert_count(&self) -> usize {
            self.upserts.lock().unwrap().len()
        }

        fn last_upsert(&self) -> (String, DraftFields) {
            self.upserts.lock().unwrap().last().cloned().expect("no upsert recorded")
        }
    }

    #[async_trait]
    impl DraftStore for RecordingDraftStore {
        async fn get_draft(&self, _subject_id: &str) -> OnboardingResult<Option<DraftFields>> {
            self.get_result
                .lock()
                .unwrap()
                .take()
                .unwrap_or(Ok(None))
        }

        async fn upsert_draft(
            &self,
            subject_id: &str,
            fields: &DraftFields,
        ) -> OnboardingResult<()> {
            self.upserts
                .lock()
                .unwrap()
                .push((subject_id.to_string(), fields.clone()));
            if self.fail_upserts {
                return Err(OnboardingError::draft_save("store offline"));
            }
            Ok(())
        }

        async fn finalize(&self, payload: &FinalizePayload) -> OnboardingResult<()> {
            self.finalized.lock().unwrap().push(payload.clone());
            Ok(())
        }
    }

    struct MockAssetStore;

    #[async_trait]
    impl AssetStore for MockAssetStore {
        async fn upload_image(
            &self,
            _bytes: Vec<u8>,
            filename: &str,
        ) -> OnboardingResult<String> {
            Ok(format!("https://cdn.example.com/{filename}"))
        }
    }

    struct Harness {
        provider: Arc<MockProvider>,
        drafts: Arc<RecordingDraftStore>,
        cache: Arc<MemoryDraftCache>,
    }

    impl Harness {
        fn new(drafts: RecordingDraftStore) -> Self {
            Self {
                provider: Arc::new(MockProvider::happy()),
                drafts: Arc::new(drafts),
                cache: Arc::new(MemoryDraftCache::new()),
            }
        }

        fn begin(&self) -> OnboardingController {
            OnboardingController::begin(
                self.provider.clone(),
                self.drafts.clone(),
                self.cache.clone(),
                Arc::new(MockAssetStore),
                AutosaveConfig::default(),
            )
        }

        async fn resume(&self, status: OnboardingStatus) -> OnboardingResult<OnboardingController> {
            OnboardingController::resume(
                self.provider.clone(),
                self.drafts.clone(),
                self.cache.clone(),
                Arc::new(MockAssetStore),
                AutosaveConfig::default(),
                ResumeContext {
                    subject_id: "sub-1".into(),
                    email: "a@b.com".into(),
                    onboarding_status: status,
                },
            )
            .await
        }
    }

    fn identity_form() -> IdentityForm {
        IdentityForm {
            email: "a@b.com".into(),
            password: "hunter22".into(),
            confirm_password: "hunter22".into(),
        }
    }

    async fn let_autosave_fire() {
        tokio::time::sleep(Duration::from_millis(1100)).await;
        for _ in 0..4 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_identity_flow_reaches_profile_step() {
        let h = Harness::new(RecordingDraftStore::default());
        let mut wizard = h.begin();
        assert_eq!(wizard.step(), WizardStep::Identity);

        wizard.submit_identity(identity_form()).await.unwrap();
        assert_eq!(wizard.subject_id(), Some("sub-1"));
        assert_eq!(wizard.step(), WizardStep::Identity);

        wizard.confirm_identity("123456").await.unwrap();
        assert_eq!(wizard.step(), WizardStep::Profile);

        // The draft exists from identity-verification time onward.
        let_autosave_fire().await;
        assert!(h.cache.get("sub-1").await.is_some());
    }

    #[tokio::test]
    async fn test_identity_form_validation() {
        let h = Harness::new(RecordingDraftStore::default());
        let mut wizard = h.begin();

        let mut form = identity_form();
        form.confirm_password = "different".into();
        let err = wizard.submit_identity(form).await.unwrap_err();
        assert!(matches!(
            err,
            OnboardingError::Validation { ref field, .. } if field == "confirm_password"
        ));

        let mut form = identity_form();
        form.email = "  ".into();
        let err = wizard.submit_identity(form).await.unwrap_err();
        assert!(matches!(
            err,
            OnboardingError::Validation { ref field, .. } if field == "email"
        ));
    }

    #[tokio::test]
    async fn test_resume_refuses_finished_accounts() {
        let h = Harness::new(RecordingDraftStore::default());
        let err = h.resume(OnboardingStatus::Finished).await.unwrap_err();
        assert!(matches!(err, OnboardingError::AlreadyFinished));
    }

    #[tokio::test]
    async fn test_resume_starts_at_profile_with_remote_over_local() {
        let mut remote = DraftFields::default();
        remote.set(DraftField::FullName, "Remote Name");
        let h = Harness::new(RecordingDraftStore::with_remote(Some(remote)));

        let mut local = DraftFields::default();
        local.set(DraftField::FullName, "Local Name");
        local.set(DraftField::Bio, "local bio");
        h.cache
            .put(RegistrationDraft {
                subject_id: "sub-1".into(),
                email: "a@b.com".into(),
                fields: local,
                last_saved_at: OffsetDateTime::now_utc(),
            })
            .await;

        let wizard = h.resume(OnboardingStatus::OnboardingInProgress).await.unwrap();
        assert!(wizard.step() >= WizardStep::Profile);
        assert_eq!(wizard.fields().full_name.as_deref(), Some("Remote Name"));
        assert_eq!(wizard.fields().bio.as_deref(), Some("local bio"));
    }

    #[tokio::test]
    async fn test_resume_survives_draft_load_failure() {
        let h = Harness::new(RecordingDraftStore::with_load_failure());
        let wizard = h.resume(OnboardingStatus::PreRegistration).await.unwrap();
        assert_eq!(wizard.step(), WizardStep::Profile);
        assert_eq!(wizard.fields(), &DraftFields::default());
    }

    #[tokio::test(start_paused = true)]
    async fn test_rapid_edits_coalesce_into_one_autosave() {
        let h = Harness::new(RecordingDraftStore::default());
        let mut wizard = h.resume(OnboardingStatus::OnboardingInProgress).await.unwrap();

        wizard.edit(DraftField::FullName, "A").unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;
        wizard.edit(DraftField::FullName, "Ana").unwrap();
        let_autosave_fire().await;

        assert_eq!(h.drafts.upsert_count(), 1);
        let (subject_id, payload) = h.drafts.last_upsert();
        assert_eq!(subject_id, "sub-1");
        assert_eq!(payload.full_name.as_deref(), Some("Ana"));

        let cached = h.cache.get("sub-1").await.unwrap();
        assert_eq!(cached.fields.full_name.as_deref(), Some("Ana"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_autosave_payload_skips_empty_fields() {
        let h = Harness::new(RecordingDraftStore::default());
        let mut wizard = h.resume(OnboardingStatus::OnboardingInProgress).await.unwrap();

        wizard.edit(DraftField::FullName, "Ana").unwrap();
        wizard.edit(DraftField::Bio, "   ").unwrap();
        let_autosave_fire().await;

        let (_, payload) = h.drafts.last_upsert();
        assert_eq!(payload.full_name.as_deref(), Some("Ana"));
        assert_eq!(payload.bio, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_remote_save_failure_is_swallowed_and_cache_still_written() {
        let drafts = RecordingDraftStore {
            fail_upserts: true,
            ..RecordingDraftStore::default()
        };
        let h = Harness::new(drafts);
        let mut wizard = h.resume(OnboardingStatus::OnboardingInProgress).await.unwrap();

        wizard.edit(DraftField::FullName, "Ana").unwrap();
        let_autosave_fire().await;

        // The failed remote write was attempted, and the cache is intact.
        assert_eq!(h.drafts.upsert_count(), 1);
        assert!(h.cache.get("sub-1").await.is_some());
    }

    #[tokio::test]
    async fn test_profile_step_validation_blocks_advance() {
        let h = Harness::new(RecordingDraftStore::default());
        let mut wizard = h.resume(OnboardingStatus::OnboardingInProgress).await.unwrap();

        let err = wizard.advance().unwrap_err();
        assert!(matches!(
            err,
            OnboardingError::Validation { ref field, .. } if field == "full_name"
        ));
        assert_eq!(wizard.step(), WizardStep::Profile);

        wizard.edit(DraftField::FullName, "Ana").unwrap();
        let err = wizard.advance().unwrap_err();
        assert!(matches!(
            err,
            OnboardingError::Validation { ref field, .. } if field == "membership_number"
        ));
        assert_eq!(wizard.step(), WizardStep::Profile);

        wizard.edit(DraftField::MembershipNumber, "GM-1042").unwrap();
        assert_eq!(wizard.advance().unwrap(), WizardStep::Chapter);
    }

    #[tokio::test]
    async fn test_edit_rejected_before_identity_verification() {
        let h = Harness::new(RecordingDraftStore::default());
        let mut wizard = h.begin();
        let err = wizard.edit(DraftField::FullName, "Ana").unwrap_err();
        assert!(matches!(err, OnboardingError::InvalidStep { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_attach_avatar_uploads_once_and_autosaves_url() {
        let h = Harness::new(RecordingDraftStore::default());
        let mut wizard = h.resume(OnboardingStatus::OnboardingInProgress).await.unwrap();

        let url = wizard.attach_avatar(vec![1, 2, 3], "me.png").await.unwrap();
        assert_eq!(url, "https://cdn.example.com/me.png");
        let_autosave_fire().await;

        let (_, payload) = h.drafts.last_upsert();
        assert_eq!(payload.avatar_url.as_deref(), Some("https://cdn.example.com/me.png"));
    }

    #[tokio::test]
    async fn test_finalize_submits_payload_and_purges_cache() {
        let h = Harness::new(RecordingDraftStore::default());
        let mut wizard = h.resume(OnboardingStatus::OnboardingInProgress).await.unwrap();

        wizard.edit(DraftField::FullName, "Ana").unwrap();
        wizard.edit(DraftField::MembershipNumber, "GM-1042").unwrap();
        wizard.fields.avatar_url = Some("https://cdn.example.com/me.png".into());

        for _ in 0..4 {
            wizard.advance().unwrap();
        }
        assert_eq!(wizard.step(), WizardStep::Review);
        let err = wizard.advance().unwrap_err();
        assert!(matches!(err, OnboardingError::InvalidStep { .. }));

        wizard.finalize().await.unwrap();

        let finalized = h.drafts.finalized.lock().unwrap();
        assert_eq!(finalized.len(), 1);
        assert_eq!(finalized[0].subject_id, "sub-1");
        assert_eq!(finalized[0].fields.full_name.as_deref(), Some("Ana"));
        assert_eq!(
            finalized[0].fields.avatar_url.as_deref(),
            Some("https://cdn.example.com/me.png")
        );
        drop(finalized);

        assert!(h.cache.get("sub-1").await.is_none());
    }

    #[tokio::test]
    async fn test_finalize_rejected_before_review() {
        let h = Harness::new(RecordingDraftStore::default());
        let mut wizard = h.resume(OnboardingStatus::OnboardingInProgress).await.unwrap();
        let err = wizard.finalize().await.unwrap_err();
        assert!(matches!(err, OnboardingError::InvalidStep { .. }));
    }
}
