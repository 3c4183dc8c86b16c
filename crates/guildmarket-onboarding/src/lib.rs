//! # guildmarket-onboarding
//!
//! Resumable registration wizard and draft persistence for the
//! guildmarket platform.
//!
//! This crate provides:
//! - The six-step onboarding wizard state machine
//! - Debounced dual-write autosave (local cache plus remote draft store)
//! - Resume-with-hydration for interrupted registrations
//! - A framework-independent debounce utility
//!
//! ## Overview
//!
//! [`OnboardingController`] drives the wizard. Step 1 creates the identity
//! at the provider (via the `guildmarket-auth` [`CredentialExchange`]
//! collaborator); steps 2-6 collect optional profile fields, autosaving
//! each edit after a quiet period. Drafts never contain secrets: the
//! identity form is a separate type that is never persisted.
//!
//! ## Modules
//!
//! - [`controller`] - The wizard state machine
//! - [`debounce`] - Debounce with cancel-on-supersede
//! - [`draft`] - Draft model and field catalogue
//! - [`error`] - Error taxonomy
//! - [`http`] - Reqwest-backed draft and asset store clients
//! - [`storage`] - Storage traits and the in-memory cache
//!
//! [`CredentialExchange`]: guildmarket_auth::CredentialExchange

pub mod controller;
pub mod debounce;
pub mod draft;
pub mod error;
pub mod http;
pub mod storage;

pub use controller::{AutosaveConfig, OnboardingController, ResumeContext, WizardStep};
pub use debounce::Debouncer;
pub use draft::{DraftField, DraftFields, FinalizePayload, IdentityForm, RegistrationDraft};
pub use error::OnboardingError;
pub use http::{HttpAssetStore, HttpDraftStore};
pub use storage::{AssetStore, DraftCache, DraftStore, MemoryDraftCache};

/// Type alias for onboarding results.
pub type OnboardingResult<T> = Result<T, OnboardingError>;
