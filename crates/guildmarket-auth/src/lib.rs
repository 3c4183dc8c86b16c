//! # guildmarket-auth
//!
//! Identity session engine for the guildmarket platform.
//!
//! This crate provides:
//! - Credential authentication against the external identity provider
//! - A closed classifier for provider failure modes
//! - Proactive, fail-closed token refresh evaluated on every session read
//! - Pure projection of the token record onto the UI-facing session shape
//!
//! ## Overview
//!
//! [`SessionManager`] is built once with injected collaborator clients
//! ([`CredentialExchange`] for the identity provider, [`UserDirectory`] for
//! the backend user store). It holds no session state: callers own the
//! current [`TokenRecord`] and pass it through
//! [`SessionManager::read_session`], which refreshes the bearer-token
//! triple when it nears expiry and invalidates the session when a refresh
//! fails.
//!
//! ## Modules
//!
//! - [`classify`] - Provider failure classification
//! - [`config`] - Session engine configuration
//! - [`error`] - Error taxonomy
//! - [`http`] - Reqwest-backed collaborator clients
//! - [`provider`] - Collaborator traits and grant types
//! - [`session`] - The session manager and refresh state machine
//! - [`token`] - Token record and expiry decoding
//! - [`view`] - Session projection

pub mod classify;
pub mod config;
pub mod error;
pub mod http;
pub mod provider;
pub mod session;
pub mod token;
pub mod view;

pub use classify::{FailureKind, ProviderFailure, classify};
pub use config::SessionConfig;
pub use error::AuthError;
pub use http::{HttpCredentialExchange, HttpUserDirectory};
pub use provider::{CredentialExchange, CredentialGrant, TokenTriple, UserDirectory};
pub use session::{SessionManager, SessionRead, TokenState, expiry_state};
pub use token::{TokenRecord, decode_expiry_seconds};
pub use view::Session;

/// Type alias for authentication/session results.
pub type AuthResult<T> = Result<T, AuthError>;
