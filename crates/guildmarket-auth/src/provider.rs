//! Collaborator traits for the identity provider and backend user store.
//!
//! The session engine never talks to the network directly; it is handed
//! implementations of these traits at construction time. Production code
//! uses the reqwest-backed clients in [`crate::http`]; tests use in-memory
//! mocks.

use async_trait::async_trait;
use serde::Deserialize;

use guildmarket_core::UserProfile;

use crate::AuthResult;
use crate::classify::ProviderFailure;

/// The bearer-token triple issued together by the identity provider.
///
/// The three tokens are only ever applied to a session as one unit; see
/// [`TokenRecord::apply_triple`](crate::token::TokenRecord::apply_triple).
#[derive(Debug, Clone, Deserialize)]
pub struct TokenTriple {
    /// OAuth access token.
    #[serde(alias = "accessToken")]
    pub access_token: String,

    /// OIDC id token carrying the identity claims and `exp`.
    #[serde(alias = "idToken")]
    pub id_token: String,

    /// Long-lived refresh token.
    #[serde(alias = "refreshToken")]
    pub refresh_token: String,
}

/// Result of a successful sign-in at the identity provider.
///
/// Produced only by the provider, never constructed locally.
#[derive(Debug, Clone, Deserialize)]
pub struct CredentialGrant {
    /// OAuth access token.
    #[serde(alias = "accessToken")]
    pub access_token: String,

    /// OIDC id token.
    #[serde(alias = "idToken")]
    pub id_token: String,

    /// Long-lived refresh token.
    #[serde(alias = "refreshToken")]
    pub refresh_token: String,

    /// The provider's subject id for the account.
    #[serde(alias = "subjectId", alias = "sub")]
    pub subject_id: String,

    /// The email the account signed in with.
    pub email: String,
}

/// Identity provider operations.
///
/// Covers sign-in and refresh for established accounts, plus the sign-up
/// and confirmation calls the onboarding wizard drives in its identity
/// step.
///
/// # Example Implementation
///
/// ```ignore
/// struct StubProvider;
///
/// #[async_trait::async_trait]
/// impl CredentialExchange for StubProvider {
///     async fn sign_in(&self, email: &str, password: &str)
///         -> Result<CredentialGrant, ProviderFailure> { ... }
///     // ... other methods
/// }
/// ```
#[async_trait]
pub trait CredentialExchange: Send + Sync {
    /// Authenticates an email/password pair.
    ///
    /// # Errors
    ///
    /// Returns the raw [`ProviderFailure`] on rejection; callers classify
    /// it with [`classify`](crate::classify::classify) rather than
    /// inspecting it directly.
    async fn sign_in(&self, email: &str, password: &str)
    -> Result<CredentialGrant, ProviderFailure>;

    /// Exchanges a refresh token for a new token triple.
    ///
    /// # Errors
    ///
    /// Returns the raw provider failure when the refresh token is expired,
    /// revoked, or the provider is unreachable.
    async fn refresh(
        &self,
        refresh_token: &str,
        email: &str,
    ) -> Result<TokenTriple, ProviderFailure>;

    /// Registers a new identity and returns the provider's subject id.
    ///
    /// # Errors
    ///
    /// Returns the raw provider failure (e.g. email already taken).
    async fn sign_up(&self, email: &str, password: &str) -> Result<String, ProviderFailure>;

    /// Confirms a registration with the emailed verification code.
    ///
    /// # Errors
    ///
    /// Returns the raw provider failure when the code is wrong or expired.
    async fn confirm_sign_up(&self, email: &str, code: &str) -> Result<(), ProviderFailure>;
}

/// Backend user store operations.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Creates or updates the application user for a fresh login.
    ///
    /// # Arguments
    ///
    /// * `bearer` - The id token from the provider grant
    /// * `subject_id` - The provider's subject id
    /// * `email` - The sign-in email
    ///
    /// # Errors
    ///
    /// Returns an error for any non-2xx backend response.
    async fn upsert_on_login(
        &self,
        bearer: &str,
        subject_id: &str,
        email: &str,
    ) -> AuthResult<UserProfile>;

    /// Fetches the user record belonging to the bearer token.
    ///
    /// # Errors
    ///
    /// Returns an error for any non-2xx backend response.
    async fn get_me(&self, bearer: &str) -> AuthResult<UserProfile>;
}
