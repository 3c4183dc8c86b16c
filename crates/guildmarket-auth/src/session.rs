//! The session manager: authentication and proactive token refresh.
//!
//! [`SessionManager`] is constructed once with injected collaborator
//! clients and holds no session state of its own: every operation takes the
//! current [`TokenRecord`] as an explicit argument and returns the next
//! one. The refresh state machine runs on every session read.
//!
//! # Refresh semantics
//!
//! - A token with at least the configured threshold left before expiry is
//!   served untouched.
//! - Closer to expiry, one refresh attempt is made per read. Success swaps
//!   the whole bearer-token triple atomically and then re-fetches the
//!   role-bearing profile fields best-effort.
//! - A failed refresh invalidates the session outright (fail closed): an
//!   unrefreshable token is never served again.
//! - A near-expiry token without a refresh token is served as-is; the
//!   backend's own verification rejects it when actually redeemed.

use std::sync::Arc;

use guildmarket_core::now_millis;

use crate::AuthResult;
use crate::classify::classify;
use crate::config::SessionConfig;
use crate::error::AuthError;
use crate::provider::{CredentialExchange, UserDirectory};
use crate::token::{TokenRecord, decode_expiry_seconds};
use crate::view::Session;

/// Freshness of a token record at evaluation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenState {
    /// Expiry is comfortably far away; no action.
    Fresh,
    /// Inside the refresh threshold but not yet expired.
    NearExpiry,
    /// Past expiry, or the id token does not decode.
    Expired,
    /// A refresh attempt failed; the record must be discarded.
    Invalidated,
}

/// Outcome of a session read.
#[derive(Debug)]
pub enum SessionRead {
    /// A live session: the (possibly refreshed) record plus its projection.
    Active {
        /// The record the caller must keep for the next read.
        record: TokenRecord,
        /// The projected session for UI-facing code.
        session: Session,
    },
    /// The session could not be kept alive; the caller must re-authenticate.
    Invalidated,
}

impl SessionRead {
    /// Returns the active record, if any.
    #[must_use]
    pub fn into_record(self) -> Option<TokenRecord> {
        match self {
            Self::Active { record, .. } => Some(record),
            Self::Invalidated => None,
        }
    }
}

/// Authenticates users and keeps their bearer-token sessions fresh.
pub struct SessionManager {
    /// Identity provider client.
    provider: Arc<dyn CredentialExchange>,

    /// Backend user store client.
    directory: Arc<dyn UserDirectory>,

    /// Engine configuration.
    config: SessionConfig,
}

impl SessionManager {
    /// Creates a session manager with injected collaborators.
    #[must_use]
    pub fn new(
        provider: Arc<dyn CredentialExchange>,
        directory: Arc<dyn UserDirectory>,
        config: SessionConfig,
    ) -> Self {
        Self {
            provider,
            directory,
            config,
        }
    }

    /// Authenticates an email/password pair and builds the initial record.
    ///
    /// Empty fields are rejected without a provider call. Provider
    /// rejections are classified: password-change and not-confirmed cases
    /// keep their kind; everything else surfaces as the generic
    /// [`AuthError::InvalidCredentials`].
    ///
    /// On provider success the backend user row is upserted; if that call
    /// fails the row is fetched read-only; if that also fails a minimal
    /// record is synthesized so authentication never strands the user.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::PasswordChangeRequired`],
    /// [`AuthError::UserNotConfirmed`], or [`AuthError::InvalidCredentials`].
    pub async fn authenticate(&self, email: &str, password: &str) -> AuthResult<TokenRecord> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(AuthError::InvalidCredentials);
        }

        let grant = match self.provider.sign_in(email, password).await {
            Ok(grant) => grant,
            Err(failure) => {
                let kind = classify(&failure);
                tracing::debug!(?kind, "sign-in rejected: {}", failure.summary());
                return Err(AuthError::from_sign_in_failure(kind));
            }
        };

        let record = match self
            .directory
            .upsert_on_login(&grant.id_token, &grant.subject_id, &grant.email)
            .await
        {
            Ok(profile) => TokenRecord::from_grant(&grant, &profile),
            Err(err) => {
                tracing::debug!("login upsert failed, falling back to fetch: {err}");
                match self.directory.get_me(&grant.id_token).await {
                    Ok(profile) => TokenRecord::from_grant(&grant, &profile),
                    Err(err) => {
                        tracing::warn!(
                            subject_id = %grant.subject_id,
                            "user store unavailable, synthesizing minimal session: {err}"
                        );
                        TokenRecord::minimal(&grant, self.config.default_role)
                    }
                }
            }
        };

        tracing::info!(subject_id = %record.subject_id, "authenticated");
        Ok(record)
    }

    /// Evaluates the freshness of a record's id token right now.
    #[must_use]
    pub fn token_state(&self, record: &TokenRecord) -> TokenState {
        expiry_state(
            &record.id_token,
            now_millis(),
            self.config.refresh_threshold_millis(),
        )
    }

    /// Reads a session, refreshing the token triple when needed.
    ///
    /// Exactly one refresh attempt is evaluated per call. Callers must
    /// replace their stored record with the one returned in
    /// [`SessionRead::Active`], and must treat
    /// [`SessionRead::Invalidated`] as a forced logout.
    pub async fn read_session(&self, mut record: TokenRecord) -> SessionRead {
        let state = self.token_state(&record);
        if state == TokenState::Fresh {
            let session = Session::project(&record);
            return SessionRead::Active { record, session };
        }

        let Some(refresh_token) = record.refresh_token.clone() else {
            // Nothing to refresh with. The stale token is served as-is and
            // rejected by the backend's own verification when redeemed.
            tracing::debug!(
                subject_id = %record.subject_id,
                "token near expiry with no refresh token, serving stale"
            );
            let session = Session::project(&record);
            return SessionRead::Active { record, session };
        };

        match self.provider.refresh(&refresh_token, &record.email).await {
            Ok(triple) => {
                record.apply_triple(triple);
                self.refetch_profile(&mut record).await;
                let session = Session::project(&record);
                SessionRead::Active { record, session }
            }
            Err(failure) => {
                tracing::warn!(
                    subject_id = %record.subject_id,
                    "token refresh failed, invalidating session: {}",
                    failure.summary()
                );
                SessionRead::Invalidated
            }
        }
    }

    /// Best-effort re-fetch of the role-bearing profile fields after a
    /// successful refresh. Failure never reverts the token swap.
    async fn refetch_profile(&self, record: &mut TokenRecord) {
        match self.directory.get_me(&record.id_token).await {
            Ok(profile) => record.absorb_profile(&profile),
            Err(err) => {
                tracing::debug!(
                    subject_id = %record.subject_id,
                    "profile re-fetch after refresh failed, keeping refreshed tokens: {err}"
                );
            }
        }
    }
}

/// Classifies an id token's expiry relative to `now_ms`.
///
/// An undecodable token counts as expired.
#[must_use]
pub fn expiry_state(id_token: &str, now_ms: i64, threshold_ms: i64) -> TokenState {
    let Some(exp) = decode_expiry_seconds(id_token) else {
        return TokenState::Expired;
    };
    let remaining = exp * 1000 - now_ms;
    if remaining >= threshold_ms {
        TokenState::Fresh
    } else if remaining > 0 {
        TokenState::NearExpiry
    } else {
        TokenState::Expired
    }
}
