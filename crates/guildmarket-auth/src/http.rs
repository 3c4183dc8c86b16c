//! Reqwest-backed collaborator clients.
//!
//! [`HttpCredentialExchange`] talks to the identity provider gateway and
//! [`HttpUserDirectory`] to the backend user store. Both accept a
//! caller-supplied [`reqwest::Client`] so timeout and proxy policy stay
//! outside this crate.

use serde::{Deserialize, Serialize};
use url::Url;

use async_trait::async_trait;
use guildmarket_core::UserProfile;

use crate::AuthResult;
use crate::classify::ProviderFailure;
use crate::error::AuthError;
use crate::provider::{CredentialExchange, CredentialGrant, TokenTriple, UserDirectory};

/// Identity provider client over HTTP.
pub struct HttpCredentialExchange {
    http_client: reqwest::Client,
    base_url: Url,
}

impl HttpCredentialExchange {
    /// Creates a client for the given provider gateway base URL.
    #[must_use]
    pub fn new(http_client: reqwest::Client, base_url: Url) -> Self {
        Self {
            http_client,
            base_url,
        }
    }

    fn endpoint(&self, path: &str) -> Result<Url, ProviderFailure> {
        self.base_url
            .join(path)
            .map_err(|e| ProviderFailure::from_message(format!("invalid endpoint {path}: {e}")))
    }

    async fn post_json<B: Serialize, T: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ProviderFailure> {
        let response = self
            .http_client
            .post(self.endpoint(path)?)
            .json(body)
            .send()
            .await
            .map_err(|e| ProviderFailure::from_message(format!("request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();

            // Providers report failures as {code|__type|name, message} JSON.
            if let Ok(failure) = serde_json::from_str::<ProviderFailure>(&body) {
                return Err(failure);
            }
            return Err(ProviderFailure::from_message(format!("HTTP {status} - {body}")));
        }

        response
            .json()
            .await
            .map_err(|e| ProviderFailure::from_message(format!("invalid response body: {e}")))
    }
}

#[derive(Serialize)]
struct SignInBody<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct RefreshBody<'a> {
    #[serde(rename = "refreshToken")]
    refresh_token: &'a str,
    email: &'a str,
}

#[derive(Serialize)]
struct ConfirmBody<'a> {
    email: &'a str,
    code: &'a str,
}

#[derive(Deserialize)]
struct SignUpResponse {
    #[serde(alias = "subjectId")]
    subject_id: String,
}

#[derive(Deserialize)]
struct Acknowledged {}

#[async_trait]
impl CredentialExchange for HttpCredentialExchange {
    async fn sign_in(
        &self,
        email: &str,
        password: &str,
    ) -> Result<CredentialGrant, ProviderFailure> {
        tracing::debug!("signing in via {}", self.base_url);
        self.post_json("auth/sign-in", &SignInBody { email, password })
            .await
    }

    async fn refresh(
        &self,
        refresh_token: &str,
        email: &str,
    ) -> Result<TokenTriple, ProviderFailure> {
        tracing::debug!("refreshing token triple via {}", self.base_url);
        self.post_json(
            "auth/refresh",
            &RefreshBody {
                refresh_token,
                email,
            },
        )
        .await
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<String, ProviderFailure> {
        let response: SignUpResponse = self
            .post_json("auth/sign-up", &SignInBody { email, password })
            .await?;
        Ok(response.subject_id)
    }

    async fn confirm_sign_up(&self, email: &str, code: &str) -> Result<(), ProviderFailure> {
        let _: Acknowledged = self
            .post_json("auth/confirm", &ConfirmBody { email, code })
            .await?;
        Ok(())
    }
}

/// Backend user store client over HTTP.
pub struct HttpUserDirectory {
    http_client: reqwest::Client,
    base_url: Url,
}

impl HttpUserDirectory {
    /// Creates a client for the backend base URL.
    #[must_use]
    pub fn new(http_client: reqwest::Client, base_url: Url) -> Self {
        Self {
            http_client,
            base_url,
        }
    }

    fn endpoint(&self, path: &str) -> AuthResult<Url> {
        self.base_url
            .join(path)
            .map_err(|e| AuthError::backend(format!("invalid endpoint {path}: {e}")))
    }

    async fn parse_profile(response: reqwest::Response) -> AuthResult<UserProfile> {
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AuthError::backend(format!("HTTP {status} - {body}")));
        }
        response
            .json()
            .await
            .map_err(|e| AuthError::backend(format!("invalid user profile body: {e}")))
    }
}

#[derive(Serialize)]
struct LoginUpsertBody<'a> {
    #[serde(rename = "subjectId")]
    subject_id: &'a str,
    email: &'a str,
}

#[async_trait]
impl UserDirectory for HttpUserDirectory {
    async fn upsert_on_login(
        &self,
        bearer: &str,
        subject_id: &str,
        email: &str,
    ) -> AuthResult<UserProfile> {
        let response = self
            .http_client
            .post(self.endpoint("users/login")?)
            .bearer_auth(bearer)
            .json(&LoginUpsertBody { subject_id, email })
            .send()
            .await
            .map_err(|e| AuthError::backend(format!("request failed: {e}")))?;
        Self::parse_profile(response).await
    }

    async fn get_me(&self, bearer: &str) -> AuthResult<UserProfile> {
        let response = self
            .http_client
            .get(self.endpoint("users/me")?)
            .bearer_auth(bearer)
            .send()
            .await
            .map_err(|e| AuthError::backend(format!("request failed: {e}")))?;
        Self::parse_profile(response).await
    }
}
