//! Reqwest-backed draft store and asset store clients.
//!
//! Both accept a caller-supplied [`reqwest::Client`] so timeout policy
//! stays outside this crate. The draft store treats a 404 on read as "no
//! draft yet", never as an error.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use url::Url;

use crate::OnboardingResult;
use crate::draft::{DraftFields, FinalizePayload};
use crate::error::OnboardingError;
use crate::storage::{AssetStore, DraftStore};

/// Backend draft store client over HTTP.
pub struct HttpDraftStore {
    http_client: reqwest::Client,
    base_url: Url,
}

impl HttpDraftStore {
    /// Creates a client for the backend base URL.
    #[must_use]
    pub fn new(http_client: reqwest::Client, base_url: Url) -> Self {
        Self {
            http_client,
            base_url,
        }
    }

    fn draft_endpoint(&self, subject_id: &str) -> Result<Url, url::ParseError> {
        self.base_url.join(&format!("drafts/{subject_id}"))
    }
}

#[async_trait]
impl DraftStore for HttpDraftStore {
    async fn get_draft(&self, subject_id: &str) -> OnboardingResult<Option<DraftFields>> {
        let endpoint = self
            .draft_endpoint(subject_id)
            .map_err(|e| OnboardingError::draft_load(format!("invalid draft endpoint: {e}")))?;
        let response = self
            .http_client
            .get(endpoint)
            .send()
            .await
            .map_err(|e| OnboardingError::draft_load(format!("request failed: {e}")))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(OnboardingError::draft_load(format!(
                "HTTP {}",
                response.status()
            )));
        }

        let fields = response
            .json()
            .await
            .map_err(|e| OnboardingError::draft_load(format!("invalid draft body: {e}")))?;
        Ok(Some(fields))
    }

    async fn upsert_draft(&self, subject_id: &str, fields: &DraftFields) -> OnboardingResult<()> {
        let endpoint = self
            .draft_endpoint(subject_id)
            .map_err(|e| OnboardingError::draft_save(format!("invalid draft endpoint: {e}")))?;
        let response = self
            .http_client
            .put(endpoint)
            .json(fields)
            .send()
            .await
            .map_err(|e| OnboardingError::draft_save(format!("request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(OnboardingError::draft_save(format!(
                "HTTP {}",
                response.status()
            )));
        }
        Ok(())
    }

    async fn finalize(&self, payload: &FinalizePayload) -> OnboardingResult<()> {
        let endpoint = self
            .base_url
            .join("registrations/complete")
            .map_err(|e| OnboardingError::draft_save(format!("invalid finalize endpoint: {e}")))?;

        let response = self
            .http_client
            .post(endpoint)
            .json(payload)
            .send()
            .await
            .map_err(|e| OnboardingError::draft_save(format!("request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(OnboardingError::draft_save(format!(
                "HTTP {}",
                response.status()
            )));
        }
        Ok(())
    }
}

/// Asset store client over HTTP.
pub struct HttpAssetStore {
    http_client: reqwest::Client,
    upload_url: Url,
}

#[derive(Deserialize)]
struct UploadResponse {
    url: String,
}

impl HttpAssetStore {
    /// Creates a client posting uploads to the given endpoint.
    #[must_use]
    pub fn new(http_client: reqwest::Client, upload_url: Url) -> Self {
        Self {
            http_client,
            upload_url,
        }
    }
}

#[async_trait]
impl AssetStore for HttpAssetStore {
    async fn upload_image(&self, bytes: Vec<u8>, filename: &str) -> OnboardingResult<String> {
        let part = reqwest::multipart::Part::bytes(bytes).file_name(filename.to_string());
        let form = reqwest::multipart::Form::new().part("file", part);

        let response = self
            .http_client
            .post(self.upload_url.clone())
            .multipart(form)
            .send()
            .await
            .map_err(|e| OnboardingError::asset_upload(format!("request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(OnboardingError::asset_upload(format!(
                "HTTP {}",
                response.status()
            )));
        }

        let upload: UploadResponse = response
            .json()
            .await
            .map_err(|e| OnboardingError::asset_upload(format!("invalid upload body: {e}")))?;
        Ok(upload.url)
    }
}
