//! Media uploader
//!
//! Uploads a single file to the remote media host and returns a durable,
//! publicly resolvable URL. One attempt per call; a failed upload is
//! recovered by the user re-selecting the file.

use crate::config::{HttpConfig, MediaConfig};
use crate::error::{OnboardingError, Result};
use crate::state::FileHandle;
use async_trait::async_trait;
use reqwest::multipart;
use serde::Deserialize;
use tracing::{debug, error};

/// Remote host that stores uploaded files
#[async_trait]
pub trait MediaHost: Send + Sync {
    /// Upload one file, returning its durable URL
    async fn upload(&self, file: &FileHandle) -> Result<String>;
}

/// Cloudinary-style unsigned upload: multipart POST of `file` and
/// `upload_preset`, `secure_url` in the response body.
pub struct CloudinaryHost {
    config: MediaConfig,
    http: reqwest::Client,
}

#[derive(Deserialize)]
struct UploadResponse {
    secure_url: Option<String>,
}

impl CloudinaryHost {
    pub fn new(config: MediaConfig, http_config: &HttpConfig) -> Self {
        let http = reqwest::Client::builder()
            .timeout(http_config.timeout())
            .build()
            .expect("failed to build HTTP client");
        Self { config, http }
    }

    async fn post_file(&self, file: &FileHandle) -> Result<String> {
        let mut part = multipart::Part::stream(file.data.clone()).file_name(file.file_name.clone());
        if let Some(content_type) = &file.content_type {
            part = part
                .mime_str(content_type)
                .map_err(|e| OnboardingError::Upload(format!("bad content type: {e}")))?;
        }

        let form = multipart::Form::new()
            .part("file", part)
            .text("upload_preset", self.config.upload_preset.clone());

        let response = self
            .http
            .post(&self.config.upload_url)
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(OnboardingError::Upload(format!(
                "media host returned {status}"
            )));
        }

        let body: UploadResponse = response.json().await?;
        body.secure_url
            .ok_or_else(|| OnboardingError::Upload("media host response missing secure_url".into()))
    }
}

#[async_trait]
impl MediaHost for CloudinaryHost {
    async fn upload(&self, file: &FileHandle) -> Result<String> {
        // Missing configuration short-circuits before any network call
        if let Err(e) = self.config.validate() {
            error!(file = %file.file_name, "upload misconfigured: {e}");
            return Err(e);
        }

        debug!(file = %file.file_name, bytes = file.data.len(), "uploading to media host");
        self.post_file(file).await.map_err(|e| e.into_upload())
    }
}
