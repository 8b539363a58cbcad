//! Submit backends
//!
//! Two interchangeable implementations of the "submit partner application"
//! contract: a direct registration API call and a third-party forms relay.
//! Selection between them is a deployment concern; the orchestrator only
//! ever sees the trait.

use crate::config::{HttpConfig, OnboardingConfig, RegistrationConfig, RelayConfig, SubmitBackend};
use crate::error::{OnboardingError, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::debug;

/// Application payload in the backend's expected shape: text fields by
/// name, file fields by their `<name>Url` value.
#[derive(Clone, Debug, Default, serde::Serialize)]
pub struct ApplicationPayload(Map<String, Value>);

impl ApplicationPayload {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), Value::String(value.into()));
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn fields(&self) -> &Map<String, Value> {
        &self.0
    }
}

/// Backend accepting a partner/vendor application
#[async_trait]
pub trait SubmitAdapter: Send + Sync {
    /// Submit an application. `Ok` carries the user-facing success message;
    /// a rejection or transport failure is a `Submission` error carrying
    /// the most specific message available.
    async fn submit_application(&self, payload: &ApplicationPayload) -> Result<String>;
}

/// Build the configured backend
pub fn submit_adapter(config: &OnboardingConfig) -> Arc<dyn SubmitAdapter> {
    match config.backend {
        SubmitBackend::DirectRegistration => Arc::new(DirectRegistration::new(
            config.registration.clone(),
            &config.http,
        )),
        SubmitBackend::RelayForms => {
            Arc::new(RelayForms::new(config.relay.clone(), &config.http))
        }
    }
}

const DEFAULT_SUCCESS_MESSAGE: &str = "Thanks for submitting. Our team will contact you soon.";

fn build_client(http_config: &HttpConfig) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(http_config.timeout())
        .build()
        .expect("failed to build HTTP client")
}

// =============================================================================
// Direct registration
// =============================================================================

/// JSON POST to the internal registration API. Success is decided by the
/// HTTP status class, not a body flag.
pub struct DirectRegistration {
    config: RegistrationConfig,
    http: reqwest::Client,
}

#[derive(Deserialize)]
struct ApiMessage {
    message: Option<String>,
}

impl DirectRegistration {
    pub fn new(config: RegistrationConfig, http_config: &HttpConfig) -> Self {
        Self {
            config,
            http: build_client(http_config),
        }
    }

    async fn post(&self, payload: &ApplicationPayload) -> Result<String> {
        let response = self
            .http
            .post(self.config.register_url())
            .json(payload)
            .send()
            .await?;

        let status = response.status();
        let body: ApiMessage = response.json().await.unwrap_or(ApiMessage { message: None });

        if status.is_success() {
            Ok(body.message.unwrap_or_else(|| DEFAULT_SUCCESS_MESSAGE.into()))
        } else {
            Err(OnboardingError::Submission(body.message.unwrap_or_else(
                || format!("registration service returned {status}"),
            )))
        }
    }
}

#[async_trait]
impl SubmitAdapter for DirectRegistration {
    async fn submit_application(&self, payload: &ApplicationPayload) -> Result<String> {
        self.config.validate()?;
        debug!(fields = payload.len(), "submitting to registration API");
        self.post(payload).await.map_err(|e| e.into_submission())
    }
}

// =============================================================================
// Forms relay
// =============================================================================

/// JSON POST to a third-party forms relay. The access key and subject line
/// travel inside the payload; the body `success` flag decides the outcome
/// even on HTTP 200.
pub struct RelayForms {
    config: RelayConfig,
    http: reqwest::Client,
}

#[derive(Deserialize)]
struct RelayResponse {
    success: bool,
    message: Option<String>,
}

impl RelayForms {
    pub fn new(config: RelayConfig, http_config: &HttpConfig) -> Self {
        Self {
            config,
            http: build_client(http_config),
        }
    }

    fn enriched(&self, payload: &ApplicationPayload) -> Map<String, Value> {
        let mut body = payload.fields().clone();
        body.insert("access_key".into(), Value::String(self.config.access_key.clone()));
        body.insert("subject".into(), Value::String(self.config.subject.clone()));
        body
    }

    async fn post(&self, payload: &ApplicationPayload) -> Result<String> {
        let response = self
            .http
            .post(&self.config.endpoint)
            .json(&self.enriched(payload))
            .send()
            .await?;

        let status = response.status();
        let body: RelayResponse = response.json().await.map_err(|_| {
            OnboardingError::Submission(format!("relay returned {status} with no result"))
        })?;

        if body.success {
            Ok(body.message.unwrap_or_else(|| DEFAULT_SUCCESS_MESSAGE.into()))
        } else {
            Err(OnboardingError::Submission(body.message.unwrap_or_else(
                || "relay rejected the submission".into(),
            )))
        }
    }
}

#[async_trait]
impl SubmitAdapter for RelayForms {
    async fn submit_application(&self, payload: &ApplicationPayload) -> Result<String> {
        self.config.validate()?;
        debug!(fields = payload.len(), "submitting through forms relay");
        self.post(payload).await.map_err(|e| e.into_submission())
    }
}
