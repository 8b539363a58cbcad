//! Error types for the onboarding workflow

use thiserror::Error;

/// Onboarding error type
///
/// Every variant is recoverable by user action: fixing configuration,
/// re-selecting a file, waiting for uploads, or resubmitting.
#[derive(Error, Debug)]
pub enum OnboardingError {
    /// Required external configuration is missing or invalid.
    /// Fails fast; no network call is attempted.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A file upload failed against the media host
    #[error("upload failed: {0}")]
    Upload(String),

    /// The form is not ready to submit
    #[error("validation failed: {0}")]
    Validation(String),

    /// The submit backend rejected the application or was unreachable
    #[error("submission failed: {0}")]
    Submission(String),

    /// Transport error from the HTTP client
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Malformed JSON in a service response
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl OnboardingError {
    /// Fold transport-level sources into the workflow taxonomy so callers
    /// above the service boundary only ever see the four spec'd kinds.
    pub(crate) fn into_upload(self) -> OnboardingError {
        match self {
            OnboardingError::Http(e) => OnboardingError::Upload(e.to_string()),
            OnboardingError::Json(e) => OnboardingError::Upload(format!("bad response: {e}")),
            other => other,
        }
    }

    pub(crate) fn into_submission(self) -> OnboardingError {
        match self {
            OnboardingError::Http(e) => OnboardingError::Submission(e.to_string()),
            OnboardingError::Json(e) => OnboardingError::Submission(format!("bad response: {e}")),
            other => other,
        }
    }
}

/// Result type for onboarding operations
pub type Result<T> = std::result::Result<T, OnboardingError>;
