//! Workflow configuration
//!
//! Environment-style configuration for the three external services: the
//! media host, the forms relay, and the registration API. All values are
//! required at call time; a missing value is a configuration error, never
//! a transient failure.

use crate::error::{OnboardingError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

/// Default request timeout for all outbound calls
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct OnboardingConfig {
    /// Media host (file uploads)
    pub media: MediaConfig,
    /// Third-party forms relay
    pub relay: RelayConfig,
    /// Direct registration API
    pub registration: RegistrationConfig,
    /// Which submit backend this deployment uses
    pub backend: SubmitBackend,
    /// HTTP client settings
    pub http: HttpConfig,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct MediaConfig {
    /// Full upload endpoint URL
    pub upload_url: String,
    /// Unsigned upload preset identifier
    pub upload_preset: String,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RelayConfig {
    /// Relay endpoint URL
    pub endpoint: String,
    /// Access key embedded in each relayed payload
    #[serde(skip_serializing)]
    pub access_key: String,
    /// Subject line embedded in each relayed payload
    pub subject: String,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RegistrationConfig {
    /// API base URL, no trailing slash
    pub base_url: String,
    /// Registration path under the base URL
    pub register_path: String,
}

/// Submit backend selector. A deployment concern, not a runtime branch.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubmitBackend {
    #[default]
    DirectRegistration,
    RelayForms,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HttpConfig {
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl OnboardingConfig {
    /// Load configuration from the environment.
    ///
    /// Unset variables load as empty strings and fail later at call time,
    /// so a relay-only deployment never needs registration variables.
    pub fn from_env() -> Self {
        let var = |name: &str| std::env::var(name).unwrap_or_default();

        Self {
            media: MediaConfig {
                upload_url: var("ONBOARDING_UPLOAD_URL"),
                upload_preset: var("ONBOARDING_UPLOAD_PRESET"),
            },
            relay: RelayConfig {
                endpoint: var("ONBOARDING_RELAY_URL"),
                access_key: var("ONBOARDING_RELAY_ACCESS_KEY"),
                subject: var("ONBOARDING_RELAY_SUBJECT"),
            },
            registration: RegistrationConfig {
                base_url: var("ONBOARDING_API_BASE_URL"),
                register_path: var("ONBOARDING_REGISTER_PATH"),
            },
            backend: match var("ONBOARDING_BACKEND").as_str() {
                "relay" => SubmitBackend::RelayForms,
                _ => SubmitBackend::DirectRegistration,
            },
            http: HttpConfig::default(),
        }
    }
}

impl MediaConfig {
    /// Check for required values, fail fast before any network call
    pub fn validate(&self) -> Result<()> {
        if self.upload_url.is_empty() || self.upload_preset.is_empty() {
            return Err(OnboardingError::Configuration(
                "media upload URL or preset not configured".into(),
            ));
        }
        parse_url(&self.upload_url)?;
        Ok(())
    }
}

impl RelayConfig {
    pub fn validate(&self) -> Result<()> {
        if self.endpoint.is_empty() || self.access_key.is_empty() {
            return Err(OnboardingError::Configuration(
                "relay endpoint or access key not configured".into(),
            ));
        }
        parse_url(&self.endpoint)?;
        Ok(())
    }
}

impl RegistrationConfig {
    pub fn validate(&self) -> Result<()> {
        if self.base_url.is_empty() || self.register_path.is_empty() {
            return Err(OnboardingError::Configuration(
                "registration API base URL or path not configured".into(),
            ));
        }
        parse_url(&self.base_url)?;
        Ok(())
    }

    /// Full registration endpoint URL
    pub fn register_url(&self) -> String {
        format!("{}{}", self.base_url, self.register_path)
    }
}

fn parse_url(raw: &str) -> Result<Url> {
    Url::parse(raw).map_err(|e| OnboardingError::Configuration(format!("invalid URL {raw:?}: {e}")))
}
