//! Partner/Vendor Onboarding Workflow
//!
//! One parameterized registration workflow behind every onboarding form
//! variant: a static field registry drives rendering and validation, file
//! fields upload to a remote media host before submission, and the
//! assembled application goes to a configurable submit backend.
//!
//! ## Features
//! - Field registries for the partner and vendor form variants
//! - Form state with derived `<name>Url` keys and per-field upload tracking
//! - Cloudinary-style unsigned media uploads
//! - Direct-registration and forms-relay submit backends behind one trait
//! - Guarded, serialized submission with reset-on-success
//!
//! ```rust,no_run
//! use partner_onboarding::{
//!     OnboardingConfig, RegistrationWorkflow, UserSession,
//!     fields::partner_registration_fields,
//! };
//!
//! # async fn run() {
//! let config = OnboardingConfig::from_env();
//! let session = UserSession::default();
//! let workflow =
//!     RegistrationWorkflow::from_config(partner_registration_fields(), session, &config);
//!
//! workflow.set_field("brandName", "Verma Textiles").unwrap();
//! let result = workflow.submit().await;
//! println!("{}: {}", result.success, result.message);
//! # }
//! ```

pub mod config;
pub mod error;
pub mod fields;
pub mod notify;
pub mod state;
pub mod submit;
pub mod upload;
pub mod workflow;

pub use config::{OnboardingConfig, SubmitBackend};
pub use error::{OnboardingError, Result};
pub use fields::{FieldDescriptor, FieldKind};
pub use notify::{LogNotifier, Notifier};
pub use state::{FileHandle, FormController, UserSession};
pub use submit::{ApplicationPayload, SubmitAdapter};
pub use upload::MediaHost;
pub use workflow::{RegistrationWorkflow, SubmissionResult};
