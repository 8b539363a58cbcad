//! Submission orchestrator
//!
//! One parameterized workflow drives every registration variant: the field
//! registry decides what is rendered and validated, the submit adapter
//! decides where the application goes. The workflow owns the form state,
//! drives uploads end to end, guards submission, and reports every outcome
//! through the notifier.

use crate::config::OnboardingConfig;
use crate::error::{OnboardingError, Result};
use crate::fields::{url_key, FieldDescriptor};
use crate::notify::{LogNotifier, Notifier};
use crate::state::{FileHandle, FormController, UserSession};
use crate::submit::{submit_adapter, ApplicationPayload, SubmitAdapter};
use crate::upload::{CloudinaryHost, MediaHost};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

/// Shown when a required file is selected but its upload has not landed
pub const WAIT_FOR_UPLOADS: &str = "Please wait for all files to upload before submitting.";

/// Shown when a second submit races an outstanding one
pub const SUBMIT_IN_PROGRESS: &str = "A submission is already in progress.";

/// Value submitted for optional file fields with no upload
pub const NOT_PROVIDED: &str = "Not provided";

/// Outcome of one submit action, drives the user-visible toast
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubmissionResult {
    pub success: bool,
    pub message: String,
}

impl SubmissionResult {
    fn succeeded(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

/// Releases the submit mutual-exclusion flag on every exit path
struct SubmitGuard<'a>(&'a AtomicBool);

impl<'a> SubmitGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_ok()
            .then_some(Self(flag))
    }
}

impl Drop for SubmitGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// The registration workflow for one mounted form
pub struct RegistrationWorkflow {
    controller: FormController,
    media: Arc<dyn MediaHost>,
    adapter: Arc<dyn SubmitAdapter>,
    notifier: Arc<dyn Notifier>,
    submitting: AtomicBool,
}

impl RegistrationWorkflow {
    pub fn new(
        fields: Vec<FieldDescriptor>,
        session: UserSession,
        media: Arc<dyn MediaHost>,
        adapter: Arc<dyn SubmitAdapter>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            controller: FormController::new(fields, session),
            media,
            adapter,
            notifier,
            submitting: AtomicBool::new(false),
        }
    }

    /// Wire up the configured media host, submit backend, and log notifier
    pub fn from_config(
        fields: Vec<FieldDescriptor>,
        session: UserSession,
        config: &OnboardingConfig,
    ) -> Self {
        Self::new(
            fields,
            session,
            Arc::new(CloudinaryHost::new(config.media.clone(), &config.http)),
            submit_adapter(config),
            Arc::new(LogNotifier),
        )
    }

    /// The underlying form state, for rendering and direct inspection
    pub fn controller(&self) -> &FormController {
        &self.controller
    }

    /// Set a text-like field from user input
    pub fn set_field(&self, name: &str, value: impl Into<String>) -> Result<()> {
        self.controller.set_text(name, value)
    }

    /// True while any field's upload is in flight. The submit control is
    /// disabled on this, so submission never races an upload.
    pub fn is_uploading(&self) -> bool {
        self.controller.any_uploading()
    }

    /// True while a submission is outstanding
    pub fn is_submitting(&self) -> bool {
        self.submitting.load(Ordering::Acquire)
    }

    /// Restore the form to its initial defaults
    pub fn reset(&self) {
        self.controller.reset();
    }

    /// Handle a file selection: record it, upload it, store the URL.
    ///
    /// Resolves to the stored URL, or `None` when the upload failed (the
    /// failure has already been surfaced) or was superseded by a later
    /// selection for the same field. Upload errors never propagate; `Err`
    /// only signals misuse of the field registry.
    pub async fn select_file(&self, name: &str, file: FileHandle) -> Result<Option<String>> {
        let ticket = self.controller.begin_file(name, file.clone())?;

        match self.media.upload(&file).await {
            Ok(url) => {
                if self.controller.complete_upload(&ticket, Some(url.clone())) {
                    self.notifier.success(&format!("{name} uploaded successfully!"));
                    Ok(Some(url))
                } else {
                    // Superseded or the form was torn down; discard silently
                    Ok(None)
                }
            }
            Err(e) => {
                warn!(field = name, "upload failed: {e}");
                self.controller.complete_upload(&ticket, None);
                self.notifier
                    .error(&format!("Failed to upload {name}. Please try again."));
                Ok(None)
            }
        }
    }

    /// Submit the application.
    ///
    /// Serialized by the submitting flag; a concurrent second submit is
    /// rejected without reaching the backend. On success the form resets to
    /// its defaults; on failure state is left untouched so the user can
    /// retry without retyping.
    pub async fn submit(&self) -> SubmissionResult {
        let Some(_guard) = SubmitGuard::acquire(&self.submitting) else {
            return SubmissionResult::failed(SUBMIT_IN_PROGRESS);
        };

        if let Err(e) = self.validate() {
            let message = specific_message(e);
            self.notifier.error(&message);
            return SubmissionResult::failed(message);
        }

        let payload = self.assemble_payload();

        match self.adapter.submit_application(&payload).await {
            Ok(message) => {
                info!("application submitted");
                self.notifier.success(&message);
                self.controller.reset();
                SubmissionResult::succeeded(message)
            }
            Err(e) => {
                let message = specific_message(e);
                warn!("submission failed: {message}");
                self.notifier.error(&message);
                SubmissionResult::failed(message)
            }
        }
    }

    fn validate(&self) -> Result<()> {
        for field in self.controller.fields() {
            if !field.required {
                continue;
            }
            let missing = if field.kind.is_file() {
                self.controller.file(field.name).is_none()
            } else {
                self.controller
                    .text(field.name)
                    .unwrap_or_default()
                    .trim()
                    .is_empty()
            };
            if missing {
                return Err(OnboardingError::Validation(format!(
                    "{} is required.",
                    field.label
                )));
            }
        }

        // Required files must have finished uploading
        let awaiting_upload = self.controller.fields().iter().any(|f| {
            f.kind.is_file()
                && f.required
                && self.controller.file(f.name).is_some()
                && self.controller.url(f.name).is_none()
        });
        if awaiting_upload {
            return Err(OnboardingError::Validation(WAIT_FOR_UPLOADS.into()));
        }

        Ok(())
    }

    fn assemble_payload(&self) -> ApplicationPayload {
        let mut payload = ApplicationPayload::new();
        for field in self.controller.fields() {
            if field.kind.is_file() {
                let url = self
                    .controller
                    .url(field.name)
                    .unwrap_or_else(|| NOT_PROVIDED.into());
                payload.insert(url_key(field.name), url);
            } else {
                let value = self.controller.text(field.name).unwrap_or_default();
                payload.insert(field.name, value);
            }
        }
        payload
    }
}

/// Pull the most specific user-facing message out of an error
fn specific_message(e: OnboardingError) -> String {
    match e {
        OnboardingError::Configuration(m)
        | OnboardingError::Upload(m)
        | OnboardingError::Validation(m)
        | OnboardingError::Submission(m) => m,
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::{partner_registration_fields, vendor_registration_fields};
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::sync::atomic::AtomicUsize;
    use tokio::sync::{Barrier, Notify};

    // -------------------------------------------------------------------------
    // Test doubles
    // -------------------------------------------------------------------------

    struct StaticHost {
        url: Option<String>,
    }

    impl StaticHost {
        fn succeeding(url: &str) -> Arc<Self> {
            Arc::new(Self {
                url: Some(url.into()),
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self { url: None })
        }
    }

    #[async_trait]
    impl crate::upload::MediaHost for StaticHost {
        async fn upload(&self, _file: &FileHandle) -> Result<String> {
            self.url
                .clone()
                .ok_or_else(|| OnboardingError::Upload("media host returned 500".into()))
        }
    }

    struct BarrierHost {
        barrier: Barrier,
    }

    #[async_trait]
    impl crate::upload::MediaHost for BarrierHost {
        async fn upload(&self, file: &FileHandle) -> Result<String> {
            // Only passes if another upload is in flight at the same time
            self.barrier.wait().await;
            Ok(format!("https://cdn.example/{}", file.file_name))
        }
    }

    #[derive(Default)]
    struct RecordingAdapter {
        reject_with: Option<String>,
        calls: Mutex<Vec<ApplicationPayload>>,
    }

    impl RecordingAdapter {
        fn accepting() -> Arc<Self> {
            Arc::new(Self::default())
        }

        fn rejecting(message: &str) -> Arc<Self> {
            Arc::new(Self {
                reject_with: Some(message.into()),
                calls: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> Vec<ApplicationPayload> {
            self.calls.lock().clone()
        }
    }

    #[async_trait]
    impl SubmitAdapter for RecordingAdapter {
        async fn submit_application(&self, payload: &ApplicationPayload) -> Result<String> {
            self.calls.lock().push(payload.clone());
            match &self.reject_with {
                Some(message) => Err(OnboardingError::Submission(message.clone())),
                None => Ok("Thanks for submitting. Our team will contact you soon.".into()),
            }
        }
    }

    struct GatedAdapter {
        entered: Notify,
        release: Notify,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl SubmitAdapter for GatedAdapter {
        async fn submit_application(&self, _payload: &ApplicationPayload) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.entered.notify_one();
            self.release.notified().await;
            Ok("done".into())
        }
    }

    #[derive(Default)]
    struct RecordingNotifier {
        events: Mutex<Vec<(bool, String)>>,
    }

    impl RecordingNotifier {
        fn errors(&self) -> Vec<String> {
            self.events
                .lock()
                .iter()
                .filter(|(ok, _)| !ok)
                .map(|(_, m)| m.clone())
                .collect()
        }
    }

    impl Notifier for RecordingNotifier {
        fn success(&self, message: &str) {
            self.events.lock().push((true, message.into()));
        }

        fn error(&self, message: &str) {
            self.events.lock().push((false, message.into()));
        }
    }

    // -------------------------------------------------------------------------
    // Fixtures
    // -------------------------------------------------------------------------

    fn session() -> UserSession {
        UserSession {
            name: Some("Asha Verma".into()),
            email: Some("asha@example.com".into()),
            phone: Some("9876543210".into()),
        }
    }

    fn workflow(
        media: Arc<dyn crate::upload::MediaHost>,
        adapter: Arc<dyn SubmitAdapter>,
        notifier: Arc<RecordingNotifier>,
    ) -> RegistrationWorkflow {
        RegistrationWorkflow::new(
            partner_registration_fields(),
            session(),
            media,
            adapter,
            notifier,
        )
    }

    fn fill_required_text(wf: &RegistrationWorkflow) {
        for field in wf.controller().fields().to_vec() {
            if field.kind.is_file() || !field.required {
                continue;
            }
            if wf
                .controller()
                .text(field.name)
                .unwrap_or_default()
                .is_empty()
            {
                wf.set_field(field.name, "sample").unwrap();
            }
        }
    }

    async fn upload_required_files(wf: &RegistrationWorkflow) {
        for name in ["aadharCard", "panCard", "cancelCheque"] {
            let file = FileHandle::new(format!("{name}.png"), vec![1, 2, 3]);
            wf.select_file(name, file).await.unwrap();
        }
    }

    // -------------------------------------------------------------------------
    // Scenarios
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_happy_path_submits_urls_and_resets() {
        let adapter = RecordingAdapter::accepting();
        let notifier = Arc::new(RecordingNotifier::default());
        let wf = workflow(
            StaticHost::succeeding("https://cdn.example/abc.png"),
            adapter.clone(),
            notifier,
        );

        fill_required_text(&wf);
        upload_required_files(&wf).await;

        let result = wf.submit().await;
        assert!(result.success);

        let calls = adapter.calls();
        assert_eq!(calls.len(), 1);
        let payload = &calls[0];
        assert_eq!(payload.get("aadharCardUrl"), Some("https://cdn.example/abc.png"));
        assert_eq!(payload.get("panCardUrl"), Some("https://cdn.example/abc.png"));
        assert_eq!(payload.get("name"), Some("Asha Verma"));
        assert_eq!(payload.get("brandName"), Some("sample"));
        // Optional logo never uploaded
        assert_eq!(payload.get("logoUrl"), Some(NOT_PROVIDED));

        // Reset to defaults
        assert_eq!(wf.controller().text("brandName").as_deref(), Some(""));
        assert_eq!(wf.controller().text("name").as_deref(), Some("Asha Verma"));
        assert!(wf.controller().url("aadharCard").is_none());
        assert!(!wf.is_submitting());
    }

    #[tokio::test]
    async fn test_pending_upload_blocks_submit() {
        let adapter = RecordingAdapter::accepting();
        let notifier = Arc::new(RecordingNotifier::default());
        let wf = workflow(
            StaticHost::succeeding("https://cdn.example/abc.png"),
            adapter.clone(),
            notifier.clone(),
        );

        fill_required_text(&wf);
        upload_required_files(&wf).await;
        // A re-selected aadhar card whose upload has not resolved yet
        wf.controller()
            .begin_file("aadharCard", FileHandle::new("aadhar-v2.png", vec![7]))
            .unwrap();

        let result = wf.submit().await;
        assert!(!result.success);
        assert_eq!(result.message, WAIT_FOR_UPLOADS);
        assert!(adapter.calls().is_empty());
        assert_eq!(notifier.errors(), [WAIT_FOR_UPLOADS]);
        // Entered values survive the blocked submit
        assert_eq!(wf.controller().text("brandName").as_deref(), Some("sample"));
        assert!(!wf.is_submitting());
    }

    #[tokio::test]
    async fn test_failed_upload_blocks_submit_and_keeps_file() {
        let adapter = RecordingAdapter::accepting();
        let notifier = Arc::new(RecordingNotifier::default());
        let wf = workflow(StaticHost::failing(), adapter.clone(), notifier.clone());

        fill_required_text(&wf);
        let stored = wf
            .select_file("aadharCard", FileHandle::new("aadhar.png", vec![1]))
            .await
            .unwrap();
        assert!(stored.is_none());
        assert_eq!(notifier.errors().len(), 1);

        // Fill the other required files by hand so only the failed one blocks
        for name in ["panCard", "cancelCheque"] {
            let ticket = wf
                .controller()
                .begin_file(name, FileHandle::new(format!("{name}.png"), vec![2]))
                .unwrap();
            wf.controller()
                .complete_upload(&ticket, Some(format!("https://cdn.example/{name}.png")));
        }

        let result = wf.submit().await;
        assert!(!result.success);
        assert_eq!(result.message, WAIT_FOR_UPLOADS);
        assert!(adapter.calls().is_empty());
        // The selection is retained for retry
        assert!(wf.controller().file("aadharCard").is_some());
    }

    #[tokio::test]
    async fn test_backend_rejection_surfaces_message_and_keeps_state() {
        let adapter = RecordingAdapter::rejecting("Invalid email");
        let notifier = Arc::new(RecordingNotifier::default());
        let wf = workflow(
            StaticHost::succeeding("https://cdn.example/abc.png"),
            adapter.clone(),
            notifier.clone(),
        );

        fill_required_text(&wf);
        upload_required_files(&wf).await;

        let result = wf.submit().await;
        assert!(!result.success);
        assert_eq!(result.message, "Invalid email");
        assert_eq!(notifier.errors(), ["Invalid email"]);

        // State untouched so the user can resubmit unchanged
        assert_eq!(wf.controller().text("brandName").as_deref(), Some("sample"));
        assert_eq!(
            wf.controller().url("aadharCard").as_deref(),
            Some("https://cdn.example/abc.png")
        );
        assert!(!wf.is_submitting());
    }

    #[tokio::test]
    async fn test_missing_required_field_rejected_before_backend() {
        let adapter = RecordingAdapter::accepting();
        let notifier = Arc::new(RecordingNotifier::default());
        let wf = workflow(
            StaticHost::succeeding("https://cdn.example/abc.png"),
            adapter.clone(),
            notifier,
        );

        // Nothing filled in: first required gap wins
        let result = wf.submit().await;
        assert!(!result.success);
        assert_eq!(result.message, "Your Brand Name is required.");
        assert!(adapter.calls().is_empty());
    }

    #[tokio::test]
    async fn test_submitting_flag_spans_backend_call() {
        let adapter = Arc::new(GatedAdapter {
            entered: Notify::new(),
            release: Notify::new(),
            calls: AtomicUsize::new(0),
        });
        let notifier = Arc::new(RecordingNotifier::default());
        let wf = Arc::new(workflow(
            StaticHost::succeeding("https://cdn.example/abc.png"),
            adapter.clone(),
            notifier,
        ));

        fill_required_text(&wf);
        upload_required_files(&wf).await;

        let task = {
            let wf = wf.clone();
            tokio::spawn(async move { wf.submit().await })
        };

        adapter.entered.notified().await;
        assert!(wf.is_submitting());

        // A second submit while one is outstanding never reaches the backend
        let second = wf.submit().await;
        assert!(!second.success);
        assert_eq!(second.message, SUBMIT_IN_PROGRESS);
        assert_eq!(adapter.calls.load(Ordering::SeqCst), 1);

        adapter.release.notify_one();
        let result = task.await.unwrap();
        assert!(result.success);
        assert!(!wf.is_submitting());
    }

    #[tokio::test]
    async fn test_unrelated_uploads_run_concurrently() {
        let adapter = RecordingAdapter::accepting();
        let notifier = Arc::new(RecordingNotifier::default());
        let wf = workflow(
            Arc::new(BarrierHost {
                barrier: Barrier::new(2),
            }),
            adapter,
            notifier,
        );

        let (aadhar, pan) = tokio::join!(
            wf.select_file("aadharCard", FileHandle::new("a.png", vec![1])),
            wf.select_file("panCard", FileHandle::new("p.png", vec![2])),
        );
        assert_eq!(aadhar.unwrap().as_deref(), Some("https://cdn.example/a.png"));
        assert_eq!(pan.unwrap().as_deref(), Some("https://cdn.example/p.png"));
        assert!(!wf.is_uploading());
    }

    #[tokio::test]
    async fn test_vendor_variant_optional_files_use_sentinel() {
        let adapter = RecordingAdapter::accepting();
        let notifier = Arc::new(RecordingNotifier::default());
        let wf = RegistrationWorkflow::new(
            vendor_registration_fields(),
            session(),
            StaticHost::succeeding("https://cdn.example/logo.png"),
            adapter.clone(),
            notifier,
        );

        wf.select_file("logo", FileHandle::new("logo.png", vec![1]))
            .await
            .unwrap();

        let result = wf.submit().await;
        assert!(result.success);

        let calls = adapter.calls();
        let payload = &calls[0];
        assert_eq!(payload.get("logoUrl"), Some("https://cdn.example/logo.png"));
        // Never selected, optional
        assert_eq!(payload.get("aadharCardUrl"), Some(NOT_PROVIDED));
        assert_eq!(payload.get("name"), Some("Asha Verma"));
    }
}
