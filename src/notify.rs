//! User notifications
//!
//! The toast seam. The workflow reports every outcome through this trait;
//! hosts plug in their own presentation. The default sink logs through
//! `tracing` so headless use still surfaces outcomes.

use tracing::{info, warn};

/// Sink for user-visible outcome messages
pub trait Notifier: Send + Sync {
    fn success(&self, message: &str);
    fn error(&self, message: &str);
}

/// Default sink: structured log events
#[derive(Debug, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn success(&self, message: &str) {
        info!(target: "onboarding", "{message}");
    }

    fn error(&self, message: &str) {
        warn!(target: "onboarding", "{message}");
    }
}
