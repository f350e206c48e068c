//! Host UI hooks the client drives on its own: the global loading indicator
//! and transient toasts.

use std::sync::Arc;

use tracing::info;

/// Default text shown next to the loading spinner.
pub const DEFAULT_LOADING_TEXT: &str = "Loading...";

/// Implemented by the embedding UI.
pub trait Feedback: Send + Sync {
    fn show_loading(&self, text: &str);
    fn hide_loading(&self);
    fn show_toast(&self, message: &str);
}

/// Feedback sink that only logs. Used when no UI is attached.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingFeedback;

impl Feedback for TracingFeedback {
    fn show_loading(&self, text: &str) {
        info!(text, "Loading indicator shown");
    }

    fn hide_loading(&self) {
        info!("Loading indicator hidden");
    }

    fn show_toast(&self, message: &str) {
        info!(message, "Toast");
    }
}

/// Shows the loading indicator on creation and hides it when dropped, so
/// every exit path (including an early `?` or a dropped future) hides it.
pub(crate) struct LoadingGuard {
    feedback: Arc<dyn Feedback>,
}

impl LoadingGuard {
    pub(crate) fn show(feedback: Arc<dyn Feedback>, text: Option<&str>) -> Self {
        feedback.show_loading(text.unwrap_or(DEFAULT_LOADING_TEXT));
        Self { feedback }
    }
}

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        self.feedback.hide_loading();
    }
}
