//! Fire-and-forget user notifications (toasts).

use std::path::PathBuf;

use serde::Serialize;
use tracing::info;

/// Heading used for engine advisories
pub const APP_HEADING: &str = "Skippy";

/// A toast to show to the user
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notification {
    pub heading: String,
    pub message: String,
    pub icon: Option<PathBuf>,
    pub duration_ms: u64,
}

impl Notification {
    pub fn new(heading: impl Into<String>, message: impl Into<String>, duration_ms: u64) -> Self {
        Self {
            heading: heading.into(),
            message: message.into(),
            icon: None,
            duration_ms,
        }
    }

    pub fn with_icon(mut self, icon: Option<PathBuf>) -> Self {
        self.icon = icon;
        self
    }
}

/// Sink for notifications. Delivery failures are the implementor's concern.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: &Notification);
}

/// Notifier that writes toasts to the log (headless hosts)
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notification: &Notification) {
        info!(
            heading = %notification.heading,
            duration_ms = notification.duration_ms,
            "{}",
            notification.message
        );
    }
}
