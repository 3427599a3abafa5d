//! User policy consulted by the monitor on every decision.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::PlaybackCategory;

/// What to do when a segment with a given label becomes active
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipMode {
    /// Seek past it without asking
    Auto,

    /// Show the skip dialog
    Ask,

    /// Leave it alone
    Never,
}

/// Preference lookups. Implementations may read live settings on every call.
pub trait SkipPolicy: Send + Sync {
    /// Behavior for a (normalized) segment label
    fn skip_mode(&self, label: &str) -> SkipMode;

    /// Whether skipping is enabled at all for the category
    fn skip_enabled(&self, category: PlaybackCategory) -> bool;

    /// Whether dialogs may be shown for the category (implies skipping enabled)
    fn dialog_enabled(&self, category: PlaybackCategory) -> bool;

    /// Backwards jump, in seconds, that counts as a rewind
    fn rewind_threshold_secs(&self) -> f64;

    /// Drop segments that intersect an earlier one while linking
    fn eliminate_overlaps(&self) -> bool;

    /// Show the one-time advisory when nested/overlapping segments exist
    fn overlap_advisory(&self) -> bool;

    /// Toast when no segment file exists for the category
    fn missing_file_toast(&self, category: PlaybackCategory) -> bool;

    /// Toast after each performed skip
    fn skipped_toast(&self) -> bool;

    /// Pause before opening a dialog
    fn dialog_debounce(&self) -> Duration;

    /// Icon attached to toasts
    fn icon(&self) -> Option<PathBuf>;
}
