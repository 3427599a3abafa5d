//! Player control capability.

use std::path::PathBuf;

use thiserror::Error;

use crate::domain::PlaybackItem;

/// Errors reading or controlling the host player
#[derive(Debug, Clone, Error)]
pub enum PlayerError {
    #[error("Player unavailable: {0}")]
    Unavailable(String),

    #[error("Seek to {target:.2}s failed: {reason}")]
    SeekFailed { target: f64, reason: String },
}

/// Narrow interface to the host video player.
///
/// Every call site in the monitor and the dialog depends only on this trait.
/// Implementations must be cheap to call from the poll loop; errors are
/// transient and the caller skips the current tick.
pub trait Player: Send + Sync {
    /// Whether a video (not audio) is currently loaded and playing
    fn is_playing_video(&self) -> bool;

    /// Whether playback is paused
    fn is_paused(&self) -> bool;

    /// Current playback position in seconds
    fn time(&self) -> Result<f64, PlayerError>;

    /// Seek to an absolute position in seconds
    fn seek(&self, seconds: f64) -> Result<(), PlayerError>;

    /// Path of the playing file; identifies the playback source
    fn playing_file(&self) -> Result<Option<PathBuf>, PlayerError>;

    /// Metadata for the playing item, `None` while the host has not resolved it
    fn playing_item(&self) -> Result<Option<PlaybackItem>, PlayerError>;
}
