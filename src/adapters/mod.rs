//! Adapter interfaces for external systems.
//!
//! The engine never talks to a media player, UI toolkit, or file format
//! directly. Each collaborator sits behind a narrow trait:
//! - `Player`: playback position and seeking
//! - `SegmentSource`: raw segments for a video (chapter XML, EDL)
//! - `Notifier`: fire-and-forget toasts

pub mod chapters;
pub mod edl;
pub mod notifier;
pub mod player;
pub mod source;

// Re-export the collaborator traits and reference implementations
pub use edl::EdlOptions;
pub use notifier::{LogNotifier, Notification, Notifier, APP_HEADING};
pub use player::{Player, PlayerError};
pub use source::{FileSegmentSource, RawSegment, SegmentSource, SourceError};
