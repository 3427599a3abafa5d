//! skippy - Segment skip engine for video playback
//!
//! Decides, while a video plays, whether a labeled interval (intro, recap,
//! credits, ...) is active and whether to skip it automatically, ask the
//! user, or leave it alone.
//!
//! # Architecture
//!
//! The engine is a polling state machine over narrow collaborator traits:
//! - Segments are loaded once per video and linked into jump chains
//! - Every tick compares the playback position with the previous one to
//!   detect pauses, rewinds, replays, and nested-segment exits
//! - Each segment activation produces at most one decision
//!
//! # Modules
//!
//! - `adapters`: Player, segment source, and notifier interfaces (chapter XML, EDL)
//! - `core`: Linker, skip policy, session state, and the playback monitor
//! - `dialog`: Skip dialog protocol with its countdown task
//! - `domain`: Data structures (Segment, Relation, PlaybackItem)
//! - `simulate`: Scripted collaborators and playback timelines
//! - `cli`: Command-line interface
//!
//! # Usage
//!
//! ```bash
//! # Show the jump chain for a video
//! skippy segments /media/Show.S01E01.mkv
//!
//! # Replay a scripted session
//! skippy simulate timeline.yaml
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod dialog;
pub mod domain;
pub mod simulate;

// Re-export main types at crate root for convenience
pub use adapters::{FileSegmentSource, Notifier, Player, SegmentSource};
pub use config::Settings;
pub use core::{PlaybackMonitor, SkipMode, SkipPolicy, TickAction, TickOutcome};
pub use dialog::{ModalPrompt, PromptOutcome, SkipPrompt};
pub use domain::{PlaybackCategory, Segment, SegmentId};
