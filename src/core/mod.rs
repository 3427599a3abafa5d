//! Core skip engine.
//!
//! This module contains:
//! - Linker: ordering, overlap elimination, and jump chaining
//! - Policy: the preference lookups the engine depends on
//! - Session: per-video tracking state
//! - Monitor: the per-tick state machine

pub mod linker;
pub mod monitor;
pub mod policy;
pub mod session;

// Re-export commonly used types
pub use linker::{link, reevaluate, Linked};
pub use monitor::{MonitorHandle, PlaybackMonitor, PromptResult, SuppressReason, TickAction, TickOutcome};
pub use policy::{SkipMode, SkipPolicy};
pub use session::{LoadedSegments, MonitorSession};
