//! Domain types for the skip engine.
//!
//! This module contains the core data structures:
//! - Segment: a labeled time interval with chained jump metadata
//! - Relations: pairwise nesting/overlap classification
//! - Playback: item metadata and movie/episode inference

pub mod playback;
pub mod relations;
pub mod segment;

// Re-export commonly used types
pub use playback::{PlaybackCategory, PlaybackItem};
pub use relations::{intersects, is_nested, is_overlapping, relation, Relation};
pub use segment::{normalize_label, JumpPoint, Provenance, Segment, SegmentError, SegmentId};
