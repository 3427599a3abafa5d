//! Segment entity: a labeled time interval within a video.
//!
//! Segments are built once per parse pass and are immutable apart from the
//! chained jump point, which only the linker writes.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use unicode_normalization::UnicodeNormalization;

/// Label used when a source provides none
pub const DEFAULT_LABEL: &str = "segment";

/// Default prompt timeout hint in seconds
pub const DEFAULT_TIMEOUT_SECS: f64 = 5.0;

/// Errors raised while constructing a segment
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SegmentError {
    #[error("Segment end time ({end}) must not be before start time ({start})")]
    InvalidSegment { start: f64, end: f64 },

    #[error("Segment bounds must be finite and non-negative: {start}-{end}")]
    InvalidBounds { start: f64, end: f64 },
}

/// Normalize a label for consistent matching (NFKC, trimmed, lower-cased)
pub fn normalize_label(text: &str) -> String {
    text.nfkc().collect::<String>().trim().to_lowercase()
}

/// Where a segment came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    /// Line-oriented edit decision list
    Edl,

    /// Matroska-style chapter XML
    Xml,

    /// Anything else (host supplied)
    Other(String),
}

impl Provenance {
    pub fn as_str(&self) -> &str {
        match self {
            Provenance::Edl => "edl",
            Provenance::Xml => "xml",
            Provenance::Other(tag) => tag,
        }
    }
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Session-scoped identity of a segment: its bounds rounded to whole seconds.
///
/// Rounding absorbs clock jitter from the host player. Two distinct segments
/// whose bounds round to the same pair collide, which is tolerated because
/// segment lists are small and gaps usually exceed a second.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SegmentId {
    pub start: i64,
    pub end: i64,
}

impl SegmentId {
    pub fn new(start: i64, end: i64) -> Self {
        Self { start, end }
    }

    pub fn from_bounds(start: f64, end: f64) -> Self {
        Self {
            start: start.round() as i64,
            end: end.round() as i64,
        }
    }
}

impl fmt::Display for SegmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.start, self.end)
    }
}

/// A chained jump computed by the linker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JumpPoint {
    /// Where a skip of this segment lands
    pub start: f64,

    /// Human-readable description of the target, e.g. `nested segment 'recap'`
    pub info: String,
}

/// A labeled time interval
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    start: f64,
    end: f64,
    label: String,
    source: Provenance,
    action_type: Option<String>,
    timeout: f64,
    allow_input: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    next_jump: Option<JumpPoint>,
}

impl Segment {
    /// Create a segment, rejecting reversed or non-finite bounds
    pub fn new(
        start: f64,
        end: f64,
        label: &str,
        source: Provenance,
    ) -> Result<Self, SegmentError> {
        if !start.is_finite() || !end.is_finite() || start < 0.0 {
            return Err(SegmentError::InvalidBounds { start, end });
        }
        if end < start {
            return Err(SegmentError::InvalidSegment { start, end });
        }

        let mut label = normalize_label(label);
        if label.is_empty() {
            label = DEFAULT_LABEL.to_string();
        }

        Ok(Self {
            start,
            end,
            label,
            source,
            action_type: None,
            timeout: DEFAULT_TIMEOUT_SECS,
            allow_input: true,
            next_jump: None,
        })
    }

    /// Attach a secondary action tag (normalized; empty tags are dropped)
    pub fn with_action_type(mut self, action_type: &str) -> Self {
        let normalized = normalize_label(action_type);
        self.action_type = (!normalized.is_empty()).then_some(normalized);
        self
    }

    /// Override the presentation hints
    pub fn with_presentation(mut self, timeout: f64, allow_input: bool) -> Self {
        self.timeout = timeout;
        self.allow_input = allow_input;
        self
    }

    pub fn start(&self) -> f64 {
        self.start
    }

    pub fn end(&self) -> f64 {
        self.end
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn source(&self) -> &Provenance {
        &self.source
    }

    pub fn action_type(&self) -> Option<&str> {
        self.action_type.as_deref()
    }

    pub fn timeout(&self) -> f64 {
        self.timeout
    }

    pub fn allow_input(&self) -> bool {
        self.allow_input
    }

    pub fn next_jump(&self) -> Option<&JumpPoint> {
        self.next_jump.as_ref()
    }

    pub fn next_jump_start(&self) -> Option<f64> {
        self.next_jump.as_ref().map(|j| j.start)
    }

    pub fn next_jump_info(&self) -> Option<&str> {
        self.next_jump.as_ref().map(|j| j.info.as_str())
    }

    pub(crate) fn set_next_jump(&mut self, start: f64, info: String) {
        self.next_jump = Some(JumpPoint { start, info });
    }

    pub(crate) fn clear_next_jump(&mut self) {
        self.next_jump = None;
    }

    pub fn id(&self) -> SegmentId {
        SegmentId::from_bounds(self.start, self.end)
    }

    /// Whether `time` falls inside the segment (both bounds inclusive)
    pub fn is_active(&self, time: f64) -> bool {
        self.start <= time && time <= self.end
    }

    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    /// Where skipping this segment lands: the chained jump, or one second past the end
    pub fn jump_target(&self) -> f64 {
        self.next_jump_start().unwrap_or(self.end + 1.0)
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}-{}] ({}", self.label, self.start, self.end, self.source)?;
        if let Some(ref action) = self.action_type {
            write!(f, ", action={}", action)?;
        }
        if let Some(ref jump) = self.next_jump {
            write!(f, ", next_jump={}, next_info={}", jump.start, jump.info)?;
        }
        write!(f, ")")
    }
}
