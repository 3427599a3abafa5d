//! Per-video monitor session state.
//!
//! A session lives from the first tick that sees a video until playback stops
//! or a different video starts. It owns the linked segment list and every
//! tracking collection the monitor consults.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{PlaybackCategory, Segment, SegmentId};

/// Segments loaded for a video
#[derive(Debug, Clone, Default)]
pub struct LoadedSegments {
    pub segments: Vec<Segment>,

    /// Whether a segment file existed (even if it yielded nothing usable)
    pub file_found: bool,

    pub has_relations: bool,
}

/// State for one playing video
#[derive(Debug, Clone)]
pub struct MonitorSession {
    /// Unique identifier for this session
    pub id: Uuid,

    /// When the session started
    pub started_at: DateTime<Utc>,

    source: PathBuf,
    category: PlaybackCategory,

    pub(crate) segments: Vec<Segment>,
    pub(crate) segment_file_found: bool,
    pub(crate) has_relations: bool,
    pub(crate) overlap_advisory_shown: bool,

    pub(crate) prompted: HashSet<SegmentId>,
    pub(crate) dismissed: HashSet<SegmentId>,
    pub(crate) skipped_to_nested: HashMap<SegmentId, Segment>,

    pub(crate) last_known_time: f64,
    pub(crate) ready_at: Option<Instant>,
    pub(crate) missing_toast_handled: bool,
    pub(crate) last_toast_at: Option<Instant>,
}

impl MonitorSession {
    pub fn new(source: PathBuf, category: PlaybackCategory, loaded: LoadedSegments) -> Self {
        Self {
            id: Uuid::new_v4(),
            started_at: Utc::now(),
            source,
            category,
            segments: loaded.segments,
            segment_file_found: loaded.file_found,
            has_relations: loaded.has_relations,
            overlap_advisory_shown: false,
            prompted: HashSet::new(),
            dismissed: HashSet::new(),
            skipped_to_nested: HashMap::new(),
            last_known_time: 0.0,
            ready_at: None,
            missing_toast_handled: false,
            last_toast_at: None,
        }
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn category(&self) -> PlaybackCategory {
        self.category
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn prompted(&self) -> &HashSet<SegmentId> {
        &self.prompted
    }

    pub fn dismissed(&self) -> &HashSet<SegmentId> {
        &self.dismissed
    }

    pub fn skipped_to_nested(&self) -> &HashMap<SegmentId, Segment> {
        &self.skipped_to_nested
    }

    pub fn last_known_time(&self) -> f64 {
        self.last_known_time
    }

    pub fn segment_file_found(&self) -> bool {
        self.segment_file_found
    }

    pub fn has_relations(&self) -> bool {
        self.has_relations
    }

    pub fn overlap_advisory_shown(&self) -> bool {
        self.overlap_advisory_shown
    }

    pub fn is_ready(&self) -> bool {
        self.ready_at.is_some()
    }

    /// Wall time since playback became ready
    pub fn ready_for(&self, now: Instant) -> Option<Duration> {
        self.ready_at.map(|at| now.saturating_duration_since(at))
    }

    /// Whether the last toast was shown less than `cooldown` ago
    pub(crate) fn toast_cooling_down(&self, now: Instant, cooldown: Duration) -> bool {
        self.last_toast_at
            .is_some_and(|at| now.saturating_duration_since(at) < cooldown)
    }

    /// Forget every prompt, dismissal and nested diversion
    pub(crate) fn clear_tracking(&mut self) {
        self.prompted.clear();
        self.dismissed.clear();
        self.skipped_to_nested.clear();
    }

    /// Restart from the top of the same video.
    ///
    /// The advisory flag and the toast cooldown survive; the advisory is
    /// shown at most once per video.
    pub(crate) fn restart(&mut self, loaded: LoadedSegments) {
        self.clear_tracking();
        self.segments = loaded.segments;
        self.segment_file_found = loaded.file_found;
        self.has_relations = loaded.has_relations;
        self.ready_at = None;
        self.last_known_time = 0.0;
        self.missing_toast_handled = false;
    }

    /// Record that the user declined `id`
    pub(crate) fn dismiss(&mut self, id: SegmentId) {
        self.dismissed.insert(id);
        self.prompted.insert(id);
    }

    /// Record a skip from `id` into its nested `target`
    pub(crate) fn divert_to_nested(&mut self, id: SegmentId, target: Segment) {
        self.skipped_to_nested.insert(id, target);
        self.prompted.insert(id);
        self.dismissed.remove(&id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Provenance;

    fn session() -> MonitorSession {
        let segments = vec![Segment::new(0.0, 30.0, "intro", Provenance::Edl).unwrap()];
        MonitorSession::new(
            PathBuf::from("/media/movie.mkv"),
            PlaybackCategory::Movie,
            LoadedSegments {
                segments,
                file_found: true,
                has_relations: false,
            },
        )
    }

    #[test]
    fn test_new_session_is_initializing() {
        let s = session();
        assert!(!s.is_ready());
        assert!(s.prompted().is_empty());
        assert_eq!(s.source(), Path::new("/media/movie.mkv"));
        assert_eq!(s.segments().len(), 1);
    }

    #[test]
    fn test_dismiss_marks_both_sets() {
        let mut s = session();
        let id = SegmentId::new(0, 30);
        s.dismiss(id);

        assert!(s.dismissed().contains(&id));
        assert!(s.prompted().contains(&id));
    }

    #[test]
    fn test_divert_clears_dismissal() {
        let mut s = session();
        let id = SegmentId::new(0, 30);
        let child = Segment::new(10.0, 20.0, "recap", Provenance::Edl).unwrap();

        s.dismiss(id);
        s.divert_to_nested(id, child);

        assert!(!s.dismissed().contains(&id));
        assert!(s.prompted().contains(&id));
        assert_eq!(s.skipped_to_nested()[&id].label(), "recap");
    }

    #[test]
    fn test_restart_keeps_advisory_flag() {
        let mut s = session();
        let now = Instant::now();
        s.overlap_advisory_shown = true;
        s.ready_at = Some(now);
        s.last_known_time = 42.0;
        s.last_toast_at = Some(now);
        s.prompted.insert(SegmentId::new(0, 30));

        s.restart(LoadedSegments::default());

        assert!(s.overlap_advisory_shown());
        assert!(!s.is_ready());
        assert_eq!(s.last_known_time(), 0.0);
        assert!(s.prompted().is_empty());
        assert!(s.toast_cooling_down(now, Duration::from_secs(6)));
    }
}
