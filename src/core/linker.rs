//! Segment linking: ordering, overlap elimination, and jump chaining.
//!
//! Linking runs in two passes:
//! 1. **Filter**: sort by start and, when configured, drop every segment that
//!    intersects one already accepted (earlier start wins).
//! 2. **Link**: point each segment's jump at the closest following segment it
//!    contains or overlaps, so a skip lands at the start of the next
//!    interesting region instead of past it.
//!
//! The monitor recomputes the chain with [`reevaluate`] on every tick, so jump
//! points always reflect the current playback position.

use tracing::{debug, trace};

use crate::domain::relations::{intersects, is_nested, is_overlapping, relation, Relation};
use crate::domain::Segment;

/// Output of [`link`]
#[derive(Debug, Clone, Default)]
pub struct Linked {
    /// Sorted, filtered, chained segments
    pub segments: Vec<Segment>,

    /// Whether any nested or overlapping pair survived filtering
    pub has_relations: bool,
}

/// Sort, filter, and chain a freshly parsed segment list.
///
/// `reference_time` makes nesting context aware: a parent whose nested child
/// already started (relative to the reference) resolves to its own end.
pub fn link(
    mut segments: Vec<Segment>,
    reference_time: Option<f64>,
    eliminate_overlaps: bool,
) -> Linked {
    // Parents before children when starts tie
    segments.sort_by(|a, b| {
        a.start()
            .total_cmp(&b.start())
            .then_with(|| b.end().total_cmp(&a.end()))
    });

    if eliminate_overlaps {
        segments = filter_overlaps(segments);
    }

    let mut has_relations = false;
    for i in 0..segments.len() {
        let Some((j, kind)) = first_related(&segments, i) else {
            continue;
        };
        has_relations = true;

        match kind {
            Relation::Contains => {
                let child_start = segments[j].start();
                let child_end = segments[j].end();
                let child_label = segments[j].label().to_string();
                let parent_label = segments[i].label().to_string();

                if reference_time.map_or(true, |t| t < child_start) {
                    debug!(
                        parent = %segments[i],
                        child = %segments[j],
                        "Chaining parent to nested segment"
                    );
                    segments[i]
                        .set_next_jump(child_start, format!("nested segment '{}'", child_label));
                } else {
                    debug!(parent = %segments[i], "Nested segment already reached, parent skips to its end");
                }

                // A nested child resolves to its own end, never its parent's
                segments[j].set_next_jump(child_end, format!("remaining {}", parent_label));
            }
            Relation::Overlapping => {
                let next_start = segments[j].start();
                let info = format!("overlapping segment '{}'", segments[j].label());
                debug!(segment = %segments[i], target = next_start, "Chaining to overlapping segment");
                segments[i].set_next_jump(next_start, info);
            }
            Relation::ContainedBy | Relation::Disjoint => {}
        }
    }

    debug!(count = segments.len(), has_relations, "Linked segments");
    Linked {
        segments,
        has_relations,
    }
}

/// Recompute jump points relative to `current_time`.
///
/// A parent whose nested child is at or behind `current_time` resolves to its
/// own end. Any nested segment containing `current_time` is forced to jump to
/// its own end.
pub fn reevaluate(segments: &mut [Segment], current_time: f64) {
    trace!(count = segments.len(), current_time, "Re-evaluating jump points");

    for i in 0..segments.len() {
        segments[i].clear_next_jump();

        let Some((j, kind)) = first_related(segments, i) else {
            continue;
        };

        match kind {
            Relation::Contains if current_time < segments[j].start() => {
                let info = format!("nested segment '{}'", segments[j].label());
                let target = segments[j].start();
                segments[i].set_next_jump(target, info);
            }
            Relation::Overlapping => {
                let info = format!("overlapping segment '{}'", segments[j].label());
                let target = segments[j].start();
                segments[i].set_next_jump(target, info);
            }
            _ => {}
        }
    }

    for i in 0..segments.len() {
        if !segments[i].is_active(current_time) {
            continue;
        }
        let Some(parent) = (0..i).find(|&p| is_nested(&segments[p], &segments[i])) else {
            continue;
        };

        let end = segments[i].end();
        if segments[i].next_jump_start() != Some(end) {
            let info = format!("remaining {}", segments[parent].label());
            trace!(segment = %segments[i], "Forcing nested segment to jump to its own end");
            segments[i].set_next_jump(end, info);
        }
    }
}

/// The nested segment that `segments[index]`'s jump lands on, if any
pub fn nested_jump_target(segments: &[Segment], index: usize) -> Option<&Segment> {
    let parent = segments.get(index)?;
    let target = parent.next_jump_start()?;

    segments
        .iter()
        .enumerate()
        .find(|(k, s)| *k != index && s.start() == target && is_nested(parent, s))
        .map(|(_, s)| s)
}

/// Whether `segments[index]` is nested inside any other segment of the list
pub fn has_container(segments: &[Segment], index: usize) -> bool {
    let seg = &segments[index];
    segments
        .iter()
        .enumerate()
        .any(|(k, other)| k != index && other.id() != seg.id() && is_nested(other, seg))
}

/// A later segment active at `time` that is nested in or overlaps
/// `segments[index]`. Such a segment takes priority over the earlier one.
pub fn superseded_by(segments: &[Segment], index: usize, time: f64) -> Option<&Segment> {
    let current = segments.get(index)?;
    if !current.is_active(time) {
        return None;
    }

    segments
        .iter()
        .skip(index + 1)
        .filter(|later| later.is_active(time))
        .find(|later| is_nested(current, later) || is_overlapping(current, later))
}

/// First following segment (in sorted order) that `segments[i]` contains or
/// overlaps. Scanning stops at the first segment starting at or after the end.
fn first_related(segments: &[Segment], i: usize) -> Option<(usize, Relation)> {
    let current = &segments[i];

    for (j, next) in segments.iter().enumerate().skip(i + 1) {
        if next.start() >= current.end() {
            return None;
        }
        match relation(current, next) {
            kind @ (Relation::Contains | Relation::Overlapping) => return Some((j, kind)),
            Relation::ContainedBy | Relation::Disjoint => continue,
        }
    }

    None
}

fn filter_overlaps(segments: Vec<Segment>) -> Vec<Segment> {
    let mut accepted: Vec<Segment> = Vec::with_capacity(segments.len());

    for seg in segments {
        if accepted.iter().any(|existing| intersects(existing, &seg)) {
            debug!(segment = %seg, "Dropping segment that overlaps an earlier one");
            continue;
        }
        accepted.push(seg);
    }

    accepted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Provenance;

    fn seg(start: f64, end: f64, label: &str) -> Segment {
        Segment::new(start, end, label, Provenance::Edl).unwrap()
    }

    #[test]
    fn test_nested_chain_without_reference() {
        let linked = link(vec![seg(10.0, 20.0, "recap"), seg(0.0, 30.0, "intro")], None, false);
        let segs = &linked.segments;

        assert!(linked.has_relations);
        assert_eq!(segs[0].label(), "intro");
        assert_eq!(segs[0].next_jump_start(), Some(10.0));
        assert_eq!(segs[0].next_jump_info(), Some("nested segment 'recap'"));
        assert_eq!(segs[1].next_jump_start(), Some(20.0));
        assert_eq!(segs[1].next_jump_info(), Some("remaining intro"));
    }

    #[test]
    fn test_nested_chain_with_reference_past_child() {
        let linked = link(vec![seg(0.0, 30.0, "intro"), seg(10.0, 20.0, "recap")], Some(12.0), false);
        let segs = &linked.segments;

        assert_eq!(segs[0].next_jump_start(), None);
        assert_eq!(segs[0].jump_target(), 31.0);
        assert_eq!(segs[1].next_jump_start(), Some(20.0));
    }

    #[test]
    fn test_overlapping_chain() {
        let linked = link(vec![seg(0.0, 20.0, "intro"), seg(15.0, 40.0, "recap")], None, false);
        let segs = &linked.segments;

        assert_eq!(segs[0].next_jump_start(), Some(15.0));
        assert_eq!(segs[0].next_jump_info(), Some("overlapping segment 'recap'"));
        assert_eq!(segs[1].next_jump_start(), None);
    }

    #[test]
    fn test_overlap_elimination_first_wins() {
        let linked = link(vec![seg(15.0, 40.0, "recap"), seg(0.0, 20.0, "intro")], None, true);

        assert_eq!(linked.segments.len(), 1);
        assert_eq!(linked.segments[0].label(), "intro");
        assert!(!linked.has_relations);
    }

    #[test]
    fn test_disjoint_segments_stay_unchained() {
        let linked = link(vec![seg(0.0, 10.0, "intro"), seg(10.0, 20.0, "recap")], None, false);

        assert!(!linked.has_relations);
        assert!(linked.segments.iter().all(|s| s.next_jump().is_none()));
    }

    #[test]
    fn test_equal_starts_put_parent_first() {
        let linked = link(vec![seg(10.0, 20.0, "recap"), seg(10.0, 40.0, "intro")], None, false);
        let segs = &linked.segments;

        assert_eq!(segs[0].label(), "intro");
        assert_eq!(segs[0].next_jump_start(), Some(10.0));
        assert_eq!(segs[1].next_jump_start(), Some(20.0));
    }

    #[test]
    fn test_reevaluate_after_rewind_past_child() {
        let mut segs = link(vec![seg(0.0, 30.0, "intro"), seg(10.0, 20.0, "recap")], None, false).segments;
        assert_eq!(segs[0].next_jump_start(), Some(10.0));

        // Rewound into the parent after the child
        reevaluate(&mut segs, 25.0);
        assert_eq!(segs[0].next_jump_start(), None);
        assert_eq!(segs[0].jump_target(), 31.0);
        // Child not active at 25, so its jump is cleared as well
        assert_eq!(segs[1].next_jump_start(), None);

        reevaluate(&mut segs, 5.0);
        assert_eq!(segs[0].next_jump_start(), Some(10.0));
    }

    #[test]
    fn test_reevaluate_forces_active_child_to_own_end() {
        let mut segs = link(vec![seg(0.0, 30.0, "intro"), seg(10.0, 20.0, "recap")], None, false).segments;

        reevaluate(&mut segs, 15.0);
        assert_eq!(segs[0].next_jump_start(), None);
        assert_eq!(segs[1].next_jump_start(), Some(20.0));
        assert_eq!(segs[1].next_jump_info(), Some("remaining intro"));
    }

    #[test]
    fn test_nested_jump_target_lookup() {
        let segs = link(vec![seg(0.0, 30.0, "intro"), seg(10.0, 20.0, "recap")], None, false).segments;

        let target = nested_jump_target(&segs, 0).unwrap();
        assert_eq!(target.label(), "recap");
        assert!(nested_jump_target(&segs, 1).is_none());
        assert!(has_container(&segs, 1));
        assert!(!has_container(&segs, 0));
    }

    #[test]
    fn test_later_active_segment_takes_priority() {
        let segs = link(
            vec![seg(0.0, 30.0, "intro"), seg(10.0, 20.0, "recap"), seg(25.0, 40.0, "credits")],
            None,
            false,
        )
        .segments;

        assert!(superseded_by(&segs, 0, 5.0).is_none());
        assert_eq!(superseded_by(&segs, 0, 15.0).map(|s| s.label()), Some("recap"));
        assert!(superseded_by(&segs, 1, 15.0).is_none());
        assert_eq!(superseded_by(&segs, 0, 27.0).map(|s| s.label()), Some("credits"));
    }
}
