//! Pairwise interval relations between segments.
//!
//! Segment counts per video are in the tens, so every relation is computed
//! pairwise; there is no interval index.

use super::segment::Segment;

/// Classification of two segments relative to each other
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    /// No shared time (touching endpoints count as disjoint)
    Disjoint,

    /// The second segment lies inside the first (includes equal spans)
    Contains,

    /// The first segment lies inside the second
    ContainedBy,

    /// They intersect without either containing the other
    Overlapping,
}

/// Whether `inner` is fully contained in `outer`.
///
/// Equal spans are nested in each other; callers treat that case as nesting.
pub fn is_nested(outer: &Segment, inner: &Segment) -> bool {
    inner.start() >= outer.start() && inner.end() <= outer.end()
}

/// Whether two segments share any time at all
pub fn intersects(a: &Segment, b: &Segment) -> bool {
    a.end() > b.start() && b.end() > a.start()
}

/// Whether two segments intersect without either being nested in the other
pub fn is_overlapping(a: &Segment, b: &Segment) -> bool {
    intersects(a, b) && !is_nested(a, b) && !is_nested(b, a)
}

/// Classify `b` relative to `a`
pub fn relation(a: &Segment, b: &Segment) -> Relation {
    if is_nested(a, b) {
        Relation::Contains
    } else if is_nested(b, a) {
        Relation::ContainedBy
    } else if intersects(a, b) {
        Relation::Overlapping
    } else {
        Relation::Disjoint
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::segment::Provenance;

    fn seg(start: f64, end: f64) -> Segment {
        Segment::new(start, end, "test", Provenance::Edl).unwrap()
    }

    #[test]
    fn test_nested() {
        let outer = seg(0.0, 30.0);
        let inner = seg(10.0, 20.0);

        assert!(is_nested(&outer, &inner));
        assert!(!is_nested(&inner, &outer));
        assert!(!is_overlapping(&outer, &inner));
        assert_eq!(relation(&outer, &inner), Relation::Contains);
        assert_eq!(relation(&inner, &outer), Relation::ContainedBy);
    }

    #[test]
    fn test_equal_spans_are_nested_not_overlapping() {
        let a = seg(10.0, 20.0);
        let b = seg(10.0, 20.0);

        assert!(is_nested(&a, &b));
        assert!(is_nested(&b, &a));
        assert!(!is_overlapping(&a, &b));
        assert_eq!(relation(&a, &b), Relation::Contains);
    }

    #[test]
    fn test_overlapping() {
        let a = seg(0.0, 20.0);
        let b = seg(15.0, 40.0);

        assert!(is_overlapping(&a, &b));
        assert!(is_overlapping(&b, &a));
        assert_eq!(relation(&a, &b), Relation::Overlapping);
    }

    #[test]
    fn test_touching_is_disjoint() {
        let a = seg(0.0, 10.0);
        let b = seg(10.0, 20.0);

        assert!(!intersects(&a, &b));
        assert!(!is_overlapping(&a, &b));
        assert_eq!(relation(&a, &b), Relation::Disjoint);
    }

    #[test]
    fn test_classification_is_exclusive_and_complete() {
        let bounds = [0.0, 5.0, 10.0, 15.0, 20.0];
        let mut segments = Vec::new();
        for (i, &s) in bounds.iter().enumerate() {
            for &e in &bounds[i..] {
                segments.push(seg(s, e));
            }
        }

        for a in &segments {
            for b in &segments {
                let nested_ab = is_nested(a, b);
                let nested_ba = is_nested(b, a);
                let overlap = is_overlapping(a, b);
                let disjoint = !intersects(a, b) && !nested_ab && !nested_ba;

                // Equal spans hold both nesting directions; count them once
                let nested = nested_ab || nested_ba;
                let holding = [nested, overlap, disjoint].iter().filter(|&&x| x).count();
                assert_eq!(holding, 1, "a={} b={}", a, b);
            }
        }
    }
}
