//! Linker Integration Tests
//!
//! Tests for relation classification, jump chaining, and re-evaluation.

use skippy::core::{link, reevaluate};
use skippy::domain::{is_nested, is_overlapping, relation, Provenance, Relation, Segment};

fn seg(start: f64, end: f64, label: &str) -> Segment {
    Segment::new(start, end, label, Provenance::Edl).unwrap()
}

#[test]
fn test_relation_classification_is_exclusive() {
    let bounds = [
        (0.0, 10.0),
        (0.0, 30.0),
        (5.0, 15.0),
        (10.0, 20.0),
        (10.0, 10.0),
        (20.0, 40.0),
        (30.0, 30.0),
        (35.0, 50.0),
    ];

    for &(a_start, a_end) in &bounds {
        for &(b_start, b_end) in &bounds {
            let a = seg(a_start, a_end, "a");
            let b = seg(b_start, b_end, "b");

            let disjoint = !(a.end() > b.start() && b.end() > a.start());
            let a_in_b = is_nested(&b, &a);
            let b_in_a = is_nested(&a, &b);
            let overlapping = is_overlapping(&a, &b);

            // Overlap excludes nesting in either direction
            assert!(!(overlapping && (a_in_b || b_in_a)), "{} / {}", a, b);
            assert!(!(overlapping && disjoint), "{} / {}", a, b);

            let held = [disjoint && !a_in_b && !b_in_a, a_in_b, b_in_a, overlapping]
                .iter()
                .filter(|&&x| x)
                .count();
            assert!(held >= 1, "no relation for {} / {}", a, b);

            // Only identical intervals are nested both ways
            if a_in_b && b_in_a {
                assert_eq!((a_start, a_end), (b_start, b_end));
            }
        }
    }
}

#[test]
fn test_relation_enum() {
    assert_eq!(relation(&seg(0.0, 30.0, "a"), &seg(10.0, 20.0, "b")), Relation::Contains);
    assert_eq!(relation(&seg(10.0, 20.0, "a"), &seg(0.0, 30.0, "b")), Relation::ContainedBy);
    assert_eq!(relation(&seg(0.0, 20.0, "a"), &seg(15.0, 40.0, "b")), Relation::Overlapping);
    assert_eq!(relation(&seg(0.0, 10.0, "a"), &seg(10.0, 20.0, "b")), Relation::Disjoint);
}

#[test]
fn test_nested_linking_example() {
    let linked = link(vec![seg(0.0, 30.0, "a"), seg(10.0, 20.0, "b")], None, false);

    assert_eq!(linked.segments[0].next_jump_start(), Some(10.0));
    assert_eq!(linked.segments[1].next_jump_start(), Some(20.0));
    assert_eq!(linked.segments[1].next_jump_info(), Some("remaining a"));
}

#[test]
fn test_overlap_linking_example() {
    let linked = link(vec![seg(0.0, 20.0, "a"), seg(15.0, 40.0, "b")], None, false);

    assert_eq!(linked.segments[0].next_jump_start(), Some(15.0));
    assert_eq!(linked.segments[1].next_jump_start(), None);
}

#[test]
fn test_overlap_elimination_example() {
    let linked = link(vec![seg(0.0, 20.0, "a"), seg(15.0, 40.0, "b")], None, true);

    assert_eq!(linked.segments.len(), 1);
    assert_eq!(linked.segments[0].label(), "a");
}

#[test]
fn test_chain_stops_at_first_related_segment() {
    // Parent contains two children; only the closest one is chained
    let linked = link(
        vec![seg(0.0, 60.0, "intro"), seg(10.0, 20.0, "recap"), seg(30.0, 40.0, "credits")],
        None,
        false,
    );
    let segs = &linked.segments;

    assert_eq!(segs[0].next_jump_start(), Some(10.0));
    assert_eq!(segs[1].next_jump_start(), Some(20.0));
    // Only the first child is chained back to its own end
    assert_eq!(segs[2].next_jump_start(), None);
}

#[test]
fn test_rewind_reevaluation_resolves_parent_to_own_end() {
    let mut segs = link(vec![seg(0.0, 30.0, "intro"), seg(10.0, 20.0, "recap")], None, false).segments;

    reevaluate(&mut segs, 22.0);

    assert_eq!(segs[0].next_jump_start(), None);
    assert_eq!(segs[0].jump_target(), 31.0);
}

#[test]
fn test_unsorted_input_is_ordered() {
    let linked = link(
        vec![seg(50.0, 60.0, "credits"), seg(0.0, 10.0, "intro"), seg(20.0, 30.0, "recap")],
        None,
        false,
    );
    let starts: Vec<f64> = linked.segments.iter().map(Segment::start).collect();

    assert_eq!(starts, vec![0.0, 20.0, 50.0]);
    assert!(!linked.has_relations);
}
