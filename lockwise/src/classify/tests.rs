use super::*;
use crate::graph::{FuncId, NodeRef};

fn node(func: usize, node: usize) -> NodeRef {
    NodeRef {
        func: FuncId(func),
        node,
    }
}

fn pair(acquire: NodeRef, matched: Option<NodeRef>, kind: PairKind) -> MatchingPair {
    MatchingPair {
        acquire,
        matched,
        kind,
    }
}

#[test]
fn safe_only_is_paired() {
    let a = node(0, 1);
    let verdicts = classify_events(&[pair(a, Some(node(0, 3)), PairKind::Safe)]);
    assert_eq!(verdicts.len(), 1);
    assert_eq!(verdicts[0].class, EventClass::Paired);
}

#[test]
fn safe_plus_dangling_is_partially_paired() {
    let a = node(0, 1);
    let verdicts = classify_events(&[
        pair(a, Some(node(0, 3)), PairKind::Safe),
        pair(a, None, PairKind::Dangling),
    ]);
    assert_eq!(verdicts[0].class, EventClass::PartiallyPaired);
}

#[test]
fn deadlock_without_safe_is_deadlock() {
    let a = node(0, 1);
    let verdicts = classify_events(&[
        pair(a, Some(node(0, 2)), PairKind::Deadlocked),
        pair(a, None, PairKind::Dangling),
    ]);
    assert_eq!(verdicts[0].class, EventClass::Deadlock);
}

#[test]
fn dangling_only_is_unpaired() {
    let a = node(0, 1);
    let verdicts = classify_events(&[pair(a, None, PairKind::Dangling)]);
    assert_eq!(verdicts[0].class, EventClass::Unpaired);
}

#[test]
fn classification_partitions_every_event() {
    let pairs = vec![
        pair(node(0, 1), Some(node(0, 5)), PairKind::Safe),
        pair(node(0, 2), Some(node(0, 3)), PairKind::Deadlocked),
        pair(node(1, 1), None, PairKind::Dangling),
        pair(node(1, 1), Some(node(1, 4)), PairKind::Safe),
    ];
    let verdicts = classify_events(&pairs);
    assert_eq!(verdicts.len(), 3);
    let mut counts = ClassCounts::default();
    for v in &verdicts {
        counts.record(v.class);
    }
    assert_eq!(counts.total, 3);
    assert_eq!(
        counts.paired + counts.partially_paired + counts.deadlock + counts.unpaired,
        counts.total
    );
}

#[test]
fn all_not_valid_event_is_excluded() {
    let a = node(0, 1);
    let verdicts = classify_events(&[pair(a, None, PairKind::NotValid)]);
    assert!(verdicts.is_empty());
}
