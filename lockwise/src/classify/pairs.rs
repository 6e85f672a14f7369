use rustc_hash::FxHashMap;
use serde::Serialize;

use crate::graph::NodeRef;

/// How one discovered acquire/match relationship is classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum PairKind {
    /// Acquire matched by a release on this path.
    Safe,
    /// Acquire re-entered while the lock was already held.
    Deadlocked,
    /// Acquire still held when the envelope root exits.
    Dangling,
    /// Structural pair contradicted by the multi-state branch map.
    NotValid,
}

/// A discovered (acquire, match-or-exit) relationship.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct MatchingPair {
    /// The acquire event.
    pub acquire: NodeRef,
    /// Matching event: the release, the second acquire for deadlocks, or
    /// `None` for function exit.
    pub matched: Option<NodeRef>,
    /// Classification of this pair.
    pub kind: PairKind,
}

/// Final classification of one physical acquire event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum EventClass {
    /// Safe pairs only.
    Paired,
    /// Safe pairs alongside dangling or deadlocked ones.
    PartiallyPaired,
    /// Deadlocked pairs without any safe pair.
    Deadlock,
    /// Dangling pairs only.
    Unpaired,
}

/// Per-acquire-event verdict with its supporting pairs.
#[derive(Debug, Clone)]
pub struct EventVerdict {
    /// The acquire event.
    pub acquire: NodeRef,
    /// Classification.
    pub class: EventClass,
    /// The pairs supporting the verdict (NotValid pairs excluded).
    pub pairs: Vec<MatchingPair>,
}

/// Folds raw pairs into one verdict per acquire event.
///
/// Every classified event belongs to exactly one class. Events whose pairs
/// are all `NotValid` never acquired on any feasible path and are excluded
/// entirely.
#[must_use]
pub fn classify_events(pairs: &[MatchingPair]) -> Vec<EventVerdict> {
    let mut by_acquire: FxHashMap<NodeRef, Vec<MatchingPair>> = FxHashMap::default();
    for p in pairs {
        by_acquire.entry(p.acquire).or_default().push(*p);
    }

    let mut verdicts: Vec<EventVerdict> = by_acquire
        .into_iter()
        .filter_map(|(acquire, mut event_pairs)| {
            event_pairs.retain(|p| p.kind != PairKind::NotValid);
            if event_pairs.is_empty() {
                return None;
            }
            event_pairs.sort_unstable_by_key(|p| (p.matched, p.kind as u8));

            let safe = event_pairs.iter().any(|p| p.kind == PairKind::Safe);
            let deadlocked = event_pairs.iter().any(|p| p.kind == PairKind::Deadlocked);
            let dangling = event_pairs.iter().any(|p| p.kind == PairKind::Dangling);

            let class = match (safe, deadlocked, dangling) {
                (true, false, false) => EventClass::Paired,
                (true, _, _) => EventClass::PartiallyPaired,
                (false, true, _) => EventClass::Deadlock,
                (false, false, _) => EventClass::Unpaired,
            };
            Some(EventVerdict {
                acquire,
                class,
                pairs: event_pairs,
            })
        })
        .collect();

    verdicts.sort_unstable_by_key(|v| v.acquire);
    verdicts
}
