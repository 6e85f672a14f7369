use std::collections::BTreeSet;

use rustc_hash::FxHashMap;
use smallvec::{smallvec, SmallVec};

use crate::classify::{MatchingPair, PairKind};
use crate::efg::{Efg, EventRole};
use crate::graph::{FuncId, NodeRef, ProgramGraph};
use crate::mpg::Mpg;

use super::status::PathStatus;
use super::summary::{ExitState, FunctionSummary};

/// Bottom-up verifier for one signature's envelope.
///
/// Expects one EFG per envelope member and walks them in the envelope's
/// callees-first order, so every call site finds its target's summary
/// already computed.
pub struct Verifier<'a> {
    graph: &'a ProgramGraph,
    mpg: &'a Mpg,
    efgs: &'a FxHashMap<FuncId, Efg>,
    summaries: FxHashMap<FuncId, FunctionSummary>,
    pairs: Vec<MatchingPair>,
}

impl<'a> Verifier<'a> {
    #[must_use]
    pub fn new(graph: &'a ProgramGraph, mpg: &'a Mpg, efgs: &'a FxHashMap<FuncId, Efg>) -> Self {
        Self {
            graph,
            mpg,
            efgs,
            summaries: FxHashMap::default(),
            pairs: Vec::new(),
        }
    }

    /// Runs the fixpoint over every envelope member.
    pub fn run(&mut self) {
        let mpg = self.mpg;
        for &f in &mpg.topo {
            let (summary, pairs) = self.traverse(f);
            self.summaries.insert(f, summary);
            self.pairs.extend(pairs);
        }
        self.pairs
            .sort_unstable_by_key(|p| (p.acquire, p.matched, p.kind as u8));
        self.pairs.dedup();
    }

    /// Computed summaries, keyed by function.
    #[must_use]
    pub fn summaries(&self) -> &FxHashMap<FuncId, FunctionSummary> {
        &self.summaries
    }

    /// All discovered pairs, sorted and deduplicated.
    #[must_use]
    pub fn into_pairs(self) -> Vec<MatchingPair> {
        self.pairs
    }

    /// One worklist walk over `f`'s EFG.
    ///
    /// States are propagated individually; the per-node memo keeps the join
    /// of everything seen and is used only to prune revisits whose state
    /// adds no new fact.
    fn traverse(&self, f: FuncId) -> (FunctionSummary, Vec<MatchingPair>) {
        let efg = &self.efgs[&f];
        let is_root = self.mpg.roots.contains(&f);

        let mut pairs: Vec<MatchingPair> = Vec::new();
        let mut entry_acquires: BTreeSet<NodeRef> = BTreeSet::new();
        let mut entry_releases: BTreeSet<NodeRef> = BTreeSet::new();
        let mut summary = FunctionSummary::default();

        let mut memo: Vec<Option<PathStatus>> = vec![None; efg.nodes.len()];
        let entry_state = PathStatus::through();
        memo[efg.entry] = Some(entry_state.clone());
        let mut work: Vec<(usize, PathStatus)> = vec![(efg.entry, entry_state)];

        while let Some((n, state)) = work.pop() {
            let outs = self.step(
                f,
                efg,
                n,
                state,
                &mut pairs,
                &mut entry_acquires,
                &mut entry_releases,
            );

            if n == efg.exit {
                for out in &outs {
                    if is_root {
                        for a in out.in_flight() {
                            pairs.push(MatchingPair {
                                acquire: a,
                                matched: None,
                                kind: PairKind::Dangling,
                            });
                        }
                    }
                    summary.push_exit(ExitState::from_status(out));
                }
                continue;
            }

            for out in outs {
                for edge in efg.successors(n) {
                    let next = edge.to;
                    let revisit = match &mut memo[next] {
                        Some(stored) => {
                            if out.is_subset_of(stored) {
                                false
                            } else {
                                stored.join(&out);
                                true
                            }
                        }
                        slot => {
                            *slot = Some(out.clone());
                            true
                        }
                    };
                    if revisit {
                        work.push((next, out.clone()));
                    }
                }
            }
        }

        summary.entry_acquires = entry_acquires.into_iter().collect();
        summary.entry_releases = entry_releases.into_iter().collect();
        (summary, pairs)
    }

    #[allow(clippy::too_many_arguments)]
    fn step(
        &self,
        f: FuncId,
        efg: &Efg,
        n: usize,
        mut state: PathStatus,
        pairs: &mut Vec<MatchingPair>,
        entry_acquires: &mut BTreeSet<NodeRef>,
        entry_releases: &mut BTreeSet<NodeRef>,
    ) -> SmallVec<[PathStatus; 2]> {
        let here = NodeRef {
            func: f,
            node: efg.nodes[n].cfg_node,
        };
        match efg.role(n) {
            None => smallvec![state],
            Some(EventRole::Acquire) => {
                if !state.unlock_seen() {
                    entry_acquires.insert(here);
                }
                if state.held() {
                    for a in state.in_flight() {
                        pairs.push(MatchingPair {
                            acquire: a,
                            matched: Some(here),
                            kind: PairKind::Deadlocked,
                        });
                    }
                    state.add_in_flight(here);
                } else {
                    state.begin_tracking(here);
                }
                smallvec![state]
            }
            Some(EventRole::MultiStateAcquire) => {
                // Try-style acquires fail instead of blocking, so the held
                // case forks without a deadlock pair and the failure leg
                // falls through unchanged.
                let mut success = state.clone();
                if success.held() {
                    success.add_in_flight(here);
                } else {
                    success.begin_tracking(here);
                }
                smallvec![success, state]
            }
            Some(EventRole::Release) => {
                if state.held() {
                    for a in state.in_flight() {
                        pairs.push(MatchingPair {
                            acquire: a,
                            matched: Some(here),
                            kind: PairKind::Safe,
                        });
                    }
                    state.discharge();
                } else if state.acq_seen() {
                    state.mark_unlock_seen();
                } else {
                    entry_releases.insert(here);
                    state.record_entry_clear(here);
                }
                smallvec![state]
            }
            Some(EventRole::EnvelopeCall) => {
                self.apply_call(here, &state, pairs, entry_acquires, entry_releases)
            }
        }
    }

    /// Splices resolved callee summaries into the caller's state.
    fn apply_call(
        &self,
        here: NodeRef,
        state: &PathStatus,
        pairs: &mut Vec<MatchingPair>,
        entry_acquires: &mut BTreeSet<NodeRef>,
        entry_releases: &mut BTreeSet<NodeRef>,
    ) -> SmallVec<[PathStatus; 2]> {
        let callees: SmallVec<[FuncId; 2]> = self
            .graph
            .call_sites(here)
            .filter_map(|site| self.graph.call_target(site))
            .filter(|t| self.summaries.contains_key(t))
            .collect();
        if callees.is_empty() {
            return smallvec![state.clone()];
        }

        let mut outs: SmallVec<[PathStatus; 2]> = SmallVec::new();
        for callee in callees {
            let summary = &self.summaries[&callee];

            if state.held() {
                for a in state.in_flight() {
                    for &ca in &summary.entry_acquires {
                        pairs.push(MatchingPair {
                            acquire: a,
                            matched: Some(ca),
                            kind: PairKind::Deadlocked,
                        });
                    }
                    for &cr in &summary.entry_releases {
                        pairs.push(MatchingPair {
                            acquire: a,
                            matched: Some(cr),
                            kind: PairKind::Safe,
                        });
                    }
                }
            }

            // The callee's entry events become the caller's entry events
            // when nothing in the caller shadowed them yet.
            if !state.unlock_seen() {
                entry_acquires.extend(summary.entry_acquires.iter().copied());
            }
            if !state.acq_seen() {
                entry_releases.extend(summary.entry_releases.iter().copied());
            }

            if summary.exit_states.is_empty() {
                outs.push(state.clone());
                continue;
            }
            for variant in &summary.exit_states {
                let mut out = state.clone();
                if variant.clears_entry {
                    if out.held() {
                        out.discharge();
                    } else {
                        if !out.acq_seen() {
                            for &r in &variant.clearing {
                                out.record_entry_clear(r);
                            }
                        }
                        out.mark_unlock_seen();
                    }
                }
                for &a in &variant.in_flight {
                    out.add_in_flight(a);
                }
                if !outs.contains(&out) {
                    outs.push(out);
                }
            }
        }
        outs
    }
}
