//! Dominator tree and dominance frontiers over the back-edge-stripped CFG.
//!
//! Iterative Cooper–Harvey–Kennedy: immediate dominators converge over a
//! reverse-postorder sweep, frontiers come from the classic two-predecessor
//! walk, and the iterated frontier closes the event set.

use rustc_hash::FxHashSet;

/// Dominator information for one acyclic flow graph.
///
/// Nodes unreachable from the entry have no dominator entry and never appear
/// in any frontier.
pub(super) struct Dominators {
    /// Immediate dominator per node; `idom[entry] == entry`, unreachable
    /// nodes are `usize::MAX`.
    idom: Vec<usize>,
    /// Reverse postorder position per node (`usize::MAX` when unreachable).
    rpo_pos: Vec<usize>,
}

const UNREACHED: usize = usize::MAX;

impl Dominators {
    /// Computes immediate dominators for the graph given by `succs`/`preds`
    /// adjacency (already stripped of back edges).
    pub(super) fn compute(succs: &[Vec<usize>], preds: &[Vec<usize>], entry: usize) -> Self {
        let n = succs.len();
        let rpo = reverse_postorder(succs, entry);
        let mut rpo_pos = vec![UNREACHED; n];
        for (pos, &node) in rpo.iter().enumerate() {
            rpo_pos[node] = pos;
        }

        let mut idom = vec![UNREACHED; n];
        idom[entry] = entry;

        let mut changed = true;
        while changed {
            changed = false;
            for &node in rpo.iter().skip(1) {
                let mut new_idom = UNREACHED;
                for &p in &preds[node] {
                    if idom[p] == UNREACHED {
                        continue;
                    }
                    new_idom = if new_idom == UNREACHED {
                        p
                    } else {
                        intersect(&idom, &rpo_pos, new_idom, p)
                    };
                }
                if new_idom != UNREACHED && idom[node] != new_idom {
                    idom[node] = new_idom;
                    changed = true;
                }
            }
        }

        Self { idom, rpo_pos }
    }

    /// True when the node was reachable from the entry.
    pub(super) fn is_reachable(&self, node: usize) -> bool {
        self.rpo_pos[node] != UNREACHED
    }

    /// Dominance frontier of every node.
    pub(super) fn frontiers(&self, preds: &[Vec<usize>]) -> Vec<FxHashSet<usize>> {
        let n = preds.len();
        let mut df: Vec<FxHashSet<usize>> = vec![FxHashSet::default(); n];
        for node in 0..n {
            if !self.is_reachable(node) || preds[node].len() < 2 {
                continue;
            }
            for &p in &preds[node] {
                if self.idom[p] == UNREACHED {
                    continue;
                }
                let mut runner = p;
                while runner != self.idom[node] {
                    df[runner].insert(node);
                    runner = self.idom[runner];
                }
            }
        }
        df
    }

    /// Iterated dominance frontier of `seed`: the smallest set closed under
    /// taking frontiers, which is exactly the node set whose removal could
    /// merge or split event-reachability information.
    pub(super) fn iterated_frontier(
        &self,
        df: &[FxHashSet<usize>],
        seed: &FxHashSet<usize>,
    ) -> FxHashSet<usize> {
        let mut result = FxHashSet::default();
        let mut worklist: Vec<usize> = seed.iter().copied().collect();
        while let Some(node) = worklist.pop() {
            for &f in &df[node] {
                if result.insert(f) {
                    worklist.push(f);
                }
            }
        }
        result
    }
}

fn intersect(idom: &[usize], rpo_pos: &[usize], a: usize, b: usize) -> usize {
    let (mut a, mut b) = (a, b);
    while a != b {
        while rpo_pos[a] > rpo_pos[b] {
            a = idom[a];
        }
        while rpo_pos[b] > rpo_pos[a] {
            b = idom[b];
        }
    }
    a
}

fn reverse_postorder(succs: &[Vec<usize>], entry: usize) -> Vec<usize> {
    let n = succs.len();
    let mut visited = vec![false; n];
    let mut postorder = Vec::with_capacity(n);
    // (node, next successor position)
    let mut stack: Vec<(usize, usize)> = vec![(entry, 0)];
    visited[entry] = true;

    while let Some(&mut (node, ref mut pos)) = stack.last_mut() {
        if let Some(&next) = succs[node].get(*pos) {
            *pos += 1;
            if !visited[next] {
                visited[next] = true;
                stack.push((next, 0));
            }
        } else {
            postorder.push(node);
            stack.pop();
        }
    }

    postorder.reverse();
    postorder
}
