use rustc_hash::FxHashMap;
use serde::Serialize;
use smallvec::SmallVec;

/// Role a retained node plays in one verification run.
///
/// Assigned per run, never persisted on the program graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum EventRole {
    /// Call site invoking a configured acquire function.
    Acquire,
    /// Acquire whose success depends on a branch on the return value.
    MultiStateAcquire,
    /// Call site invoking a configured release function.
    Release,
    /// Call into another function of the matching pair envelope.
    EnvelopeCall,
}

/// Node of the event flow graph, referencing the CFG node it retains.
#[derive(Debug, Clone)]
pub struct EfgNode {
    /// Retained CFG node index.
    pub cfg_node: usize,
    /// Event role, when the node is an event.
    pub role: Option<EventRole>,
}

/// Directed EFG edge. Condition values are copied from the CFG edges the
/// splice traversal collapsed.
#[derive(Debug, Clone, Copy)]
pub struct EfgEdge {
    /// Source EFG node index.
    pub from: usize,
    /// Target EFG node index.
    pub to: usize,
    /// Branch value inherited from the spliced path.
    pub cond: Option<bool>,
    /// Survived back edge (both endpoints retained).
    pub back_edge: bool,
}

/// Event flow graph: the reachability-preserving quotient of a function's
/// CFG onto its event nodes.
#[derive(Debug)]
pub struct Efg {
    /// Retained nodes, sorted by CFG node id.
    pub nodes: Vec<EfgNode>,
    /// Edges between retained nodes.
    pub edges: Vec<EfgEdge>,
    /// Retained master entry (EFG index).
    pub entry: usize,
    /// Retained master exit (EFG index).
    pub exit: usize,
    /// Outgoing edge indices per EFG node.
    pub succs: Vec<SmallVec<[usize; 2]>>,
    /// CFG node id -> EFG index.
    pub by_cfg: FxHashMap<usize, usize>,
}

impl Efg {
    /// Iterates outgoing edges of an EFG node.
    pub fn successors(&self, node: usize) -> impl Iterator<Item = &EfgEdge> + '_ {
        self.succs[node].iter().map(move |&e| &self.edges[e])
    }

    /// Role of an EFG node.
    #[must_use]
    pub fn role(&self, node: usize) -> Option<EventRole> {
        self.nodes[node].role
    }

    /// True when `from` reaches `to` following EFG edges.
    #[must_use]
    pub fn reaches(&self, from: usize, to: usize) -> bool {
        let mut seen = vec![false; self.nodes.len()];
        let mut stack = vec![from];
        while let Some(n) = stack.pop() {
            if n == to {
                return true;
            }
            if std::mem::replace(&mut seen[n], true) {
                continue;
            }
            for e in self.successors(n) {
                stack.push(e.to);
            }
        }
        false
    }
}
