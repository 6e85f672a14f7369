use compact_str::CompactString;
use serde::Serialize;
use smallvec::SmallVec;
use std::fmt;

/// Index of a function within the program graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct FuncId(pub usize);

/// Global reference to one CFG node: function plus node index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeRef {
    /// Owning function.
    pub func: FuncId,
    /// Node index inside that function's CFG.
    pub node: usize,
}

/// Position of a statement in the original C source.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct SourceLocation {
    /// Source file path as reported by the indexer.
    pub file: CompactString,
    /// 1-indexed line number.
    pub line: u32,
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

/// A call site attached to one CFG node.
///
/// Target resolution (including function pointers) happened upstream in the
/// indexer; a call site carries the resolved callee name.
#[derive(Debug, Clone)]
pub struct CallSite {
    /// CFG node containing the call.
    pub node: usize,
    /// Resolved callee name.
    pub callee: CompactString,
    /// Lock-argument text, when the callee takes a resource argument.
    pub resource: Option<CompactString>,
    /// Source-order index of this call within its function.
    pub order: usize,
}

/// One CFG statement or branch point.
#[derive(Debug, Clone)]
pub struct CfgNode {
    /// Dense node index within the owning CFG.
    pub id: usize,
    /// Statement or condition text.
    pub label: CompactString,
    /// Master entry flag. Exactly one node per CFG carries it.
    pub is_entry: bool,
    /// Master exit flag. Exactly one node per CFG carries it.
    pub is_exit: bool,
    /// Branch point: outgoing edges carry condition values.
    pub is_condition: bool,
    /// Source position.
    pub location: SourceLocation,
}

/// Directed CFG edge.
#[derive(Debug, Clone, Copy)]
pub struct CfgEdge {
    /// Source node index.
    pub from: usize,
    /// Target node index.
    pub to: usize,
    /// Branch value when the source is a condition node. Condition edges
    /// from the same node carry disjoint values.
    pub cond: Option<bool>,
    /// Tagged by the loader's DFS; back edges form the natural loops.
    pub back_edge: bool,
}

/// Control-flow graph of one function.
///
/// Normalized by the loader: exactly one master entry and one master exit,
/// back edges tagged.
#[derive(Debug, Clone)]
pub struct Cfg {
    /// Nodes indexed by id.
    pub nodes: Vec<CfgNode>,
    /// All edges.
    pub edges: Vec<CfgEdge>,
    /// Master entry node index.
    pub entry: usize,
    /// Master exit node index.
    pub exit: usize,
    /// Outgoing edge indices per node.
    pub succs: Vec<SmallVec<[usize; 2]>>,
    /// Incoming edge indices per node.
    pub preds: Vec<SmallVec<[usize; 2]>>,
}

impl Cfg {
    /// Iterates outgoing edges of `node`.
    pub fn successors(&self, node: usize) -> impl Iterator<Item = &CfgEdge> + '_ {
        self.succs[node].iter().map(move |&e| &self.edges[e])
    }

    /// Iterates incoming edges of `node`.
    pub fn predecessors(&self, node: usize) -> impl Iterator<Item = &CfgEdge> + '_ {
        self.preds[node].iter().map(move |&e| &self.edges[e])
    }

    /// A node is disconnected when it has neither predecessors nor
    /// successors. Single-node graphs are exempt.
    #[must_use]
    pub fn has_disconnected_node(&self) -> bool {
        self.nodes.len() > 1
            && self
                .nodes
                .iter()
                .any(|n| self.succs[n.id].is_empty() && self.preds[n.id].is_empty())
    }
}

/// One function owning a CFG plus its call sites.
#[derive(Debug, Clone)]
pub struct Function {
    /// Function name, unique within the program graph.
    pub name: CompactString,
    /// Normalized control-flow graph.
    pub cfg: Cfg,
    /// Call sites in source order.
    pub calls: Vec<CallSite>,
}

impl Function {
    /// Returns the call site attached to `node`, if any.
    #[must_use]
    pub fn call_at(&self, node: usize) -> Option<&CallSite> {
        self.calls.iter().find(|c| c.node == node)
    }
}
