use compact_str::CompactString;
use rustc_hash::{FxHashMap, FxHashSet};

use super::types::{CallSite, Cfg, FuncId, Function, NodeRef, SourceLocation};

/// Read-only view of the whole program as produced by the upstream indexer.
#[derive(Debug, Default)]
pub struct ProgramGraph {
    functions: Vec<Function>,
    by_name: FxHashMap<CompactString, FuncId>,
}

/// Whole-program call graph: caller/callee adjacency over [`FuncId`]s.
///
/// Only calls whose target resolves to a function in the graph appear;
/// calls into external code (the lock API itself, libc) have no edge.
#[derive(Debug, Default)]
pub struct CallGraph {
    /// Callees per caller.
    pub callees: FxHashMap<FuncId, Vec<FuncId>>,
    /// Callers per callee.
    pub callers: FxHashMap<FuncId, Vec<FuncId>>,
}

impl ProgramGraph {
    /// Builds a program graph from already-normalized functions.
    #[must_use]
    pub fn new(functions: Vec<Function>) -> Self {
        let by_name = functions
            .iter()
            .enumerate()
            .map(|(i, f)| (f.name.clone(), FuncId(i)))
            .collect();
        Self { functions, by_name }
    }

    /// Number of functions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.functions.len()
    }

    /// True when the graph holds no functions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    /// Returns the function with the given id.
    #[must_use]
    pub fn function(&self, id: FuncId) -> &Function {
        &self.functions[id.0]
    }

    /// Returns the CFG of `id`.
    #[must_use]
    pub fn cfg(&self, id: FuncId) -> &Cfg {
        &self.functions[id.0].cfg
    }

    /// Looks a function up by name.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<FuncId> {
        self.by_name.get(name).copied()
    }

    /// Iterates all functions with their ids.
    pub fn iter(&self) -> impl Iterator<Item = (FuncId, &Function)> {
        self.functions
            .iter()
            .enumerate()
            .map(|(i, f)| (FuncId(i), f))
    }

    /// Call sites contained in one CFG node.
    pub fn call_sites(&self, at: NodeRef) -> impl Iterator<Item = &CallSite> {
        self.functions[at.func.0]
            .calls
            .iter()
            .filter(move |c| c.node == at.node)
    }

    /// Resolves a call site to its target function, when the target lives in
    /// this graph.
    #[must_use]
    pub fn call_target(&self, site: &CallSite) -> Option<FuncId> {
        self.lookup(&site.callee)
    }

    /// Owning function of a node reference.
    #[must_use]
    pub fn containing_function(&self, node: NodeRef) -> &Function {
        &self.functions[node.func.0]
    }

    /// Source position of a node.
    #[must_use]
    pub fn source_location(&self, node: NodeRef) -> &SourceLocation {
        &self.functions[node.func.0].cfg.nodes[node.node].location
    }

    /// Derives the whole-program call graph.
    #[must_use]
    pub fn call_graph(&self) -> CallGraph {
        let mut cg = CallGraph::default();
        for (id, func) in self.iter() {
            let mut seen = FxHashSet::default();
            for site in &func.calls {
                if let Some(target) = self.call_target(site) {
                    if seen.insert(target) {
                        cg.callees.entry(id).or_default().push(target);
                        cg.callers.entry(target).or_default().push(id);
                    }
                }
            }
        }
        cg
    }
}
