//! Programmatic CFG and program-graph builders shared by unit and
//! integration tests.

use compact_str::CompactString;

use crate::graph::{CallSite, CfgEdge, CfgNode, Function, ProgramGraph, SourceLocation};

/// Builder for one function's CFG, mirroring the indexer's output without
/// going through JSON.
pub struct FunctionSketch {
    name: CompactString,
    file: CompactString,
    nodes: Vec<CfgNode>,
    edges: Vec<CfgEdge>,
    calls: Vec<CallSite>,
}

impl FunctionSketch {
    /// Starts a function named `name`; node lines are assigned sequentially.
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: CompactString::new(name),
            file: CompactString::new(format!("{name}.c")),
            nodes: Vec::new(),
            edges: Vec::new(),
            calls: Vec::new(),
        }
    }

    /// Adds an ordinary statement node and returns its index.
    pub fn node(&mut self, label: &str) -> usize {
        self.push_node(label, false)
    }

    /// Adds a branch-point node and returns its index.
    pub fn cond(&mut self, label: &str) -> usize {
        self.push_node(label, true)
    }

    fn push_node(&mut self, label: &str, is_condition: bool) -> usize {
        let id = self.nodes.len();
        self.nodes.push(CfgNode {
            id,
            label: CompactString::new(label),
            is_entry: false,
            is_exit: false,
            is_condition,
            location: SourceLocation {
                file: self.file.clone(),
                line: u32::try_from(id).unwrap_or(0) + 1,
            },
        });
        id
    }

    /// Adds an unconditional edge.
    pub fn edge(&mut self, from: usize, to: usize) -> &mut Self {
        self.edges.push(CfgEdge {
            from,
            to,
            cond: None,
            back_edge: false,
        });
        self
    }

    /// Adds a condition edge with the given branch value.
    pub fn cond_edge(&mut self, from: usize, to: usize, value: bool) -> &mut Self {
        self.edges.push(CfgEdge {
            from,
            to,
            cond: Some(value),
            back_edge: false,
        });
        self
    }

    /// Attaches a call site to `node`.
    pub fn call(&mut self, node: usize, callee: &str, resource: &str) -> &mut Self {
        let order = self.calls.len();
        self.calls.push(CallSite {
            node,
            callee: CompactString::new(callee),
            resource: Some(CompactString::new(resource)),
            order,
        });
        self
    }

    /// Attaches a call site without a resource argument (plain callee).
    pub fn plain_call(&mut self, node: usize, callee: &str) -> &mut Self {
        let order = self.calls.len();
        self.calls.push(CallSite {
            node,
            callee: CompactString::new(callee),
            resource: None,
            order,
        });
        self
    }

    /// Normalizes (master exit, adjacency, back-edge tags) and finishes.
    #[must_use]
    pub fn build(self) -> Function {
        let cfg = crate::graph::finish_cfg(self.nodes, self.edges, 0);
        Function {
            name: self.name,
            cfg,
            calls: self.calls,
        }
    }
}

/// Assembles functions into a [`ProgramGraph`].
#[derive(Default)]
pub struct ProgramSketch {
    functions: Vec<Function>,
}

impl ProgramSketch {
    /// Empty program.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a finished function.
    pub fn function(&mut self, func: Function) -> &mut Self {
        self.functions.push(func);
        self
    }

    /// Builds the program graph.
    #[must_use]
    pub fn build(self) -> ProgramGraph {
        ProgramGraph::new(self.functions)
    }
}
