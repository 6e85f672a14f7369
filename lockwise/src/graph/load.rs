//! JSON program-graph loader.
//!
//! The upstream C indexer serializes functions, CFG nodes/edges, and resolved
//! call sites into one JSON document. Loading normalizes each function:
//! - exactly one master entry (the declared entry, or node 0),
//! - exactly one master exit (synthesized when several nodes fall out),
//! - back edges tagged by a DFS from the entry.

use compact_str::CompactString;
use serde::Deserialize;
use smallvec::SmallVec;
use std::fs;
use std::path::Path;

use super::program::ProgramGraph;
use super::types::{CallSite, Cfg, CfgEdge, CfgNode, Function, SourceLocation};

/// Error while reading or normalizing a program graph file.
#[derive(Debug)]
pub enum LoadError {
    /// File could not be read.
    Io(std::io::Error),
    /// Document is not valid JSON or does not match the schema.
    Parse(serde_json::Error),
    /// A function's graph is malformed (bad edge target, missing nodes).
    Malformed {
        /// Offending function.
        function: String,
        /// What was wrong.
        cause: String,
    },
}

impl std::fmt::Display for LoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "cannot read program graph: {e}"),
            Self::Parse(e) => write!(f, "cannot parse program graph: {e}"),
            Self::Malformed { function, cause } => {
                write!(f, "malformed CFG for `{function}`: {cause}")
            }
        }
    }
}

impl std::error::Error for LoadError {}

#[derive(Debug, Deserialize)]
struct GraphDoc {
    functions: Vec<FunctionDoc>,
}

#[derive(Debug, Deserialize)]
struct FunctionDoc {
    name: CompactString,
    #[serde(default)]
    file: CompactString,
    nodes: Vec<NodeDoc>,
    #[serde(default)]
    edges: Vec<EdgeDoc>,
    #[serde(default)]
    calls: Vec<CallDoc>,
    /// Declared entry node id; defaults to the first node.
    #[serde(default)]
    entry: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct NodeDoc {
    id: usize,
    #[serde(default)]
    label: CompactString,
    #[serde(default)]
    line: u32,
    #[serde(default)]
    condition: bool,
}

#[derive(Debug, Deserialize)]
struct EdgeDoc {
    from: usize,
    to: usize,
    #[serde(default)]
    cond: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct CallDoc {
    node: usize,
    callee: CompactString,
    #[serde(default)]
    resource: Option<CompactString>,
}

/// Loads and normalizes a program graph from a JSON file.
pub fn load_program_graph(path: &Path) -> Result<ProgramGraph, LoadError> {
    let content = fs::read_to_string(path).map_err(LoadError::Io)?;
    parse_program_graph(&content)
}

/// Parses and normalizes a program graph from a JSON string.
pub fn parse_program_graph(content: &str) -> Result<ProgramGraph, LoadError> {
    let doc: GraphDoc = serde_json::from_str(content).map_err(LoadError::Parse)?;
    let mut functions = Vec::with_capacity(doc.functions.len());
    for func in doc.functions {
        functions.push(normalize_function(func)?);
    }
    Ok(ProgramGraph::new(functions))
}

fn normalize_function(doc: FunctionDoc) -> Result<Function, LoadError> {
    let malformed = |cause: String| LoadError::Malformed {
        function: doc.name.to_string(),
        cause,
    };

    if doc.nodes.is_empty() {
        return Err(malformed("function has no CFG nodes".to_owned()));
    }

    // Indexer node ids may be sparse; remap to dense indices.
    let mut id_map = rustc_hash::FxHashMap::default();
    let mut nodes: Vec<CfgNode> = Vec::with_capacity(doc.nodes.len());
    for (dense, n) in doc.nodes.iter().enumerate() {
        if id_map.insert(n.id, dense).is_some() {
            return Err(malformed(format!("duplicate node id {}", n.id)));
        }
        nodes.push(CfgNode {
            id: dense,
            label: n.label.clone(),
            is_entry: false,
            is_exit: false,
            is_condition: n.condition,
            location: SourceLocation {
                file: doc.file.clone(),
                line: n.line,
            },
        });
    }

    let remap = |id: usize| -> Result<usize, LoadError> {
        id_map
            .get(&id)
            .copied()
            .ok_or_else(|| malformed(format!("edge references unknown node id {id}")))
    };

    let mut edges = Vec::with_capacity(doc.edges.len());
    for e in &doc.edges {
        edges.push(CfgEdge {
            from: remap(e.from)?,
            to: remap(e.to)?,
            cond: e.cond,
            back_edge: false,
        });
    }

    let entry = match doc.entry {
        Some(id) => remap(id)?,
        None => 0,
    };
    nodes[entry].is_entry = true;

    let mut calls = Vec::with_capacity(doc.calls.len());
    for (order, c) in doc.calls.iter().enumerate() {
        calls.push(CallSite {
            node: remap(c.node)?,
            callee: c.callee.clone(),
            resource: c.resource.clone(),
            order,
        });
    }

    let cfg = finish_cfg(nodes, edges, entry);
    Ok(Function {
        name: doc.name,
        cfg,
        calls,
    })
}

/// Final normalization shared with the test builders: master-exit synthesis,
/// adjacency lists, back-edge tagging.
pub(crate) fn finish_cfg(mut nodes: Vec<CfgNode>, mut edges: Vec<CfgEdge>, entry: usize) -> Cfg {
    // Functions with multiple natural exits get one synthesized master exit
    // before any dominance computation happens downstream.
    let natural_exits: Vec<usize> = (0..nodes.len())
        .filter(|&n| !edges.iter().any(|e| e.from == n))
        .collect();
    let exit = if natural_exits.len() == 1 {
        natural_exits[0]
    } else {
        let exit = nodes.len();
        let file = nodes[entry].location.file.clone();
        nodes.push(CfgNode {
            id: exit,
            label: CompactString::const_new("<exit>"),
            is_entry: false,
            is_exit: false,
            is_condition: false,
            location: SourceLocation { file, line: 0 },
        });
        for n in natural_exits {
            edges.push(CfgEdge {
                from: n,
                to: exit,
                cond: None,
                back_edge: false,
            });
        }
        exit
    };
    nodes[exit].is_exit = true;

    let mut succs: Vec<SmallVec<[usize; 2]>> = vec![SmallVec::new(); nodes.len()];
    let mut preds: Vec<SmallVec<[usize; 2]>> = vec![SmallVec::new(); nodes.len()];
    for (i, e) in edges.iter().enumerate() {
        succs[e.from].push(i);
        preds[e.to].push(i);
    }

    tag_back_edges(&mut edges, &succs, entry);

    Cfg {
        nodes,
        edges,
        entry,
        exit,
        succs,
        preds,
    }
}

/// Tags back edges with an iterative DFS from the entry. An edge into a node
/// still on the DFS stack closes a natural loop.
fn tag_back_edges(edges: &mut [CfgEdge], succs: &[SmallVec<[usize; 2]>], entry: usize) {
    #[derive(Clone, Copy, PartialEq)]
    enum Color {
        White,
        Gray,
        Black,
    }
    let mut color = vec![Color::White; succs.len()];
    // (node, next outgoing-edge position)
    let mut stack: Vec<(usize, usize)> = vec![(entry, 0)];
    color[entry] = Color::Gray;

    while let Some(&mut (node, ref mut pos)) = stack.last_mut() {
        if let Some(&edge_idx) = succs[node].get(*pos) {
            *pos += 1;
            let target = edges[edge_idx].to;
            match color[target] {
                Color::Gray => edges[edge_idx].back_edge = true,
                Color::White => {
                    color[target] = Color::Gray;
                    stack.push((target, 0));
                }
                Color::Black => {}
            }
        } else {
            color[node] = Color::Black;
            stack.pop();
        }
    }
}
