//! JSON export of the verified event flow graphs.
//!
//! One bundle per completed signature: the reduced per-function graphs with
//! roles and source positions, plus the surviving pairs. Meant for external
//! visualization and for diffing runs.

use rustc_hash::FxHashMap;
use serde::Serialize;
use std::fs;
use std::io;
use std::path::Path;

use crate::classify::{MatchingPair, PairKind};
use crate::efg::{Efg, EventRole};
use crate::graph::{FuncId, ProgramGraph};

/// One retained node with its source attribution.
#[derive(Debug, Serialize)]
pub struct ExportedNode {
    /// CFG node id within the owning function.
    pub cfg_node: usize,
    /// Statement or condition text.
    pub label: String,
    /// `file:line` position.
    pub location: String,
    /// Event role, when the node is an event.
    pub role: Option<EventRole>,
}

/// One edge of the reduced graph.
#[derive(Debug, Serialize)]
pub struct ExportedEdge {
    /// Source EFG node index.
    pub from: usize,
    /// Target EFG node index.
    pub to: usize,
    /// Branch value inherited from the spliced path.
    pub cond: Option<bool>,
    /// Survived loop edge.
    pub back_edge: bool,
}

/// Reduced graph of one envelope function.
#[derive(Debug, Serialize)]
pub struct ExportedEfg {
    /// Function name.
    pub function: String,
    /// Entry node index.
    pub entry: usize,
    /// Exit node index.
    pub exit: usize,
    /// Retained nodes.
    pub nodes: Vec<ExportedNode>,
    /// Edges between retained nodes.
    pub edges: Vec<ExportedEdge>,
}

/// One pair keyed by source positions.
#[derive(Debug, Serialize)]
pub struct ExportedPair {
    /// Classification of the pair.
    pub kind: PairKind,
    /// Position of the acquire.
    pub acquire: String,
    /// Position of the match; absent for exit-matched pairs.
    pub matched: Option<String>,
}

/// Export bundle of one signature.
#[derive(Debug, Serialize)]
pub struct SignatureGraphs {
    /// Signature name.
    pub signature: String,
    /// Per-function reduced graphs, sorted by function name.
    pub functions: Vec<ExportedEfg>,
    /// Surviving pairs.
    pub pairs: Vec<ExportedPair>,
}

/// Assembles the bundle for one verified signature.
#[must_use]
pub fn signature_graphs(
    graph: &ProgramGraph,
    signature: &str,
    efgs: &FxHashMap<FuncId, Efg>,
    pairs: &[MatchingPair],
) -> SignatureGraphs {
    let mut functions: Vec<ExportedEfg> = efgs
        .iter()
        .map(|(&f, efg)| {
            let func = graph.function(f);
            ExportedEfg {
                function: func.name.to_string(),
                entry: efg.entry,
                exit: efg.exit,
                nodes: efg
                    .nodes
                    .iter()
                    .map(|n| {
                        let cfg_node = &func.cfg.nodes[n.cfg_node];
                        ExportedNode {
                            cfg_node: n.cfg_node,
                            label: cfg_node.label.to_string(),
                            location: cfg_node.location.to_string(),
                            role: n.role,
                        }
                    })
                    .collect(),
                edges: efg
                    .edges
                    .iter()
                    .map(|e| ExportedEdge {
                        from: e.from,
                        to: e.to,
                        cond: e.cond,
                        back_edge: e.back_edge,
                    })
                    .collect(),
            }
        })
        .collect();
    functions.sort_by(|a, b| a.function.cmp(&b.function));

    let pairs = pairs
        .iter()
        .map(|p| ExportedPair {
            kind: p.kind,
            acquire: graph.source_location(p.acquire).to_string(),
            matched: p.matched.map(|m| graph.source_location(m).to_string()),
        })
        .collect();

    SignatureGraphs {
        signature: signature.to_owned(),
        functions,
        pairs,
    }
}

/// Writes all bundles of a batch as one pretty-printed JSON document.
pub fn write_graphs(path: &Path, graphs: &[SignatureGraphs]) -> io::Result<()> {
    let json = serde_json::to_string_pretty(graphs).map_err(io::Error::other)?;
    fs::write(path, json)
}
