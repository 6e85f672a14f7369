//! Program graph model: the typed, attributed output of the external
//! C-source indexer, consumed read-only by the verifier.
//!
//! One [`Function`] owns one normalized [`Cfg`] (single master entry/exit,
//! back edges tagged). Call sites carry resolved callee names and the
//! lock-argument text used for signature discovery.

mod load;
mod program;
mod types;

pub use load::{load_program_graph, parse_program_graph, LoadError};
pub use program::{CallGraph, ProgramGraph};
pub use types::{CallSite, Cfg, CfgEdge, CfgNode, FuncId, Function, NodeRef, SourceLocation};

pub(crate) use load::finish_cfg;

#[cfg(test)]
mod tests;
