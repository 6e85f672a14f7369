//! Lockwise: interprocedural lock/unlock pairing verification for C
//! codebases.
//!
//! Consumes the JSON program graph emitted by an external C indexer and
//! verifies, per lock-argument signature, that every acquire is matched by
//! a release on every path. The pipeline per signature:
//!
//! 1. group acquire/release call sites by lock-argument text,
//! 2. derive the matching pair graph (the bounded call-graph envelope),
//! 3. reduce each member's CFG to its event flow graph via iterated
//!    dominance frontiers,
//! 4. run the bottom-up summary verifier over the envelope,
//! 5. filter structural pairs by branch feasibility,
//! 6. classify each acquire event and report.

pub mod analyzer;
pub mod classify;
pub mod cli;
pub mod config;
pub mod efg;
pub mod entry_point;
pub mod errors;
pub mod export;
pub mod feasibility;
pub mod graph;
pub mod mpg;
pub mod output;
pub mod test_utils;
pub mod verify;

pub use classify::{BatchReport, EventClass, MatchingPair, PairKind, SignatureReport};
pub use config::{Config, LockwiseConfig, RunConfig};
pub use errors::{RunError, SkipReason};
pub use graph::{load_program_graph, parse_program_graph, ProgramGraph};
