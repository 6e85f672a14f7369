//! Branch-feasibility filtering.
//!
//! Structural pairs discovered by the verifier are checked against the
//! acyclic paths of the containing function's CFG: a pair survives only
//! when some candidate path realizes it with a consistent assignment of
//! branch literals. Multi-state acquires additionally carry a success
//! branch mapping; a pair contradicted on every candidate path is reported
//! as not valid rather than merely infeasible.

mod cache;
mod checker;
mod heuristics;
mod paths;

pub use cache::FeasibilityCache;
pub use checker::{FeasibilityChecker, PairFeasibility};
pub use heuristics::branch_success_map;
pub use paths::{ambiguous_conditions, enumerate_paths, PathSet, MAX_PATHS};

#[cfg(test)]
mod tests;
