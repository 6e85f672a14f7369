//! Event flow graph construction.
//!
//! Reduces a function's CFG to the minimal subgraph preserving reachability
//! and branch correlation among the event nodes of one verification run.
//! The retained set is the event set plus its iterated dominance frontier
//! plus the master entry/exit; everything else is spliced out.

mod builder;
mod dominator;
mod types;

pub use builder::build_efg;
pub use types::{Efg, EfgEdge, EfgNode, EventRole};
