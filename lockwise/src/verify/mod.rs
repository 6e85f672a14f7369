//! Interprocedural summary verifier.
//!
//! Processes the envelope's functions callees-first; each function gets one
//! worklist fixpoint walk over its event flow graph carrying a
//! [`PathStatus`] lattice value. Callee effects are spliced in from their
//! [`FunctionSummary`]; multi-state callees fan the continuation out into
//! one state per summary variant instead of duplicating call nodes.

mod status;
mod summary;
mod traversal;

pub use status::PathStatus;
pub use summary::{ExitState, FunctionSummary};
pub use traversal::Verifier;
