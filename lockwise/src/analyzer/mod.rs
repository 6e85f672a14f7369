//! Signature discovery and the per-signature verification pipeline.
//!
//! The batch driver walks discovered signatures one at a time; each runs
//! envelope construction, per-function graph reduction, the summary
//! verifier, feasibility filtering, and classification. A failing
//! signature is recorded as skipped, never aborting its siblings.

mod batch;
mod signature;

pub use batch::{run_batch, BatchRun};
pub use signature::{discover_signatures, verify_signature, SignatureOutcome};
