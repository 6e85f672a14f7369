//! Matching pair aggregation and reporting types.
//!
//! The verifier emits raw [`MatchingPair`]s; this module folds them into a
//! per-acquire-event classification and into the per-signature and batch
//! reports consumed by the output layer.

mod pairs;
mod report;

pub use pairs::{classify_events, EventClass, EventVerdict, MatchingPair, PairKind};
pub use report::{BatchReport, ClassCounts, EventReport, SignatureReport, SkippedSignature};

#[cfg(test)]
mod tests;
