use serde::Serialize;

use super::pairs::EventClass;

/// Counts per classification bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ClassCounts {
    /// Classified acquire events in total.
    pub total: usize,
    /// Safe-only events.
    pub paired: usize,
    /// Safe alongside dangling/deadlocked.
    pub partially_paired: usize,
    /// Deadlocked without safe.
    pub deadlock: usize,
    /// Dangling only.
    pub unpaired: usize,
}

impl ClassCounts {
    /// Adds one classified event.
    pub fn record(&mut self, class: EventClass) {
        self.total += 1;
        match class {
            EventClass::Paired => self.paired += 1,
            EventClass::PartiallyPaired => self.partially_paired += 1,
            EventClass::Deadlock => self.deadlock += 1,
            EventClass::Unpaired => self.unpaired += 1,
        }
    }

    /// Merges another bucket into this one.
    pub fn absorb(&mut self, other: &Self) {
        self.total += other.total;
        self.paired += other.paired;
        self.partially_paired += other.partially_paired;
        self.deadlock += other.deadlock;
        self.unpaired += other.unpaired;
    }

    /// Events that need attention (everything but cleanly paired).
    #[must_use]
    pub fn flagged(&self) -> usize {
        self.partially_paired + self.deadlock + self.unpaired
    }
}

/// Per-event detail row.
#[derive(Debug, Clone, Serialize)]
pub struct EventReport {
    /// Containing function name.
    pub function: String,
    /// Statement text of the acquire.
    pub label: String,
    /// Source position of the acquire.
    pub location: String,
    /// Source position of the matched event, or `<exit>`.
    pub matched: String,
    /// Classification.
    pub class: EventClass,
}

/// Verification result for one resource signature.
#[derive(Debug, Clone, Serialize)]
pub struct SignatureReport {
    /// Signature name (lock-argument text).
    pub signature: String,
    /// Classification counts.
    pub counts: ClassCounts,
    /// Safe pairs whose acquire and release share a function.
    pub intraprocedural_pairs: usize,
    /// Safe pairs crossing a function boundary.
    pub interprocedural_pairs: usize,
    /// Per-event details, sorted by location.
    pub events: Vec<EventReport>,
    /// Notes from feasibility filtering (dropped branch constraints).
    pub diagnostics: Vec<String>,
}

/// A signature the batch skipped, with its reason.
#[derive(Debug, Clone, Serialize)]
pub struct SkippedSignature {
    /// Signature name.
    pub signature: String,
    /// Human-readable skip reason.
    pub reason: String,
}

/// Aggregated result of one batch run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchReport {
    /// Completed signatures in verification order.
    pub signatures: Vec<SignatureReport>,
    /// Skipped signatures with reasons.
    pub skipped: Vec<SkippedSignature>,
    /// Sum over all completed signatures.
    pub aggregate: ClassCounts,
}

impl BatchReport {
    /// Records one completed signature.
    pub fn record(&mut self, report: SignatureReport) {
        self.aggregate.absorb(&report.counts);
        self.signatures.push(report);
    }

    /// Records one skipped signature.
    pub fn record_skip(&mut self, signature: String, reason: &crate::errors::SkipReason) {
        self.skipped.push(SkippedSignature {
            signature,
            reason: reason.to_string(),
        });
    }
}
