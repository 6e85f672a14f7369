use std::collections::BTreeSet;

use crate::graph::NodeRef;

const THROUGH: u8 = 1 << 0;
const LOCK_HELD: u8 = 1 << 1;
const UNLOCK_SEEN: u8 = 1 << 2;
const ACQ_SEEN: u8 = 1 << 3;
const CLEARS_ENTRY: u8 = 1 << 4;

/// Lattice value carried along one traversal: status bits plus the
/// in-flight acquire set and the entry-clearing release set.
///
/// Joining is bitwise OR plus set union, so values only grow; together with
/// subset-based revisit pruning this guarantees termination over cyclic
/// event flow graphs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathStatus {
    bits: u8,
    /// Acquires currently unmatched on this path.
    in_flight: BTreeSet<NodeRef>,
    /// Releases that discharged a caller-held lock before any own acquire.
    clearing: BTreeSet<NodeRef>,
}

impl PathStatus {
    /// Initial value at a function entry.
    #[must_use]
    pub fn through() -> Self {
        Self {
            bits: THROUGH,
            in_flight: BTreeSet::new(),
            clearing: BTreeSet::new(),
        }
    }

    /// Lock currently held on this path.
    #[must_use]
    pub fn held(&self) -> bool {
        self.bits & LOCK_HELD != 0
    }

    /// A release occurred somewhere on this path.
    #[must_use]
    pub fn unlock_seen(&self) -> bool {
        self.bits & UNLOCK_SEEN != 0
    }

    /// An acquire occurred somewhere on this path.
    #[must_use]
    pub fn acq_seen(&self) -> bool {
        self.bits & ACQ_SEEN != 0
    }

    /// A release preceded every acquire on this path.
    #[must_use]
    pub fn clears_entry(&self) -> bool {
        self.bits & CLEARS_ENTRY != 0
    }

    /// The unmatched acquires on this path, in id order.
    pub fn in_flight(&self) -> impl Iterator<Item = NodeRef> + '_ {
        self.in_flight.iter().copied()
    }

    /// The entry-clearing releases on this path, in id order.
    pub fn clearing(&self) -> impl Iterator<Item = NodeRef> + '_ {
        self.clearing.iter().copied()
    }

    /// Begins tracking an acquire, replacing the in-flight set.
    pub fn begin_tracking(&mut self, acquire: NodeRef) {
        self.bits |= LOCK_HELD | ACQ_SEEN;
        self.in_flight.clear();
        self.in_flight.insert(acquire);
    }

    /// Adds a further acquire while the lock is already held.
    pub fn add_in_flight(&mut self, acquire: NodeRef) {
        self.bits |= LOCK_HELD | ACQ_SEEN;
        self.in_flight.insert(acquire);
    }

    /// Discharges the held lock.
    pub fn discharge(&mut self) {
        self.bits &= !LOCK_HELD;
        self.bits |= UNLOCK_SEEN;
        self.in_flight.clear();
    }

    /// Records a pass-through release discharging a caller-held lock.
    pub fn record_entry_clear(&mut self, release: NodeRef) {
        self.bits |= UNLOCK_SEEN | CLEARS_ENTRY;
        self.clearing.insert(release);
    }

    /// Marks that a release happened without touching the in-flight set.
    pub fn mark_unlock_seen(&mut self) {
        self.bits |= UNLOCK_SEEN;
    }

    /// True when every fact in `self` is already present in `other`.
    #[must_use]
    pub fn is_subset_of(&self, other: &Self) -> bool {
        self.bits & !other.bits == 0
            && self.in_flight.is_subset(&other.in_flight)
            && self.clearing.is_subset(&other.clearing)
    }

    /// Monotone join: bit OR plus set union. Returns whether `self` grew.
    pub fn join(&mut self, other: &Self) -> bool {
        let mut changed = false;
        let merged = self.bits | other.bits;
        if merged != self.bits {
            self.bits = merged;
            changed = true;
        }
        for &n in &other.in_flight {
            changed |= self.in_flight.insert(n);
        }
        for &n in &other.clearing {
            changed |= self.clearing.insert(n);
        }
        changed
    }
}
