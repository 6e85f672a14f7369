use smallvec::SmallVec;

use crate::graph::NodeRef;

use super::status::PathStatus;

/// One distinct lock state observed at a function's exit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExitState {
    /// Lock held when the function returns along this variant.
    pub held: bool,
    /// Unmatched acquires still open at exit, in id order.
    pub in_flight: Vec<NodeRef>,
    /// This variant discharges a lock the caller held at the call.
    pub clears_entry: bool,
    /// Releases doing the discharging, in id order.
    pub clearing: Vec<NodeRef>,
}

impl ExitState {
    pub(super) fn from_status(s: &PathStatus) -> Self {
        Self {
            held: s.held(),
            in_flight: s.in_flight().collect(),
            clears_entry: s.clears_entry(),
            clearing: s.clearing().collect(),
        }
    }
}

/// Lock-relevant effect of one envelope function, as seen by its callers.
#[derive(Debug, Clone, Default)]
pub struct FunctionSummary {
    /// Acquires reachable from entry with no release before them.
    pub entry_acquires: Vec<NodeRef>,
    /// Releases reachable from entry with no acquire before them.
    pub entry_releases: Vec<NodeRef>,
    /// Distinct exit-state variants.
    pub exit_states: SmallVec<[ExitState; 2]>,
}

impl FunctionSummary {
    /// The function exits both holding and not holding the lock, so each
    /// caller continuation must fork per variant.
    #[must_use]
    pub fn is_multi_state(&self) -> bool {
        self.exit_states.iter().any(|v| v.held) && self.exit_states.iter().any(|v| !v.held)
    }

    pub(super) fn push_exit(&mut self, state: ExitState) {
        if !self.exit_states.contains(&state) {
            self.exit_states.push(state);
        }
    }
}
