use rustc_hash::FxHashMap;

use crate::graph::Cfg;

use super::paths::{enumerate_paths, PathSet};

/// Outcome of checking one structural pair against the path set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairFeasibility {
    /// Some candidate path realizes the pair consistently.
    Feasible,
    /// Candidate paths exist but none is branch-consistent.
    Infeasible,
    /// Every candidate path takes the failure branch of the pair's
    /// multi-state acquire: the pair never acquired at all.
    NotValid,
}

/// Per-function feasibility checker over its enumerated path set.
pub struct FeasibilityChecker<'a> {
    cfg: &'a Cfg,
    paths: PathSet,
    /// Multi-state acquire node -> (consuming condition node, branch value
    /// meaning the acquire succeeded).
    branch_map: FxHashMap<usize, (usize, bool)>,
}

impl<'a> FeasibilityChecker<'a> {
    #[must_use]
    pub fn new(cfg: &'a Cfg, branch_map: FxHashMap<usize, (usize, bool)>) -> Self {
        Self {
            cfg,
            paths: enumerate_paths(cfg),
            branch_map,
        }
    }

    /// Path enumeration overflowed; every pair is accepted structurally.
    #[must_use]
    pub fn truncated(&self) -> bool {
        self.paths.truncated
    }

    /// Checks one pair: `first` must precede `second` (or the exit when
    /// `None`) with no `excluded` node strictly between them.
    ///
    /// A pair with no candidate path at all is vacuously feasible; the
    /// verifier found it across a splice the full CFG no longer shows, and
    /// structural evidence stands.
    #[must_use]
    pub fn check(&self, first: usize, second: Option<usize>, excluded: &[usize]) -> PairFeasibility {
        if self.paths.truncated {
            return PairFeasibility::Feasible;
        }
        let mapped = self.branch_map.get(&first).copied();

        let mut saw_candidate = false;
        let mut saw_agreeing = false;
        for path in &self.paths.paths {
            let Some(start) = path.iter().position(|&n| n == first) else {
                continue;
            };
            let end = match second {
                Some(s) => match path.iter().skip(start + 1).position(|&n| n == s) {
                    Some(off) => start + 1 + off,
                    None => continue,
                },
                None => path.len() - 1,
            };
            if path[start + 1..end].iter().any(|n| excluded.contains(n)) {
                continue;
            }
            saw_candidate = true;

            let agrees = mapped.is_none_or(|(cond, success)| {
                self.paths
                    .branch_taken(self.cfg, path, cond)
                    .is_none_or(|taken| taken == success)
            });
            if !agrees {
                continue;
            }
            saw_agreeing = true;
            // Literals past the second endpoint do not constrain the pair.
            if self.paths.consistent(self.cfg, &path[..=end]) {
                return PairFeasibility::Feasible;
            }
        }

        if !saw_candidate {
            return PairFeasibility::Feasible;
        }
        if mapped.is_some() && !saw_agreeing {
            return PairFeasibility::NotValid;
        }
        PairFeasibility::Infeasible
    }
}
