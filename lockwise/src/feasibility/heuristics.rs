use regex::Regex;
use rustc_hash::FxHashMap;

use crate::graph::Cfg;

/// Maps each multi-state acquire node to the condition node consuming its
/// result, with the branch value meaning the acquire succeeded.
///
/// An externally decided value in `overrides` (keyed by acquire node) is
/// the source of truth and binds to the nearest consuming condition
/// regardless of its label. Without an override, syntactic matching over
/// the condition label covers the common zero-on-success test shapes; a
/// try-style call whose result flows through a variable before the test
/// stays unmapped and keeps its structural pairs.
#[must_use]
pub fn branch_success_map(
    cfg: &Cfg,
    sites: &[(usize, &str)],
    overrides: &FxHashMap<usize, bool>,
) -> FxHashMap<usize, (usize, bool)> {
    let mut map = FxHashMap::default();
    for &(node, callee) in sites {
        let mut candidates: Vec<usize> = Vec::new();
        if cfg.nodes[node].is_condition {
            candidates.push(node);
        }
        for e in cfg.successors(node) {
            if !e.back_edge && cfg.nodes[e.to].is_condition {
                candidates.push(e.to);
            }
        }
        if let Some(&success) = overrides.get(&node) {
            if let Some(&cand) = candidates.first() {
                map.insert(node, (cand, success));
            }
            continue;
        }
        for cand in candidates {
            let label = cfg.nodes[cand].label.as_str();
            if !label.contains(callee) {
                continue;
            }
            if let Some(success) = success_branch(label, callee) {
                map.insert(node, (cand, success));
                break;
            }
        }
    }
    map
}

/// Branch value meaning success for a zero-on-success acquire tested by
/// `label`, or `None` when the shape is unrecognized.
pub(super) fn success_branch(label: &str, callee: &str) -> Option<bool> {
    let name = regex::escape(callee);
    let negated = Regex::new(&format!(r"^\s*!\s*{name}\s*\(")).ok()?;
    if negated.is_match(label) {
        return Some(true);
    }
    let eq_zero = Regex::new(&format!(r"{name}\s*\([^)]*\)\s*==\s*0")).ok()?;
    if eq_zero.is_match(label) {
        return Some(true);
    }
    let ne_zero = Regex::new(&format!(r"{name}\s*\([^)]*\)\s*!=\s*0")).ok()?;
    if ne_zero.is_match(label) {
        return Some(false);
    }
    let bare = Regex::new(&format!(r"^\s*{name}\s*\(.*\)\s*$")).ok()?;
    if bare.is_match(label) {
        return Some(false);
    }
    None
}
