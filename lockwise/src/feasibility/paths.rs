use compact_str::CompactString;
use rustc_hash::FxHashMap;

use crate::graph::Cfg;

/// Bound on enumerated entry-to-exit paths per function. Functions
/// exceeding it are accepted structurally instead of filtered.
pub const MAX_PATHS: usize = 4096;

/// Acyclic entry-to-exit paths of one CFG, with branch literals interned
/// by condition label text.
#[derive(Debug)]
pub struct PathSet {
    /// Node sequences, entry first.
    pub paths: Vec<Vec<usize>>,
    /// Per CFG node: interned literal id when the node is a branch point.
    /// Two condition nodes with identical label text share a literal.
    pub literals: Vec<Option<usize>>,
    /// Enumeration hit [`MAX_PATHS`] and stopped early.
    pub truncated: bool,
}

impl PathSet {
    /// Branch value `path` takes at condition node `cond`, when the node
    /// lies on the path.
    #[must_use]
    pub fn branch_taken(&self, cfg: &Cfg, path: &[usize], cond: usize) -> Option<bool> {
        let pos = path.iter().position(|&n| n == cond)?;
        let next = *path.get(pos + 1)?;
        cfg.successors(cond)
            .find(|e| !e.back_edge && e.to == next)
            .and_then(|e| e.cond)
    }

    /// True when the path binds no literal to both branch values.
    #[must_use]
    pub fn consistent(&self, cfg: &Cfg, path: &[usize]) -> bool {
        let mut bound: FxHashMap<usize, bool> = FxHashMap::default();
        for window in path.windows(2) {
            let Some(lit) = self.literals[window[0]] else {
                continue;
            };
            let value = cfg
                .successors(window[0])
                .find(|e| !e.back_edge && e.to == window[1])
                .and_then(|e| e.cond);
            if let Some(v) = value {
                if *bound.entry(lit).or_insert(v) != v {
                    return false;
                }
            }
        }
        true
    }
}

/// Condition nodes with a forward edge carrying no branch value (a
/// multi-way switch arm, typically). No literal can be collected over such
/// an edge; the constraint is dropped and the caller reports it.
#[must_use]
pub fn ambiguous_conditions(cfg: &Cfg) -> Vec<usize> {
    (0..cfg.nodes.len())
        .filter(|&n| {
            cfg.nodes[n].is_condition
                && cfg
                    .successors(n)
                    .any(|e| !e.back_edge && e.cond.is_none())
        })
        .collect()
}

/// Enumerates the simple entry-to-exit paths of `cfg` over its forward
/// (back-edge-stripped) edges, capped at [`MAX_PATHS`].
#[must_use]
pub fn enumerate_paths(cfg: &Cfg) -> PathSet {
    let mut intern: FxHashMap<CompactString, usize> = FxHashMap::default();
    let literals: Vec<Option<usize>> = cfg
        .nodes
        .iter()
        .map(|n| {
            n.is_condition.then(|| {
                let next = intern.len();
                *intern.entry(n.label.clone()).or_insert(next)
            })
        })
        .collect();

    let mut paths: Vec<Vec<usize>> = Vec::new();
    let mut truncated = false;
    // Iterative DFS carrying the current path; `pos` walks the successor
    // edge list of the path's tip.
    let mut path: Vec<usize> = vec![cfg.entry];
    let mut stack: Vec<(usize, usize)> = vec![(cfg.entry, 0)];
    while let Some(&mut (node, ref mut pos)) = stack.last_mut() {
        if node == cfg.exit {
            if paths.len() == MAX_PATHS {
                truncated = true;
                break;
            }
            paths.push(path.clone());
            stack.pop();
            path.pop();
            continue;
        }
        let mut chosen = None;
        while *pos < cfg.succs[node].len() {
            let edge = &cfg.edges[cfg.succs[node][*pos]];
            *pos += 1;
            if !edge.back_edge && !path.contains(&edge.to) {
                chosen = Some(edge.to);
                break;
            }
        }
        match chosen {
            Some(to) => {
                path.push(to);
                stack.push((to, 0));
            }
            None => {
                stack.pop();
                path.pop();
            }
        }
    }

    PathSet {
        paths,
        literals,
        truncated,
    }
}
