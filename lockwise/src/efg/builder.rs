use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::SmallVec;
use std::collections::BTreeMap;

use super::dominator::Dominators;
use super::types::{Efg, EfgEdge, EfgNode, EventRole};
use crate::graph::Cfg;

/// Builds the event flow graph of one function.
///
/// Retained = events ∪ iterated dominance frontier of the events ∪
/// {entry, exit}; every other node is spliced out, connecting each
/// predecessor to each successor with an edge copying the incoming edge's
/// condition value. Back edges are excluded from the dominance input and
/// from the splice traversal; they survive only between retained endpoints.
pub fn build_efg(cfg: &Cfg, events: &FxHashMap<usize, EventRole>) -> Result<Efg, String> {
    let n = cfg.nodes.len();

    // Acyclic projection.
    let mut succs: Vec<Vec<usize>> = vec![Vec::new(); n];
    let mut preds: Vec<Vec<usize>> = vec![Vec::new(); n];
    for e in &cfg.edges {
        if !e.back_edge {
            succs[e.from].push(e.to);
            preds[e.to].push(e.from);
        }
    }

    let dom = Dominators::compute(&succs, &preds, cfg.entry);
    if !dom.is_reachable(cfg.exit) {
        return Err("master exit unreachable from entry".to_owned());
    }

    let seed: FxHashSet<usize> = events
        .keys()
        .copied()
        .filter(|&e| dom.is_reachable(e))
        .collect();
    let df = dom.frontiers(&preds);
    let mut retained = dom.iterated_frontier(&df, &seed);
    retained.extend(seed.iter().copied());
    retained.insert(cfg.entry);
    retained.insert(cfg.exit);

    // Splice adjacency; BTreeMap keeps edge emission deterministic and its
    // entry API keeps the first synthesized parallel edge.
    let mut out: Vec<BTreeMap<usize, Option<bool>>> = vec![BTreeMap::new(); n];
    let mut inc: Vec<FxHashSet<usize>> = vec![FxHashSet::default(); n];
    for e in &cfg.edges {
        if !e.back_edge && dom.is_reachable(e.from) {
            out[e.from].entry(e.to).or_insert(e.cond);
            inc[e.to].insert(e.from);
        }
    }

    for node in 0..n {
        if retained.contains(&node) || !dom.is_reachable(node) {
            continue;
        }
        let incoming: Vec<usize> = inc[node].iter().copied().collect();
        let outgoing: Vec<(usize, Option<bool>)> =
            out[node].iter().map(|(&to, &c)| (to, c)).collect();
        for &p in &incoming {
            let Some(&in_cond) = out[p].get(&node) else {
                continue;
            };
            for &(s, out_cond) in &outgoing {
                if p == s || s == node {
                    continue;
                }
                // The incoming edge's condition value wins; the outgoing
                // one fills in when the spliced node was the branch point.
                out[p].entry(s).or_insert(in_cond.or(out_cond));
                inc[s].insert(p);
            }
            out[p].remove(&node);
        }
        for &(s, _) in &outgoing {
            inc[s].remove(&node);
        }
        out[node].clear();
        inc[node].clear();
    }

    // Assemble over retained nodes, sorted by CFG id for determinism.
    let mut order: Vec<usize> = retained
        .iter()
        .copied()
        .filter(|&r| dom.is_reachable(r))
        .collect();
    order.sort_unstable();

    let by_cfg: FxHashMap<usize, usize> = order.iter().enumerate().map(|(i, &c)| (c, i)).collect();
    let nodes: Vec<EfgNode> = order
        .iter()
        .map(|&c| EfgNode {
            cfg_node: c,
            role: events.get(&c).copied(),
        })
        .collect();

    let mut edges = Vec::new();
    for &c in &order {
        let from = by_cfg[&c];
        for (&to_cfg, &cond) in &out[c] {
            if let Some(&to) = by_cfg.get(&to_cfg) {
                edges.push(EfgEdge {
                    from,
                    to,
                    cond,
                    back_edge: false,
                });
            }
        }
    }
    for e in &cfg.edges {
        if e.back_edge {
            if let (Some(&from), Some(&to)) = (by_cfg.get(&e.from), by_cfg.get(&e.to)) {
                edges.push(EfgEdge {
                    from,
                    to,
                    cond: e.cond,
                    back_edge: true,
                });
            }
        }
    }

    let mut efg_succs: Vec<SmallVec<[usize; 2]>> = vec![SmallVec::new(); nodes.len()];
    for (i, e) in edges.iter().enumerate() {
        efg_succs[e.from].push(i);
    }

    let entry = *by_cfg
        .get(&cfg.entry)
        .ok_or_else(|| "entry not retained".to_owned())?;
    let exit = *by_cfg
        .get(&cfg.exit)
        .ok_or_else(|| "exit not retained".to_owned())?;

    let efg = Efg {
        nodes,
        edges,
        entry,
        exit,
        succs: efg_succs,
        by_cfg,
    };
    if !efg.reaches(efg.entry, efg.exit) {
        return Err("exit unreachable after splicing".to_owned());
    }
    Ok(efg)
}
