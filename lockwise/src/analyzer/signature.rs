use compact_str::CompactString;
use regex::Regex;
use rustc_hash::FxHashMap;

use crate::classify::{
    classify_events, ClassCounts, EventReport, EventVerdict, MatchingPair, PairKind,
    SignatureReport,
};
use crate::config::RunConfig;
use crate::efg::{build_efg, Efg, EventRole};
use crate::errors::SkipReason;
use crate::export::{signature_graphs, SignatureGraphs};
use crate::feasibility::{
    ambiguous_conditions, branch_success_map, FeasibilityCache, FeasibilityChecker,
    PairFeasibility,
};
use crate::graph::{CallGraph, FuncId, ProgramGraph};
use crate::mpg::{build_mpg, SignatureSites, SiteRef};
use crate::verify::Verifier;

/// Result of verifying one signature.
pub struct SignatureOutcome {
    /// The per-signature report.
    pub report: SignatureReport,
    /// Export bundle, when graph export was requested.
    pub graphs: Option<SignatureGraphs>,
}

/// Groups the program's acquire/release call sites by lock-argument text.
///
/// Signatures without any acquire site carry no events and are dropped;
/// the optional query regex restricts which signatures are kept.
pub fn discover_signatures(
    graph: &ProgramGraph,
    config: &RunConfig,
) -> Result<Vec<SignatureSites>, regex::Error> {
    let query = config
        .signature_query
        .as_deref()
        .map(Regex::new)
        .transpose()?;

    let mut grouped: FxHashMap<CompactString, SignatureSites> = FxHashMap::default();
    for (id, func) in graph.iter() {
        for site in &func.calls {
            let Some(resource) = &site.resource else {
                continue;
            };
            let callee = site.callee.as_str();
            let multi_state = config.multi_state_functions.iter().any(|m| m == callee);
            let is_acquire =
                multi_state || config.acquire_functions.iter().any(|a| a == callee);
            let is_release = config.release_functions.iter().any(|r| r == callee);
            if !is_acquire && !is_release {
                continue;
            }
            if let Some(q) = &query {
                if !q.is_match(resource) {
                    continue;
                }
            }
            let entry = grouped
                .entry(resource.clone())
                .or_insert_with(|| SignatureSites {
                    name: resource.to_string(),
                    acquires: Vec::new(),
                    releases: Vec::new(),
                });
            let site_ref = SiteRef {
                func: id,
                node: site.node,
                order: site.order,
                multi_state,
            };
            if is_acquire {
                entry.acquires.push(site_ref);
            } else {
                entry.releases.push(site_ref);
            }
        }
    }

    let mut signatures: Vec<SignatureSites> = grouped
        .into_values()
        .filter(|s| !s.acquires.is_empty())
        .collect();
    signatures.sort_unstable_by(|a, b| a.name.cmp(&b.name));
    Ok(signatures)
}

/// Runs the full pipeline for one signature: envelope, per-function event
/// flow graphs, summary verification, feasibility filtering,
/// classification.
pub fn verify_signature(
    graph: &ProgramGraph,
    cg: &CallGraph,
    sites: &SignatureSites,
    config: &RunConfig,
    cache: &mut Option<FeasibilityCache>,
    export_graphs: bool,
) -> Result<SignatureOutcome, SkipReason> {
    let mpg = build_mpg(graph, cg, sites, config)?;

    // Role assignment: acquire beats release beats envelope call when one
    // node carries several.
    let mut roles: FxHashMap<FuncId, FxHashMap<usize, EventRole>> = mpg
        .functions
        .iter()
        .map(|&f| (f, FxHashMap::default()))
        .collect();
    for s in &sites.acquires {
        if let Some(events) = roles.get_mut(&s.func) {
            let role = if s.multi_state {
                EventRole::MultiStateAcquire
            } else {
                EventRole::Acquire
            };
            events.insert(s.node, role);
        }
    }
    for s in &sites.releases {
        if let Some(events) = roles.get_mut(&s.func) {
            events.entry(s.node).or_insert(EventRole::Release);
        }
    }
    for &f in &mpg.functions {
        for site in &graph.function(f).calls {
            if graph
                .call_target(site)
                .is_some_and(|t| t != f && mpg.contains(t))
            {
                if let Some(events) = roles.get_mut(&f) {
                    events.entry(site.node).or_insert(EventRole::EnvelopeCall);
                }
            }
        }
    }

    let mut efgs: FxHashMap<FuncId, Efg> = FxHashMap::default();
    for &f in &mpg.functions {
        let func = graph.function(f);
        if func.cfg.has_disconnected_node() {
            return Err(SkipReason::DisconnectedCfg {
                function: func.name.to_string(),
            });
        }
        let efg = build_efg(&func.cfg, &roles[&f]).map_err(|cause| SkipReason::EfgConstruction {
            function: func.name.to_string(),
            cause,
        })?;
        efgs.insert(f, efg);
    }

    let mut verifier = Verifier::new(graph, &mpg, &efgs);
    verifier.run();
    let mut pairs = verifier.into_pairs();

    let diagnostics = if config.feasibility_enabled {
        filter_pairs(graph, sites, cache, &mut pairs)
    } else {
        Vec::new()
    };

    let verdicts = classify_events(&pairs);
    let report = build_report(graph, sites, &verdicts, diagnostics);
    let graphs = export_graphs.then(|| signature_graphs(graph, &sites.name, &efgs, &pairs));
    Ok(SignatureOutcome { report, graphs })
}

/// Drops branch-infeasible pairs and downgrades failure-branch pairs of
/// multi-state acquires to [`PairKind::NotValid`]. Returns the notes for
/// constraints that had to be dropped.
///
/// Only pairs whose endpoints share a function are checked; the path model
/// is intraprocedural. The cache supplies two things keyed on source
/// positions: externally decided acquisition branches for multi-state
/// sites, which win over the label heuristics, and memoized pair verdicts.
fn filter_pairs<'g>(
    graph: &'g ProgramGraph,
    sites: &SignatureSites,
    cache: &mut Option<FeasibilityCache>,
    pairs: &mut Vec<MatchingPair>,
) -> Vec<String> {
    let mut releases_by_func: FxHashMap<FuncId, Vec<usize>> = FxHashMap::default();
    for s in &sites.releases {
        releases_by_func.entry(s.func).or_default().push(s.node);
    }

    let mut multi_sites: FxHashMap<FuncId, Vec<(usize, &str)>> = FxHashMap::default();
    for s in sites.acquires.iter().filter(|s| s.multi_state) {
        if let Some(call) = graph.function(s.func).call_at(s.node) {
            multi_sites
                .entry(s.func)
                .or_default()
                .push((s.node, call.callee.as_str()));
        }
    }

    // Acquisition-branch maps per function. Supplied cache lines are the
    // source of truth; heuristic decisions are written back so they can be
    // inspected and corrected.
    let mut branch_maps: FxHashMap<FuncId, FxHashMap<usize, (usize, bool)>> =
        FxHashMap::default();
    for (&func, list) in &multi_sites {
        let function = graph.function(func);
        let mut overrides: FxHashMap<usize, bool> = FxHashMap::default();
        if let Some(c) = cache.as_ref() {
            for &(node, _) in list {
                let loc = function.cfg.nodes[node].location.to_string();
                if let Some(success) = c.branch(&loc) {
                    overrides.insert(node, success);
                }
            }
        }
        let map = branch_success_map(&function.cfg, list, &overrides);
        if let Some(c) = cache.as_mut() {
            for (&node, &(_, success)) in &map {
                if !overrides.contains_key(&node) {
                    c.set_branch(function.cfg.nodes[node].location.to_string(), success);
                }
            }
        }
        branch_maps.insert(func, map);
    }

    let mut diagnostics: Vec<String> = Vec::new();
    let mut checkers: FxHashMap<FuncId, FeasibilityChecker<'g>> = FxHashMap::default();
    let mut kept = Vec::with_capacity(pairs.len());
    for mut pair in pairs.drain(..) {
        let func = pair.acquire.func;
        let intra = pair.matched.is_none_or(|m| m.func == func);
        if !intra {
            kept.push(pair);
            continue;
        }

        let key = cache.as_ref().map(|_| {
            let first = graph.source_location(pair.acquire).to_string();
            let second = pair.matched.map(|m| graph.source_location(m).to_string());
            FeasibilityCache::key(&first, second.as_deref())
        });
        if let (Some(c), Some(k)) = (cache.as_ref(), key.as_deref()) {
            if let Some(feasible) = c.get(k) {
                if feasible {
                    kept.push(pair);
                }
                continue;
            }
        }

        let checker = checkers.entry(func).or_insert_with(|| {
            let function = graph.function(func);
            for &n in &ambiguous_conditions(&function.cfg) {
                let node = &function.cfg.nodes[n];
                diagnostics.push(format!(
                    "`{}`: branch `{}` at {} carries no value; constraint dropped",
                    function.name, node.label, node.location
                ));
            }
            let branch_map = branch_maps.remove(&func).unwrap_or_default();
            FeasibilityChecker::new(&function.cfg, branch_map)
        });

        // Safe pairs need the release itself reachable; deadlocked and
        // dangling pairs additionally must dodge every release in between.
        let excluded: &[usize] = match pair.kind {
            PairKind::Safe => &[],
            _ => releases_by_func.get(&func).map_or(&[], Vec::as_slice),
        };
        match checker.check(pair.acquire.node, pair.matched.map(|m| m.node), excluded) {
            PairFeasibility::Feasible => {
                if let (Some(c), Some(k)) = (cache.as_mut(), key) {
                    c.insert(k, true);
                }
                kept.push(pair);
            }
            PairFeasibility::Infeasible => {
                if let (Some(c), Some(k)) = (cache.as_mut(), key) {
                    c.insert(k, false);
                }
            }
            PairFeasibility::NotValid => {
                pair.kind = PairKind::NotValid;
                kept.push(pair);
            }
        }
    }
    *pairs = kept;
    diagnostics
}

fn build_report(
    graph: &ProgramGraph,
    sites: &SignatureSites,
    verdicts: &[EventVerdict],
    diagnostics: Vec<String>,
) -> SignatureReport {
    let mut counts = ClassCounts::default();
    let mut intra = 0;
    let mut inter = 0;
    let mut events = Vec::with_capacity(verdicts.len());
    for v in verdicts {
        counts.record(v.class);
        for p in &v.pairs {
            if p.kind == PairKind::Safe {
                if let Some(m) = p.matched {
                    if m.func == p.acquire.func {
                        intra += 1;
                    } else {
                        inter += 1;
                    }
                }
            }
        }
        let func = graph.containing_function(v.acquire);
        let node = &func.cfg.nodes[v.acquire.node];
        let matched = v
            .pairs
            .iter()
            .find(|p| p.kind == PairKind::Safe)
            .and_then(|p| p.matched)
            .or_else(|| v.pairs.iter().find_map(|p| p.matched));
        events.push(EventReport {
            function: func.name.to_string(),
            label: node.label.to_string(),
            location: node.location.to_string(),
            matched: matched
                .map_or_else(|| "<exit>".to_owned(), |m| graph.source_location(m).to_string()),
            class: v.class,
        });
    }
    events.sort_by(|a, b| a.location.cmp(&b.location));

    SignatureReport {
        signature: sites.name.clone(),
        counts,
        intraprocedural_pairs: intra,
        interprocedural_pairs: inter,
        events,
        diagnostics,
    }
}
