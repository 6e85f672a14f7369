use rustc_hash::{FxHashMap, FxHashSet};

use crate::config::RunConfig;
use crate::errors::SkipReason;
use crate::graph::{CallGraph, FuncId, ProgramGraph};

/// One acquire or release call site of a signature.
#[derive(Debug, Clone)]
pub struct SiteRef {
    /// Function containing the site.
    pub func: FuncId,
    /// CFG node containing the call.
    pub node: usize,
    /// Source-order index within the function.
    pub order: usize,
    /// True for configured multi-state (try-style) acquire functions.
    pub multi_state: bool,
}

/// All acquire/release call sites of one resource signature.
#[derive(Debug, Clone)]
pub struct SignatureSites {
    /// Signature name (the lock-argument text).
    pub name: String,
    /// Acquire call sites.
    pub acquires: Vec<SiteRef>,
    /// Release call sites.
    pub releases: Vec<SiteRef>,
}

/// Matching pair graph for one signature.
#[derive(Debug)]
pub struct Mpg {
    /// Member functions, sorted by id.
    pub functions: Vec<FuncId>,
    /// Induced call edges (caller, callee). Self-loops and cycle-closing
    /// back edges are pruned; see [`build_mpg`].
    pub edges: Vec<(FuncId, FuncId)>,
    /// Members in callees-first topological order.
    pub topo: Vec<FuncId>,
    /// Members never called from within the envelope.
    pub roots: FxHashSet<FuncId>,
}

impl Mpg {
    /// True when `f` belongs to the envelope.
    #[must_use]
    pub fn contains(&self, f: FuncId) -> bool {
        self.functions.binary_search(&f).is_ok()
    }
}

/// Derives the envelope for one signature from the whole-program call graph.
///
/// Self-loops are pruned and a DFS greedily drops the back edges of mutual
/// recursion, so recursive envelopes degrade to their acyclic approximation
/// (the recursive call finds no callee summary and passes through). Guard
/// rails abort the signature (not the batch): size bound, exclusion list,
/// and an envelope still cyclic after the pruning.
pub fn build_mpg(
    graph: &ProgramGraph,
    cg: &CallGraph,
    sites: &SignatureSites,
    config: &RunConfig,
) -> Result<Mpg, SkipReason> {
    // Group directly-calling functions.
    let mut acquire_callers: FxHashSet<FuncId> = sites.acquires.iter().map(|s| s.func).collect();
    let mut release_callers: FxHashSet<FuncId> = sites.releases.iter().map(|s| s.func).collect();

    // Dual-call heuristic: a function whose last release call site does not
    // textually follow its last acquire call site is treated as
    // acquire-only. Syntactic approximation kept from the original design.
    let both: Vec<FuncId> = acquire_callers
        .intersection(&release_callers)
        .copied()
        .collect();
    for f in both {
        let last_acquire = sites
            .acquires
            .iter()
            .filter(|s| s.func == f)
            .map(|s| s.order)
            .max();
        let last_release = sites
            .releases
            .iter()
            .filter(|s| s.func == f)
            .map(|s| s.order)
            .max();
        if let (Some(a), Some(r)) = (last_acquire, last_release) {
            if r < a {
                release_callers.remove(&f);
            }
        }
    }

    // Reverse reachability: everything that can reach each side.
    let reach_acquire = reverse_reachable(cg, &acquire_callers);
    let reach_release = reverse_reachable(cg, &release_callers);
    let balanced: FxHashSet<FuncId> = reach_acquire
        .intersection(&reach_release)
        .copied()
        .collect();
    let either: FxHashSet<FuncId> = reach_acquire.union(&reach_release).copied().collect();

    // Envelope: descendants of balanced callers that still lie on a path to
    // one of the sides, plus the direct callers themselves.
    let descend = forward_reachable(cg, &balanced);
    let mut members: FxHashSet<FuncId> = descend.intersection(&either).copied().collect();
    members.extend(acquire_callers.iter().copied());
    members.extend(release_callers.iter().copied());

    if members.len() > config.mpg_node_limit {
        return Err(SkipReason::SizeLimit {
            size: members.len(),
            limit: config.mpg_node_limit,
        });
    }
    for &f in &members {
        let name = graph.function(f).name.as_str();
        if config.excluded_functions.iter().any(|e| e == name) {
            return Err(SkipReason::ProblematicFunction {
                name: name.to_owned(),
            });
        }
    }

    let mut functions: Vec<FuncId> = members.iter().copied().collect();
    functions.sort_unstable();

    // Induced call edges; self-loops pruned silently.
    let mut edges: Vec<(FuncId, FuncId)> = Vec::new();
    for &caller in &functions {
        if let Some(callees) = cg.callees.get(&caller) {
            for &callee in callees {
                if callee != caller && members.contains(&callee) {
                    edges.push((caller, callee));
                }
            }
        }
    }
    edges.sort_unstable();
    edges.dedup();
    let edges = strip_back_edges(&functions, edges);

    let topo = topo_callees_first(&functions, &edges).ok_or(SkipReason::CyclicEnvelope)?;

    let called: FxHashSet<FuncId> = edges.iter().map(|&(_, callee)| callee).collect();
    let roots: FxHashSet<FuncId> = functions
        .iter()
        .copied()
        .filter(|f| !called.contains(f))
        .collect();

    Ok(Mpg {
        functions,
        edges,
        topo,
        roots,
    })
}

fn reverse_reachable(cg: &CallGraph, seed: &FxHashSet<FuncId>) -> FxHashSet<FuncId> {
    let mut reached = seed.clone();
    let mut stack: Vec<FuncId> = seed.iter().copied().collect();
    while let Some(f) = stack.pop() {
        if let Some(callers) = cg.callers.get(&f) {
            for &c in callers {
                if reached.insert(c) {
                    stack.push(c);
                }
            }
        }
    }
    reached
}

fn forward_reachable(cg: &CallGraph, seed: &FxHashSet<FuncId>) -> FxHashSet<FuncId> {
    let mut reached = seed.clone();
    let mut stack: Vec<FuncId> = seed.iter().copied().collect();
    while let Some(f) = stack.pop() {
        if let Some(callees) = cg.callees.get(&f) {
            for &c in callees {
                if reached.insert(c) {
                    stack.push(c);
                }
            }
        }
    }
    reached
}

/// Drops the back edges found by a DFS over the induced call edges. The
/// remainder is acyclic, giving the callees-first order the verifier needs;
/// a call over a dropped edge contributes nothing to its caller's state.
fn strip_back_edges(
    functions: &[FuncId],
    edges: Vec<(FuncId, FuncId)>,
) -> Vec<(FuncId, FuncId)> {
    let index: FxHashMap<FuncId, usize> = functions
        .iter()
        .enumerate()
        .map(|(i, &f)| (f, i))
        .collect();
    let mut out: Vec<Vec<usize>> = vec![Vec::new(); functions.len()];
    for (i, &(caller, _)) in edges.iter().enumerate() {
        out[index[&caller]].push(i);
    }

    #[derive(Clone, Copy, PartialEq)]
    enum Color {
        White,
        Gray,
        Black,
    }
    let mut color = vec![Color::White; functions.len()];
    let mut dropped = vec![false; edges.len()];
    for start in 0..functions.len() {
        if color[start] != Color::White {
            continue;
        }
        color[start] = Color::Gray;
        let mut stack: Vec<(usize, usize)> = vec![(start, 0)];
        while let Some(&mut (node, ref mut pos)) = stack.last_mut() {
            if let Some(&e) = out[node].get(*pos) {
                *pos += 1;
                let target = index[&edges[e].1];
                match color[target] {
                    Color::Gray => dropped[e] = true,
                    Color::White => {
                        color[target] = Color::Gray;
                        stack.push((target, 0));
                    }
                    Color::Black => {}
                }
            } else {
                color[node] = Color::Black;
                stack.pop();
            }
        }
    }

    edges
        .into_iter()
        .zip(dropped)
        .filter_map(|(e, drop)| (!drop).then_some(e))
        .collect()
}

/// Kahn's algorithm emitting callees before callers. Returns `None` when a
/// cycle between distinct members remains.
fn topo_callees_first(functions: &[FuncId], edges: &[(FuncId, FuncId)]) -> Option<Vec<FuncId>> {
    // Out-degree within the envelope; a function with no un-emitted callees
    // is ready.
    let mut out_degree: FxHashMap<FuncId, usize> = functions.iter().map(|&f| (f, 0)).collect();
    let mut callers_of: FxHashMap<FuncId, Vec<FuncId>> = FxHashMap::default();
    for &(caller, callee) in edges {
        *out_degree.entry(caller).or_default() += 1;
        callers_of.entry(callee).or_default().push(caller);
    }

    let mut ready: Vec<FuncId> = functions
        .iter()
        .copied()
        .filter(|f| out_degree[f] == 0)
        .collect();
    ready.sort_unstable();

    let mut topo = Vec::with_capacity(functions.len());
    while let Some(f) = ready.pop() {
        topo.push(f);
        if let Some(callers) = callers_of.get(&f) {
            for &caller in callers {
                let d = out_degree.get_mut(&caller)?;
                *d -= 1;
                if *d == 0 {
                    ready.push(caller);
                }
            }
        }
    }

    if topo.len() == functions.len() {
        Some(topo)
    } else {
        None
    }
}
