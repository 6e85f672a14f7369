use rustc_hash::FxHashMap;

use super::heuristics::success_branch;
use super::*;
use crate::graph::Cfg;
use crate::test_utils::FunctionSketch;

fn cfg_of(sketch: FunctionSketch) -> Cfg {
    sketch.build().cfg
}

#[test]
fn diamond_enumerates_both_paths() {
    let mut f = FunctionSketch::new("f");
    let entry = f.node("entry");
    let cond = f.cond("x > 0");
    let a = f.node("a");
    let b = f.node("b");
    let join = f.node("join");
    f.edge(entry, cond)
        .cond_edge(cond, a, true)
        .cond_edge(cond, b, false)
        .edge(a, join)
        .edge(b, join);
    let cfg = cfg_of(f);

    let paths = enumerate_paths(&cfg);
    assert_eq!(paths.paths.len(), 2);
    assert!(!paths.truncated);
    for path in &paths.paths {
        assert_eq!(path[0], cfg.entry);
        assert_eq!(*path.last().unwrap(), cfg.exit);
        assert!(paths.consistent(&cfg, path));
    }
}

#[test]
fn repeated_literal_contradiction_is_infeasible() {
    // Acquire under `x > 0`, release under `!(x > 0)` written as the false
    // branch of the same test: the only path reaching both contradicts
    // itself.
    let mut f = FunctionSketch::new("f");
    let entry = f.node("entry");
    let c1 = f.cond("x > 0");
    let acq = f.node("pthread_mutex_lock(&m)");
    let skip1 = f.node("skip1");
    let c2 = f.cond("x > 0");
    let skip2 = f.node("skip2");
    let rel = f.node("pthread_mutex_unlock(&m)");
    let done = f.node("return");
    f.edge(entry, c1)
        .cond_edge(c1, acq, true)
        .cond_edge(c1, skip1, false)
        .edge(acq, c2)
        .edge(skip1, c2)
        .cond_edge(c2, skip2, true)
        .cond_edge(c2, rel, false)
        .edge(skip2, done)
        .edge(rel, done);
    let cfg = cfg_of(f);

    let checker = FeasibilityChecker::new(&cfg, FxHashMap::default());
    assert_eq!(
        checker.check(acq, Some(rel), &[]),
        PairFeasibility::Infeasible
    );
    // The dangling side of the same acquire is the consistent continuation.
    assert_eq!(checker.check(acq, None, &[rel]), PairFeasibility::Feasible);
}

#[test]
fn excluded_node_between_endpoints_drops_the_candidate() {
    let mut f = FunctionSketch::new("f");
    let entry = f.node("entry");
    let acq = f.node("pthread_mutex_lock(&m)");
    let rel = f.node("pthread_mutex_unlock(&m)");
    let done = f.node("return");
    f.edge(entry, acq).edge(acq, rel).edge(rel, done);
    let cfg = cfg_of(f);

    let checker = FeasibilityChecker::new(&cfg, FxHashMap::default());
    // Every path to exit passes the release, so no candidate remains and
    // the pair is accepted vacuously.
    assert_eq!(checker.check(acq, None, &[rel]), PairFeasibility::Feasible);
}

#[test]
fn failure_branch_pair_is_not_valid() {
    let mut f = FunctionSketch::new("f");
    let entry = f.node("entry");
    let try_acq = f.cond("pthread_mutex_trylock(&m)");
    let rel = f.node("pthread_mutex_unlock(&m)");
    let done = f.node("return");
    f.edge(entry, try_acq)
        .cond_edge(try_acq, rel, true)
        .cond_edge(try_acq, done, false)
        .edge(rel, done);
    let cfg = cfg_of(f);

    let branch_map =
        branch_success_map(&cfg, &[(try_acq, "pthread_mutex_trylock")], &FxHashMap::default());
    assert_eq!(branch_map[&try_acq], (try_acq, false));

    let checker = FeasibilityChecker::new(&cfg, branch_map);
    // The release sits on the true branch, but a zero return (false) is
    // the success: pairing acquire with that release never happens.
    assert_eq!(
        checker.check(try_acq, Some(rel), &[]),
        PairFeasibility::NotValid
    );
    // The failure-free continuation straight to exit takes the success
    // branch and survives.
    assert_eq!(checker.check(try_acq, None, &[rel]), PairFeasibility::Feasible);
}

#[test]
fn supplied_branch_decision_covers_a_result_variable_test() {
    // The trylock result flows through `r` before the test, so the label
    // heuristic finds nothing. A supplied decision binds the site to the
    // nearest consuming condition anyway.
    let mut f = FunctionSketch::new("f");
    let entry = f.node("entry");
    let try_acq = f.node("r = pthread_mutex_trylock(&m)");
    let cond = f.cond("r != 0");
    let rel = f.node("pthread_mutex_unlock(&m)");
    let done = f.node("return");
    f.edge(entry, try_acq)
        .edge(try_acq, cond)
        .cond_edge(cond, done, true)
        .cond_edge(cond, rel, false)
        .edge(rel, done);
    let cfg = cfg_of(f);
    let sites = [(try_acq, "pthread_mutex_trylock")];

    assert!(branch_success_map(&cfg, &sites, &FxHashMap::default()).is_empty());

    let mut overrides = FxHashMap::default();
    overrides.insert(try_acq, false);
    let branch_map = branch_success_map(&cfg, &sites, &overrides);
    assert_eq!(branch_map[&try_acq], (cond, false));
}

#[test]
fn supplied_branch_decision_beats_the_label_heuristic() {
    let mut f = FunctionSketch::new("f");
    let entry = f.node("entry");
    let try_acq = f.cond("pthread_mutex_trylock(&m)");
    let rel = f.node("pthread_mutex_unlock(&m)");
    let done = f.node("return");
    f.edge(entry, try_acq)
        .cond_edge(try_acq, rel, true)
        .cond_edge(try_acq, done, false)
        .edge(rel, done);
    let cfg = cfg_of(f);
    let sites = [(try_acq, "pthread_mutex_trylock")];

    // The bare-call shape reads as failure on the true branch; the supplied
    // decision says the opposite and wins.
    let mut overrides = FxHashMap::default();
    overrides.insert(try_acq, true);
    let branch_map = branch_success_map(&cfg, &sites, &overrides);
    assert_eq!(branch_map[&try_acq], (try_acq, true));
}

#[test]
fn contradiction_beyond_the_release_is_ignored() {
    // The same test repeats after the release with only a false arm; the
    // pair itself ends at the release, so the later contradiction does not
    // touch it.
    let mut f = FunctionSketch::new("f");
    let entry = f.node("entry");
    let c1 = f.cond("x > 0");
    let acq = f.node("pthread_mutex_lock(&m)");
    let bail = f.node("bail");
    let rel = f.node("pthread_mutex_unlock(&m)");
    let c2 = f.cond("x > 0");
    let done = f.node("return");
    f.edge(entry, c1)
        .cond_edge(c1, acq, true)
        .cond_edge(c1, bail, false)
        .edge(acq, rel)
        .edge(rel, c2)
        .cond_edge(c2, done, false)
        .edge(bail, done);
    let cfg = cfg_of(f);

    let checker = FeasibilityChecker::new(&cfg, FxHashMap::default());
    assert_eq!(checker.check(acq, Some(rel), &[]), PairFeasibility::Feasible);
    // Running on to the exit crosses the repeated test and contradicts it.
    assert_eq!(checker.check(acq, None, &[]), PairFeasibility::Infeasible);
}

#[test]
fn success_branch_recognizes_pthread_test_shapes() {
    let callee = "pthread_mutex_trylock";
    assert_eq!(success_branch("!pthread_mutex_trylock(&m)", callee), Some(true));
    assert_eq!(
        success_branch("pthread_mutex_trylock(&m) == 0", callee),
        Some(true)
    );
    assert_eq!(
        success_branch("pthread_mutex_trylock(&m) != 0", callee),
        Some(false)
    );
    assert_eq!(
        success_branch("pthread_mutex_trylock(&m)", callee),
        Some(false)
    );
    assert_eq!(success_branch("ret", callee), None);
    assert_eq!(success_branch("ret == 0", callee), None);
}

#[test]
fn enumeration_truncates_at_the_cap() {
    // Thirteen chained diamonds give 8192 simple paths.
    let mut f = FunctionSketch::new("f");
    let mut prev = f.node("entry");
    for i in 0..13 {
        let cond = f.cond(&format!("c{i}"));
        let a = f.node("a");
        let b = f.node("b");
        let join = f.node("join");
        f.edge(prev, cond)
            .cond_edge(cond, a, true)
            .cond_edge(cond, b, false)
            .edge(a, join)
            .edge(b, join);
        prev = join;
    }
    let cfg = cfg_of(f);

    let paths = enumerate_paths(&cfg);
    assert!(paths.truncated);
    assert_eq!(paths.paths.len(), MAX_PATHS);

    let checker = FeasibilityChecker::new(&cfg, FxHashMap::default());
    assert_eq!(checker.check(1, None, &[]), PairFeasibility::Feasible);
}

#[test]
fn cache_round_trips_and_skips_clean_saves() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("feasibility.cache");

    let mut cache = FeasibilityCache::load(&path).unwrap();
    assert!(cache.is_empty());
    cache.insert(FeasibilityCache::key("a.c:10", Some("a.c:14")), true);
    cache.insert(FeasibilityCache::key("a.c:10", None), false);
    cache.set_branch("b.c:7".to_owned(), true);
    cache.save(&path).unwrap();

    let reloaded = FeasibilityCache::load(&path).unwrap();
    assert_eq!(reloaded.len(), 3);
    assert_eq!(reloaded.get("a.c:10 -> a.c:14"), Some(true));
    assert_eq!(reloaded.get("a.c:10 -> <exit>"), Some(false));
    assert_eq!(reloaded.branch("b.c:7"), Some(true));
}

#[test]
fn hand_written_branch_lines_parse_alongside_pair_lines() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("feasibility.cache");
    std::fs::write(
        &path,
        "# decisions\nworker.c:12 = F\nworker.c:12 -> worker.c:30 = T\n",
    )
    .unwrap();

    let cache = FeasibilityCache::load(&path).unwrap();
    assert_eq!(cache.branch("worker.c:12"), Some(false));
    assert_eq!(cache.get("worker.c:12 -> worker.c:30"), Some(true));
    assert_eq!(cache.branch("worker.c:99"), None);
}
