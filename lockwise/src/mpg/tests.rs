use super::*;
use crate::config::RunConfig;
use crate::errors::SkipReason;
use crate::graph::{CallGraph, FuncId, ProgramGraph};
use crate::test_utils::{FunctionSketch, ProgramSketch};

fn site(func: FuncId, node: usize, order: usize) -> SiteRef {
    SiteRef {
        func,
        node,
        order,
        multi_state: false,
    }
}

/// main calls helper (locks) and releaser (unlocks).
fn split_program() -> (ProgramGraph, CallGraph) {
    let mut main = FunctionSketch::new("main");
    let entry = main.node("entry");
    let a = main.node("helper(&m)");
    let b = main.node("releaser(&m)");
    main.edge(entry, a).edge(a, b);
    main.plain_call(a, "helper").plain_call(b, "releaser");

    let mut helper = FunctionSketch::new("helper");
    let entry = helper.node("entry");
    let lock = helper.node("pthread_mutex_lock(&m)");
    helper.edge(entry, lock);
    helper.call(lock, "pthread_mutex_lock", "&m");

    let mut releaser = FunctionSketch::new("releaser");
    let entry = releaser.node("entry");
    let unlock = releaser.node("pthread_mutex_unlock(&m)");
    releaser.edge(entry, unlock);
    releaser.call(unlock, "pthread_mutex_unlock", "&m");

    let mut program = ProgramSketch::new();
    program
        .function(main.build())
        .function(helper.build())
        .function(releaser.build());
    let graph = program.build();
    let cg = graph.call_graph();
    (graph, cg)
}

fn split_sites(graph: &ProgramGraph) -> SignatureSites {
    let helper = graph.lookup("helper").unwrap();
    let releaser = graph.lookup("releaser").unwrap();
    SignatureSites {
        name: "&m".to_owned(),
        acquires: vec![site(helper, 1, 0)],
        releases: vec![site(releaser, 1, 0)],
    }
}

#[test]
fn envelope_spans_balanced_caller_and_both_sides() {
    let (graph, cg) = split_program();
    let sites = split_sites(&graph);
    let mpg = build_mpg(&graph, &cg, &sites, &RunConfig::default()).unwrap();

    let main = graph.lookup("main").unwrap();
    let helper = graph.lookup("helper").unwrap();
    let releaser = graph.lookup("releaser").unwrap();
    assert!(mpg.contains(main));
    assert!(mpg.contains(helper));
    assert!(mpg.contains(releaser));
    assert_eq!(mpg.functions.len(), 3);
    assert!(mpg.roots.contains(&main));
    assert!(!mpg.roots.contains(&helper));
}

#[test]
fn topo_emits_callees_before_callers() {
    let (graph, cg) = split_program();
    let sites = split_sites(&graph);
    let mpg = build_mpg(&graph, &cg, &sites, &RunConfig::default()).unwrap();

    let main = graph.lookup("main").unwrap();
    let helper = graph.lookup("helper").unwrap();
    let pos = |f| mpg.topo.iter().position(|&x| x == f).unwrap();
    assert!(pos(helper) < pos(main));
}

#[test]
fn node_limit_skips_signature() {
    let (graph, cg) = split_program();
    let sites = split_sites(&graph);
    let config = RunConfig {
        mpg_node_limit: 2,
        ..RunConfig::default()
    };
    match build_mpg(&graph, &cg, &sites, &config) {
        Err(SkipReason::SizeLimit { size: 3, limit: 2 }) => {}
        other => panic!("expected size-limit skip, got {other:?}"),
    }
}

#[test]
fn excluded_function_skips_signature() {
    let (graph, cg) = split_program();
    let sites = split_sites(&graph);
    let config = RunConfig {
        excluded_functions: vec!["helper".to_owned()],
        ..RunConfig::default()
    };
    match build_mpg(&graph, &cg, &sites, &config) {
        Err(SkipReason::ProblematicFunction { name }) => assert_eq!(name, "helper"),
        other => panic!("expected exclusion skip, got {other:?}"),
    }
}

#[test]
fn mutual_recursion_degrades_to_the_acyclic_approximation() {
    let mut a = FunctionSketch::new("a");
    let entry = a.node("entry");
    let lock = a.node("pthread_mutex_lock(&m)");
    let call_b = a.node("b()");
    a.edge(entry, lock).edge(lock, call_b);
    a.call(lock, "pthread_mutex_lock", "&m").plain_call(call_b, "b");

    let mut b = FunctionSketch::new("b");
    let entry = b.node("entry");
    let unlock = b.node("pthread_mutex_unlock(&m)");
    let call_a = b.node("a()");
    b.edge(entry, unlock).edge(unlock, call_a);
    b.call(unlock, "pthread_mutex_unlock", "&m")
        .plain_call(call_a, "a");

    let mut program = ProgramSketch::new();
    program.function(a.build()).function(b.build());
    let graph = program.build();
    let cg = graph.call_graph();

    let a_id = graph.lookup("a").unwrap();
    let b_id = graph.lookup("b").unwrap();
    let sites = SignatureSites {
        name: "&m".to_owned(),
        acquires: vec![site(a_id, 1, 0)],
        releases: vec![site(b_id, 1, 0)],
    };
    // The back edge closing the a <-> b cycle is dropped; the envelope
    // keeps both members with a callees-first order over the remainder.
    let mpg = build_mpg(&graph, &cg, &sites, &RunConfig::default()).unwrap();
    assert_eq!(mpg.functions, vec![a_id, b_id]);
    assert_eq!(mpg.edges, vec![(a_id, b_id)]);
    assert_eq!(mpg.topo, vec![b_id, a_id]);
    assert!(mpg.roots.contains(&a_id));
    assert!(!mpg.roots.contains(&b_id));
}

#[test]
fn self_recursion_is_pruned_not_cyclic() {
    let mut f = FunctionSketch::new("f");
    let entry = f.node("entry");
    let lock = f.node("pthread_mutex_lock(&m)");
    let rec = f.node("f()");
    let unlock = f.node("pthread_mutex_unlock(&m)");
    f.edge(entry, lock).edge(lock, rec).edge(rec, unlock);
    f.call(lock, "pthread_mutex_lock", "&m")
        .plain_call(rec, "f")
        .call(unlock, "pthread_mutex_unlock", "&m");

    let mut program = ProgramSketch::new();
    program.function(f.build());
    let graph = program.build();
    let cg = graph.call_graph();

    let id = graph.lookup("f").unwrap();
    let sites = SignatureSites {
        name: "&m".to_owned(),
        acquires: vec![site(id, 1, 0)],
        releases: vec![site(id, 3, 2)],
    };
    let mpg = build_mpg(&graph, &cg, &sites, &RunConfig::default()).unwrap();
    assert_eq!(mpg.functions, vec![id]);
    assert!(mpg.edges.is_empty());
    assert!(mpg.roots.contains(&id));
}

#[test]
fn dual_call_heuristic_drops_release_side() {
    // reversed() unlocks before it locks, so it must not count as a release
    // provider; its caller then has no balanced path and stays outside.
    let mut caller = FunctionSketch::new("caller");
    let entry = caller.node("entry");
    let call = caller.node("reversed()");
    caller.edge(entry, call);
    caller.plain_call(call, "reversed");

    let mut reversed = FunctionSketch::new("reversed");
    let entry = reversed.node("entry");
    let unlock = reversed.node("pthread_mutex_unlock(&m)");
    let lock = reversed.node("pthread_mutex_lock(&m)");
    reversed.edge(entry, unlock).edge(unlock, lock);
    reversed
        .call(unlock, "pthread_mutex_unlock", "&m")
        .call(lock, "pthread_mutex_lock", "&m");

    let mut program = ProgramSketch::new();
    program.function(caller.build()).function(reversed.build());
    let graph = program.build();
    let cg = graph.call_graph();

    let caller_id = graph.lookup("caller").unwrap();
    let reversed_id = graph.lookup("reversed").unwrap();
    let sites = SignatureSites {
        name: "&m".to_owned(),
        acquires: vec![site(reversed_id, 2, 1)],
        releases: vec![site(reversed_id, 1, 0)],
    };
    let mpg = build_mpg(&graph, &cg, &sites, &RunConfig::default()).unwrap();
    assert!(mpg.contains(reversed_id));
    assert!(!mpg.contains(caller_id));
}
