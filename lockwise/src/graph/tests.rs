use super::*;

const SIMPLE_DOC: &str = r#"{
  "functions": [
    {
      "name": "worker",
      "file": "worker.c",
      "nodes": [
        {"id": 0, "label": "entry", "line": 10},
        {"id": 1, "label": "pthread_mutex_lock(&m)", "line": 11},
        {"id": 2, "label": "count++", "line": 12},
        {"id": 3, "label": "pthread_mutex_unlock(&m)", "line": 13},
        {"id": 4, "label": "return", "line": 14}
      ],
      "edges": [
        {"from": 0, "to": 1},
        {"from": 1, "to": 2},
        {"from": 2, "to": 3},
        {"from": 3, "to": 4}
      ],
      "calls": [
        {"node": 1, "callee": "pthread_mutex_lock", "resource": "&m"},
        {"node": 3, "callee": "pthread_mutex_unlock", "resource": "&m"}
      ]
    }
  ]
}"#;

#[test]
fn parses_and_normalizes_simple_function() {
    let graph = parse_program_graph(SIMPLE_DOC).expect("should parse");
    assert_eq!(graph.len(), 1);
    let id = graph.lookup("worker").expect("function exists");
    let cfg = graph.cfg(id);
    assert_eq!(cfg.entry, 0);
    assert_eq!(cfg.exit, 4);
    assert!(cfg.nodes[cfg.entry].is_entry);
    assert!(cfg.nodes[cfg.exit].is_exit);
    assert!(!cfg.has_disconnected_node());
}

#[test]
fn synthesizes_master_exit_for_multiple_returns() {
    let doc = r#"{
      "functions": [
        {
          "name": "branchy",
          "nodes": [
            {"id": 0, "label": "entry"},
            {"id": 1, "label": "flag", "condition": true},
            {"id": 2, "label": "return 1"},
            {"id": 3, "label": "return 0"}
          ],
          "edges": [
            {"from": 0, "to": 1},
            {"from": 1, "to": 2, "cond": true},
            {"from": 1, "to": 3, "cond": false}
          ]
        }
      ]
    }"#;
    let graph = parse_program_graph(doc).expect("should parse");
    let cfg = graph.cfg(FuncId(0));
    // A fifth node was synthesized and both returns feed it.
    assert_eq!(cfg.nodes.len(), 5);
    assert_eq!(cfg.exit, 4);
    assert_eq!(cfg.predecessors(cfg.exit).count(), 2);
    assert_eq!(cfg.nodes[cfg.exit].label, "<exit>");
}

#[test]
fn tags_loop_back_edge() {
    let doc = r#"{
      "functions": [
        {
          "name": "spin",
          "nodes": [
            {"id": 0, "label": "entry"},
            {"id": 1, "label": "i < n", "condition": true},
            {"id": 2, "label": "i++"},
            {"id": 3, "label": "return"}
          ],
          "edges": [
            {"from": 0, "to": 1},
            {"from": 1, "to": 2, "cond": true},
            {"from": 2, "to": 1},
            {"from": 1, "to": 3, "cond": false}
          ]
        }
      ]
    }"#;
    let graph = parse_program_graph(doc).expect("should parse");
    let cfg = graph.cfg(FuncId(0));
    let back: Vec<_> = cfg.edges.iter().filter(|e| e.back_edge).collect();
    assert_eq!(back.len(), 1);
    assert_eq!((back[0].from, back[0].to), (2, 1));
}

#[test]
fn call_graph_resolves_internal_targets_only() {
    let doc = r#"{
      "functions": [
        {
          "name": "caller",
          "nodes": [{"id": 0, "label": "entry"}, {"id": 1, "label": "helper()"}],
          "edges": [{"from": 0, "to": 1}],
          "calls": [
            {"node": 1, "callee": "helper"},
            {"node": 1, "callee": "external_fn"}
          ]
        },
        {
          "name": "helper",
          "nodes": [{"id": 0, "label": "entry"}]
        }
      ]
    }"#;
    let graph = parse_program_graph(doc).expect("should parse");
    let caller = graph.lookup("caller").expect("exists");
    let helper = graph.lookup("helper").expect("exists");
    let cg = graph.call_graph();
    assert_eq!(cg.callees.get(&caller), Some(&vec![helper]));
    assert_eq!(cg.callers.get(&helper), Some(&vec![caller]));
    assert!(cg.callees.get(&helper).is_none());
}

#[test]
fn rejects_edge_to_unknown_node() {
    let doc = r#"{
      "functions": [
        {
          "name": "broken",
          "nodes": [{"id": 0, "label": "entry"}],
          "edges": [{"from": 0, "to": 9}]
        }
      ]
    }"#;
    let err = parse_program_graph(doc).expect_err("must fail");
    assert!(matches!(err, LoadError::Malformed { .. }));
}
