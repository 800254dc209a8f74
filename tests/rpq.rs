//! A basic RPQ scenario, plus a `from_set`/`to_set` subsumption check
//! against the `between_all` result.

use pathmatrix::automaton::{build_from_regex, Dialect};
use pathmatrix::graph::LabeledGraph;
use pathmatrix::rpq::{solve_rpq, RpqQuery};

#[test]
fn between_all_matches_spec_scenario() {
    let graph = LabeledGraph::from_text(["0 a 1", "1 b 2", "2 a 0"]).unwrap();
    let constraint = build_from_regex("a b", Dialect::Simplified).unwrap();
    let pairs = solve_rpq(&graph, &constraint, &RpqQuery::BetweenAll);
    assert_eq!(pairs, [(0, 2)].into_iter().collect());
}

#[test]
fn from_to_set_subsumes_between_all() {
    let graph = LabeledGraph::from_text(["0 a 1", "1 b 2", "2 a 0", "0 b 2"]).unwrap();
    let constraint = build_from_regex("a b", Dialect::Simplified).unwrap();

    let all = solve_rpq(&graph, &constraint, &RpqQuery::BetweenAll);
    let from_set: std::collections::BTreeSet<usize> = [0].into_iter().collect();
    let to_set: std::collections::BTreeSet<usize> = [2].into_iter().collect();
    let filtered = solve_rpq(&graph, &constraint, &RpqQuery::FromSetToSet(from_set.clone(), to_set.clone()));

    let expected: std::collections::HashSet<(usize, usize)> = all
        .into_iter()
        .filter(|(u, v)| from_set.contains(u) && to_set.contains(v))
        .collect();
    assert_eq!(filtered, expected);
}
