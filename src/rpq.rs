//! Regular path query solving: intersect the constraint automaton with
//! the graph via Kronecker product, dispatch on the query's shape, then
//! read off reachable pairs through the product's transitive closure.

use std::collections::{BTreeSet, HashSet};

use serde::Deserialize;

use crate::closure;
use crate::error::{EngineError, Result};
use crate::graph::LabeledGraph;
use crate::kronecker;

#[derive(Debug, Deserialize)]
struct RawQuery {
    #[serde(default)]
    reachability_between_all: bool,
    reachability_from_set: Option<Vec<usize>>,
    reachability_to_set: Option<Vec<usize>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RpqQuery {
    BetweenAll,
    FromSet(BTreeSet<usize>),
    FromSetToSet(BTreeSet<usize>, BTreeSet<usize>),
}

impl RpqQuery {
    pub fn from_json(text: &str) -> Result<RpqQuery> {
        let raw: RawQuery =
            serde_json::from_str(text).map_err(|e| EngineError::Parse(format!("malformed query JSON: {e}")))?;
        RpqQuery::from_raw(raw)
    }

    fn from_raw(raw: RawQuery) -> Result<RpqQuery> {
        if raw.reachability_between_all {
            return Ok(RpqQuery::BetweenAll);
        }
        match (raw.reachability_from_set, raw.reachability_to_set) {
            (Some(from), None) => Ok(RpqQuery::FromSet(from.into_iter().collect())),
            (Some(from), Some(to)) => Ok(RpqQuery::FromSetToSet(from.into_iter().collect(), to.into_iter().collect())),
            _ => Err(EngineError::InvalidQuery("incorrect format of the input query".into())),
        }
    }
}

/// Solve one RPQ: `constraint` is the automaton built from the regex,
/// `graph` is the data graph being queried.
pub fn solve_rpq(graph: &LabeledGraph, constraint: &LabeledGraph, query: &RpqQuery) -> HashSet<(usize, usize)> {
    let intersection = kronecker::product(constraint, graph);
    let step = graph.vertices_num();

    let (start_idxs, end_idxs): (BTreeSet<usize>, BTreeSet<usize>) = match query {
        RpqQuery::BetweenAll => (intersection.start_states.clone(), intersection.final_states.clone()),
        RpqQuery::FromSet(from) => {
            let start = intersection
                .start_states
                .iter()
                .filter(|idx| from.contains(&(*idx % step)))
                .copied()
                .collect();
            (start, intersection.final_states.clone())
        }
        RpqQuery::FromSetToSet(from, to) => {
            let start = intersection
                .start_states
                .iter()
                .filter(|idx| from.contains(&(*idx % step)))
                .copied()
                .collect();
            let end = intersection
                .final_states
                .iter()
                .filter(|idx| to.contains(&(*idx % step)))
                .copied()
                .collect();
            (start, end)
        }
    };

    let reachability = closure::by_squaring(intersection.store());
    let mut result = HashSet::new();
    for &s in &start_idxs {
        for &e in &end_idxs {
            if reachability.get(s, e) {
                result.insert((s % step, e % step));
            }
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::automaton::{build_from_regex, Dialect};
    use crate::graph::Edge;
    use crate::matrix::label;

    fn triangle() -> LabeledGraph {
        LabeledGraph::from_edges([
            Edge { from: 0, label: label("a"), to: 1 },
            Edge { from: 1, label: label("a"), to: 2 },
            Edge { from: 2, label: label("a"), to: 0 },
        ])
    }

    #[test]
    fn between_all_finds_every_cycle_length_multiple_of_pattern() {
        let graph = triangle();
        let constraint = build_from_regex("a a", Dialect::Simplified).unwrap();
        let query = RpqQuery::BetweenAll;
        let pairs = solve_rpq(&graph, &constraint, &query);
        assert!(pairs.contains(&(0, 2)));
    }

    #[test]
    fn from_set_restricts_starts() {
        let graph = triangle();
        let constraint = build_from_regex("a", Dialect::Simplified).unwrap();
        let query = RpqQuery::FromSet([0].into_iter().collect());
        let pairs = solve_rpq(&graph, &constraint, &query);
        assert!(pairs.iter().all(|(s, _)| *s == 0));
        assert!(pairs.contains(&(0, 1)));
    }

    #[test]
    fn malformed_query_json_is_rejected() {
        let err = RpqQuery::from_json("{}").unwrap_err();
        assert!(matches!(err, EngineError::InvalidQuery(_)));
    }
}
