//! Intersection via Kronecker (tensor) product of two labeled graphs.
//!
//! For every label that appears in `self`, multiplies `self[label]` by
//! `other[label]` (or an all-zero matrix if `other` lacks the label);
//! labels present only in `other` are dropped. Start/final states of the
//! product are a deliberately conservative superset — every `other`
//! state paired with each of `self`'s starts/finals — filtered later by
//! the caller via `id % other.size()`.

use std::collections::BTreeSet;

use crate::graph::LabeledGraph;
use crate::matrix::{BoolMatrix, MatrixStore};

pub fn product(lhs: &LabeledGraph, rhs: &LabeledGraph) -> LabeledGraph {
    let step = rhs.vertices_num();
    let zero = BoolMatrix::zeros(step);
    let mut store = MatrixStore::new(lhs.vertices_num() * step);

    for label in lhs.store().labels() {
        let a = lhs.store().get(label).expect("label came from lhs.store().labels()");
        let b = rhs.store().get(label).unwrap_or(&zero);
        store.insert(label.clone(), a.kronecker(b));
    }

    let expand = |states: &BTreeSet<usize>| -> BTreeSet<usize> {
        states
            .iter()
            .flat_map(|&i| (0..step).map(move |k| i * step + k))
            .collect()
    };
    let start_states = expand(&lhs.start_states);
    let final_states = expand(&lhs.final_states);

    LabeledGraph::from_store(store, start_states, final_states)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Edge;
    use crate::matrix::label;

    #[test]
    fn drops_labels_only_present_in_other() {
        let lhs = LabeledGraph::from_edges([Edge { from: 0, label: label("a"), to: 1 }]);
        let rhs = LabeledGraph::from_edges([Edge { from: 0, label: label("b"), to: 1 }]);
        let p = product(&lhs, &rhs);
        assert!(p.store().get(&label("a")).is_some());
        assert!(p.store().get(&label("b")).is_none());
    }

    #[test]
    fn start_final_are_conservative_superset() {
        let lhs = LabeledGraph::from_edges([Edge { from: 0, label: label("a"), to: 1 }]);
        let rhs = LabeledGraph::from_edges([Edge { from: 0, label: label("a"), to: 1 }]);
        let p = product(&lhs, &rhs);
        // step = rhs.vertices_num() = 2; lhs starts = {0,1} -> {0,1,2,3}
        assert_eq!(p.start_states, [0, 1, 2, 3].into_iter().collect());
    }
}
