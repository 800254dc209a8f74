//! Context-free path query solvers. Five entry points accept a graph and
//! a grammar and return the same set of `(start, end)` vertex pairs
//! reachable by the grammar's start symbol, computed by structurally
//! different algorithms: a worklist (Hellings), a CNF matrix fixpoint,
//! and three tensor-fixpoint variants differing only in which form of
//! the grammar the recursive automaton is built from.

use std::collections::{BTreeSet, HashSet, VecDeque};

use crate::closure;
use crate::grammar::{Cnf, CnfBody, Grammar};
use crate::graph::LabeledGraph;
use crate::kronecker;
use crate::matrix::{Label, MatrixStore};
use crate::rfa::Rfa;

/// Worklist algorithm over CNF productions (Hellings').
pub fn hellings(graph: &LabeledGraph, grammar: &Grammar) -> HashSet<(usize, usize)> {
    let n = graph.vertices_num();
    let mut result = MatrixStore::new(n);
    let mut worklist: VecDeque<(usize, usize, Label)> = VecDeque::new();

    if grammar.generate_epsilon {
        let start = grammar.cnf.start.clone().expect("to_cnf always sets a start symbol");
        for &v in graph.vertices() {
            result.get_mut_or_zero(&start).set(v, v, true);
            worklist.push_back((v, v, start.clone()));
        }
    }

    for (edge_label, matrix) in graph.store().entries() {
        for (head, body) in &grammar.cnf.productions {
            if let CnfBody::Term(t) = body {
                if t == edge_label {
                    let target = result.get_mut_or_zero(head);
                    for (i, j) in matrix.iter_entries() {
                        if !target.get(i, j) {
                            target.set(i, j, true);
                            worklist.push_back((i, j, head.clone()));
                        }
                    }
                }
            }
        }
    }

    while let Some((from, to, var)) = worklist.pop_front() {
        log::trace!("cfpq::hellings worklist pop, remaining={}", worklist.len());
        let mut updates: Vec<(usize, usize, Label)> = Vec::new();

        for (var_before, matrix) in result.entries() {
            for node_before in 0..n {
                if !matrix.get(node_before, from) {
                    continue;
                }
                for (head, body) in &grammar.cnf.productions {
                    if let CnfBody::Pair(b0, b1) = body {
                        if b0 == var_before && b1 == &var {
                            let already = result.get(head).map_or(false, |m| m.get(node_before, to));
                            if !already {
                                updates.push((node_before, to, head.clone()));
                            }
                        }
                    }
                }
            }
        }

        for (var_after, matrix) in result.entries() {
            for node_after in 0..n {
                if !matrix.get(to, node_after) {
                    continue;
                }
                for (head, body) in &grammar.cnf.productions {
                    if let CnfBody::Pair(b0, b1) = body {
                        if b0 == &var && b1 == var_after {
                            let already = result.get(head).map_or(false, |m| m.get(from, node_after));
                            if !already {
                                updates.push((from, node_after, head.clone()));
                            }
                        }
                    }
                }
            }
        }

        for (i, j, head) in updates {
            let target = result.get_mut_or_zero(&head);
            if !target.get(i, j) {
                target.set(i, j, true);
                worklist.push_back((i, j, head));
            }
        }
    }

    pairs_for_start(&result, &grammar.cnf)
}

/// Matrix fixpoint over CNF productions: iterate `head += left @ right`
/// over every binary production until nothing changes.
pub fn matrix_fixpoint(graph: &LabeledGraph, grammar: &Grammar) -> HashSet<(usize, usize)> {
    let n = graph.vertices_num();
    let mut result = MatrixStore::new(n);

    if grammar.generate_epsilon {
        let start = grammar.cnf.start.clone().expect("to_cnf always sets a start symbol");
        for &v in graph.vertices() {
            result.get_mut_or_zero(&start).set(v, v, true);
        }
    }

    for (edge_label, matrix) in graph.store().entries() {
        for (head, body) in &grammar.cnf.productions {
            if let CnfBody::Term(t) = body {
                if t == edge_label {
                    result.get_mut_or_zero(head).union_inplace(matrix);
                }
            }
        }
    }

    let binary: Vec<(&Label, &Label, &Label)> = grammar
        .cnf
        .productions
        .iter()
        .filter_map(|(head, body)| match body {
            CnfBody::Pair(a, b) => Some((head, a, b)),
            CnfBody::Term(_) => None,
        })
        .collect();

    loop {
        log::trace!("cfpq::matrix_fixpoint round start, nvals={}", result.edges_counter().values().sum::<usize>());
        let mut changed = false;
        for &(head, left, right) in &binary {
            let (Some(l), Some(r)) = (result.get(left).cloned(), result.get(right).cloned()) else {
                continue;
            };
            let product = l.matmul(&r);
            let target = result.get_mut_or_zero(head);
            let before = target.nvals();
            target.union_inplace(&product);
            changed |= target.nvals() != before;
        }
        if !changed {
            break;
        }
    }

    pairs_for_start(&result, &grammar.cnf)
}

fn pairs_for_start(result: &MatrixStore, cnf: &Cnf) -> HashSet<(usize, usize)> {
    let start = cnf.start.as_ref().expect("to_cnf always sets a start symbol");
    match result.get(start) {
        Some(matrix) => matrix.iter_entries().collect(),
        None => HashSet::new(),
    }
}

/// Tensor fixpoint: repeatedly take the Kronecker product of the
/// recursive automaton against the graph-so-far, close it transitively,
/// and fold every `(start, final)` pair that spans the product back into
/// the working matrices, until nothing changes.
pub fn tensor_fixpoint_from_rfa(graph: &LabeledGraph, rfa: &Rfa) -> HashSet<(usize, usize)> {
    let n = graph.vertices_num();
    let mut result = MatrixStore::new(n);
    for (edge_label, matrix) in graph.store().entries() {
        result.insert(edge_label.clone(), matrix.clone());
    }

    for (&(start, end), head) in &rfa.head_by_start_final_pair {
        if start == end {
            let target = result.get_mut_or_zero(head);
            for &v in graph.vertices() {
                target.set(v, v, true);
            }
        }
    }
    for head in &rfa.eps_heads {
        let target = result.get_mut_or_zero(head);
        for &v in graph.vertices() {
            target.set(v, v, true);
        }
    }

    loop {
        log::trace!("cfpq::tensor_fixpoint_from_rfa round start, nvals={}", result.edges_counter().values().sum::<usize>());
        let result_graph = LabeledGraph::from_store(result.clone(), BTreeSet::new(), BTreeSet::new());
        let tensor = kronecker::product(&rfa.graph, &result_graph);
        let tensor_closure = closure::by_squaring(tensor.store());

        let mut changed = false;
        for (i, j) in tensor_closure.iter_entries() {
            if !tensor.start_states.contains(&i) || !tensor.final_states.contains(&j) {
                continue;
            }
            let i_graph = i % n;
            let j_graph = j % n;
            let i_rfa = i / n;
            let j_rfa = j / n;
            if let Some(head) = rfa.head_by_start_final_pair.get(&(i_rfa, j_rfa)) {
                let target = result.get_mut_or_zero(head);
                if !target.get(i_graph, j_graph) {
                    target.set(i_graph, j_graph, true);
                    changed = true;
                }
            }
        }
        if !changed {
            break;
        }
    }

    match result.get(&rfa.start_symbol) {
        Some(matrix) => matrix.iter_entries().collect(),
        None => HashSet::new(),
    }
}

/// Build the recursive automaton straight from the grammar's raw
/// productions and run the tensor fixpoint ("tensor-on-RFA").
pub fn tensor_on_rfa(graph: &LabeledGraph, grammar: &Grammar) -> HashSet<(usize, usize)> {
    let rfa = Rfa::from_cfg(&grammar.cfg);
    tensor_fixpoint_from_rfa(graph, &rfa)
}

/// Same, but the recursive automaton is built from the strict-CNF form.
/// Strict CNF has no production to carry ε-containment, so the seed is
/// added to the automaton's epsilon heads directly when the grammar
/// derives ε ("tensor-on-CNF").
pub fn tensor_on_cnf(graph: &LabeledGraph, grammar: &Grammar) -> HashSet<(usize, usize)> {
    let mut rfa = Rfa::from_cfg(&grammar.cnf_cfg());
    if grammar.generate_epsilon {
        let start = grammar.cnf.start.clone().expect("to_cnf always sets a start symbol");
        rfa.eps_heads.insert(start);
    }
    tensor_fixpoint_from_rfa(graph, &rfa)
}

/// Same, but the recursive automaton is built from the weak-CNF form,
/// whose start symbol carries a real ε production ("tensor-on-wCNF").
pub fn tensor_on_wcnf(graph: &LabeledGraph, grammar: &Grammar) -> HashSet<(usize, usize)> {
    let rfa = Rfa::from_cfg(&grammar.weak_cfg());
    tensor_fixpoint_from_rfa(graph, &rfa)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Edge;
    use crate::matrix::label;

    // S -> a S b | eps : recognizes a^n b^n, graph 0-a->1-a->2-b->3-b->4
    fn dyck_setup() -> (LabeledGraph, Grammar) {
        let graph = LabeledGraph::from_edges([
            Edge { from: 0, label: label("a"), to: 1 },
            Edge { from: 1, label: label("a"), to: 2 },
            Edge { from: 2, label: label("b"), to: 3 },
            Edge { from: 3, label: label("b"), to: 4 },
        ]);
        let grammar = Grammar::from_symbolic_text(["S a S b", "S"]).unwrap();
        (graph, grammar)
    }

    #[test]
    fn all_five_solvers_agree_on_dyck_language() {
        let (graph, grammar) = dyck_setup();
        let h = hellings(&graph, &grammar);
        let m = matrix_fixpoint(&graph, &grammar);
        let rfa = tensor_on_rfa(&graph, &grammar);
        let cnf = tensor_on_cnf(&graph, &grammar);
        let wcnf = tensor_on_wcnf(&graph, &grammar);
        assert_eq!(h, m);
        assert_eq!(h, rfa);
        assert_eq!(h, cnf);
        assert_eq!(h, wcnf);
        assert!(h.contains(&(2, 3)));
        assert!(h.contains(&(1, 4)));
    }

    #[test]
    fn generate_epsilon_adds_reflexive_pairs() {
        let (graph, grammar) = dyck_setup();
        assert!(grammar.generate_epsilon);
        let pairs = hellings(&graph, &grammar);
        for v in graph.vertices() {
            assert!(pairs.contains(&(*v, *v)));
        }
    }
}
