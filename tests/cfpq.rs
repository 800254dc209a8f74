//! A handful of grammar/graph scenarios, each solved with all five CFPQ
//! solvers and checked against the expected pair set and against each
//! other.

use std::collections::HashSet;

use pathmatrix::cfpq::{hellings, matrix_fixpoint, tensor_on_cnf, tensor_on_rfa, tensor_on_wcnf};
use pathmatrix::grammar::Grammar;
use pathmatrix::graph::LabeledGraph;

fn check_scenario(grammar_lines: &[&str], graph_lines: &[&str], expected: &[(usize, usize)]) {
    let grammar = Grammar::from_symbolic_text(grammar_lines.iter().copied()).unwrap();
    let graph = LabeledGraph::from_text(graph_lines.iter().copied()).unwrap();
    let expected: HashSet<(usize, usize)> = expected.iter().copied().collect();

    let h = hellings(&graph, &grammar);
    let m = matrix_fixpoint(&graph, &grammar);
    let rfa = tensor_on_rfa(&graph, &grammar);
    let cnf = tensor_on_cnf(&graph, &grammar);
    let wcnf = tensor_on_wcnf(&graph, &grammar);

    assert_eq!(h, expected, "hellings mismatch");
    assert_eq!(m, expected, "matrix_fixpoint mismatch");
    assert_eq!(rfa, expected, "tensor_on_rfa mismatch");
    assert_eq!(cnf, expected, "tensor_on_cnf mismatch");
    assert_eq!(wcnf, expected, "tensor_on_wcnf mismatch");
}

#[test]
fn g0_first_graph() {
    check_scenario(
        &["S a S b S", "S"],
        &["0 a 1", "1 a 2", "2 a 0", "2 b 3", "3 b 2"],
        &[
            (0, 0),
            (1, 1),
            (2, 2),
            (3, 3),
            (0, 2),
            (1, 2),
            (1, 3),
            (2, 3),
            (0, 3),
        ],
    );
}

#[test]
fn g0_second_graph() {
    check_scenario(
        &["S a S b S", "S"],
        &["1 a 2", "2 a 3", "2 b 3", "3 b 4", "4 b 5", "5 a 4"],
        &[(1, 1), (2, 2), (3, 3), (4, 4), (5, 5), (1, 3), (1, 5), (2, 4)],
    );
}

#[test]
fn g1_first_graph() {
    check_scenario(
        &["S a S b", "S"],
        &["0 a 1", "1 a 2", "2 a 0", "2 b 3", "3 b 2"],
        &[(0, 0), (1, 1), (2, 2), (3, 3), (0, 2), (0, 3), (1, 2), (1, 3), (2, 3)],
    );
}

#[test]
fn g2_first_graph() {
    check_scenario(
        &["S A B", "S A C", "C S B", "A a", "B b"],
        &["0 a 1", "1 a 2", "2 a 0", "2 b 3", "3 b 2"],
        &[(0, 2), (0, 3), (1, 2), (1, 3), (2, 2), (2, 3)],
    );
}

#[test]
fn g3_is_empty() {
    check_scenario(
        &["S A C B", "A a", "C c", "B b B", "B"],
        &["0 a 2", "2 b 3", "3 c 0", "0 c 1"],
        &[],
    );
}
