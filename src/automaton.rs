//! Deterministic automaton construction: subset-construction output,
//! Hopcroft-style minimization, and conversion into a `LabeledGraph`
//! whose vertices are DFA states.
//!
//! One outgoing edge per alphabet symbol, keyed by string labels rather
//! than a fixed alphabet, with a concrete minimization pipeline.

use std::collections::{BTreeSet, HashMap, HashSet};

use crate::graph::LabeledGraph;
use crate::matrix::Label;

#[derive(Clone, Debug)]
pub struct Dfa {
    n: usize,
    start: usize,
    finals: BTreeSet<usize>,
    transitions: HashMap<(usize, Label), usize>,
}

impl Dfa {
    pub fn new(n: usize, start: usize, finals: BTreeSet<usize>, transitions: HashMap<(usize, Label), usize>) -> Self {
        Dfa {
            n,
            start,
            finals,
            transitions,
        }
    }

    pub fn num_states(&self) -> usize {
        self.n
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn finals(&self) -> &BTreeSet<usize> {
        &self.finals
    }

    fn alphabet(&self) -> BTreeSet<Label> {
        self.transitions.keys().map(|(_, l)| l.clone()).collect()
    }

    /// Every label appearing on some transition, in sorted order.
    pub fn labels(&self) -> Vec<Label> {
        self.alphabet().into_iter().collect()
    }

    pub fn step(&self, state: usize, label: &Label) -> Option<usize> {
        self.transitions.get(&(state, label.clone())).copied()
    }

    pub fn accepts(&self, word: &[Label]) -> bool {
        let mut state = self.start;
        for label in word {
            match self.step(state, label) {
                Some(next) => state = next,
                None => return false,
            }
        }
        self.finals.contains(&state)
    }

    /// Hopcroft-style partition refinement, including an explicit dead
    /// (non-accepting sink) state so every transition is total before
    /// splitting — otherwise missing transitions would be conflated with
    /// transitions to a dead state incorrectly.
    pub fn minimize(&self) -> Dfa {
        let alphabet: Vec<Label> = self.alphabet().into_iter().collect();
        let dead = self.n; // virtual total-sink state
        let total = self.n + 1;

        let step_total = |state: usize, label: &Label| -> usize {
            if state == dead {
                return dead;
            }
            self.transitions.get(&(state, label.clone())).copied().unwrap_or(dead)
        };

        // initial partition: accepting vs non-accepting (including dead).
        let mut partition: Vec<BTreeSet<usize>> = vec![
            (0..total).filter(|s| self.finals.contains(s)).collect(),
            (0..total).filter(|s| !self.finals.contains(s)).collect(),
        ];
        partition.retain(|p| !p.is_empty());

        loop {
            let state_to_block: HashMap<usize, usize> = partition
                .iter()
                .enumerate()
                .flat_map(|(b, states)| states.iter().map(move |&s| (s, b)))
                .collect();

            let mut next_partition: Vec<BTreeSet<usize>> = Vec::new();
            for block in &partition {
                let mut signature_to_states: HashMap<Vec<Option<usize>>, BTreeSet<usize>> = HashMap::new();
                for &state in block {
                    let signature: Vec<Option<usize>> = alphabet
                        .iter()
                        .map(|label| Some(state_to_block[&step_total(state, label)]))
                        .collect();
                    signature_to_states.entry(signature).or_default().insert(state);
                }
                next_partition.extend(signature_to_states.into_values());
            }

            if next_partition.len() == partition.len() {
                partition = next_partition;
                break;
            }
            partition = next_partition;
        }

        let state_to_block: HashMap<usize, usize> = partition
            .iter()
            .enumerate()
            .flat_map(|(b, states)| states.iter().map(move |&s| (s, b)))
            .collect();
        let dead_block = state_to_block[&dead];

        let mut new_transitions = HashMap::new();
        for (block_id, states) in partition.iter().enumerate() {
            if block_id == dead_block {
                continue;
            }
            let representative = *states.iter().next().unwrap();
            for label in &alphabet {
                let target = step_total(representative, label);
                let target_block = state_to_block[&target];
                if target_block != dead_block {
                    new_transitions.insert((block_id, label.clone()), target_block);
                }
            }
        }

        let new_start = state_to_block[&self.start];
        let new_finals: BTreeSet<usize> = (0..partition.len())
            .filter(|&b| b != dead_block && partition[b].iter().any(|s| self.finals.contains(s)))
            .collect();

        // renumber blocks excluding the dead block so ids are dense.
        let mut live_blocks: Vec<usize> = (0..partition.len()).filter(|&b| b != dead_block).collect();
        live_blocks.sort_unstable();
        let renumber: HashMap<usize, usize> = live_blocks.iter().enumerate().map(|(i, &b)| (b, i)).collect();

        let transitions = new_transitions
            .into_iter()
            .filter_map(|((b, label), target)| {
                let b2 = *renumber.get(&b)?;
                let t2 = *renumber.get(&target)?;
                Some(((b2, label), t2))
            })
            .collect();
        let finals = new_finals.into_iter().filter_map(|b| renumber.get(&b).copied()).collect();
        let start = *renumber.get(&new_start).unwrap_or(&0);

        Dfa::new(live_blocks.len().max(1), start, finals, transitions)
    }

    /// Build a `LabeledGraph` whose vertices are this DFA's states.
    pub fn to_graph(&self) -> LabeledGraph {
        use crate::matrix::{BoolMatrix, MatrixStore};

        let mut store = MatrixStore::new(self.n);
        let mut by_label: HashMap<Label, BoolMatrix> = HashMap::new();
        for (&(from, ref label), &to) in &self.transitions {
            by_label
                .entry(label.clone())
                .or_insert_with(|| BoolMatrix::zeros(self.n))
                .set(from, to, true);
        }
        for (label, matrix) in by_label {
            store.insert(label, matrix);
        }
        let starts: BTreeSet<usize> = [self.start].into_iter().collect();
        LabeledGraph::from_store(store, starts, self.finals.clone())
    }
}

/// True iff the languages recognized by two minimized DFAs agree on every
/// word built from a shared sample alphabet, up to `max_len` — a
/// language-equivalence check that avoids needing full DFA isomorphism.
pub fn equivalent_on_sample(a: &Dfa, b: &Dfa, alphabet: &[Label], max_len: usize) -> bool {
    let mut words: Vec<Vec<Label>> = vec![Vec::new()];
    let mut frontier: Vec<Vec<Label>> = vec![Vec::new()];
    for _ in 0..max_len {
        let mut next = Vec::new();
        for word in &frontier {
            for label in alphabet {
                let mut w = word.clone();
                w.push(label.clone());
                next.push(w);
            }
        }
        words.extend(next.iter().cloned());
        frontier = next;
    }
    words.iter().all(|w| a.accepts(w) == b.accepts(w))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    Simplified,
    Pythonic,
}

/// Parse regex text, build its minimized DFA, and package it as a
/// `LabeledGraph` whose vertices are that DFA's states.
pub fn build_from_regex(text: &str, dialect: Dialect) -> crate::error::Result<LabeledGraph> {
    let op_tree = crate::regex::parse(text, dialect)?;
    let nfa = crate::regex::to_nfa(&op_tree);
    let dfa = nfa.to_dfa().minimize();
    Ok(dfa.to_graph())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::label;

    fn sample_dfa() -> Dfa {
        // accepts a(b)* over {a,b}
        let mut transitions = HashMap::new();
        transitions.insert((0, label("a")), 1);
        transitions.insert((1, label("b")), 1);
        Dfa::new(2, 0, [1].into_iter().collect(), transitions)
    }

    #[test]
    fn accepts_and_rejects() {
        let dfa = sample_dfa();
        assert!(dfa.accepts(&[label("a")]));
        assert!(dfa.accepts(&[label("a"), label("b"), label("b")]));
        assert!(!dfa.accepts(&[label("b")]));
        assert!(!dfa.accepts(&[]));
    }

    #[test]
    fn minimize_preserves_language() {
        let dfa = sample_dfa();
        let min = dfa.minimize();
        let alphabet = vec![label("a"), label("b")];
        assert!(equivalent_on_sample(&dfa, &min, &alphabet, 4));
    }
}
