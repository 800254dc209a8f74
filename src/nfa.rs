//! A non-deterministic automaton with epsilon transitions.
//!
//! Keeps labeled edges and epsilon edges in separate tables so the
//! epsilon-reachability graph is easy to isolate during subset
//! construction (`to_dfa`).

use std::collections::{BTreeSet, HashMap, VecDeque};

use crate::automaton::Dfa;
use crate::matrix::Label;

#[derive(Clone, Debug, Default)]
pub struct Nfa {
    /// Edges like a dfa but may contain duplicate entries for first component.
    edges: Vec<Vec<(Label, usize)>>,

    /// Epsilon transitions, stored separately so the epsilon-reachability
    /// graph is easy to compute.
    epsilons: Vec<Vec<usize>>,

    starts: BTreeSet<usize>,
    finals: BTreeSet<usize>,
}

impl Nfa {
    pub fn new(n: usize) -> Self {
        Nfa {
            edges: vec![Vec::new(); n],
            epsilons: vec![Vec::new(); n],
            starts: BTreeSet::new(),
            finals: BTreeSet::new(),
        }
    }

    fn ensure(&mut self, n: usize) {
        if n >= self.edges.len() {
            self.edges.resize(n + 1, Vec::new());
            self.epsilons.resize(n + 1, Vec::new());
        }
    }

    pub fn add_state(&mut self) -> usize {
        let id = self.edges.len();
        self.edges.push(Vec::new());
        self.epsilons.push(Vec::new());
        id
    }

    pub fn add_transition(&mut self, from: usize, label: Option<Label>, to: usize) {
        self.ensure(from);
        self.ensure(to);
        match label {
            Some(label) => self.edges[from].push((label, to)),
            None => self.epsilons[from].push(to),
        }
    }

    pub fn add_start(&mut self, s: usize) {
        self.ensure(s);
        self.starts.insert(s);
    }

    pub fn add_final(&mut self, s: usize) {
        self.ensure(s);
        self.finals.insert(s);
    }

    pub fn num_states(&self) -> usize {
        self.edges.len()
    }

    pub fn starts(&self) -> &BTreeSet<usize> {
        &self.starts
    }

    pub fn finals(&self) -> &BTreeSet<usize> {
        &self.finals
    }

    /// All states reachable purely by epsilon transitions, including the
    /// starting set itself.
    pub fn epsilon_closure(&self, from: &BTreeSet<usize>) -> BTreeSet<usize> {
        let mut reached: BTreeSet<usize> = from.clone();
        let mut todo: VecDeque<usize> = from.iter().copied().collect();
        while let Some(next) = todo.pop_front() {
            if next >= self.epsilons.len() {
                continue;
            }
            for &target in &self.epsilons[next] {
                if reached.insert(target) {
                    todo.push_back(target);
                }
            }
        }
        reached
    }

    /// Subset construction: the standard NFA-with-epsilon to DFA conversion.
    pub fn to_dfa(&self) -> Dfa {
        let start_set = self.epsilon_closure(&self.starts);
        let mut set_to_id: HashMap<BTreeSet<usize>, usize> = HashMap::new();
        let mut sets: Vec<BTreeSet<usize>> = Vec::new();
        let mut transitions: HashMap<(usize, Label), usize> = HashMap::new();
        let mut finals = BTreeSet::new();

        set_to_id.insert(start_set.clone(), 0);
        sets.push(start_set);

        let mut frontier = VecDeque::new();
        frontier.push_back(0usize);

        while let Some(id) = frontier.pop_front() {
            let current = sets[id].clone();
            if current.iter().any(|s| self.finals.contains(s)) {
                finals.insert(id);
            }

            let mut by_label: HashMap<Label, BTreeSet<usize>> = HashMap::new();
            for &state in &current {
                if state >= self.edges.len() {
                    continue;
                }
                for (label, target) in &self.edges[state] {
                    by_label.entry(label.clone()).or_default().insert(*target);
                }
            }

            for (label, targets) in by_label {
                let closed = self.epsilon_closure(&targets);
                let next_id = *set_to_id.entry(closed.clone()).or_insert_with(|| {
                    let id = sets.len();
                    sets.push(closed.clone());
                    frontier.push_back(id);
                    id
                });
                transitions.insert((id, label), next_id);
            }
        }

        Dfa::new(sets.len(), 0, finals, transitions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::label;

    #[test]
    fn epsilon_closure_follows_chains() {
        let mut nfa = Nfa::new(3);
        nfa.add_transition(0, None, 1);
        nfa.add_transition(1, None, 2);
        let closure = nfa.epsilon_closure(&[0].into_iter().collect());
        assert_eq!(closure, [0, 1, 2].into_iter().collect());
    }

    #[test]
    fn subset_construction_merges_nondeterminism() {
        // 0 --a--> 1, 0 --a--> 2, both via the same label: a DFA state
        // should merge {1,2}.
        let mut nfa = Nfa::new(3);
        nfa.add_start(0);
        nfa.add_transition(0, Some(label("a")), 1);
        nfa.add_transition(0, Some(label("a")), 2);
        nfa.add_final(2);
        let dfa = nfa.to_dfa();
        assert_eq!(dfa.num_states(), 2); // {0} and {1,2}
        assert!(dfa.accepts(&[label("a")]));
    }
}
