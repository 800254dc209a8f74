//! Labeled graph: a matrix store plus vertex/start/final bookkeeping.
//! Built once from an edge list, then treated as immutable except via
//! `to_nfa` and when used as the target of `from_label_to_bool_matrix`.

use std::collections::{BTreeSet, HashMap};

use crate::error::{EngineError, Result};
use crate::matrix::{label, BoolMatrix, Label, MatrixStore};

/// One edge of the input graph/automaton: `from label to`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Edge {
    pub from: usize,
    pub label: Label,
    pub to: usize,
}

#[derive(Clone, Debug)]
pub struct LabeledGraph {
    store: MatrixStore,
    vertices: BTreeSet<usize>,
    pub start_states: BTreeSet<usize>,
    pub final_states: BTreeSet<usize>,
}

impl LabeledGraph {
    /// An empty graph with no vertices, edges, starts or finals.
    pub fn empty() -> Self {
        LabeledGraph {
            store: MatrixStore::new(0),
            vertices: BTreeSet::new(),
            start_states: BTreeSet::new(),
            final_states: BTreeSet::new(),
        }
    }

    /// Construct from an edge list. Defaults `start_states`/`final_states`
    /// to every referenced vertex.
    pub fn from_edges(edges: impl IntoIterator<Item = Edge>) -> Self {
        let mut by_label: HashMap<Label, (Vec<usize>, Vec<usize>)> = HashMap::new();
        let mut vertices = BTreeSet::new();
        for edge in edges {
            vertices.insert(edge.from);
            vertices.insert(edge.to);
            let entry = by_label.entry(edge.label).or_default();
            entry.0.push(edge.from);
            entry.1.push(edge.to);
        }
        let size = vertices.iter().next_back().map_or(0, |&m| m + 1);
        let mut store = MatrixStore::new(size);
        for (label, (rows, cols)) in by_label {
            store.insert(label, BoolMatrix::from_lists(size, &rows, &cols));
        }
        let start_states = vertices.clone();
        let final_states = vertices.clone();
        LabeledGraph {
            store,
            vertices,
            start_states,
            final_states,
        }
    }

    /// Construct directly from a pre-built store (internal constructor,
    /// used by Kronecker product and RFA construction).
    pub fn from_store(store: MatrixStore, start_states: BTreeSet<usize>, final_states: BTreeSet<usize>) -> Self {
        let size = store.size();
        let vertices = (0..size).collect();
        LabeledGraph {
            store,
            vertices,
            start_states,
            final_states,
        }
    }

    /// Parse `from_vertex SPACE label SPACE to_vertex` lines.
    pub fn from_text<'a>(lines: impl IntoIterator<Item = &'a str>) -> Result<Self> {
        let mut edges = Vec::new();
        for (lineno, line) in lines.into_iter().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let parts: Vec<&str> = line.split(' ').collect();
            if parts.len() != 3 {
                return Err(EngineError::Parse(format!(
                    "graph line {}: expected 'from label to', got {:?}",
                    lineno + 1,
                    line
                )));
            }
            let from: usize = parts[0].parse().map_err(|_| {
                EngineError::Parse(format!("graph line {}: bad vertex id {:?}", lineno + 1, parts[0]))
            })?;
            let to: usize = parts[2].parse().map_err(|_| {
                EngineError::Parse(format!("graph line {}: bad vertex id {:?}", lineno + 1, parts[2]))
            })?;
            edges.push(Edge {
                from,
                label: label(parts[1]),
                to,
            });
        }
        Ok(Self::from_edges(edges))
    }

    pub fn vertices(&self) -> &BTreeSet<usize> {
        &self.vertices
    }

    /// Dimension shared by every label's matrix; never smaller than the
    /// store's own size.
    pub fn vertices_num(&self) -> usize {
        self.store.size()
    }

    pub fn store(&self) -> &MatrixStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut MatrixStore {
        &mut self.store
    }

    pub fn edges_counter(&self) -> HashMap<Label, usize> {
        self.store.edges_counter()
    }

    /// Rebuild a standard NFA: one state per vertex id `0..N`, one symbol
    /// per label, transitions from nonzero matrix entries. Also overwrites
    /// this graph's start/final sets as a side effect.
    pub fn to_nfa(&mut self, starts: BTreeSet<usize>, finals: BTreeSet<usize>) -> crate::nfa::Nfa {
        self.start_states = starts.clone();
        self.final_states = finals.clone();
        let mut nfa = crate::nfa::Nfa::new(self.vertices_num());
        for (label, matrix) in self.store.entries() {
            for (i, j) in matrix.iter_entries() {
                nfa.add_transition(i, Some(label.clone()), j);
            }
        }
        for &s in &starts {
            nfa.add_start(s);
        }
        for &f in &finals {
            nfa.add_final(f);
        }
        nfa
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_text_parses_triples() {
        let g = LabeledGraph::from_text(["0 a 1", "1 a 2", "2 a 0"]).unwrap();
        assert_eq!(g.vertices_num(), 3);
        assert_eq!(g.edges_counter()[&label("a")], 3);
    }

    #[test]
    fn from_text_rejects_malformed_lines() {
        let err = LabeledGraph::from_text(["0 a"]).unwrap_err();
        assert!(matches!(err, EngineError::Parse(_)));
    }

    #[test]
    fn defaults_start_final_to_all_vertices() {
        let g = LabeledGraph::from_text(["0 a 1"]).unwrap();
        assert_eq!(g.start_states, g.vertices().clone());
        assert_eq!(g.final_states, g.vertices().clone());
    }
}
