//! Recursive finite automaton: one DFA fragment per nonterminal, all
//! embedded as disjoint vertex ranges inside a single `LabeledGraph`,
//! with `head_by_start_final_pair` recovering which nonterminal a given
//! start/final pair belongs to.
//!
//! `from_cfg` builds its fragments straight from a grammar's raw
//! productions (not CNF): each production `A -> b1 b2 ... bk` becomes a
//! `k`-edge path of fresh vertices.

use std::collections::{BTreeSet, HashMap, HashSet};

use crate::automaton::Dialect;
use crate::error::Result;
use crate::grammar::{Cfg, Symbol};
use crate::graph::LabeledGraph;
use crate::matrix::{label, Label, MatrixStore};

pub struct Rfa {
    pub graph: LabeledGraph,
    pub head_by_start_final_pair: HashMap<(usize, usize), Label>,
    /// Heads with at least one epsilon production in the source grammar.
    pub eps_heads: HashSet<Label>,
    pub start_symbol: Label,
}

impl Rfa {
    /// One path of fresh vertices per production body.
    pub fn from_cfg(cfg: &Cfg) -> Rfa {
        let total: usize = cfg.productions.iter().map(|p| p.body.len() + 1).sum();
        let mut store = MatrixStore::new(total.max(1));
        let mut start_states = BTreeSet::new();
        let mut final_states = BTreeSet::new();
        let mut head_by_start_final_pair = HashMap::new();
        let mut cnt = 0usize;

        for prod in &cfg.productions {
            let start = cnt;
            start_states.insert(start);
            head_by_start_final_pair.insert((start, start + prod.body.len()), prod.head.clone());
            for sym in &prod.body {
                let edge_label = match sym {
                    Symbol::Term(t) => t.clone(),
                    Symbol::Nonterm(n) => n.clone(),
                };
                store.get_mut_or_zero(&edge_label).set(cnt, cnt + 1, true);
                cnt += 1;
            }
            final_states.insert(cnt);
            cnt += 1;
        }

        let eps_heads = cfg
            .productions
            .iter()
            .filter(|p| p.body.is_empty())
            .map(|p| p.head.clone())
            .collect();

        let graph = LabeledGraph::from_store(store, start_states, final_states);
        Rfa {
            graph,
            head_by_start_final_pair,
            eps_heads,
            start_symbol: cfg.start.clone(),
        }
    }

    /// One DFA fragment per head line, laid out over disjoint vertex
    /// ranges.
    pub fn from_text<'a>(lines: impl IntoIterator<Item = &'a str>, dialect: Dialect) -> Result<Rfa> {
        let mut fragments = Vec::new();
        let mut start_symbol = None;
        let mut eps_heads = HashSet::new();

        for line in lines {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let (head, body_text) = line.split_once(' ').unwrap_or((line, ""));
            let head = label(head);
            if start_symbol.is_none() {
                start_symbol = Some(head.clone());
            }
            if body_text.is_empty() {
                eps_heads.insert(head.clone());
            }
            let regex = crate::regex::parse(body_text, dialect)?;
            let dfa = crate::regex::to_nfa(&regex).to_dfa().minimize();
            fragments.push((head, dfa));
        }

        let start_symbol = start_symbol.ok_or_else(|| {
            crate::error::EngineError::Parse("recursive automaton has no fragments".into())
        })?;

        let total: usize = fragments.iter().map(|(_, dfa)| dfa.num_states()).sum();
        let mut store = MatrixStore::new(total.max(1));
        let mut start_states = BTreeSet::new();
        let mut final_states = BTreeSet::new();
        let mut head_by_start_final_pair = HashMap::new();
        let mut base = 0usize;

        for (head, dfa) in &fragments {
            let frag_start = base + dfa.start();
            start_states.insert(frag_start);
            for &f in dfa.finals() {
                let frag_final = base + f;
                final_states.insert(frag_final);
                head_by_start_final_pair.insert((frag_start, frag_final), head.clone());
            }
            for edge_label in dfa.labels() {
                for from in 0..dfa.num_states() {
                    if let Some(to) = dfa.step(from, &edge_label) {
                        store.get_mut_or_zero(&edge_label).set(base + from, base + to, true);
                    }
                }
            }
            base += dfa.num_states();
        }

        let graph = LabeledGraph::from_store(store, start_states, final_states);
        Ok(Rfa {
            graph,
            head_by_start_final_pair,
            eps_heads,
            start_symbol,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::{Cfg, Production};

    #[test]
    fn from_cfg_bridges_head_by_start_final_pair() {
        let cfg = Cfg {
            start: label("S"),
            productions: vec![Production {
                head: label("S"),
                body: vec![Symbol::Term(label("a")), Symbol::Nonterm(label("S"))],
            }],
        };
        let rfa = Rfa::from_cfg(&cfg);
        assert_eq!(rfa.head_by_start_final_pair.len(), 1);
        assert_eq!(rfa.head_by_start_final_pair[&(0, 2)], label("S"));
        assert_eq!(rfa.graph.vertices_num(), 3);
    }

    #[test]
    fn from_cfg_tracks_eps_heads() {
        let cfg = Cfg {
            start: label("S"),
            productions: vec![
                Production { head: label("S"), body: vec![Symbol::Nonterm(label("A"))] },
                Production { head: label("A"), body: vec![] },
            ],
        };
        let rfa = Rfa::from_cfg(&cfg);
        assert!(rfa.eps_heads.contains(&label("A")));
    }

    #[test]
    fn from_text_builds_disjoint_fragments() {
        let rfa = Rfa::from_text(["S a", "A b"], Dialect::Simplified).unwrap();
        assert_eq!(rfa.start_symbol, label("S"));
        assert_eq!(rfa.head_by_start_final_pair.len(), 2);
    }
}
