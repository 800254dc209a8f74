//! External I/O adapters: thin pass-throughs from file text to the core
//! constructors. All interesting logic stays in `graph`, `grammar`,
//! `rpq` and friends.

use crate::automaton::Dialect;
use crate::error::Result;
use crate::grammar::Grammar;
use crate::graph::LabeledGraph;
use crate::rpq::RpqQuery;

/// Parse a graph file's text: `from_vertex label to_vertex` lines.
pub fn read_graph(text: &str) -> Result<LabeledGraph> {
    LabeledGraph::from_text(text.lines())
}

/// Parse a query file's text: the JSON reachability-query dialect.
pub fn read_query(text: &str) -> Result<RpqQuery> {
    RpqQuery::from_json(text)
}

/// Which grammar dialect a grammar file uses: caller-selected, mirroring
/// the regex dialect switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrammarDialect {
    Symbolic,
    RegexRhs(Dialect),
}

/// Parse a grammar file's text under the caller-selected dialect.
pub fn read_grammar(text: &str, dialect: GrammarDialect) -> Result<Grammar> {
    match dialect {
        GrammarDialect::Symbolic => Grammar::from_symbolic_text(text.lines()),
        GrammarDialect::RegexRhs(regex_dialect) => Grammar::from_regex_text(text.lines(), regex_dialect),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_graph_parses_triples() {
        let g = read_graph("0 a 1\n1 a 2\n").unwrap();
        assert_eq!(g.vertices_num(), 3);
    }

    #[test]
    fn read_query_parses_between_all() {
        let q = read_query(r#"{"reachability_between_all": true}"#).unwrap();
        assert_eq!(q, RpqQuery::BetweenAll);
    }

    #[test]
    fn read_grammar_dispatches_symbolic() {
        let g = read_grammar("S a S b\nS", GrammarDialect::Symbolic).unwrap();
        assert!(g.generate_epsilon);
    }
}
