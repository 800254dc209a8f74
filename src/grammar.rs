//! Context-free grammars and the CFG → CNF / weak-CNF normalizer. Two
//! accepted front ends, caller-selected: symbolic productions, or a
//! regex on the right-hand side walked through its minimized DFA.

use std::collections::{HashMap, HashSet};

use crate::automaton::Dialect;
use crate::error::{EngineError, Result};
use crate::matrix::{label, Label};

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Symbol {
    Term(Label),
    Nonterm(Label),
}

impl Symbol {
    /// All-lowercase is a terminal; anything else is a nonterminal.
    pub fn classify(token: &str) -> Symbol {
        if token.chars().all(|c| !c.is_alphabetic() || c.is_lowercase()) {
            Symbol::Term(label(token))
        } else {
            Symbol::Nonterm(label(token))
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Production {
    pub head: Label,
    pub body: Vec<Symbol>,
}

/// A raw context-free grammar: nonterminals, terminals, productions and a
/// start symbol. Bodies may have arbitrary length and may be empty (ε).
#[derive(Clone, Debug)]
pub struct Cfg {
    pub start: Label,
    pub productions: Vec<Production>,
}

/// Monotonic fresh-nonterminal allocator, threaded explicitly through
/// construction instead of a module-wide counter.
#[derive(Default)]
pub struct NameAllocator {
    next: usize,
}

impl NameAllocator {
    pub fn new() -> Self {
        NameAllocator { next: 0 }
    }

    pub fn fresh(&mut self, hint: &str) -> Label {
        let id = self.next;
        self.next += 1;
        label(format!("{hint}#{id}"))
    }
}

impl Cfg {
    /// Symbolic dialect: `HEAD sym1 sym2 ...`, `eps` denotes empty body.
    pub fn from_symbolic_text<'a>(lines: impl IntoIterator<Item = &'a str>) -> Result<Cfg> {
        let mut productions = Vec::new();
        let mut start: Option<Label> = None;
        for (lineno, line) in lines.into_iter().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let mut tokens = line.split_whitespace();
            let head = tokens.next().ok_or_else(|| {
                EngineError::Parse(format!("grammar line {}: missing head", lineno + 1))
            })?;
            let head = label(head);
            if start.is_none() {
                start = Some(head.clone());
            }
            let rest: Vec<&str> = tokens.collect();
            let body = if rest == ["eps"] {
                Vec::new()
            } else {
                rest.into_iter().map(Symbol::classify).collect()
            };
            productions.push(Production { head, body });
        }
        let start = start.ok_or_else(|| EngineError::Parse("grammar has no productions".into()))?;
        Ok(Cfg { start, productions })
    }

    /// Regex-RHS dialect: `HEAD regex`, where `regex` ranges over
    /// terminals and nonterminals. Each head becomes a family of
    /// productions derived by walking the minimized DFA of the regex.
    pub fn from_regex_text<'a>(lines: impl IntoIterator<Item = &'a str>, dialect: Dialect) -> Result<Cfg> {
        let mut alloc = NameAllocator::new();
        let mut productions = Vec::new();
        let mut start: Option<Label> = None;
        for (lineno, line) in lines.into_iter().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let (head, body_text) = line.split_once(' ').ok_or_else(|| {
                EngineError::Parse(format!("grammar line {}: expected 'HEAD regex'", lineno + 1))
            })?;
            let head = label(head);
            if start.is_none() {
                start = Some(head.clone());
            }
            let regex = crate::regex::parse(body_text, dialect)?;
            let dfa = crate::regex::to_nfa(&regex).to_dfa().minimize();
            productions.extend(productions_from_dfa(&head, &dfa, &mut alloc));
        }
        let start = start.ok_or_else(|| EngineError::Parse("grammar has no productions".into()))?;
        Ok(Cfg { start, productions })
    }
}

fn productions_from_dfa(head: &Label, dfa: &crate::automaton::Dfa, alloc: &mut NameAllocator) -> Vec<Production> {
    let vars: Vec<Label> = (0..dfa.num_states()).map(|_| alloc.fresh(head)).collect();
    let mut productions = vec![Production {
        head: head.clone(),
        body: vec![Symbol::Nonterm(vars[dfa.start()].clone())],
    }];
    let alphabet = dfa.labels();
    for state in 0..dfa.num_states() {
        for label_sym in &alphabet {
            if let Some(target) = dfa.step(state, label_sym) {
                let sym = Symbol::classify(label_sym);
                productions.push(Production {
                    head: vars[state].clone(),
                    body: vec![sym, Symbol::Nonterm(vars[target].clone())],
                });
            }
        }
        if dfa.finals().contains(&state) {
            productions.push(Production {
                head: vars[state].clone(),
                body: Vec::new(),
            });
        }
    }
    productions
}

// ---- CNF ----------------------------------------------------------------

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CnfBody {
    Term(Label),
    Pair(Label, Label),
}

#[derive(Clone, Debug, Default)]
pub struct Cnf {
    pub start: Option<Label>,
    pub productions: Vec<(Label, CnfBody)>,
}

impl Cnf {
    pub fn by_head(&self, head: &Label) -> impl Iterator<Item = &CnfBody> {
        self.productions.iter().filter(move |(h, _)| h == head).map(|(_, b)| b)
    }
}

/// Whether `cfg` derives the empty word (standard nullability test).
pub fn generates_epsilon(cfg: &Cfg) -> bool {
    nullable_set(cfg).contains(&cfg.start)
}

fn nullable_set(cfg: &Cfg) -> HashSet<Label> {
    let mut nullable: HashSet<Label> = cfg
        .productions
        .iter()
        .filter(|p| p.body.is_empty())
        .map(|p| p.head.clone())
        .collect();
    loop {
        let mut changed = false;
        for p in &cfg.productions {
            if nullable.contains(&p.head) {
                continue;
            }
            let all_nullable = p.body.iter().all(|s| match s {
                Symbol::Nonterm(n) => nullable.contains(n),
                Symbol::Term(_) => false,
            });
            if all_nullable && !p.body.is_empty() {
                nullable.insert(p.head.clone());
                changed = true;
            }
        }
        if !changed {
            break;
        }
    }
    nullable
}

/// Standard CFG → CNF conversion: START, TERM, BIN, DEL, UNIT passes.
pub fn to_cnf(cfg: &Cfg, alloc: &mut NameAllocator) -> Cnf {
    // START: fresh start symbol, so the start never appears on a RHS.
    let new_start = alloc.fresh("CNF_START");
    let mut productions = cfg.productions.clone();
    productions.push(Production {
        head: new_start.clone(),
        body: vec![Symbol::Nonterm(cfg.start.clone())],
    });

    // DEL: drop epsilon productions (generate_epsilon is tracked separately,
    // as wCNF's own epsilon marker), propagating by omitting nullable
    // symbols from every production's body.
    let nullable = nullable_set(&Cfg { start: new_start.clone(), productions: productions.clone() });
    let mut expanded = Vec::new();
    for p in &productions {
        if p.body.is_empty() {
            continue;
        }
        expand_nullable_omissions(p, &nullable, &mut expanded);
    }
    productions = expanded;
    productions.retain(|p| !p.body.is_empty());

    // UNIT: eliminate A -> B for nonterminal B, via unit-pair closure.
    productions = eliminate_unit_productions(productions);

    // TERM: replace terminals inside bodies of length >= 2 with fresh
    // nonterminals that derive exactly that terminal.
    let mut term_vars: HashMap<Label, Label> = HashMap::new();
    let mut with_term_vars = Vec::new();
    for p in productions {
        if p.body.len() >= 2 {
            let body = p
                .body
                .into_iter()
                .map(|s| match s {
                    Symbol::Term(t) => {
                        let var = term_vars.entry(t.clone()).or_insert_with(|| alloc.fresh("TERM")).clone();
                        Symbol::Nonterm(var)
                    }
                    other => other,
                })
                .collect();
            with_term_vars.push(Production { head: p.head, body });
        } else {
            with_term_vars.push(p);
        }
    }
    for (term, var) in &term_vars {
        with_term_vars.push(Production {
            head: var.clone(),
            body: vec![Symbol::Term(term.clone())],
        });
    }

    // BIN: break bodies longer than 2 into a right-branching chain.
    let mut cnf_productions = Vec::new();
    for p in with_term_vars {
        match p.body.len() {
            0 => unreachable!("epsilon productions were removed by DEL"),
            1 => {
                if let Symbol::Term(t) = &p.body[0] {
                    cnf_productions.push((p.head, CnfBody::Term(t.clone())));
                }
                // unit nonterminal bodies were removed by UNIT
            }
            2 => {
                let (a, b) = match (&p.body[0], &p.body[1]) {
                    (Symbol::Nonterm(a), Symbol::Nonterm(b)) => (a.clone(), b.clone()),
                    _ => unreachable!("TERM pass leaves only nonterminals in bodies of length >= 2"),
                };
                cnf_productions.push((p.head, CnfBody::Pair(a, b)));
            }
            _ => {
                let mut head = p.head.clone();
                let body = p.body;
                for i in 0..body.len() - 2 {
                    let a = match &body[i] {
                        Symbol::Nonterm(n) => n.clone(),
                        _ => unreachable!(),
                    };
                    let fresh = alloc.fresh("BIN");
                    cnf_productions.push((head.clone(), CnfBody::Pair(a, fresh.clone())));
                    head = fresh;
                }
                let a = match &body[body.len() - 2] {
                    Symbol::Nonterm(n) => n.clone(),
                    _ => unreachable!(),
                };
                let b = match &body[body.len() - 1] {
                    Symbol::Nonterm(n) => n.clone(),
                    _ => unreachable!(),
                };
                cnf_productions.push((head, CnfBody::Pair(a, b)));
            }
        }
    }

    Cnf {
        start: Some(new_start),
        productions: cnf_productions,
    }
}

fn expand_nullable_omissions(p: &Production, nullable: &HashSet<Label>, out: &mut Vec<Production>) {
    let n = p.body.len();
    for mask in 0u32..(1 << n) {
        let mut body = Vec::new();
        let mut kept_any_nullable_omission = false;
        for (i, sym) in p.body.iter().enumerate() {
            let omit = (mask & (1 << i)) != 0;
            if omit {
                match sym {
                    Symbol::Nonterm(nt) if nullable.contains(nt) => {
                        kept_any_nullable_omission = true;
                        continue;
                    }
                    _ => {
                        body.push(sym.clone());
                    }
                }
            } else {
                body.push(sym.clone());
            }
        }
        if mask == 0 || kept_any_nullable_omission {
            out.push(Production {
                head: p.head.clone(),
                body,
            });
        }
    }
}

fn eliminate_unit_productions(productions: Vec<Production>) -> Vec<Production> {
    let mut non_unit: Vec<Production> = Vec::new();
    let mut unit_pairs: Vec<(Label, Label)> = Vec::new();
    for p in &productions {
        if p.body.len() == 1 {
            if let Symbol::Nonterm(n) = &p.body[0] {
                unit_pairs.push((p.head.clone(), n.clone()));
                continue;
            }
        }
        non_unit.push(p.clone());
    }

    // unit-pair closure: (A, A) plus transitive unit chains.
    let heads: HashSet<Label> = productions.iter().map(|p| p.head.clone()).collect();
    let mut closure: HashSet<(Label, Label)> = heads.iter().map(|h| (h.clone(), h.clone())).collect();
    loop {
        let mut changed = false;
        for (a, b) in &unit_pairs {
            for (x, y) in closure.clone() {
                if y == *a && closure.insert((x.clone(), b.clone())) {
                    changed = true;
                }
            }
        }
        if !changed {
            break;
        }
    }

    let mut result = Vec::new();
    for (a, b) in &closure {
        for p in &non_unit {
            if &p.head == b {
                result.push(Production {
                    head: a.clone(),
                    body: p.body.clone(),
                });
            }
        }
    }
    result
}

/// A grammar packaged with its CNF and weak-CNF forms.
pub struct Grammar {
    pub cfg: Cfg,
    pub generate_epsilon: bool,
    pub cnf: Cnf,
    pub wcnf: Cnf,
}

impl Grammar {
    pub fn new(cfg: Cfg) -> Grammar {
        let generate_epsilon = generates_epsilon(&cfg);
        let mut alloc = NameAllocator::new();
        let cnf = to_cnf(&cfg, &mut alloc);
        // Weak CNF: CNF plus an epsilon-accepting start symbol when the
        // original grammar derives the empty word. `S' -> S`
        // is a unit production, which `CnfBody` cannot encode directly, so
        // `S'` inherits every one of `S`'s productions instead of pointing
        // at it.
        let wcnf = if generate_epsilon {
            let new_start = alloc.fresh("WCNF_START");
            let mut productions = cnf.productions.clone();
            if let Some(old_start) = &cnf.start {
                let inherited: Vec<(Label, CnfBody)> = cnf
                    .productions
                    .iter()
                    .filter(|(h, _)| h == old_start)
                    .map(|(_, b)| (new_start.clone(), b.clone()))
                    .collect();
                productions.extend(inherited);
            }
            Cnf {
                start: Some(new_start),
                productions,
            }
        } else {
            cnf.clone()
        };
        Grammar {
            cfg,
            generate_epsilon,
            cnf,
            wcnf,
        }
    }

    /// The weak-CNF form re-expressed as a raw `Cfg`, for feeding into
    /// `Rfa::from_cfg` — the tensor-fixpoint solver can run over either the
    /// plain grammar or its weak-CNF form.
    pub fn weak_cfg(&self) -> Cfg {
        let start = self.wcnf.start.clone().expect("to_cnf always sets a start symbol");
        let mut productions: Vec<Production> = self
            .wcnf
            .productions
            .iter()
            .map(|(head, body)| {
                let body = match body {
                    CnfBody::Term(t) => vec![Symbol::Term(t.clone())],
                    CnfBody::Pair(a, b) => vec![Symbol::Nonterm(a.clone()), Symbol::Nonterm(b.clone())],
                };
                Production { head: head.clone(), body }
            })
            .collect();
        if self.generate_epsilon {
            productions.push(Production { head: start.clone(), body: Vec::new() });
        }
        Cfg { start, productions }
    }

    /// The strict-CNF form re-expressed as a raw `Cfg`, with no synthetic
    /// epsilon production (strict CNF cannot represent one) — callers that
    /// need ε-containment over this form must seed it separately, the way
    /// `cfpq::tensor_on_cnf` does.
    pub fn cnf_cfg(&self) -> Cfg {
        let start = self.cnf.start.clone().expect("to_cnf always sets a start symbol");
        let productions = self
            .cnf
            .productions
            .iter()
            .map(|(head, body)| {
                let body = match body {
                    CnfBody::Term(t) => vec![Symbol::Term(t.clone())],
                    CnfBody::Pair(a, b) => vec![Symbol::Nonterm(a.clone()), Symbol::Nonterm(b.clone())],
                };
                Production { head: head.clone(), body }
            })
            .collect();
        Cfg { start, productions }
    }

    pub fn from_symbolic_text<'a>(lines: impl IntoIterator<Item = &'a str>) -> Result<Grammar> {
        Ok(Grammar::new(Cfg::from_symbolic_text(lines)?))
    }

    pub fn from_regex_text<'a>(lines: impl IntoIterator<Item = &'a str>, dialect: Dialect) -> Result<Grammar> {
        Ok(Grammar::new(Cfg::from_regex_text(lines, dialect)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbolic_dialect_classifies_by_case() {
        let cfg = Cfg::from_symbolic_text(["S a S b S", "S"]).unwrap();
        assert_eq!(cfg.start, label("S"));
        assert_eq!(cfg.productions.len(), 2);
        assert!(matches!(&cfg.productions[0].body[0], Symbol::Term(t) if t.as_ref() == "a"));
        assert!(cfg.productions[1].body.is_empty());
    }

    #[test]
    fn eps_productive_grammar_marks_generate_epsilon() {
        let cfg = Cfg::from_symbolic_text(["S a S b S", "S"]).unwrap();
        assert!(generates_epsilon(&cfg));
    }

    #[test]
    fn cnf_bodies_are_binary_or_unary() {
        let cfg = Cfg::from_symbolic_text(["S A B", "A a", "B b"]).unwrap();
        let mut alloc = NameAllocator::new();
        let cnf = to_cnf(&cfg, &mut alloc);
        for (_, body) in &cnf.productions {
            match body {
                CnfBody::Term(_) => {}
                CnfBody::Pair(_, _) => {}
            }
        }
        assert!(!cnf.productions.is_empty());
    }
}
