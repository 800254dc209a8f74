//! Regular expressions over the edge-label alphabet.
//!
//! An interned `Op`/`Handle`/`Cached` AST shape, so recurring
//! subexpressions share storage; `Match(Label)` holds a full `Rc<str>`
//! token rather than a single character, since labels are multi-character
//! tokens. Supports two front-end dialects and a Thompson construction
//! into an epsilon-NFA.

use std::collections::HashMap;
use std::iter::Peekable;
use std::str::CharIndices;

use crate::automaton::Dialect;
use crate::error::{EngineError, Result};
use crate::matrix::{label, Label};
use crate::nfa::Nfa;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Handle(usize);

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Op {
    Epsilon,
    Match(Label),
    Star(Handle),
    Plus(Handle),
    Optional(Handle),
    Or(Handle, Handle),
    Concat(Handle, Handle),
}

/// Regex AST with cached (deduplicated) subexpressions.
pub struct Regex {
    subs: Vec<Op>,
    cache: HashMap<Op, Handle>,
}

impl Regex {
    fn new() -> Self {
        Regex {
            subs: Vec::new(),
            cache: HashMap::new(),
        }
    }

    fn insert(&mut self, op: Op) -> Handle {
        if let Some(&h) = self.cache.get(&op) {
            return h;
        }
        let h = Handle(self.subs.len());
        self.subs.push(op.clone());
        self.cache.insert(op, h);
        h
    }

    fn root(&self) -> Option<Handle> {
        self.subs.len().checked_sub(1).map(Handle)
    }

    fn get(&self, Handle(i): Handle) -> &Op {
        &self.subs[i]
    }
}

// ---- Parsing -----------------------------------------------------------
//
// Grammar (both dialects share this shape; pythonic additionally accepts
// `[..]` character classes):
//
//   expr   := term ('|' term)*
//   term   := factor+               (juxtaposition = concatenation)
//   factor := atom ('*' | '+' | '?')?
//   atom   := SYMBOL | '(' expr ')' | '.' expr  | charclass (pythonic)
//
// A symbol is a maximal run of characters that is not whitespace and not
// one of the operator characters. An explicit '.' between two atoms is
// accepted as a concatenation operator and otherwise ignored.

struct Parser<'a> {
    text: &'a str,
    chars: Peekable<CharIndices<'a>>,
    dialect: Dialect,
    regex: Regex,
}

const OPERATOR_CHARS: &[char] = &['|', '*', '+', '?', '(', ')', '.', '[', ']'];

impl<'a> Parser<'a> {
    fn new(text: &'a str, dialect: Dialect) -> Self {
        Parser {
            text,
            chars: text.char_indices().peekable(),
            dialect,
            regex: Regex::new(),
        }
    }

    fn skip_ws(&mut self) {
        while matches!(self.chars.peek(), Some((_, c)) if c.is_whitespace()) {
            self.chars.next();
        }
    }

    fn peek_char(&mut self) -> Option<char> {
        self.skip_ws();
        self.chars.peek().map(|&(_, c)| c)
    }

    fn parse_expr(&mut self) -> Result<Handle> {
        let mut left = self.parse_term()?;
        loop {
            self.skip_ws();
            match self.peek_char() {
                Some('|') => {
                    self.chars.next();
                    let right = self.parse_term()?;
                    left = self.regex.insert(Op::Or(left, right));
                }
                _ => break,
            }
        }
        Ok(left)
    }

    fn parse_term(&mut self) -> Result<Handle> {
        let mut left = self.parse_factor()?;
        loop {
            self.skip_ws();
            match self.peek_char() {
                Some(c) if c == '|' || c == ')' => break,
                Some('.') => {
                    // explicit concatenation operator
                    self.chars.next();
                    let right = self.parse_factor()?;
                    left = self.regex.insert(Op::Concat(left, right));
                }
                None => break,
                _ => {
                    let right = self.parse_factor()?;
                    left = self.regex.insert(Op::Concat(left, right));
                }
            }
        }
        Ok(left)
    }

    fn parse_factor(&mut self) -> Result<Handle> {
        let mut atom = self.parse_atom()?;
        loop {
            match self.peek_char() {
                Some('*') => {
                    self.chars.next();
                    atom = self.regex.insert(Op::Star(atom));
                }
                Some('+') => {
                    self.chars.next();
                    atom = self.regex.insert(Op::Plus(atom));
                }
                Some('?') => {
                    self.chars.next();
                    atom = self.regex.insert(Op::Optional(atom));
                }
                _ => break,
            }
        }
        Ok(atom)
    }

    fn parse_atom(&mut self) -> Result<Handle> {
        self.skip_ws();
        match self.peek_char() {
            Some('(') => {
                self.chars.next();
                let inner = self.parse_expr()?;
                self.skip_ws();
                match self.chars.next() {
                    Some((_, ')')) => Ok(inner),
                    other => Err(EngineError::Parse(format!(
                        "expected ')' in regex {:?}, found {:?}",
                        self.text, other
                    ))),
                }
            }
            Some('[') if self.dialect == Dialect::Pythonic => self.parse_char_class(),
            Some(c) if OPERATOR_CHARS.contains(&c) => Err(EngineError::UnsupportedRegexFeature(format!(
                "unexpected operator {:?} in regex {:?}",
                c, self.text
            ))),
            Some(_) => self.parse_symbol(),
            None => Err(EngineError::Parse(format!("unexpected end of regex {:?}", self.text))),
        }
    }

    fn parse_symbol(&mut self) -> Result<Handle> {
        let start = self.chars.peek().unwrap().0;
        let mut end = start;
        while let Some(&(idx, c)) = self.chars.peek() {
            if c.is_whitespace() || OPERATOR_CHARS.contains(&c) {
                break;
            }
            end = idx + c.len_utf8();
            self.chars.next();
        }
        let token = &self.text[start..end];
        Ok(self.regex.insert(Op::Match(label(token))))
    }

    /// `[a-z]`, `[abc]`, `[a-zA-Z0-9]`: expand to an alternation of
    /// single-character symbol matches (pythonic dialect only).
    fn parse_char_class(&mut self) -> Result<Handle> {
        self.chars.next(); // consume '['
        let mut chars_in_class: Vec<char> = Vec::new();
        let mut prev: Option<char> = None;
        loop {
            match self.chars.next() {
                Some((_, ']')) => break,
                Some((_, '-')) if prev.is_some() => {
                    let lo = prev.unwrap();
                    let (_, hi) = self.chars.next().ok_or_else(|| {
                        EngineError::Parse(format!("unterminated character range in regex {:?}", self.text))
                    })?;
                    if hi as u32 >= lo as u32 {
                        for c in (lo as u32)..=(hi as u32) {
                            if let Some(c) = char::from_u32(c) {
                                chars_in_class.push(c);
                            }
                        }
                    }
                    prev = None;
                }
                Some((_, c)) => {
                    chars_in_class.push(c);
                    prev = Some(c);
                }
                None => {
                    return Err(EngineError::Parse(format!(
                        "unterminated character class in regex {:?}",
                        self.text
                    )))
                }
            }
        }
        if chars_in_class.is_empty() {
            return Err(EngineError::Parse(format!("empty character class in regex {:?}", self.text)));
        }
        let mut handle = self.regex.insert(Op::Match(label(chars_in_class[0].to_string())));
        for c in &chars_in_class[1..] {
            let next = self.regex.insert(Op::Match(label(c.to_string())));
            handle = self.regex.insert(Op::Or(handle, next));
        }
        Ok(handle)
    }
}

/// Parse a single regex line in the given dialect.
pub fn parse(text: &str, dialect: Dialect) -> Result<Regex> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        let mut regex = Regex::new();
        regex.insert(Op::Epsilon);
        return Ok(regex);
    }
    let mut parser = Parser::new(trimmed, dialect);
    parser.parse_expr()?;
    Ok(parser.regex)
}

// ---- Thompson construction ---------------------------------------------

struct Fragment {
    start: usize,
    end: usize,
}

fn thompson(nfa: &mut Nfa, regex: &Regex, handle: Handle) -> Fragment {
    match regex.get(handle) {
        Op::Epsilon => {
            let start = nfa.add_state();
            let end = nfa.add_state();
            nfa.add_transition(start, None, end);
            Fragment { start, end }
        }
        Op::Match(label) => {
            let start = nfa.add_state();
            let end = nfa.add_state();
            nfa.add_transition(start, Some(label.clone()), end);
            Fragment { start, end }
        }
        Op::Concat(a, b) => {
            let fa = thompson(nfa, regex, *a);
            let fb = thompson(nfa, regex, *b);
            nfa.add_transition(fa.end, None, fb.start);
            Fragment {
                start: fa.start,
                end: fb.end,
            }
        }
        Op::Or(a, b) => {
            let fa = thompson(nfa, regex, *a);
            let fb = thompson(nfa, regex, *b);
            let start = nfa.add_state();
            let end = nfa.add_state();
            nfa.add_transition(start, None, fa.start);
            nfa.add_transition(start, None, fb.start);
            nfa.add_transition(fa.end, None, end);
            nfa.add_transition(fb.end, None, end);
            Fragment { start, end }
        }
        Op::Star(a) => {
            let fa = thompson(nfa, regex, *a);
            let start = nfa.add_state();
            let end = nfa.add_state();
            nfa.add_transition(start, None, fa.start);
            nfa.add_transition(start, None, end);
            nfa.add_transition(fa.end, None, fa.start);
            nfa.add_transition(fa.end, None, end);
            Fragment { start, end }
        }
        Op::Plus(a) => {
            let fa = thompson(nfa, regex, *a);
            let end = nfa.add_state();
            nfa.add_transition(fa.end, None, fa.start);
            nfa.add_transition(fa.end, None, end);
            Fragment {
                start: fa.start,
                end,
            }
        }
        Op::Optional(a) => {
            let fa = thompson(nfa, regex, *a);
            nfa.add_transition(fa.start, None, fa.end);
            Fragment {
                start: fa.start,
                end: fa.end,
            }
        }
    }
}

/// Build an epsilon-NFA for the whole regex via Thompson's construction.
pub fn to_nfa(regex: &Regex) -> Nfa {
    let mut nfa = Nfa::new(0);
    let root = regex.root().expect("regex always has a root operation");
    let fragment = thompson(&mut nfa, regex, root);
    nfa.add_start(fragment.start);
    nfa.add_final(fragment.end);
    nfa
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::automaton::equivalent_on_sample;

    fn dfa_for(text: &str, dialect: Dialect) -> crate::automaton::Dfa {
        let regex = parse(text, dialect).unwrap();
        to_nfa(&regex).to_dfa().minimize()
    }

    #[test]
    fn concat_star_and_alternation() {
        let dfa = dfa_for("a b*|c", Dialect::Simplified);
        assert!(dfa.accepts(&[label("a")]));
        assert!(dfa.accepts(&[label("a"), label("b"), label("b")]));
        assert!(dfa.accepts(&[label("c")]));
        assert!(!dfa.accepts(&[label("b")]));
    }

    #[test]
    fn equivalent_regexes_yield_equivalent_automata() {
        let a = dfa_for("a*", Dialect::Simplified);
        let b = dfa_for("(a)*", Dialect::Simplified);
        assert!(equivalent_on_sample(&a, &b, &[label("a")], 5));
    }

    #[test]
    fn pythonic_char_class_expands_to_alternation() {
        let dfa = dfa_for("[ab]", Dialect::Pythonic);
        assert!(dfa.accepts(&[label("a")]));
        assert!(dfa.accepts(&[label("b")]));
        assert!(!dfa.accepts(&[label("c")]));
    }

    #[test]
    fn rejects_unbalanced_parens() {
        let err = parse("(a", Dialect::Simplified).unwrap_err();
        assert!(matches!(err, EngineError::Parse(_)));
    }
}
