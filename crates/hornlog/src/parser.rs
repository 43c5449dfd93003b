//! Surface-syntax parser for rule sets and queries.
//!
//! This is the only module that touches program text. A `logos`-generated
//! lexer feeds a recursive-descent parser that produces [`Rule`]s and
//! [`Goal`]s over the term model, numbering each clause's variables from 0
//! in order of first occurrence.
//!
//! List syntax is sugar: `[a,b|T]` parses to `cons(a,cons(b,T))` and `[]`
//! to `nil`, so compiled programs use a single runtime representation for
//! lists. A bare `_` is the distinguished don't-care atom, not a variable;
//! identifiers starting with `_` or an uppercase letter are variables.

use std::collections::BTreeMap;
use std::fmt;

use logos::Logos;

use crate::diagnostic::{Diagnostic, Span};
use crate::error::{Error, Result};
use crate::term::{Goal, Rule, Term, UNDERSCORE};

#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n]+")]
#[logos(skip(r"%[^\n]*", allow_greedy = true))]
enum Token {
    #[regex(r"[a-z][A-Za-z0-9_]*", |lex| lex.slice().to_owned())]
    Atom(String),

    #[regex(r"[A-Z_][A-Za-z0-9_]*", |lex| lex.slice().to_owned())]
    Variable(String),

    #[regex(r"-?[0-9]+", |lex| lex.slice().parse::<i64>().ok())]
    Int(i64),

    #[token(":-")]
    Neck,
    #[token("?-")]
    Query,
    #[token(":=")]
    Assign,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token(",")]
    Comma,
    #[token("|")]
    Bar,
    #[token(".")]
    Dot,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Atom(s) | Token::Variable(s) => write!(f, "`{s}`"),
            Token::Int(n) => write!(f, "`{n}`"),
            Token::Neck => f.write_str("`:-`"),
            Token::Query => f.write_str("`?-`"),
            Token::Assign => f.write_str("`:=`"),
            Token::LParen => f.write_str("`(`"),
            Token::RParen => f.write_str("`)`"),
            Token::LBracket => f.write_str("`[`"),
            Token::RBracket => f.write_str("`]`"),
            Token::Comma => f.write_str("`,`"),
            Token::Bar => f.write_str("`|`"),
            Token::Dot => f.write_str("`.`"),
        }
    }
}

/// Parse a program: zero or more clauses, each terminated by `.`.
///
/// Variable identifiers are assigned per clause, starting at 0.
///
/// # Example
///
/// ```
/// use hornlog::parse_rules;
///
/// let rules = parse_rules(
///     "append(nil, L, L).
///      append(cons(X, L1), L2, cons(X, L3)) :- append(L1, L2, L3).",
/// )
/// .unwrap();
/// assert_eq!(rules.len(), 2);
/// assert_eq!(rules[1].body.len(), 1);
/// ```
pub fn parse_rules(source: &str) -> Result<Vec<Rule>> {
    let mut parser = Parser::new(source)?;
    let mut rules = Vec::new();
    while !parser.at_end() {
        rules.push(parser.rule()?);
    }
    Ok(rules)
}

/// Parse a query: one or more goals separated by `,`, with an optional
/// `?-` prefix and an optional trailing `.`.
///
/// Returns the goals and the mapping from source-level variable names to
/// the identifiers assigned to them (starting at 0, shared across all the
/// query's goals) so that answers can be rendered under the user's names.
pub fn parse_query(source: &str) -> Result<(Vec<Goal>, BTreeMap<String, usize>)> {
    let mut parser = Parser::new(source)?;
    parser.eat(&Token::Query);
    let mut goals = vec![parser.goal()?];
    while parser.eat(&Token::Comma) {
        goals.push(parser.goal()?);
    }
    parser.eat(&Token::Dot);
    if !parser.at_end() {
        return Err(parser.error_here("expected end of query"));
    }
    Ok((goals, parser.vars))
}

struct Parser<'a> {
    source: &'a str,
    tokens: Vec<(Token, Span)>,
    pos: usize,
    vars: BTreeMap<String, usize>,
}

impl<'a> Parser<'a> {
    fn new(source: &'a str) -> Result<Self> {
        let mut tokens = Vec::new();
        for (result, range) in Token::lexer(source).spanned() {
            let span = Span::new(range.start, range.end);
            match result {
                Ok(token) => tokens.push((token, span)),
                Err(()) => {
                    return Err(Error::Parse(Diagnostic::new(
                        source,
                        span,
                        "unrecognized token",
                    )));
                }
            }
        }
        Ok(Self {
            source,
            tokens,
            pos: 0,
            vars: BTreeMap::new(),
        })
    }

    fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|(t, _)| t)
    }

    fn advance(&mut self) -> Option<(Token, Span)> {
        let item = self.tokens.get(self.pos).cloned();
        if item.is_some() {
            self.pos += 1;
        }
        item
    }

    fn eat(&mut self, token: &Token) -> bool {
        if self.peek() == Some(token) {
            self.pos += 1;
            return true;
        }
        false
    }

    fn expect(&mut self, token: Token, context: &str) -> Result<()> {
        if self.eat(&token) {
            return Ok(());
        }
        Err(self.error_here(format!("expected {token} {context}")))
    }

    /// The span of the next token, or an empty span at end of input.
    fn current_span(&self) -> Span {
        match self.tokens.get(self.pos) {
            Some((_, span)) => *span,
            None => Span::new(self.source.len(), self.source.len()),
        }
    }

    fn error_here(&self, message: impl Into<String>) -> Error {
        self.error_at(self.current_span(), message)
    }

    fn error_at(&self, span: Span, message: impl Into<String>) -> Error {
        Error::Parse(Diagnostic::new(self.source, span, message))
    }

    /// The identifier for a named variable, allocating the next free one
    /// on first sight. The numbering scope is managed by the callers:
    /// cleared per clause, shared across a query.
    fn var_id(&mut self, name: String) -> usize {
        let next = self.vars.len();
        *self.vars.entry(name).or_insert(next)
    }

    fn rule(&mut self) -> Result<Rule> {
        self.vars.clear();
        let head = self.goal()?;
        let mut body = Vec::new();
        if self.eat(&Token::Neck) {
            body.push(self.goal()?);
            while self.eat(&Token::Comma) {
                body.push(self.goal()?);
            }
        }
        self.expect(Token::Dot, "after clause")?;
        Ok(Rule { head, body })
    }

    fn goal(&mut self) -> Result<Goal> {
        let start = self.current_span();
        let term = self.term()?;

        // Infix built-in forms: `T is T` and `T := T`.
        let infix = match self.peek() {
            Some(Token::Atom(a)) if a == "is" => Some("is"),
            Some(Token::Assign) => Some(":="),
            _ => None,
        };
        if let Some(op) = infix {
            self.advance();
            let rhs = self.term()?;
            return Ok(Goal::new(op, vec![term, rhs]));
        }

        match term {
            Term::Compound { functor, args } => Ok(Goal::new(functor, args)),
            Term::Atom(name) => Ok(Goal::new(name, Vec::new())),
            _ => Err(self.error_at(start, "expected a callable goal")),
        }
    }

    fn term(&mut self) -> Result<Term> {
        match self.advance() {
            Some((Token::Variable(name), _)) => {
                if name == UNDERSCORE {
                    return Ok(Term::atom(UNDERSCORE));
                }
                Ok(Term::Var(self.var_id(name)))
            }
            Some((Token::Int(n), _)) => Ok(Term::Int(n)),
            Some((Token::Atom(name), _)) => {
                if self.eat(&Token::LParen) {
                    let mut args = vec![self.term()?];
                    while self.eat(&Token::Comma) {
                        args.push(self.term()?);
                    }
                    self.expect(Token::RParen, "after arguments")?;
                    return Ok(Term::Compound { functor: name, args });
                }
                Ok(Term::Atom(name))
            }
            Some((Token::LBracket, _)) => self.list(),
            Some((token, span)) => {
                Err(self.error_at(span, format!("expected a term, found {token}")))
            }
            None => Err(self.error_here("expected a term")),
        }
    }

    /// The remainder of a list literal; the opening `[` is already
    /// consumed. Desugars to `cons/2` chains ending in `nil` (or in the
    /// explicit `|` tail).
    fn list(&mut self) -> Result<Term> {
        if self.eat(&Token::RBracket) {
            return Ok(Term::nil());
        }
        let mut items = vec![self.term()?];
        while self.eat(&Token::Comma) {
            items.push(self.term()?);
        }
        let tail = if self.eat(&Token::Bar) {
            self.term()?
        } else {
            Term::nil()
        };
        self.expect(Token::RBracket, "to close the list")?;
        Ok(items.into_iter().rev().fold(tail, |tail, head| {
            Term::compound("cons", vec![head, tail])
        }))
    }
}
