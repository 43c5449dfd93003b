//! Hornlog, an embeddable Horn-clause logic engine.
//!
//! Hornlog answers queries against a set of Horn clauses by SLD resolution
//! with occurs-check unification, enumerating every provable set of
//! bindings. The design follows the Bowen–Byrd–Clocksin portable Prolog
//! compiler: clauses are compiled to a seven-opcode bytecode whose
//! term-shaped instructions serve both as head matchers and as goal
//! builders, and a small interpreter executes the compiled procedures
//! over a persistent substitution.
//!
//! # Quick Start
//!
//! ```
//! use hornlog::Engine;
//!
//! let engine = Engine::load(
//!     "append(nil, L, L).
//!      append(cons(X, L1), L2, cons(X, L3)) :- append(L1, L2, L3).",
//! )
//! .unwrap();
//!
//! // Which L and X split [a,b,c]?
//! let solutions = engine
//!     .interpret("append(L, X, cons(a, cons(b, cons(c, nil))))")
//!     .unwrap();
//!
//! assert_eq!(solutions.len(), 4);
//! assert_eq!(solutions[0]["L"].to_string(), "nil");
//! assert_eq!(solutions[3]["X"].to_string(), "nil");
//! ```
//!
//! # Surface syntax
//!
//! - Clauses: `head.` or `head :- goal1, goal2.`
//! - Atoms are lowercase-initial identifiers; variables are
//!   uppercase-initial (or `_`-prefixed) identifiers; a bare `_` is the
//!   don't-care atom.
//! - Lists: `[a, b | T]` is sugar for `cons(a, cons(b, T))`; `[]` is
//!   `nil`.
//! - Queries: `?- goal1, goal2.` (the `?-` and the final `.` are
//!   optional).
//! - Comments run from `%` to end of line.
//!
//! # Built-ins
//!
//! Procedures not defined by the loaded program are looked up in the
//! engine's builtin table; calls to unregistered procedures fail. The
//! `*_with_builtins` constructors pre-register the reserved arithmetic
//! predicates `is/2`, `:=/2`, and `isplus/3`; hosts add their own with
//! [`Engine::register_builtin`].
//!
//! # Limits
//!
//! Enumeration is eager and exhaustive: a query with infinitely many
//! answers (for example a left-recursive program) will not return. Cut,
//! negation-as-failure, and clause indexing are out of scope.

mod builtins;
mod bytecode;
mod compiler;
mod diagnostic;
mod engine;
mod error;
mod parser;
mod subst;
mod term;
mod vm;

pub use builtins::BuiltinFn;
pub use bytecode::{Clause, Functor, Op, Procedure, Program, XrEntry};
pub use compiler::{compile_procedures, compile_rule};
pub use diagnostic::{Diagnostic, Span};
pub use engine::{Bindings, Engine};
pub use error::{Error, Result};
pub use parser::{parse_query, parse_rules};
pub use subst::Substitution;
pub use term::{FALSE, Goal, NIL, Rule, TRUE, Term, UNDERSCORE};
