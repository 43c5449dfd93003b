//! The public engine handle: load a program, run queries, collect
//! bindings.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::builtins::BuiltinFn;
use crate::bytecode::Program;
use crate::compiler::compile_procedures;
use crate::error::Result;
use crate::parser::{parse_query, parse_rules};
use crate::subst::Substitution;
use crate::term::Term;
use crate::vm::Vm;

/// One solution: each query variable, by its source name, mapped to its
/// resolved term. A variable the proof left unbound maps to itself.
pub type Bindings = BTreeMap<String, Term>;

/// A loaded logic program, ready to answer queries.
///
/// The engine owns a compiled procedure table and a (possibly empty)
/// builtin table. Queries are independent: each `interpret` call starts
/// from a fresh substitution and variable counter.
///
/// # Example
///
/// ```
/// use hornlog::Engine;
///
/// let engine = Engine::load(
///     "append(nil, L, L).
///      append(cons(X, L1), L2, cons(X, L3)) :- append(L1, L2, L3).",
/// )
/// .unwrap();
///
/// let solutions = engine
///     .interpret("append(cons(a, cons(b, nil)), cons(c, nil), L)")
///     .unwrap();
/// assert_eq!(solutions.len(), 1);
/// assert_eq!(
///     solutions[0]["L"].to_string(),
///     "cons(a,cons(b,cons(c,nil)))"
/// );
/// ```
#[derive(Clone, Debug)]
pub struct Engine {
    vm: Vm,
}

impl Engine {
    /// Wrap a compiled program. No builtins are registered: a call to a
    /// procedure that is neither compiled nor registered fails.
    pub fn new(program: Program) -> Self {
        Self {
            vm: Vm::new(program),
        }
    }

    /// Wrap a compiled program with the reserved arithmetic predicates
    /// (`is/2`, `:=/2`, `isplus/3`) pre-registered.
    pub fn with_builtins(program: Program) -> Self {
        let mut engine = Self::new(program);
        engine.vm.register_default_builtins();
        engine
    }

    /// Parse and compile a program in one step.
    ///
    /// # Errors
    ///
    /// Returns an error when the program text is malformed.
    pub fn load(rules: &str) -> Result<Self> {
        Ok(Self::new(compile_procedures(&parse_rules(rules)?)))
    }

    /// [`load`](Self::load) plus the reserved arithmetic predicates.
    ///
    /// # Example
    ///
    /// ```
    /// use hornlog::Engine;
    ///
    /// let engine =
    ///     Engine::load_with_builtins("inc(X, Y) :- Y is plus(X, 1).").unwrap();
    /// let solutions = engine.interpret("inc(41, N)").unwrap();
    /// assert_eq!(solutions[0]["N"].to_string(), "42");
    /// ```
    pub fn load_with_builtins(rules: &str) -> Result<Self> {
        Ok(Self::with_builtins(compile_procedures(&parse_rules(rules)?)))
    }

    /// Register a built-in predicate under `(name, arity)`.
    ///
    /// The callback receives the call's argument terms and the current
    /// substitution, and returns one extended substitution per solution.
    /// An empty vector is failure.
    ///
    /// # Example
    ///
    /// ```
    /// use hornlog::{Engine, Program, Term};
    ///
    /// let mut engine = Engine::new(Program::new());
    /// engine.register_builtin("zero", 1, |args, sub| {
    ///     sub.unify(&args[0], &Term::Int(0)).into_iter().collect()
    /// });
    ///
    /// let solutions = engine.interpret("zero(X)").unwrap();
    /// assert_eq!(solutions[0]["X"], Term::Int(0));
    /// ```
    pub fn register_builtin<F>(&mut self, name: impl Into<String>, arity: usize, f: F)
    where
        F: Fn(&[Term], &Substitution) -> Vec<Substitution> + Send + Sync + 'static,
    {
        self.vm.register_builtin(name, arity, Arc::new(f) as BuiltinFn);
    }

    /// Run a query and return every provable set of bindings, in
    /// depth-first, leftmost-clause-first order.
    ///
    /// The query is one or more goals separated by `,`; goals run left to
    /// right. Enumeration is exhaustive; a query with infinitely many
    /// answers will not return.
    ///
    /// # Errors
    ///
    /// Returns an error when the query text is malformed. An unprovable
    /// query is not an error: it yields an empty vector.
    pub fn interpret(&self, query: &str) -> Result<Vec<Bindings>> {
        let (goals, vars) = parse_query(query)?;
        let states = self.vm.solve(&goals, vars.len());
        Ok(states
            .iter()
            .map(|state| {
                vars.iter()
                    .map(|(name, &var)| (name.clone(), state.resolve(var)))
                    .collect()
            })
            .collect())
    }
}
