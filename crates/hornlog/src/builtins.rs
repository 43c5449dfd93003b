//! Built-in predicate registry and the default arithmetic relations.
//!
//! A procedure key that is absent from the compiled program is routed
//! here. Unregistered keys fail (zero solutions); hosts extend the engine
//! by registering callbacks keyed by `(name, arity)`.
//!
//! A builtin sees the call's argument terms (unwalked) and the current
//! substitution, and returns one extended substitution per solution. The
//! interpreter resumes the pending continuation for each.

use std::collections::HashMap;
use std::sync::Arc;

use crate::bytecode::Functor;
use crate::subst::Substitution;
use crate::term::Term;

/// Callback type for host-registered built-in predicates.
pub type BuiltinFn = Arc<dyn Fn(&[Term], &Substitution) -> Vec<Substitution> + Send + Sync>;

/// The builtin table of one engine.
#[derive(Clone, Default)]
pub(crate) struct Builtins {
    table: HashMap<Functor, BuiltinFn>,
}

impl std::fmt::Debug for Builtins {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Builtins")
            .field("table", &self.table.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl Builtins {
    pub(crate) fn register(&mut self, name: impl Into<String>, arity: usize, f: BuiltinFn) {
        self.table.insert(Functor::new(name, arity), f);
    }

    pub(crate) fn get(&self, key: &Functor) -> Option<&BuiltinFn> {
        self.table.get(key)
    }

    /// Install the reserved predicates: `is/2`, its alternate spelling
    /// `:=/2`, and the addition relation `isplus/3`.
    pub(crate) fn register_defaults(&mut self) {
        self.register("is", 2, Arc::new(builtin_is));
        self.register(":=", 2, Arc::new(builtin_is));
        self.register("isplus", 3, Arc::new(builtin_isplus));
    }
}

/// Evaluate a term as a 64-bit integer expression: integers evaluate to
/// themselves, and the binary compounds `plus`, `minus`, `times`, and
/// `div` fold their evaluated arguments. Anything else fails: an unbound
/// variable, an atom, overflow, division by zero.
fn eval_int(sub: &Substitution, term: &Term) -> Option<i64> {
    match sub.walk(term) {
        Term::Int(n) => Some(n),
        Term::Compound { functor, args } if args.len() == 2 => {
            let lhs = eval_int(sub, &args[0])?;
            let rhs = eval_int(sub, &args[1])?;
            match functor.as_str() {
                "plus" => lhs.checked_add(rhs),
                "minus" => lhs.checked_sub(rhs),
                "times" => lhs.checked_mul(rhs),
                "div" => {
                    if rhs == 0 {
                        None
                    } else {
                        lhs.checked_div(rhs)
                    }
                }
                _ => None,
            }
        }
        _ => None,
    }
}

/// `is/2` and `:=/2`: unify the left term with the arithmetic value of
/// the right.
fn builtin_is(args: &[Term], sub: &Substitution) -> Vec<Substitution> {
    if args.len() != 2 {
        return Vec::new();
    }
    let Some(value) = eval_int(sub, &args[1]) else {
        return Vec::new();
    };
    sub.unify(&args[0], &Term::Int(value)).into_iter().collect()
}

/// `isplus/3`: addition as a relation. Any two ground integer positions
/// determine the third; fewer than two fails.
fn builtin_isplus(args: &[Term], sub: &Substitution) -> Vec<Substitution> {
    if args.len() != 3 {
        return Vec::new();
    }
    let ints: Vec<Option<i64>> = args
        .iter()
        .map(|a| match sub.walk(a) {
            Term::Int(n) => Some(n),
            _ => None,
        })
        .collect();
    let result = match (ints[0], ints[1], ints[2]) {
        (Some(a), Some(b), _) => a
            .checked_add(b)
            .and_then(|c| sub.unify(&args[2], &Term::Int(c))),
        (Some(a), None, Some(c)) => c
            .checked_sub(a)
            .and_then(|b| sub.unify(&args[1], &Term::Int(b))),
        (None, Some(b), Some(c)) => c
            .checked_sub(b)
            .and_then(|a| sub.unify(&args[0], &Term::Int(a))),
        _ => None,
    };
    result.into_iter().collect()
}
