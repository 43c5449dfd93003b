//! Persistent substitutions and unification with occurs-check.
//!
//! A substitution is the unifier computed so far: a finite map from
//! variable index to term. It is used as an immutable value: every
//! successful unification returns a *new* substitution extending the old
//! one, and the old one stays valid for the interpreter's alternative
//! branches. There is no trail and no undo; backtracking falls out of
//! immutability.
//!
//! The representation is an `Arc`-linked association chain: cloning is
//! O(1), extension pushes one node, and sibling branches share their
//! common prefix. A binding, once made, is never shadowed; `unify` walks
//! variables to their root before deciding to extend.

use std::sync::Arc;

use crate::term::Term;

struct Binding {
    var: usize,
    term: Term,
    next: Option<Arc<Binding>>,
}

/// A persistent mapping from variable index to term.
#[derive(Clone, Default)]
pub struct Substitution {
    head: Option<Arc<Binding>>,
    len: usize,
}

impl Substitution {
    /// The empty substitution.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of bindings.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Look up the binding for a variable, if any.
    pub fn get(&self, var: usize) -> Option<&Term> {
        let mut node = self.head.as_deref();
        while let Some(b) = node {
            if b.var == var {
                return Some(&b.term);
            }
            node = b.next.as_deref();
        }
        None
    }

    /// Resolve a term one level: follow variable bindings until reaching
    /// either a non-variable term or an unbound variable. Subterms are not
    /// resolved.
    pub fn walk(&self, term: &Term) -> Term {
        let mut current = term.clone();
        loop {
            match current {
                Term::Var(v) => match self.get(v) {
                    Some(bound) => current = bound.clone(),
                    None => return Term::Var(v),
                },
                resolved => return resolved,
            }
        }
    }

    /// Resolve a term deeply: [`walk`](Self::walk), then recurse into list
    /// heads/tails and compound arguments. Variables remaining in the
    /// result are unbound.
    pub fn walk_star(&self, term: &Term) -> Term {
        match self.walk(term) {
            Term::List { head, tail } => Term::List {
                head: Box::new(self.walk_star(&head)),
                tail: Box::new(self.walk_star(&tail)),
            },
            Term::Compound { functor, args } => Term::Compound {
                functor,
                args: args.iter().map(|a| self.walk_star(a)).collect(),
            },
            resolved => resolved,
        }
    }

    /// Bind `var` to `term`, returning the extended substitution, or
    /// `None` when the occurs-check rejects the binding. Occurs-check
    /// failure is logical failure, not an error.
    pub fn extend(&self, var: usize, term: Term) -> Option<Substitution> {
        if self.occurs(var, &term) {
            return None;
        }
        Some(Substitution {
            head: Some(Arc::new(Binding {
                var,
                term,
                next: self.head.clone(),
            })),
            len: self.len + 1,
        })
    }

    /// Whether `var` occurs in `term` under this substitution. Descends
    /// into list heads/tails and compound arguments.
    fn occurs(&self, var: usize, term: &Term) -> bool {
        match self.walk(term) {
            Term::Var(v) => v == var,
            Term::List { head, tail } => self.occurs(var, &head) || self.occurs(var, &tail),
            Term::Compound { args, .. } => args.iter().any(|a| self.occurs(var, a)),
            _ => false,
        }
    }

    /// Unify two terms, returning the extended substitution on success.
    ///
    /// Both terms are walked to their roots first. Equal roots succeed
    /// without extension; an unbound variable on either side is bound to
    /// the other root (occurs-checked); compounds unify argument by
    /// argument, left to right, threading the substitution; lists unify
    /// head then tail. Everything else fails.
    ///
    /// # Example
    ///
    /// ```
    /// use hornlog::{Substitution, Term};
    ///
    /// let sub = Substitution::new();
    /// let sub = sub
    ///     .unify(
    ///         &Term::compound("f", vec![Term::Var(0), Term::Int(2)]),
    ///         &Term::compound("f", vec![Term::atom("a"), Term::Var(1)]),
    ///     )
    ///     .unwrap();
    /// assert_eq!(sub.walk(&Term::Var(0)), Term::atom("a"));
    /// assert_eq!(sub.walk(&Term::Var(1)), Term::Int(2));
    /// ```
    pub fn unify(&self, u: &Term, v: &Term) -> Option<Substitution> {
        let u0 = self.walk(u);
        let v0 = self.walk(v);
        if u0 == v0 {
            return Some(self.clone());
        }
        if let Term::Var(n) = u0 {
            return self.extend(n, v0);
        }
        if let Term::Var(n) = v0 {
            return self.extend(n, u0);
        }
        match (u0, v0) {
            (
                Term::Compound { functor: uf, args: ua },
                Term::Compound { functor: vf, args: va },
            ) => {
                if uf != vf || ua.len() != va.len() {
                    return None;
                }
                let mut sub = self.clone();
                for (x, y) in ua.iter().zip(va.iter()) {
                    sub = sub.unify(x, y)?;
                }
                Some(sub)
            }
            (
                Term::List { head: uh, tail: ut },
                Term::List { head: vh, tail: vt },
            ) => self.unify(&uh, &vh)?.unify(&ut, &vt),
            _ => None,
        }
    }
}

impl std::fmt::Debug for Substitution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut map = f.debug_map();
        let mut node = self.head.as_deref();
        while let Some(b) = node {
            map.entry(&b.var, &b.term.to_string());
            node = b.next.as_deref();
        }
        map.finish()
    }
}
