//! Bytecode instruction set and compiled clause representation.
//!
//! This module defines the instructions the compiler produces and the VM
//! executes, together with the per-clause reference table ("xr table") the
//! instructions index into. The instruction set is the seven-opcode core of
//! the Bowen–Byrd–Clocksin portable Prolog design.

use std::collections::HashMap;
use std::fmt;

/// The `(name, arity)` identity shared by compound descriptors and
/// procedure keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Functor {
    pub name: String,
    pub arity: usize,
}

impl Functor {
    pub fn new(name: impl Into<String>, arity: usize) -> Self {
        Self {
            name: name.into(),
            arity,
        }
    }
}

impl fmt::Display for Functor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.name, self.arity)
    }
}

/// A single bytecode instruction.
///
/// The term-shaped instructions (`Const`, `Var`, `Functor`) are dual-mode:
/// with caller arguments still pending they *match* (unify against the next
/// pending argument), otherwise they *build* (append the described term to
/// the argument queue of the next call). The mode is decided dynamically by
/// the VM; the compiler emits one instruction stream per clause that serves
/// both as head pattern and body builder.
///
/// Index operands (`u32`) refer to entries in the owning [`Clause`]'s xr
/// table, except for `Var`, whose operand is an index into the clause-local
/// variable namespace `[0, num_vars)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    /// Match or build the literal constant (integer or atom) in xr slot `k`.
    Const(u32),

    /// Match or build clause-local variable `v`, offset at run time by the
    /// invocation's variable offset.
    Var(u32),

    /// Begin matching or building a compound whose descriptor is xr slot
    /// `k`. The following instructions, up to the balancing [`Op::Pop`],
    /// handle the compound's arguments positionally.
    Functor(u32),

    /// Finish the compound begun by the nearest unbalanced [`Op::Functor`].
    Pop,

    /// Head fully matched; transition into the body. Emitted only for
    /// clauses with a non-empty body.
    Enter,

    /// Invoke the procedure in xr slot `k` on the arguments accumulated in
    /// the build queue, saving the current position for resumption.
    Call(u32),

    /// Finish the clause: resume the pending continuation, or yield the
    /// current bindings as a solution. Always the last instruction.
    Exit,
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Op::Const(k) => write!(f, "CONST {k}"),
            Op::Var(v) => write!(f, "VAR {v}"),
            Op::Functor(k) => write!(f, "FUNCTOR {k}"),
            Op::Pop => f.write_str("POP"),
            Op::Enter => f.write_str("ENTER"),
            Op::Call(k) => write!(f, "CALL {k}"),
            Op::Exit => f.write_str("EXIT"),
        }
    }
}

/// An entry in a clause's xr table.
///
/// The table is the clause's pool of everything its bytecode refers to by
/// index: literal constants, compound descriptors, and called procedures.
/// Entries are interned during compilation, so repeated references within
/// one clause share a slot.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum XrEntry {
    /// An integer literal.
    Int(i64),
    /// An atom literal.
    Atom(String),
    /// A compound descriptor, referenced by [`Op::Functor`].
    Functor(Functor),
    /// A procedure reference, referenced by [`Op::Call`].
    Proc(Functor),
}

impl fmt::Display for XrEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            XrEntry::Int(n) => write!(f, "{n}"),
            XrEntry::Atom(s) => f.write_str(s),
            XrEntry::Functor(fun) => write!(f, "{fun}"),
            XrEntry::Proc(p) => write!(f, "{p}"),
        }
    }
}

/// One compiled clause: its xr table, its bytecode, and the size of its
/// variable namespace.
///
/// `num_vars` is the number of distinct clause-local variables; the VM
/// reserves that many fresh variable indices per invocation so recursive
/// uses of the clause never alias each other.
#[derive(Debug, Clone, PartialEq)]
pub struct Clause {
    pub xr: Vec<XrEntry>,
    pub num_vars: usize,
    pub code: Vec<Op>,
}

impl fmt::Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "xr: [")?;
        for (i, entry) in self.xr.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{entry}")?;
        }
        writeln!(f, "]  vars: {}", self.num_vars)?;
        for op in &self.code {
            writeln!(f, "  {op}")?;
        }
        Ok(())
    }
}

/// All clauses sharing one `(name, arity)` key, in source order.
#[derive(Debug, Clone, PartialEq)]
pub struct Procedure {
    pub key: Functor,
    pub clauses: Vec<Clause>,
}

/// A compiled program: the procedure table the interpreter executes
/// against.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Program {
    procedures: HashMap<Functor, Procedure>,
}

impl Program {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a procedure, keyed by its `(name, arity)`. A procedure with
    /// the same key is replaced.
    pub fn insert(&mut self, procedure: Procedure) {
        self.procedures.insert(procedure.key.clone(), procedure);
    }

    pub fn get(&self, key: &Functor) -> Option<&Procedure> {
        self.procedures.get(key)
    }

    pub fn len(&self) -> usize {
        self.procedures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.procedures.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Procedure> {
        self.procedures.values()
    }
}
