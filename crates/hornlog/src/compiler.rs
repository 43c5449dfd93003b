//! Clause compiler: translates rules into bytecode clauses and groups them
//! into procedures.
//!
//! Each rule compiles independently into a flat instruction stream plus an
//! xr table built up by interning every constant, compound descriptor, and
//! called procedure the rule mentions. The stream is emitted in one
//! left-to-right traversal: head arguments, `ENTER` when a body exists,
//! then each body goal's arguments followed by its `CALL`, and a final
//! `EXIT`.

use std::collections::HashMap;

use crate::bytecode::{Clause, Functor, Op, Procedure, Program, XrEntry};
use crate::term::{Rule, Term};

/// Compile a set of rules into a procedure table. Rules sharing a head
/// `(name, arity)` become one procedure, with clauses kept in source order.
///
/// # Example
///
/// ```
/// use hornlog::{compile_procedures, parse_rules, Functor};
///
/// let rules = parse_rules("likes(mary, wine). likes(john, wine).").unwrap();
/// let program = compile_procedures(&rules);
/// let procedure = program.get(&Functor::new("likes", 2)).unwrap();
/// assert_eq!(procedure.clauses.len(), 2);
/// ```
pub fn compile_procedures(rules: &[Rule]) -> Program {
    let mut order: Vec<Functor> = Vec::new();
    let mut groups: HashMap<Functor, Vec<&Rule>> = HashMap::new();
    for rule in rules {
        let key = Functor::new(rule.head.functor.clone(), rule.head.arity());
        let group = groups.entry(key.clone()).or_default();
        if group.is_empty() {
            order.push(key);
        }
        group.push(rule);
    }

    let mut program = Program::new();
    for key in order {
        let clauses = groups[&key].iter().map(|r| compile_rule(r)).collect();
        program.insert(Procedure { key, clauses });
    }
    program
}

/// Compile a single rule into a clause.
pub fn compile_rule(rule: &Rule) -> Clause {
    let mut c = ClauseCompiler::default();
    c.compile_args(&rule.head.args);
    if !rule.body.is_empty() {
        c.code.push(Op::Enter);
    }
    for goal in &rule.body {
        c.compile_args(&goal.args);
        let idx = c.intern(XrEntry::Proc(Functor::new(goal.functor.clone(), goal.arity())));
        c.code.push(Op::Call(idx));
    }
    c.code.push(Op::Exit);
    c.finish()
}

/// Builder for one clause under compilation: the growing instruction
/// stream and the xr table with its interning index.
#[derive(Default)]
struct ClauseCompiler {
    xr: Vec<XrEntry>,
    interned: HashMap<XrEntry, u32>,
    code: Vec<Op>,
}

impl ClauseCompiler {
    /// Add an entry to the xr table and return its slot, reusing the slot
    /// of an identical earlier entry.
    fn intern(&mut self, entry: XrEntry) -> u32 {
        if let Some(&idx) = self.interned.get(&entry) {
            return idx;
        }
        let idx = self.xr.len() as u32;
        self.xr.push(entry.clone());
        self.interned.insert(entry, idx);
        idx
    }

    fn compile_args(&mut self, args: &[Term]) {
        for arg in args {
            self.compile_term(arg);
        }
    }

    fn compile_term(&mut self, term: &Term) {
        match term {
            Term::Var(v) => self.code.push(Op::Var(*v as u32)),
            Term::Int(n) => {
                let idx = self.intern(XrEntry::Int(*n));
                self.code.push(Op::Const(idx));
            }
            Term::Atom(s) => {
                let idx = self.intern(XrEntry::Atom(s.clone()));
                self.code.push(Op::Const(idx));
            }
            Term::Compound { functor, args } => {
                let idx = self.intern(XrEntry::Functor(Functor::new(functor.clone(), args.len())));
                self.code.push(Op::Functor(idx));
                self.compile_args(args);
                self.code.push(Op::Pop);
            }
            // Host-built cons cells compile to the same cons/2 shape the
            // parser's list sugar produces, keeping one runtime
            // representation for lists.
            Term::List { head, tail } => {
                let idx = self.intern(XrEntry::Functor(Functor::new("cons", 2)));
                self.code.push(Op::Functor(idx));
                self.compile_term(head);
                self.compile_term(tail);
                self.code.push(Op::Pop);
            }
        }
    }

    /// Close the clause: the variable namespace size is one past the
    /// highest variable index the emitted code mentions.
    fn finish(self) -> Clause {
        let num_vars = self
            .code
            .iter()
            .filter_map(|op| match op {
                Op::Var(v) => Some(*v as usize + 1),
                _ => None,
            })
            .max()
            .unwrap_or(0);
        Clause {
            xr: self.xr,
            num_vars,
            code: self.code,
        }
    }
}
