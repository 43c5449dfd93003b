//! The bytecode interpreter: procedure dispatch and clause execution.
//!
//! Execution is a pure function of its inputs. The substitution is a
//! persistent value, so trying the clauses of a procedure one after
//! another needs no trail and no choice-point stack: every clause trial
//! starts from the caller's original state and contributes its own list
//! of solution states, concatenated in clause order. The resulting
//! enumeration is the classic depth-first, leftmost-clause-first Prolog
//! search order, and it is exhaustive: a program with infinitely many
//! answers will not return.
//!
//! Panics in this module are reserved for bytecode that the compiler can
//! never emit (an xr slot of the wrong kind, an unbalanced `POP`, code
//! after `EXIT`). A program that merely fails to prove something produces
//! an empty solution list, never a panic.

use std::collections::VecDeque;

use crate::builtins::{BuiltinFn, Builtins};
use crate::bytecode::{Clause, Functor, Op, Program, XrEntry};
use crate::subst::Substitution;
use crate::term::{Goal, Term};

/// The interpreter: a compiled program plus the builtin table.
#[derive(Clone, Default, Debug)]
pub(crate) struct Vm {
    program: Program,
    builtins: Builtins,
}

/// The threaded proof state: the substitution built so far, the variable
/// offset of the clause invocation being executed, and the next free
/// variable index.
#[derive(Clone)]
pub(crate) struct State {
    pub(crate) sub: Substitution,
    /// Added to every clause-local `VAR` operand, so each invocation of a
    /// clause works in its own variable range.
    vo: usize,
    /// Monotonically allocated; bumped at clause entry and whenever
    /// `FUNCTOR` synthesizes fresh argument variables.
    vc: usize,
}

/// A suspended execution point for an outer subgoal: resumes `clause` at
/// `ip` with the saved variable offset.
#[derive(Clone)]
struct Frame<'a> {
    clause: &'a Clause,
    ip: usize,
    vo: usize,
}

/// Everything one clause execution owns: position in the clause,
/// continuation stack, the argument queue being matched, the stack of
/// queues saved while descending into compounds, the queue being built
/// for the next call, and the proof state.
struct Execution<'a> {
    clause: &'a Clause,
    ip: usize,
    cont: Vec<Frame<'a>>,
    args: VecDeque<Term>,
    stack: Vec<VecDeque<Term>>,
    queue: Vec<Term>,
    state: State,
}

impl Vm {
    pub(crate) fn new(program: Program) -> Self {
        Self {
            program,
            builtins: Builtins::default(),
        }
    }

    pub(crate) fn register_builtin(&mut self, name: impl Into<String>, arity: usize, f: BuiltinFn) {
        self.builtins.register(name, arity, f);
    }

    pub(crate) fn register_default_builtins(&mut self) {
        self.builtins.register_defaults();
    }

    /// Prove a conjunction of goals, starting the variable counter after
    /// the query's own variables. Goals run left to right: the states
    /// proved for one goal seed the next.
    pub(crate) fn solve(&self, goals: &[Goal], query_vars: usize) -> Vec<State> {
        let mut states = vec![State {
            sub: Substitution::new(),
            vo: 0,
            vc: query_vars,
        }];
        for goal in goals {
            let key = Functor::new(goal.functor.clone(), goal.arity());
            let mut next = Vec::new();
            for state in states {
                let args: VecDeque<Term> = goal.args.iter().cloned().collect();
                next.extend(self.arrive(&key, args, Vec::new(), state));
            }
            states = next;
        }
        states
    }

    /// Dispatch a call: look the procedure up and try each of its clauses
    /// in order against the caller's state, concatenating their solutions.
    /// Keys not present in the program are routed to the builtin table;
    /// unregistered keys fail.
    fn arrive<'a>(
        &'a self,
        key: &Functor,
        args: VecDeque<Term>,
        cont: Vec<Frame<'a>>,
        state: State,
    ) -> Vec<State> {
        let Some(procedure) = self.program.get(key) else {
            return self.arrive_builtin(key, args, cont, state);
        };
        let mut solutions = Vec::new();
        for clause in &procedure.clauses {
            let execution = Execution {
                clause,
                ip: 0,
                cont: cont.clone(),
                args: args.clone(),
                stack: Vec::new(),
                queue: Vec::new(),
                state: State {
                    sub: state.sub.clone(),
                    vo: state.vc,
                    vc: state.vc + clause.num_vars,
                },
            };
            solutions.extend(self.execute(execution));
        }
        solutions
    }

    fn arrive_builtin<'a>(
        &'a self,
        key: &Functor,
        args: VecDeque<Term>,
        cont: Vec<Frame<'a>>,
        state: State,
    ) -> Vec<State> {
        let Some(builtin) = self.builtins.get(key) else {
            return Vec::new();
        };
        let args: Vec<Term> = args.into_iter().collect();
        let mut solutions = Vec::new();
        for sub in builtin(&args, &state.sub) {
            let resumed = State {
                sub,
                vo: state.vo,
                vc: state.vc,
            };
            solutions.extend(self.resume(cont.clone(), resumed));
        }
        solutions
    }

    /// Continue after a completed call that had no clause body of its own
    /// to run: pop a pending frame, or yield the state as a solution.
    fn resume<'a>(&'a self, mut cont: Vec<Frame<'a>>, state: State) -> Vec<State> {
        let Some(frame) = cont.pop() else {
            return vec![state];
        };
        self.execute(Execution {
            clause: frame.clause,
            ip: frame.ip,
            cont,
            args: VecDeque::new(),
            stack: Vec::new(),
            queue: Vec::new(),
            state: State {
                sub: state.sub,
                vo: frame.vo,
                vc: state.vc,
            },
        })
    }

    /// Run one clause's bytecode to its end.
    ///
    /// The term-shaped instructions pick their mode by inspecting `args`:
    /// while caller arguments are pending they match (unify against the
    /// front of `args`), afterwards they build (append to `queue` for the
    /// next call).
    fn execute<'a>(&'a self, mut ex: Execution<'a>) -> Vec<State> {
        loop {
            let op = match ex.clause.code.get(ex.ip) {
                Some(op) => *op,
                None => panic!("ran past the end of clause bytecode"),
            };
            ex.ip += 1;
            match op {
                Op::Const(k) => {
                    let term = match xr(ex.clause, k) {
                        XrEntry::Int(n) => Term::Int(*n),
                        XrEntry::Atom(s) => Term::Atom(s.clone()),
                        other => panic!("CONST operand is not a constant: {other}"),
                    };
                    if !step_term(&mut ex, term) {
                        return Vec::new();
                    }
                }
                Op::Var(v) => {
                    let term = Term::Var(ex.state.vo + v as usize);
                    if !step_term(&mut ex, term) {
                        return Vec::new();
                    }
                }
                Op::Functor(k) => {
                    let XrEntry::Functor(functor) = xr(ex.clause, k) else {
                        panic!("FUNCTOR operand is not a functor: {}", xr(ex.clause, k));
                    };
                    // Fresh variables stand in for the compound's
                    // arguments; the following instructions match into
                    // them positionally, and any bindings they establish
                    // are visible through the compound via the
                    // substitution.
                    let fresh: Vec<Term> = (0..functor.arity)
                        .map(|n| Term::Var(ex.state.vc + n))
                        .collect();
                    ex.state.vc += functor.arity;
                    let compound = Term::Compound {
                        functor: functor.name.clone(),
                        args: fresh.clone(),
                    };
                    match ex.args.pop_front() {
                        Some(next) => {
                            let Some(sub) = ex.state.sub.unify(&next, &compound) else {
                                return Vec::new();
                            };
                            ex.state.sub = sub;
                            let outer = std::mem::take(&mut ex.args);
                            ex.stack.push(outer);
                        }
                        None => {
                            ex.queue.push(compound);
                            ex.stack.push(VecDeque::new());
                        }
                    }
                    ex.args = fresh.into();
                }
                Op::Pop => {
                    if !ex.args.is_empty() {
                        panic!("POP with unconsumed compound arguments");
                    }
                    match ex.stack.pop() {
                        Some(saved) => ex.args = saved,
                        None => panic!("POP with empty stack"),
                    }
                }
                Op::Enter => {
                    // Head not fully consumed: the caller supplied more
                    // (or more deeply nested) arguments than the head
                    // pattern matched.
                    if !ex.args.is_empty() || !ex.stack.is_empty() {
                        return Vec::new();
                    }
                }
                Op::Call(k) => {
                    let XrEntry::Proc(procedure) = xr(ex.clause, k) else {
                        panic!("CALL operand is not a procedure: {}", xr(ex.clause, k));
                    };
                    let mut cont = ex.cont;
                    cont.push(Frame {
                        clause: ex.clause,
                        ip: ex.ip,
                        vo: ex.state.vo,
                    });
                    let args: VecDeque<Term> = ex.queue.into();
                    return self.arrive(procedure, args, cont, ex.state);
                }
                Op::Exit => {
                    if ex.ip != ex.clause.code.len() {
                        panic!("EXIT before the end of clause bytecode");
                    }
                    if !ex.args.is_empty() || !ex.stack.is_empty() {
                        return Vec::new();
                    }
                    match ex.cont.pop() {
                        Some(frame) => {
                            ex.clause = frame.clause;
                            ex.ip = frame.ip;
                            ex.state.vo = frame.vo;
                        }
                        None => return vec![ex.state],
                    }
                }
            }
        }
    }
}

fn xr(clause: &Clause, k: u32) -> &XrEntry {
    clause
        .xr
        .get(k as usize)
        .unwrap_or_else(|| panic!("xr index {k} out of range"))
}

/// One dual-mode step for `CONST` and `VAR`: match the term against the
/// next pending argument, or append it to the build queue. Returns false
/// on unification failure.
fn step_term(ex: &mut Execution<'_>, term: Term) -> bool {
    match ex.args.pop_front() {
        Some(next) => match ex.state.sub.unify(&next, &term) {
            Some(sub) => {
                ex.state.sub = sub;
                true
            }
            None => false,
        },
        None => {
            ex.queue.push(term);
            true
        }
    }
}

impl State {
    /// Deeply resolve a query variable under this state's substitution.
    /// An unbound variable resolves to itself.
    pub(crate) fn resolve(&self, var: usize) -> Term {
        self.sub.walk_star(&Term::Var(var))
    }
}
