use hornlog::{Bindings, Engine, Program, Term};
use pretty_assertions::assert_eq;

const APPEND: &str = "
    append(nil, L, L).
    append(cons(X, L1), L2, cons(X, L3)) :- append(L1, L2, L3).";

fn atoms(names: &[&str]) -> Term {
    Term::list(names.iter().map(|n| Term::atom(*n)))
}

#[test]
fn append_ground_forward() {
    let engine = Engine::load(APPEND).unwrap();
    let solutions = engine
        .interpret("append(cons(a, cons(b, nil)), cons(c, nil), L)")
        .unwrap();

    assert_eq!(solutions.len(), 1);
    assert_eq!(solutions[0]["L"], atoms(&["a", "b", "c"]));
}

#[test]
fn append_split_enumerates_in_order() {
    let engine = Engine::load(APPEND).unwrap();
    let solutions = engine
        .interpret("append(L, X, cons(a, cons(b, cons(c, nil))))")
        .unwrap();

    let expected: Vec<(Term, Term)> = vec![
        (atoms(&[]), atoms(&["a", "b", "c"])),
        (atoms(&["a"]), atoms(&["b", "c"])),
        (atoms(&["a", "b"]), atoms(&["c"])),
        (atoms(&["a", "b", "c"]), atoms(&[])),
    ];
    let got: Vec<(Term, Term)> = solutions
        .iter()
        .map(|s| (s["L"].clone(), s["X"].clone()))
        .collect();
    assert_eq!(got, expected);
}

#[test]
fn append_no_solution() {
    let engine = Engine::load(APPEND).unwrap();
    let solutions = engine
        .interpret("append(cons(a, nil), cons(b, nil), cons(x, nil))")
        .unwrap();
    assert_eq!(solutions, Vec::<Bindings>::new());
}

#[test]
fn append_with_list_sugar() {
    let engine = Engine::load(APPEND).unwrap();
    let solutions = engine.interpret("append(L, X, [a, b, c])").unwrap();
    assert_eq!(solutions.len(), 4);
    assert_eq!(solutions[1]["L"], atoms(&["a"]));
    assert_eq!(solutions[1]["X"], atoms(&["b", "c"]));
}

#[test]
fn solution_order_follows_clause_order() {
    let engine = Engine::load(
        "likes(mary, wine).
         likes(john, beer).
         likes(john, wine).",
    )
    .unwrap();
    let solutions = engine.interpret("likes(X, wine)").unwrap();
    let got: Vec<Term> = solutions.iter().map(|s| s["X"].clone()).collect();
    assert_eq!(got, vec![Term::atom("mary"), Term::atom("john")]);
}

#[test]
fn ground_query_yields_one_empty_binding_set() {
    let engine = Engine::load("likes(mary, wine).").unwrap();
    let solutions = engine.interpret("likes(mary, wine)").unwrap();
    assert_eq!(solutions, vec![Bindings::new()]);
}

#[test]
fn interpret_is_deterministic() {
    let engine = Engine::load(APPEND).unwrap();
    let first = engine.interpret("append(L, X, [a, b, c])").unwrap();
    let second = engine.interpret("append(L, X, [a, b, c])").unwrap();
    assert_eq!(first, second);
}

#[test]
fn conjunctive_query_threads_bindings() {
    let engine = Engine::load(
        "parent(tom, bob).
         parent(bob, ann).",
    )
    .unwrap();
    let solutions = engine.interpret("parent(tom, X), parent(X, Y)").unwrap();
    assert_eq!(solutions.len(), 1);
    assert_eq!(solutions[0]["X"], Term::atom("bob"));
    assert_eq!(solutions[0]["Y"], Term::atom("ann"));
}

#[test]
fn conjunctive_query_fails_when_any_goal_fails() {
    let engine = Engine::load(
        "parent(tom, bob).
         parent(bob, ann).",
    )
    .unwrap();
    let solutions = engine.interpret("parent(tom, X), parent(ann, X)").unwrap();
    assert!(solutions.is_empty());
}

// Two invocations of the same clause must see distinct fresh variables:
// the nesting below only comes out right when each call is renamed apart.
#[test]
fn recursive_invocations_are_renamed_apart() {
    let engine = Engine::load("dup(X, f(X)).").unwrap();
    let solutions = engine.interpret("dup(A, B), dup(B, C)").unwrap();
    assert_eq!(solutions.len(), 1);

    let Term::Var(a) = solutions[0]["A"] else {
        panic!("A should stay unbound, got {}", solutions[0]["A"]);
    };
    assert_eq!(
        solutions[0]["B"],
        Term::compound("f", vec![Term::Var(a)]),
    );
    assert_eq!(
        solutions[0]["C"],
        Term::compound("f", vec![Term::compound("f", vec![Term::Var(a)])]),
    );
}

#[test]
fn occurs_check_rejects_cyclic_proof() {
    let engine = Engine::load("eq(X, X).").unwrap();
    let solutions = engine.interpret("eq(Y, f(Y))").unwrap();
    assert!(solutions.is_empty());
}

#[test]
fn unbound_query_variable_resolves_to_itself() {
    let engine = Engine::load("any(X).").unwrap();
    let solutions = engine.interpret("any(Z)").unwrap();
    assert_eq!(solutions.len(), 1);
    assert!(matches!(solutions[0]["Z"], Term::Var(_)));
}

#[test]
fn partial_answer_shares_variables() {
    let engine = Engine::load(APPEND).unwrap();
    let solutions = engine.interpret("append(cons(a, nil), Y, Z)").unwrap();
    assert_eq!(solutions.len(), 1);

    // Z = cons(a, Y'): whatever variable stands for Y must be the same
    // one inside Z.
    let y = solutions[0]["Y"].clone();
    assert!(matches!(y, Term::Var(_)));
    assert_eq!(
        solutions[0]["Z"],
        Term::compound("cons", vec![Term::atom("a"), y]),
    );
}

// --- built-ins -----------------------------------------------------------

#[test]
fn unknown_procedure_fails_in_strict_mode() {
    let engine = Engine::new(Program::new());
    assert!(engine.interpret("foo(a)").unwrap().is_empty());
    assert!(engine.interpret("X is 1").unwrap().is_empty());
}

#[test]
fn is_evaluates_arithmetic() {
    let engine = Engine::load_with_builtins("inc(X, Y) :- Y is plus(X, 1).").unwrap();
    let solutions = engine.interpret("inc(41, N)").unwrap();
    assert_eq!(solutions.len(), 1);
    assert_eq!(solutions[0]["N"], Term::Int(42));
}

#[test]
fn is_evaluates_nested_expressions() {
    let engine = Engine::load_with_builtins(
        "calc(X) :- X is plus(times(2, 3), minus(10, div(9, 3))).",
    )
    .unwrap();
    let solutions = engine.interpret("calc(X)").unwrap();
    assert_eq!(solutions[0]["X"], Term::Int(13));
}

#[test]
fn assign_is_an_alias_for_is() {
    let engine = Engine::load_with_builtins("double(X, Y) :- Y := times(X, 2).").unwrap();
    let solutions = engine.interpret("double(5, N)").unwrap();
    assert_eq!(solutions[0]["N"], Term::Int(10));
}

#[test]
fn is_checks_ground_results() {
    let engine = Engine::with_builtins(Program::new());
    assert_eq!(engine.interpret("3 is plus(1, 2)").unwrap().len(), 1);
    assert!(engine.interpret("4 is plus(1, 2)").unwrap().is_empty());
}

#[test]
fn is_fails_on_unbound_or_nonnumeric_operands() {
    let engine = Engine::with_builtins(Program::new());
    assert!(engine.interpret("X is plus(Y, 1)").unwrap().is_empty());
    assert!(engine.interpret("X is plus(a, 1)").unwrap().is_empty());
}

#[test]
fn division_by_zero_fails() {
    let engine = Engine::load_with_builtins("bad(X) :- X is div(1, 0).").unwrap();
    assert!(engine.interpret("bad(X)").unwrap().is_empty());
}

#[test]
fn isplus_solves_for_any_position() {
    let engine = Engine::with_builtins(Program::new());

    let z = engine.interpret("isplus(2, 3, Z)").unwrap();
    assert_eq!(z[0]["Z"], Term::Int(5));

    let y = engine.interpret("isplus(2, Y, 5)").unwrap();
    assert_eq!(y[0]["Y"], Term::Int(3));

    let x = engine.interpret("isplus(X, 3, 5)").unwrap();
    assert_eq!(x[0]["X"], Term::Int(2));

    assert!(engine.interpret("isplus(X, Y, 5)").unwrap().is_empty());
}

#[test]
fn registered_builtin_is_called() {
    let mut engine = Engine::new(Program::new());
    engine.register_builtin("zero", 1, |args, sub| {
        sub.unify(&args[0], &Term::Int(0)).into_iter().collect()
    });

    let solutions = engine.interpret("zero(X)").unwrap();
    assert_eq!(solutions.len(), 1);
    assert_eq!(solutions[0]["X"], Term::Int(0));
}

#[test]
fn builtin_solutions_resume_the_continuation() {
    // The builtin's bindings must be visible to the goals that follow it
    // in the calling clause's body.
    let engine = Engine::load_with_builtins(
        "step(X, Z) :- Y is plus(X, 1), Z is plus(Y, 1).",
    )
    .unwrap();
    let solutions = engine.interpret("step(0, Z)").unwrap();
    assert_eq!(solutions[0]["Z"], Term::Int(2));
}

// --- errors --------------------------------------------------------------

#[test]
fn malformed_program_is_a_parse_error() {
    let err = Engine::load("p(.").unwrap_err();
    assert!(err.to_string().contains("Parse error"));
}

#[test]
fn malformed_query_is_a_parse_error() {
    let engine = Engine::load(APPEND).unwrap();
    let err = engine.interpret("append(").unwrap_err();
    assert!(err.to_string().contains("expected a term"));
}
