use hornlog::{parse_query, parse_rules, Goal, Rule, Term};
use pretty_assertions::assert_eq;

#[test]
fn parses_facts_and_rules() {
    let rules = parse_rules(
        "append(nil, L, L).
         append(cons(X, L1), L2, cons(X, L3)) :- append(L1, L2, L3).",
    )
    .unwrap();

    assert_eq!(
        rules[0],
        Rule {
            head: Goal::new("append", vec![Term::nil(), Term::Var(0), Term::Var(0)]),
            body: vec![],
        }
    );
    assert_eq!(
        rules[1],
        Rule {
            head: Goal::new(
                "append",
                vec![
                    Term::compound("cons", vec![Term::Var(0), Term::Var(1)]),
                    Term::Var(2),
                    Term::compound("cons", vec![Term::Var(0), Term::Var(3)]),
                ],
            ),
            body: vec![Goal::new(
                "append",
                vec![Term::Var(1), Term::Var(2), Term::Var(3)],
            )],
        }
    );
}

#[test]
fn variables_are_numbered_per_clause() {
    let rules = parse_rules(
        "p(X, Y).
         q(Y, X).",
    )
    .unwrap();
    // Both clauses start over at 0, in order of first occurrence.
    assert_eq!(rules[0].head.args, vec![Term::Var(0), Term::Var(1)]);
    assert_eq!(rules[1].head.args, vec![Term::Var(0), Term::Var(1)]);
}

#[test]
fn parses_zero_arity_goals() {
    let rules = parse_rules("halt. p :- halt.").unwrap();
    assert_eq!(rules[0].head, Goal::new("halt", vec![]));
    assert_eq!(rules[1].body, vec![Goal::new("halt", vec![])]);
}

#[test]
fn parses_integers() {
    let rules = parse_rules("p(0, 42, -5).").unwrap();
    assert_eq!(
        rules[0].head.args,
        vec![Term::Int(0), Term::Int(42), Term::Int(-5)],
    );
}

#[test]
fn list_sugar_desugars_to_cons() {
    let rules = parse_rules("p([a, b | T]). q([]). r([1]).").unwrap();

    assert_eq!(
        rules[0].head.args[0],
        Term::compound(
            "cons",
            vec![
                Term::atom("a"),
                Term::compound("cons", vec![Term::atom("b"), Term::Var(0)]),
            ],
        )
    );
    assert_eq!(rules[1].head.args[0], Term::nil());
    assert_eq!(rules[2].head.args[0], Term::list([Term::Int(1)]));
}

#[test]
fn bare_underscore_is_an_atom() {
    let rules = parse_rules("p(_, _).").unwrap();
    assert_eq!(
        rules[0].head.args,
        vec![Term::atom("_"), Term::atom("_")],
    );
}

#[test]
fn underscore_prefixed_names_are_variables() {
    let rules = parse_rules("p(_X, _X, Y).").unwrap();
    assert_eq!(
        rules[0].head.args,
        vec![Term::Var(0), Term::Var(0), Term::Var(1)],
    );
}

#[test]
fn comments_are_skipped() {
    let rules = parse_rules(
        "% a program
         p(a). % trailing
         % q(b).
         r(c).",
    )
    .unwrap();
    assert_eq!(rules.len(), 2);
    assert_eq!(rules[1].head, Goal::new("r", vec![Term::atom("c")]));
}

#[test]
fn parses_infix_builtin_goals() {
    let rules = parse_rules("inc(X, Y) :- Y is plus(X, 1).").unwrap();
    assert_eq!(
        rules[0].body,
        vec![Goal::new(
            "is",
            vec![
                Term::Var(1),
                Term::compound("plus", vec![Term::Var(0), Term::Int(1)]),
            ],
        )]
    );

    let rules = parse_rules("set(X) :- X := 3.").unwrap();
    assert_eq!(
        rules[0].body,
        vec![Goal::new(":=", vec![Term::Var(0), Term::Int(3)])]
    );
}

#[test]
fn query_variables_are_shared_across_goals() {
    let (goals, vars) = parse_query("p(X), q(X, Y)").unwrap();
    assert_eq!(goals.len(), 2);
    assert_eq!(goals[0].args, vec![Term::Var(0)]);
    assert_eq!(goals[1].args, vec![Term::Var(0), Term::Var(1)]);
    assert_eq!(vars.len(), 2);
    assert_eq!(vars["X"], 0);
    assert_eq!(vars["Y"], 1);
}

#[test]
fn query_prefix_and_terminator_are_optional() {
    let bare = parse_query("p(X)").unwrap();
    let dotted = parse_query("p(X).").unwrap();
    let prefixed = parse_query("?- p(X).").unwrap();
    assert_eq!(bare.0, dotted.0);
    assert_eq!(bare.0, prefixed.0);
}

#[test]
fn missing_dot_is_an_error() {
    let err = parse_rules("p(a)").unwrap_err();
    assert!(err.to_string().contains("expected `.`"));
}

#[test]
fn unclosed_arguments_are_an_error() {
    let err = parse_rules("p(a.").unwrap_err();
    assert!(err.to_string().contains("expected `)`"));
}

#[test]
fn non_callable_goal_is_an_error() {
    let err = parse_rules("p :- 5.").unwrap_err();
    assert!(err.to_string().contains("expected a callable goal"));
}

#[test]
fn unrecognized_character_is_an_error() {
    let err = parse_rules("p(@).").unwrap_err();
    assert!(err.to_string().contains("unrecognized token"));
}

#[test]
fn errors_point_at_the_offending_line() {
    let err = parse_rules(
        "p(a).
q(b,).",
    )
    .unwrap_err();
    let rendered = err.to_string();
    assert!(rendered.contains("line 2"), "got: {rendered}");
    assert!(rendered.contains("q(b,)."), "got: {rendered}");
}

#[test]
fn trailing_garbage_after_query_is_an_error() {
    let err = parse_query("p(X). q(Y)").unwrap_err();
    assert!(err.to_string().contains("expected end of query"));
}
