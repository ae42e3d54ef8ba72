//! Test extend (BIND) evaluation.

use crate::config::EngineConfig;
use crate::e2e_tests::helpers::{column, evaluate, pattern, social_dataset, try_evaluate};
use crate::query::{Algebra, Assignment, EvaluationError, Expr};
use crate::term::{Literal, Term, Variable};
use crate::testing::{iri, literal};

/// Later assignments see the values bound by earlier ones.
#[test]
fn test_extend_assignments_in_order() {
    let dataset = social_dataset();
    let tree = Algebra::extend(
        pattern("?p", "email", "?e"),
        vec![
            Assignment::new(Variable::new("n"), Expr::constant(Literal::from(1_i64))),
            Assignment::new(
                Variable::new("m"),
                Expr::add(Expr::var("n"), Expr::constant(Literal::from(41_i64))),
            ),
        ],
    )
    .expect("non-empty assignments");

    let result = evaluate(&dataset, &tree);

    assert_eq!(result.len(), 2);
    for solution in result.solutions() {
        assert_eq!(solution.get_by_name("m"), Some(&Term::from(Literal::from(42_i64))));
    }
}

/// A failing expression leaves its variable unbound and keeps the solution.
#[test]
fn test_extend_error_leaves_variable_unbound() {
    let dataset = social_dataset();
    let tree = Algebra::extend(
        pattern("?p", "type", "Person"),
        vec![Assignment::new(
            Variable::new("address"),
            Expr::str(Expr::var("e")),
        )],
    )
    .expect("non-empty assignments");

    let unbound = evaluate(&dataset, &tree);
    assert_eq!(column(&unbound, "address"), vec!["-", "-", "-"]);

    let extended = evaluate(
        &dataset,
        &Algebra::extend(
            Algebra::left_join(
                pattern("?p", "type", "Person"),
                pattern("?p", "email", "?e"),
                None,
            ),
            vec![Assignment::new(
                Variable::new("address"),
                Expr::str(Expr::var("e")),
            )],
        )
        .expect("non-empty assignments"),
    );

    assert_eq!(extended.len(), 3);
    let bound = extended
        .solutions()
        .iter()
        .filter(|s| s.has_name("address"))
        .count();
    assert_eq!(bound, 2);
    assert!(extended.variables().contains("address"));
}

/// `str` of an IRI gives its text as a plain literal.
#[test]
fn test_extend_str_of_iri() {
    let dataset = social_dataset();
    let tree = Algebra::extend(
        pattern("alice", "email", "?e"),
        vec![Assignment::new(Variable::new("text"), Expr::str(Expr::var("e")))],
    )
    .expect("non-empty assignments");

    let result = evaluate(&dataset, &tree);

    assert_eq!(
        result.solutions()[0].get_by_name("text"),
        Some(&literal("http://example.org/alice-mail"))
    );
}

/// Binding a variable to the value it already has is allowed; binding it to
/// a different value is an error naming the variable and solution.
#[test]
fn test_extend_rebinding() {
    let dataset = social_dataset();
    let config = EngineConfig::default();

    let same = Algebra::extend(
        pattern("?p", "type", "Dog"),
        vec![Assignment::new(Variable::new("p"), Expr::constant(iri("rex")))],
    )
    .expect("non-empty assignments");
    assert_eq!(
        try_evaluate(&dataset, &config, &same)
            .expect("same value is allowed")
            .len(),
        1
    );

    let different = Algebra::extend(
        pattern("?p", "type", "Dog"),
        vec![Assignment::new(Variable::new("p"), Expr::constant(iri("alice")))],
    )
    .expect("non-empty assignments");
    let error = try_evaluate(&dataset, &config, &different).expect_err("rebinding fails");
    assert_eq!(
        error,
        EvaluationError::Rebinding {
            variable: "p".to_owned(),
            solution_index: 0,
        }
    );
}

/// An extend without assignments cannot be built.
#[test]
fn test_extend_requires_assignments() {
    assert!(Algebra::extend(pattern("?p", "type", "Dog"), Vec::new()).is_err());
}
