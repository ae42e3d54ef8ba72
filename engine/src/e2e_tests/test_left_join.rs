//! Test optional joins (left join semantics).

use std::sync::Arc;

use crate::e2e_tests::helpers::{column, evaluate, pattern, social_dataset};
use crate::query::{Algebra, Expr, Multiset};
use crate::testing::{ProbeDataset, iri};

/// Every person is kept; only those with an email gain `?e`.
#[test]
fn test_left_join_keeps_every_left_solution() {
    let dataset = social_dataset();

    let result = evaluate(
        &dataset,
        &Algebra::left_join(
            pattern("?p", "type", "Person"),
            pattern("?p", "email", "?e"),
            None,
        ),
    );

    assert_eq!(result.len(), 3);
    assert_eq!(column(&result, "p"), vec!["alice", "bob", "carol"]);
    assert_eq!(column(&result, "e"), vec!["-", "alice-mail", "carol-mail"]);
}

/// Merged solutions rejected by the filter fall back to the left solution.
#[test]
fn test_left_join_filter() {
    let dataset = social_dataset();

    let result = evaluate(
        &dataset,
        &Algebra::left_join(
            pattern("?p", "type", "Person"),
            pattern("?p", "email", "?e"),
            Some(Arc::new(Expr::equal(
                Expr::var("e"),
                Expr::constant(iri("carol-mail")),
            ))),
        ),
    );

    assert_eq!(result.len(), 3);
    assert_eq!(column(&result, "e"), vec!["-", "-", "carol-mail"]);
}

/// A filter that errors for a solution rejects that merge.
#[test]
fn test_left_join_filter_error_rejects() {
    let dataset = social_dataset();

    let result = evaluate(
        &dataset,
        &Algebra::left_join(
            pattern("?p", "type", "Person"),
            pattern("?p", "email", "?e"),
            Some(Arc::new(Expr::var("unbound"))),
        ),
    );

    assert_eq!(column(&result, "e"), vec!["-", "-", "-"]);
}

/// When the sides share a variable the right side is narrowed on the left's
/// bindings; when they do not, it is evaluated once from scratch.
#[test]
fn test_left_join_linearization() {
    let probe = ProbeDataset::new(social_dataset());
    let shared = evaluate(
        &probe,
        &Algebra::left_join(
            pattern("?p", "type", "Person"),
            pattern("?p", "email", "?e"),
            None,
        ),
    );
    assert_eq!(shared.len(), 3);
    assert_eq!(probe.counts().by_subject_predicate, 3);

    probe.reset();
    let disjoint = evaluate(
        &probe,
        &Algebra::left_join(
            pattern("?p", "type", "Person"),
            pattern("?x", "email", "?e"),
            None,
        ),
    );
    assert_eq!(disjoint.len(), 6);
    assert_eq!(probe.counts().by_predicate, 1);
    assert_eq!(probe.counts().by_subject_predicate, 0);
}

/// An empty left side gives `Null` without evaluating the right side.
#[test]
fn test_left_join_empty_left() {
    let probe = ProbeDataset::new(social_dataset());

    let result = evaluate(
        &probe,
        &Algebra::left_join(
            pattern("?p", "type", "Unicorn"),
            pattern("?p", "email", "?e"),
            None,
        ),
    );

    assert_eq!(result, Multiset::Null);
    assert_eq!(probe.counts().total(), 1);
}

/// Optional values float: they are declared but not fixed.
#[test]
fn test_left_join_variables() {
    let dataset = social_dataset();

    let result = evaluate(
        &dataset,
        &Algebra::left_join(
            pattern("?p", "type", "Person"),
            pattern("?p", "email", "?e"),
            None,
        ),
    );

    assert!(result.fixed_variables().contains("p"));
    assert!(result.floating_variables().contains("e"));
}
