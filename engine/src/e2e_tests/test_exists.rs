//! Test EXISTS / NOT EXISTS filtering.

use crate::e2e_tests::helpers::{column, evaluate, pattern, social_dataset};
use crate::query::{Algebra, Expr, Multiset};
use crate::testing::{ProbeDataset, iri};

/// EXISTS and NOT EXISTS over the same sides split the left solutions in two.
#[test]
fn test_exists_partitions_left() {
    let dataset = social_dataset();
    let left = || pattern("?p", "type", "Person");
    let right = || pattern("?p", "email", "?e");

    let all = evaluate(&dataset, &left());
    let with = evaluate(&dataset, &Algebra::exists(left(), right()));
    let without = evaluate(&dataset, &Algebra::not_exists(left(), right()));

    assert_eq!(with.len() + without.len(), all.len());
    assert_eq!(column(&with, "p"), vec!["alice", "carol"]);
    assert_eq!(column(&without, "p"), vec!["bob"]);

    assert_eq!(column(&with.union(&without), "p"), column(&all, "p"));
}

/// The right side only filters: its variables never reach the output.
#[test]
fn test_exists_does_not_bind() {
    let dataset = social_dataset();

    let result = evaluate(
        &dataset,
        &Algebra::exists(pattern("?p", "type", "Person"), pattern("?p", "email", "?e")),
    );

    let left = evaluate(&dataset, &pattern("?p", "type", "Person"));
    assert_eq!(result.variables(), left.variables());
    assert!(result.solutions().iter().all(|s| !s.has_name("e")));
}

/// The right side is evaluated against the left bindings.
#[test]
fn test_exists_with_filtered_right() {
    let dataset = social_dataset();

    let result = evaluate(
        &dataset,
        &Algebra::exists(
            pattern("?p", "type", "Person"),
            Algebra::filter(
                pattern("?p", "knows", "?q"),
                Expr::equal(Expr::var("q"), Expr::constant(iri("bob"))),
            ),
        ),
    );

    assert_eq!(column(&result, "p"), vec!["alice"]);
}

/// An empty left side gives `Null` and the right side is never evaluated.
#[test]
fn test_not_exists_empty_left() {
    let probe = ProbeDataset::new(social_dataset());

    let result = evaluate(
        &probe,
        &Algebra::not_exists(pattern("?p", "type", "Unicorn"), pattern("?p", "?x", "?y")),
    );

    assert_eq!(result, Multiset::Null);
    assert_eq!(probe.counts().all_triples, 0);
}
