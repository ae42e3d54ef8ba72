//! Test join evaluation: short-circuiting, narrowing and the unit laws.

use crate::config::EngineConfig;
use crate::dataset::MemoryDataset;
use crate::e2e_tests::helpers::{evaluate, pattern, rows, social_dataset, try_evaluate};
use crate::query::{Algebra, Multiset};
use crate::term::Variable;
use crate::testing::{ProbeDataset, dataset_from};

/// A left side without solutions must keep the right side from touching the
/// dataset at all.
#[test]
fn test_join_empty_left_skips_right() {
    let probe = ProbeDataset::new(social_dataset());

    let result = evaluate(
        &probe,
        &Algebra::join(pattern("?s", "type", "Unicorn"), pattern("?s", "?p", "?o")),
    );

    assert_eq!(result, Multiset::Null);
    let counts = probe.counts();
    assert_eq!(counts.by_predicate_object, 1);
    assert_eq!(counts.all_triples, 0);
    assert_eq!(counts.total(), 1);
}

/// A ground pattern that is absent makes the whole join `Null`.
#[test]
fn test_join_with_absent_ground_pattern() {
    let dataset = social_dataset();

    let result = evaluate(
        &dataset,
        &Algebra::join(pattern("?p", "type", "Person"), pattern("rex", "type", "Person")),
    );
    assert_eq!(result, Multiset::Null);

    let result = evaluate(
        &dataset,
        &Algebra::join(pattern("alice", "type", "Person"), pattern("?p", "knows", "?q")),
    );
    assert_eq!(result, evaluate(&dataset, &pattern("?p", "knows", "?q")));
}

/// `Identity` is the unit of join and `Null` absorbs it.
#[test]
fn test_join_unit_laws() {
    let dataset = social_dataset();
    let people = evaluate(&dataset, &pattern("?p", "type", "Person"));

    assert_eq!(Multiset::Identity.join(&people), people);
    assert_eq!(people.join(&Multiset::Identity), people);
    assert_eq!(people.join(&Multiset::Null), Multiset::Null);
    assert_eq!(Multiset::Null.join(&people), Multiset::Null);
}

/// The right side is looked up once per distinct value of the shared fixed
/// variable, even when the left side repeats values.
#[test]
fn test_join_narrows_once_per_distinct_value() {
    let probe = ProbeDataset::new(social_dataset());
    let people = || {
        Algebra::union(
            pattern("?p", "type", "Person"),
            pattern("?p", "type", "Person"),
        )
    };

    let result = evaluate(
        &probe,
        &Algebra::join(people(), pattern("?p", "email", "?e")),
    );

    assert_eq!(
        rows(&result),
        vec![
            "e=alice-mail p=alice",
            "e=alice-mail p=alice",
            "e=carol-mail p=carol",
            "e=carol-mail p=carol",
        ]
    );
    let counts = probe.counts();
    assert_eq!(counts.by_predicate_object, 2);
    assert_eq!(counts.by_subject_predicate, 3);
    assert_eq!(counts.total(), 5);
}

/// Without full indexing two-term lookups fall back to a single term and the
/// answers do not change.
#[test]
fn test_join_without_full_indexing() {
    let probe = ProbeDataset::new(social_dataset());
    let config = EngineConfig::default().with_full_triple_indexing(false);
    let tree = Algebra::join(pattern("?p", "type", "Person"), pattern("?p", "email", "?e"));

    let result = try_evaluate(&probe, &config, &tree).expect("evaluation succeeds");

    assert_eq!(
        rows(&result),
        vec!["e=alice-mail p=alice", "e=carol-mail p=carol"]
    );
    let counts = probe.counts();
    assert_eq!(counts.by_object, 1);
    assert_eq!(counts.by_subject, 3);
    assert_eq!(counts.by_subject_predicate, 0);
    assert_eq!(counts.by_predicate_object, 0);
}

/// Three-way chains join through every shared variable.
#[test]
fn test_join_chain() {
    let dataset = social_dataset();
    let tree = Algebra::join(
        Algebra::join(pattern("?a", "knows", "?b"), pattern("?b", "knows", "?c")),
        pattern("?c", "knows", "?a"),
    );

    let result = evaluate(&dataset, &tree);

    assert_eq!(
        rows(&result),
        vec![
            "a=alice b=bob c=carol",
            "a=bob b=carol c=alice",
            "a=carol b=alice c=bob",
        ]
    );
}

/// Only bob is a person, but both alice and bob know someone.
fn owners() -> MemoryDataset {
    #[allow(clippy::expect_used)]
    dataset_from(&[
        ("bob", "type", "Person"),
        ("alice", "knows", "x1"),
        ("bob", "knows", "x2"),
    ])
    .expect("valid triples")
}

/// A projection on the right drops `?p`, so every projected row joins with
/// every person.
#[test]
fn test_join_with_projected_right() {
    let dataset = owners();
    let left = pattern("?p", "type", "Person");
    let right = Algebra::project(pattern("?p", "knows", "?y"), vec![Variable::new("y")]);

    let result = evaluate(&dataset, &Algebra::join(left.clone(), right.clone()));

    assert_eq!(rows(&result), vec!["p=bob y=x1", "p=bob y=x2"]);
    let plain = evaluate(&dataset, &left).join(&evaluate(&dataset, &right));
    assert_eq!(rows(&result), rows(&plain));
}

/// A slice on the right cuts the unconstrained result before the join.
#[test]
fn test_join_with_sliced_right() {
    let dataset = owners();
    let left = pattern("?p", "type", "Person");
    let right = Algebra::slice(pattern("?p", "knows", "?y"), 0, Some(1));

    let result = evaluate(&dataset, &Algebra::join(left.clone(), right.clone()));

    assert!(result.is_empty());
    let plain = evaluate(&dataset, &left).join(&evaluate(&dataset, &right));
    assert_eq!(rows(&result), rows(&plain));
}

/// Optional and existence joins see the same unconstrained slice.
#[test]
fn test_optional_and_exists_with_sliced_right() {
    let dataset = owners();
    let right = || Algebra::slice(pattern("?p", "knows", "?y"), 0, Some(1));

    let optional = evaluate(
        &dataset,
        &Algebra::left_join(pattern("?p", "type", "Person"), right(), None),
    );
    assert_eq!(rows(&optional), vec!["p=bob"]);

    let exists = evaluate(
        &dataset,
        &Algebra::exists(pattern("?p", "type", "Person"), right()),
    );
    assert!(exists.is_empty());
}
