//! Test the canonical text form of algebra trees.

use std::sync::Arc;

use crate::e2e_tests::helpers::{pattern, triple};
use crate::query::{Algebra, AlgebraError, Assignment, Expr, PrefixFormatter};
use crate::term::Variable;
use crate::testing::{EXAMPLE_NAMESPACE, iri, literal};

fn example_prefixes() -> PrefixFormatter {
    PrefixFormatter::new().with_prefix("ex", EXAMPLE_NAMESPACE)
}

fn people_query() -> Algebra {
    Algebra::slice(
        Algebra::distinct(Algebra::project(
            Algebra::filter(
                Algebra::left_join(
                    Algebra::bgp(vec![triple("?p", "type", "Person")]),
                    pattern("?p", "email", "?e"),
                    Some(Arc::new(Expr::bound("e"))),
                ),
                Expr::not(Expr::equal(Expr::var("p"), Expr::constant(iri("bob")))),
            ),
            vec![Variable::new("p"), Variable::new("e")],
        )),
        0,
        Some(10),
    )
}

#[test]
fn test_render_with_prefixes() {
    assert_eq!(
        people_query().render(&example_prefixes()),
        "(slice 0 10 (distinct (project (?p ?e) (filter (! (= ?p ex:bob)) \
         (leftjoin (bgp (triple ?p ex:type ex:Person)) (triple ?p ex:email ?e) (bound ?e))))))"
    );
}

#[test]
fn test_display_uses_ntriples() {
    assert_eq!(
        pattern("?s", "knows", "?o").to_string(),
        "(triple ?s <http://example.org/knows> ?o)"
    );
}

#[test]
fn test_render_binary_operators() {
    let formatter = example_prefixes();
    let tree = Algebra::minus(
        Algebra::union(
            Algebra::join(pattern("?a", "knows", "?b"), pattern("?b", "knows", "?c")),
            Algebra::exists(pattern("?a", "type", "Person"), pattern("?a", "email", "?m")),
        ),
        Algebra::not_exists(pattern("?a", "type", "Dog"), pattern("?a", "knows", "?z")),
    );

    assert_eq!(
        tree.render(&formatter),
        "(minus (union (join (triple ?a ex:knows ?b) (triple ?b ex:knows ?c)) \
         (exists (triple ?a ex:type ex:Person) (triple ?a ex:email ?m))) \
         (notexists (triple ?a ex:type ex:Dog) (triple ?a ex:knows ?z)))"
    );
}

#[test]
fn test_render_extend_and_open_slice() {
    let tree = Algebra::slice(
        Algebra::extend(
            pattern("?p", "type", "Person"),
            vec![
                Assignment::new(Variable::new("label"), Expr::constant(literal("person"))),
                Assignment::new(Variable::new("text"), Expr::str(Expr::var("p"))),
            ],
        )
        .expect("non-empty assignments"),
        5,
        None,
    );

    assert_eq!(
        tree.render(&example_prefixes()),
        "(slice 5 _ (extend ((?label \"person\") (?text (str ?p))) (triple ?p ex:type ex:Person)))"
    );
}

/// Rendering is stable across rebuilding a tree from its own children.
#[test]
fn test_copy_with_children_preserves_rendering() {
    let original = people_query();
    let children = original.children().into_iter().cloned().collect();

    let copy = original
        .copy_with_children(children)
        .expect("same number of children");

    assert_eq!(copy.to_string(), original.to_string());
}

#[test]
fn test_copy_with_wrong_child_count() {
    let join = Algebra::join(pattern("?a", "knows", "?b"), pattern("?b", "knows", "?c"));

    let error = join
        .copy_with_children(vec![pattern("?a", "knows", "?b")])
        .expect_err("join needs two children");

    assert_eq!(
        error,
        AlgebraError::ChildCount {
            operator: "join",
            expected: 2,
            actual: 1,
        }
    );
    assert_eq!(error.to_string(), "join takes 2 children but 1 were given");
}
