//! Matching one triple pattern against the dataset.
//!
//! The matcher picks an index path from the positions it knows, asks the
//! dataset for candidates and keeps the candidates that pass the acceptance
//! filter:
//!
//! 1. Constant positions are known from the pattern itself.
//! 2. Variables fixed in the input multiset are narrowed: for every distinct
//!    tuple of their bound values one lookup is issued with those values as
//!    extra known positions.
//! 3. Every candidate must carry each known term at its position, and the
//!    same term at every position of a repeated variable.
//! 4. Accepted triples become solutions that bind each pattern variable once.
//!
//! A pattern without variables is answered with a single containment test.

use std::collections::HashSet;

use tracing::trace;

use super::context::EvaluationContext;
use super::error::EvaluationError;
use super::multiset::Multiset;
use super::pattern::{IndexPath, TriplePattern};
use super::solution::Solution;
use crate::dataset::{Dataset, TripleIter};
use crate::term::{Position, Term, Triple};

/// The term known at each position for one lookup.
type KnownTerms = [Option<Term>; 3];

/// Evaluate a triple pattern against the context's dataset and input.
///
/// # Errors
///
/// Returns an error if the dataset fails or returns a triple that does not
/// fit the lookup it was asked for.
pub fn match_pattern(
    pattern: &TriplePattern,
    ctx: &EvaluationContext<'_>,
) -> Result<Multiset, EvaluationError> {
    let dataset = ctx.dataset();

    if pattern.is_ground() {
        return match_ground(pattern, dataset);
    }

    let constants: KnownTerms =
        Position::ALL.map(|position| pattern.get(position).as_constant().cloned());

    let input = ctx.input();
    let fixed = input.fixed_variables();
    let narrowed: Vec<&String> = pattern
        .occurrences()
        .keys()
        .filter(|name| fixed.contains(*name))
        .collect();

    let mut solutions = Vec::new();

    if narrowed.is_empty() {
        let path = pattern.index_path().effective(ctx.config().full_triple_indexing);
        collect_matches(pattern, dataset, path, &constants, &mut solutions)?;
    } else {
        let mut seen: HashSet<Vec<&Term>> = HashSet::new();
        for input_solution in input.solutions() {
            let tuple: Option<Vec<&Term>> = narrowed
                .iter()
                .map(|name| input_solution.get_by_name(name))
                .collect();
            let Some(tuple) = tuple else { continue };
            if !seen.insert(tuple.clone()) {
                continue;
            }

            let mut known = constants.clone();
            for (name, term) in narrowed.iter().zip(&tuple) {
                for position in &pattern.occurrences()[*name] {
                    known[position.index()] = Some((*term).clone());
                }
            }
            let path = path_for(&known).effective(ctx.config().full_triple_indexing);
            collect_matches(pattern, dataset, path, &known, &mut solutions)?;
        }
        trace!(
            variables = ?narrowed,
            lookups = seen.len(),
            "narrowed pattern on input bindings"
        );
    }

    Ok(Multiset::from_solutions(pattern.variables(), solutions))
}

fn match_ground(
    pattern: &TriplePattern,
    dataset: &dyn Dataset,
) -> Result<Multiset, EvaluationError> {
    let terms = Position::ALL.map(|position| pattern.get(position).as_constant());
    let [Some(s), Some(p), Some(o)] = terms else {
        return Ok(Multiset::Null);
    };
    let Ok(triple) = Triple::new(s.clone(), p.clone(), o.clone()) else {
        return Ok(Multiset::Null);
    };
    trace!(path = %IndexPath::Contains, "dataset lookup");
    if dataset.contains(&triple)? {
        Ok(Multiset::Identity)
    } else {
        Ok(Multiset::Null)
    }
}

fn path_for(known: &KnownTerms) -> IndexPath {
    IndexPath::for_bound(known[0].is_some(), known[1].is_some(), known[2].is_some())
}

/// Run one lookup and append the accepted solutions.
fn collect_matches(
    pattern: &TriplePattern,
    dataset: &dyn Dataset,
    path: IndexPath,
    known: &KnownTerms,
    out: &mut Vec<Solution>,
) -> Result<(), EvaluationError> {
    trace!(path = %path, "dataset lookup");
    for triple in lookup(dataset, path, known)? {
        check_contract(path, known, &triple)?;
        if accepts(pattern, known, &triple) {
            out.push(project(pattern, &triple));
        }
    }
    Ok(())
}

fn lookup<'d>(
    dataset: &'d dyn Dataset,
    path: IndexPath,
    known: &KnownTerms,
) -> Result<TripleIter<'d>, EvaluationError> {
    let key = |position: Position| known[position.index()].as_ref();
    let iter: TripleIter<'d> = match (
        path,
        key(Position::Subject),
        key(Position::Predicate),
        key(Position::Object),
    ) {
        (IndexPath::BySubject, Some(s), _, _) => dataset.triples_with_subject(s)?,
        (IndexPath::ByPredicate, _, Some(p), _) => dataset.triples_with_predicate(p)?,
        (IndexPath::ByObject, _, _, Some(o)) => dataset.triples_with_object(o)?,
        (IndexPath::BySubjectPredicate, Some(s), Some(p), _) => {
            dataset.triples_with_subject_predicate(s, p)?
        }
        (IndexPath::BySubjectObject, Some(s), _, Some(o)) => {
            dataset.triples_with_subject_object(s, o)?
        }
        (IndexPath::ByPredicateObject, _, Some(p), Some(o)) => {
            dataset.triples_with_predicate_object(p, o)?
        }
        (IndexPath::Contains, Some(s), Some(p), Some(o)) => {
            // A literal subject or non-IRI predicate can never be stored.
            match Triple::new(s.clone(), p.clone(), o.clone()) {
                Ok(triple) => {
                    if dataset.contains(&triple)? {
                        Box::new(std::iter::once(triple))
                    } else {
                        Box::new(std::iter::empty())
                    }
                }
                Err(_) => Box::new(std::iter::empty()),
            }
        }
        _ => dataset.all_triples()?,
    };
    Ok(iter)
}

/// A keyed lookup must only return triples carrying the key.
fn check_contract(
    path: IndexPath,
    known: &KnownTerms,
    triple: &Triple,
) -> Result<(), EvaluationError> {
    for &position in path.key_positions() {
        if let Some(expected) = &known[position.index()] {
            if triple.get(position) != expected {
                return Err(EvaluationError::DatasetContract {
                    path,
                    expectation: format!("{position} {expected}, got triple {triple}"),
                });
            }
        }
    }
    Ok(())
}

fn accepts(pattern: &TriplePattern, known: &KnownTerms, triple: &Triple) -> bool {
    let known_ok = Position::ALL.iter().all(|&position| {
        known[position.index()]
            .as_ref()
            .is_none_or(|term| triple.get(position) == term)
    });
    known_ok
        && pattern.occurrences().values().all(|positions| {
            let first = triple.get(positions[0]);
            positions[1..].iter().all(|&p| triple.get(p) == first)
        })
}

fn project(pattern: &TriplePattern, triple: &Triple) -> Solution {
    pattern
        .occurrences()
        .iter()
        .map(|(name, positions)| (name.clone(), triple.get(positions[0]).clone()))
        .collect()
}
