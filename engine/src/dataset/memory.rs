//! In-memory dataset with one index per lookup shape.
//!
//! Triples are stored once in insertion order; each index maps a key to the
//! list of slots holding matching triples:
//!
//! - Subject, predicate and object indexes: `term -> [slot]`
//! - Subject-predicate, subject-object and predicate-object indexes:
//!   `(term, term) -> [slot]`
//! - Primary index: `triple -> slot`, used for containment and deduplication
//!
//! The dataset has set semantics: inserting a triple twice keeps one copy.

use std::collections::HashMap;

use super::{Dataset, DatasetError, TripleIter};
use crate::term::{Term, Triple};

type SingleIndex = HashMap<Term, Vec<usize>>;
type PairIndex = HashMap<(Term, Term), Vec<usize>>;

/// An in-memory, fully indexed triple set.
#[derive(Debug, Default)]
pub struct MemoryDataset {
    triples: Vec<Triple>,
    primary: HashMap<Triple, usize>,
    by_subject: SingleIndex,
    by_predicate: SingleIndex,
    by_object: SingleIndex,
    by_subject_predicate: PairIndex,
    by_subject_object: PairIndex,
    by_predicate_object: PairIndex,
}

impl MemoryDataset {
    /// Create an empty dataset.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a triple.
    ///
    /// Returns `false` if the triple was already present.
    pub fn insert(&mut self, triple: Triple) -> bool {
        if self.primary.contains_key(&triple) {
            return false;
        }
        let slot = self.triples.len();
        let s = triple.subject().clone();
        let p = triple.predicate().clone();
        let o = triple.object().clone();

        self.by_subject.entry(s.clone()).or_default().push(slot);
        self.by_predicate.entry(p.clone()).or_default().push(slot);
        self.by_object.entry(o.clone()).or_default().push(slot);
        self.by_subject_predicate
            .entry((s.clone(), p.clone()))
            .or_default()
            .push(slot);
        self.by_subject_object
            .entry((s, o.clone()))
            .or_default()
            .push(slot);
        self.by_predicate_object
            .entry((p, o))
            .or_default()
            .push(slot);

        self.primary.insert(triple.clone(), slot);
        self.triples.push(triple);
        true
    }

    /// Build a triple from terms and insert it.
    ///
    /// # Errors
    ///
    /// Returns an error if the terms do not form a valid triple.
    pub fn insert_terms(
        &mut self,
        subject: impl Into<Term>,
        predicate: impl Into<Term>,
        object: impl Into<Term>,
    ) -> Result<bool, DatasetError> {
        let triple = Triple::new(subject, predicate, object)?;
        Ok(self.insert(triple))
    }

    /// Get the number of triples.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.triples.len()
    }

    /// Check if the dataset holds no triples.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.triples.is_empty()
    }

    fn slots<'a>(&'a self, slots: Option<&'a Vec<usize>>) -> TripleIter<'a> {
        match slots {
            Some(slots) => Box::new(slots.iter().map(|&slot| self.triples[slot].clone())),
            None => Box::new(std::iter::empty()),
        }
    }

    fn pair_key(first: &Term, second: &Term) -> (Term, Term) {
        (first.clone(), second.clone())
    }
}

impl Dataset for MemoryDataset {
    fn triples_with_subject(&self, subject: &Term) -> Result<TripleIter<'_>, DatasetError> {
        Ok(self.slots(self.by_subject.get(subject)))
    }

    fn triples_with_predicate(&self, predicate: &Term) -> Result<TripleIter<'_>, DatasetError> {
        Ok(self.slots(self.by_predicate.get(predicate)))
    }

    fn triples_with_object(&self, object: &Term) -> Result<TripleIter<'_>, DatasetError> {
        Ok(self.slots(self.by_object.get(object)))
    }

    fn triples_with_subject_predicate(
        &self,
        subject: &Term,
        predicate: &Term,
    ) -> Result<TripleIter<'_>, DatasetError> {
        let key = Self::pair_key(subject, predicate);
        Ok(self.slots(self.by_subject_predicate.get(&key)))
    }

    fn triples_with_subject_object(
        &self,
        subject: &Term,
        object: &Term,
    ) -> Result<TripleIter<'_>, DatasetError> {
        let key = Self::pair_key(subject, object);
        Ok(self.slots(self.by_subject_object.get(&key)))
    }

    fn triples_with_predicate_object(
        &self,
        predicate: &Term,
        object: &Term,
    ) -> Result<TripleIter<'_>, DatasetError> {
        let key = Self::pair_key(predicate, object);
        Ok(self.slots(self.by_predicate_object.get(&key)))
    }

    fn contains(&self, triple: &Triple) -> Result<bool, DatasetError> {
        Ok(self.primary.contains_key(triple))
    }

    fn all_triples(&self) -> Result<TripleIter<'_>, DatasetError> {
        Ok(Box::new(self.triples.iter().cloned()))
    }
}
