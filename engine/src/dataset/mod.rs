//! The dataset contract consumed by the evaluator.
//!
//! The evaluator never owns triple storage. It asks a [`Dataset`] for triples
//! through one of the index paths below and filters the candidates itself:
//!
//! - Single-term scans: by subject, by predicate, by object
//! - Two-term lookups: by subject+predicate, subject+object, predicate+object
//! - Direct containment test for fully bound triples
//! - Full scan as a last resort
//!
//! Every sequence is lazy and may only be consumed once.
//!
//! [`MemoryDataset`] is an in-memory implementation with all six indexes.

mod memory;

pub use memory::MemoryDataset;

use crate::term::{Term, Triple, TripleError};

/// A lazy, finite sequence of triples returned by a dataset lookup.
pub type TripleIter<'a> = Box<dyn Iterator<Item = Triple> + 'a>;

/// Read access to a set of triples.
///
/// Implementations may be shared read-only between concurrently executing
/// queries. Writes during an in-flight lookup must be serialized or
/// snapshot-isolated by the implementation.
pub trait Dataset {
    /// All triples with the given subject.
    fn triples_with_subject(&self, subject: &Term) -> Result<TripleIter<'_>, DatasetError>;

    /// All triples with the given predicate.
    fn triples_with_predicate(&self, predicate: &Term) -> Result<TripleIter<'_>, DatasetError>;

    /// All triples with the given object.
    fn triples_with_object(&self, object: &Term) -> Result<TripleIter<'_>, DatasetError>;

    /// All triples with the given subject and predicate.
    fn triples_with_subject_predicate(
        &self,
        subject: &Term,
        predicate: &Term,
    ) -> Result<TripleIter<'_>, DatasetError>;

    /// All triples with the given subject and object.
    fn triples_with_subject_object(
        &self,
        subject: &Term,
        object: &Term,
    ) -> Result<TripleIter<'_>, DatasetError>;

    /// All triples with the given predicate and object.
    fn triples_with_predicate_object(
        &self,
        predicate: &Term,
        object: &Term,
    ) -> Result<TripleIter<'_>, DatasetError>;

    /// Check whether the exact triple is present.
    fn contains(&self, triple: &Triple) -> Result<bool, DatasetError>;

    /// Every triple in the dataset.
    ///
    /// Use with caution - this can be expensive for large datasets.
    fn all_triples(&self) -> Result<TripleIter<'_>, DatasetError>;
}

/// Errors reported by a dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatasetError {
    /// The dataset could not serve the request.
    Unavailable(String),
    /// A triple with ill-typed terms was offered to the dataset.
    InvalidTriple(TripleError),
}

impl std::fmt::Display for DatasetError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unavailable(message) => write!(f, "dataset unavailable: {message}"),
            Self::InvalidTriple(e) => write!(f, "invalid triple: {e}"),
        }
    }
}

impl std::error::Error for DatasetError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Unavailable(_) => None,
            Self::InvalidTriple(e) => Some(e),
        }
    }
}

impl From<TripleError> for DatasetError {
    fn from(e: TripleError) -> Self {
        Self::InvalidTriple(e)
    }
}
