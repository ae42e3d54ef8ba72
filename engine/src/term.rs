//! Triple and variable types shared by the dataset contract and the evaluator.
//!
//! RDF terms themselves are [`oxrdf::Term`] values. This module adds the
//! triple shape that datasets speak in, the triple positions the matcher
//! reasons about, and the variable names the algebra binds.

use std::fmt;

pub use oxrdf::{BlankNode, Literal, NamedNode, Term};

/// A position inside a triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Position {
    Subject,
    Predicate,
    Object,
}

impl Position {
    /// All positions in triple order.
    pub const ALL: [Self; 3] = [Self::Subject, Self::Predicate, Self::Object];

    /// The zero-based slot of this position inside a triple.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Subject => 0,
            Self::Predicate => 1,
            Self::Object => 2,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Subject => write!(f, "subject"),
            Self::Predicate => write!(f, "predicate"),
            Self::Object => write!(f, "object"),
        }
    }
}

/// A triple, readonly.
///
/// # Invariants
///
/// - The subject is an IRI or a blank node.
/// - The predicate is an IRI.
/// - The object may be any term.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Triple {
    subject: Term,
    predicate: Term,
    object: Term,
}

impl Triple {
    /// Create a triple, validating the term kind of each position.
    ///
    /// # Errors
    ///
    /// Returns an error if the subject is a literal or the predicate is not an IRI.
    pub fn new(
        subject: impl Into<Term>,
        predicate: impl Into<Term>,
        object: impl Into<Term>,
    ) -> Result<Self, TripleError> {
        let subject = subject.into();
        let predicate = predicate.into();
        if subject.is_literal() {
            return Err(TripleError::InvalidSubject(subject));
        }
        if !predicate.is_named_node() {
            return Err(TripleError::InvalidPredicate(predicate));
        }
        Ok(Self {
            subject,
            predicate,
            object: object.into(),
        })
    }

    /// The subject term.
    #[must_use]
    pub const fn subject(&self) -> &Term {
        &self.subject
    }

    /// The predicate term.
    #[must_use]
    pub const fn predicate(&self) -> &Term {
        &self.predicate
    }

    /// The object term.
    #[must_use]
    pub const fn object(&self) -> &Term {
        &self.object
    }

    /// The term at the given position.
    #[must_use]
    pub const fn get(&self, position: Position) -> &Term {
        match position {
            Position::Subject => &self.subject,
            Position::Predicate => &self.predicate,
            Position::Object => &self.object,
        }
    }
}

impl fmt::Display for Triple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} .", self.subject, self.predicate, self.object)
    }
}

/// Errors raised when a triple is built from terms of the wrong kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TripleError {
    /// The subject is a literal.
    InvalidSubject(Term),
    /// The predicate is not an IRI.
    InvalidPredicate(Term),
}

impl fmt::Display for TripleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidSubject(term) => write!(f, "invalid triple subject: {term}"),
            Self::InvalidPredicate(term) => {
                write!(f, "invalid triple predicate: {term} (must be an IRI)")
            }
        }
    }
}

impl std::error::Error for TripleError {}

/// A query variable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Variable {
    /// The variable name, without the leading `?`.
    pub name: String,
}

impl Variable {
    /// Create a new variable.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// The variable name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "?{}", self.name)
    }
}
