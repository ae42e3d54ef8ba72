//! Triple patterns and the index path used to answer them.
//!
//! A pattern has three items. Each is classified once, when the pattern is
//! built:
//!
//! - `Constant`: a fixed term the triple must carry at that position
//! - `Variable`: the first occurrence of a variable, which it binds
//! - `RepeatedVariable`: a later occurrence of the same variable, which only
//!   constrains the triple to carry the same term at both positions
//!
//! The occurrence map (variable name to positions) and the index path are
//! computed at the same time and never change afterwards.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use super::error::PatternError;
use super::format::{NTriplesFormatter, TermFormatter};
use crate::term::{Position, Term, Variable};

/// One position of a triple pattern.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PatternItem {
    Constant(Term),
    Variable(Variable),
    RepeatedVariable(Variable),
}

impl PatternItem {
    /// A constant item.
    pub fn constant(term: impl Into<Term>) -> Self {
        Self::Constant(term.into())
    }

    /// A variable item.
    pub fn variable(name: impl Into<String>) -> Self {
        Self::Variable(Variable::new(name))
    }

    /// The variable at this position, whether first or repeated.
    #[must_use]
    pub const fn as_variable(&self) -> Option<&Variable> {
        match self {
            Self::Constant(_) => None,
            Self::Variable(v) | Self::RepeatedVariable(v) => Some(v),
        }
    }

    /// The constant term at this position.
    #[must_use]
    pub const fn as_constant(&self) -> Option<&Term> {
        match self {
            Self::Constant(term) => Some(term),
            Self::Variable(_) | Self::RepeatedVariable(_) => None,
        }
    }

    fn render(&self, formatter: &dyn TermFormatter) -> String {
        match self {
            Self::Constant(term) => formatter.format_term(term),
            Self::Variable(v) | Self::RepeatedVariable(v) => v.to_string(),
        }
    }
}

impl From<Term> for PatternItem {
    fn from(term: Term) -> Self {
        Self::Constant(term)
    }
}

impl From<Variable> for PatternItem {
    fn from(variable: Variable) -> Self {
        Self::Variable(variable)
    }
}

/// How a lookup reaches the dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndexPath {
    BySubject,
    ByPredicate,
    ByObject,
    BySubjectPredicate,
    BySubjectObject,
    ByPredicateObject,
    /// All three positions are known: test for the exact triple.
    Contains,
    FullScan,
}

impl IndexPath {
    /// Pick the path for a set of bound positions.
    #[must_use]
    pub const fn for_bound(subject: bool, predicate: bool, object: bool) -> Self {
        match (subject, predicate, object) {
            (true, true, true) => Self::Contains,
            (true, true, false) => Self::BySubjectPredicate,
            (true, false, true) => Self::BySubjectObject,
            (false, true, true) => Self::ByPredicateObject,
            (true, false, false) => Self::BySubject,
            (false, true, false) => Self::ByPredicate,
            (false, false, true) => Self::ByObject,
            (false, false, false) => Self::FullScan,
        }
    }

    /// The path to use when two-term indexes may be unavailable.
    ///
    /// Without full indexing a two-term path falls back to its most selective
    /// single term: subject first, then object, then predicate.
    #[must_use]
    pub const fn effective(self, full_indexing: bool) -> Self {
        if full_indexing {
            return self;
        }
        match self {
            Self::BySubjectPredicate | Self::BySubjectObject => Self::BySubject,
            Self::ByPredicateObject => Self::ByObject,
            other => other,
        }
    }

    /// The positions whose terms form the lookup key.
    #[must_use]
    pub const fn key_positions(self) -> &'static [Position] {
        match self {
            Self::BySubject => &[Position::Subject],
            Self::ByPredicate => &[Position::Predicate],
            Self::ByObject => &[Position::Object],
            Self::BySubjectPredicate => &[Position::Subject, Position::Predicate],
            Self::BySubjectObject => &[Position::Subject, Position::Object],
            Self::ByPredicateObject => &[Position::Predicate, Position::Object],
            Self::Contains => &Position::ALL,
            Self::FullScan => &[],
        }
    }
}

impl fmt::Display for IndexPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::BySubject => "by-subject",
            Self::ByPredicate => "by-predicate",
            Self::ByObject => "by-object",
            Self::BySubjectPredicate => "by-subject-predicate",
            Self::BySubjectObject => "by-subject-object",
            Self::ByPredicateObject => "by-predicate-object",
            Self::Contains => "contains",
            Self::FullScan => "full-scan",
        };
        f.write_str(name)
    }
}

/// A triple pattern: three classified items plus the data derived from them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriplePattern {
    items: [PatternItem; 3],
    occurrences: BTreeMap<String, Vec<Position>>,
    index_path: IndexPath,
}

impl TriplePattern {
    /// Build a pattern, classifying repeated variables.
    ///
    /// # Errors
    ///
    /// Returns an error if the predicate is a constant that is not an IRI.
    pub fn new(
        subject: impl Into<PatternItem>,
        predicate: impl Into<PatternItem>,
        object: impl Into<PatternItem>,
    ) -> Result<Self, PatternError> {
        let raw = [subject.into(), predicate.into(), object.into()];

        if let PatternItem::Constant(term) = &raw[Position::Predicate.index()] {
            if !term.is_named_node() {
                return Err(PatternError::InvalidPredicate(term.clone()));
            }
        }

        let mut occurrences: BTreeMap<String, Vec<Position>> = BTreeMap::new();
        let items = Position::ALL.map(|position| {
            match &raw[position.index()] {
                PatternItem::Constant(term) => PatternItem::Constant(term.clone()),
                PatternItem::Variable(v) | PatternItem::RepeatedVariable(v) => {
                    let seen = occurrences.entry(v.name.clone()).or_default();
                    let first = seen.is_empty();
                    seen.push(position);
                    if first {
                        PatternItem::Variable(v.clone())
                    } else {
                        PatternItem::RepeatedVariable(v.clone())
                    }
                }
            }
        });

        let bound = |position: Position| items[position.index()].as_constant().is_some();
        let index_path = IndexPath::for_bound(
            bound(Position::Subject),
            bound(Position::Predicate),
            bound(Position::Object),
        );

        Ok(Self {
            items,
            occurrences,
            index_path,
        })
    }

    /// The item at the given position.
    #[must_use]
    pub const fn get(&self, position: Position) -> &PatternItem {
        &self.items[position.index()]
    }

    /// Map from each variable name to the positions it occupies, in order.
    #[must_use]
    pub const fn occurrences(&self) -> &BTreeMap<String, Vec<Position>> {
        &self.occurrences
    }

    /// The index path implied by the constant positions.
    #[must_use]
    pub const fn index_path(&self) -> IndexPath {
        self.index_path
    }

    /// The distinct variable names of the pattern.
    #[must_use]
    pub fn variables(&self) -> BTreeSet<String> {
        self.occurrences.keys().cloned().collect()
    }

    /// Check if the pattern has no variables.
    #[must_use]
    pub fn is_ground(&self) -> bool {
        self.occurrences.is_empty()
    }

    /// Render as `(triple s p o)`.
    #[must_use]
    pub fn render(&self, formatter: &dyn TermFormatter) -> String {
        format!(
            "(triple {} {} {})",
            self.items[0].render(formatter),
            self.items[1].render(formatter),
            self.items[2].render(formatter)
        )
    }
}

impl fmt::Display for TriplePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(&NTriplesFormatter))
    }
}
