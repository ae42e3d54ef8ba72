//! Errors raised while building or evaluating algebra trees.

use std::fmt;

use super::pattern::IndexPath;
use crate::dataset::DatasetError;
use crate::term::Term;

/// Errors raised when a triple pattern is constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatternError {
    /// A constant predicate that is not an IRI.
    InvalidPredicate(Term),
}

impl fmt::Display for PatternError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidPredicate(term) => {
                write!(f, "pattern predicate must be an IRI or a variable, got {term}")
            }
        }
    }
}

impl std::error::Error for PatternError {}

/// Errors raised when an algebra node is constructed or rebuilt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlgebraError {
    /// An extend node was given no assignments.
    EmptyExtend,
    /// `copy_with_children` was given the wrong number of children.
    ChildCount {
        operator: &'static str,
        expected: usize,
        actual: usize,
    },
}

impl fmt::Display for AlgebraError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyExtend => write!(f, "extend requires at least one assignment"),
            Self::ChildCount {
                operator,
                expected,
                actual,
            } => write!(
                f,
                "{operator} takes {expected} children but {actual} were given"
            ),
        }
    }
}

impl std::error::Error for AlgebraError {}

/// Errors that abort an evaluation.
///
/// Per-solution expression failures are never reported here: they are
/// absorbed where they happen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EvaluationError {
    /// The query ran past its deadline.
    Timeout { limit_ms: u64, elapsed_ms: u64 },
    /// The dataset failed to serve a lookup.
    Dataset(DatasetError),
    /// A dataset lookup returned a triple that does not fit the lookup key.
    DatasetContract {
        path: IndexPath,
        expectation: String,
    },
    /// An extend assignment tried to change the value of a bound variable.
    Rebinding {
        variable: String,
        solution_index: usize,
    },
}

impl fmt::Display for EvaluationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timeout {
                limit_ms,
                elapsed_ms,
            } => write!(
                f,
                "query timed out after {elapsed_ms}ms (limit {limit_ms}ms)"
            ),
            Self::Dataset(e) => write!(f, "dataset error: {e}"),
            Self::DatasetContract { path, expectation } => {
                write!(f, "dataset violated {path} lookup: expected {expectation}")
            }
            Self::Rebinding {
                variable,
                solution_index,
            } => write!(
                f,
                "extend would rebind ?{variable} to a different value in solution {solution_index}"
            ),
        }
    }
}

impl std::error::Error for EvaluationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Dataset(e) => Some(e),
            _ => None,
        }
    }
}

impl From<DatasetError> for EvaluationError {
    fn from(e: DatasetError) -> Self {
        Self::Dataset(e)
    }
}
