//! Variable bindings produced while evaluating a query.
//!
//! A `Solution` maps variable names to the terms they are bound to. Solutions
//! are treated as values: combinators build new solutions instead of editing
//! the ones they were given.

use std::collections::BTreeMap;
use std::fmt;

use crate::term::{Term, Variable};

/// One assignment of terms to a subset of the query variables.
///
/// Bindings are kept sorted by variable name so that two solutions with the
/// same bindings compare and hash equal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Solution {
    /// Map from variable names to their bound values.
    bindings: BTreeMap<String, Term>,
}

impl Solution {
    /// Create a solution with no bindings.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            bindings: BTreeMap::new(),
        }
    }

    /// Bind a variable to a value.
    ///
    /// Returns the previous value if the variable was already bound.
    pub fn set(&mut self, variable: &Variable, value: Term) -> Option<Term> {
        self.bindings.insert(variable.name.clone(), value)
    }

    /// Get the value bound to a variable.
    #[must_use]
    pub fn get(&self, variable: &Variable) -> Option<&Term> {
        self.bindings.get(&variable.name)
    }

    /// Get the value bound to a variable by name.
    #[must_use]
    pub fn get_by_name(&self, name: &str) -> Option<&Term> {
        self.bindings.get(name)
    }

    /// Check if a variable is bound.
    #[must_use]
    pub fn has(&self, variable: &Variable) -> bool {
        self.bindings.contains_key(&variable.name)
    }

    /// Check if a variable is bound by name.
    #[must_use]
    pub fn has_name(&self, name: &str) -> bool {
        self.bindings.contains_key(name)
    }

    /// Get the number of bound variables.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Check if the solution has no bindings.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Iterate over all bindings in variable-name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Term)> {
        self.bindings.iter().map(|(name, term)| (name.as_str(), term))
    }

    /// Iterate over the names of the bound variables.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.bindings.keys().map(String::as_str)
    }

    /// Check if this solution is compatible with another.
    ///
    /// Two solutions are compatible if every variable bound by both is bound
    /// to the same value.
    #[must_use]
    pub fn is_compatible_with(&self, other: &Self) -> bool {
        let (smaller, larger) = if self.len() <= other.len() {
            (self, other)
        } else {
            (other, self)
        };
        smaller
            .bindings
            .iter()
            .all(|(name, value)| larger.bindings.get(name).is_none_or(|other| other == value))
    }

    /// Check if this solution binds at least one variable the other also binds.
    #[must_use]
    pub fn shares_variable_with(&self, other: &Self) -> bool {
        self.bindings.keys().any(|name| other.bindings.contains_key(name))
    }

    /// Create a new solution holding the bindings of both.
    ///
    /// Returns `None` if the solutions are not compatible.
    #[must_use]
    pub fn merge(&self, other: &Self) -> Option<Self> {
        if !self.is_compatible_with(other) {
            return None;
        }
        let mut merged = self.clone();
        for (name, value) in &other.bindings {
            merged
                .bindings
                .entry(name.clone())
                .or_insert_with(|| value.clone());
        }
        Some(merged)
    }

    /// Create a copy that only keeps the listed variables.
    #[must_use]
    pub fn project(&self, variables: &[Variable]) -> Self {
        let bindings = variables
            .iter()
            .filter_map(|v| {
                self.bindings
                    .get(&v.name)
                    .map(|term| (v.name.clone(), term.clone()))
            })
            .collect();
        Self { bindings }
    }
}

impl FromIterator<(String, Term)> for Solution {
    fn from_iter<I: IntoIterator<Item = (String, Term)>>(iter: I) -> Self {
        Self {
            bindings: iter.into_iter().collect(),
        }
    }
}

impl fmt::Display for Solution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (name, term)) in self.bindings.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "?{name} -> {term}")?;
        }
        write!(f, "}}")
    }
}
