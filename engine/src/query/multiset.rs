//! The evaluator's working value: a tagged bag of solutions.
//!
//! A multiset is one of:
//!
//! - `Identity`: exactly one solution, the empty binding
//! - `Null`: zero solutions, the failure marker that suppresses sibling evaluation
//! - `Regular`: a bag of solutions (duplicates retained) plus its declared variables
//!
//! # Invariants
//!
//! - `fixed_variables() ∩ floating_variables() = ∅`
//! - The declared variables of a `Regular` multiset include every variable
//!   bound by one of its solutions.
//! - A `Regular` multiset with zero solutions has no fixed variables.
//!
//! The combinators in this module are pure: they never look at the dataset
//! and never decide what to evaluate. Short-circuiting is the evaluator's job.

use std::collections::{BTreeSet, HashMap, HashSet};

use super::solution::Solution;
use crate::term::{Term, Variable};

static IDENTITY_SOLUTIONS: [Solution; 1] = [Solution::new()];

/// A tagged bag of solutions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Multiset {
    /// One empty solution: "succeeded, nothing to bind".
    Identity,
    /// No solutions, and nothing downstream should be evaluated.
    Null,
    /// A bag of solutions with its declared variables.
    Regular {
        variables: BTreeSet<String>,
        solutions: Vec<Solution>,
    },
}

impl Multiset {
    /// Create a regular multiset.
    ///
    /// Variables bound by any solution are added to the declared set.
    #[must_use]
    pub fn from_solutions(mut variables: BTreeSet<String>, solutions: Vec<Solution>) -> Self {
        for solution in &solutions {
            for name in solution.names() {
                if !variables.contains(name) {
                    variables.insert(name.to_owned());
                }
            }
        }
        Self::Regular {
            variables,
            solutions,
        }
    }

    /// Create a regular multiset with zero solutions.
    #[must_use]
    pub const fn empty(variables: BTreeSet<String>) -> Self {
        Self::Regular {
            variables,
            solutions: Vec::new(),
        }
    }

    /// Check if this is the `Null` marker.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Check if this is `Identity`.
    #[must_use]
    pub const fn is_identity(&self) -> bool {
        matches!(self, Self::Identity)
    }

    /// Check if the multiset holds no solutions, either as `Null` or as an
    /// empty `Regular` multiset.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get the number of solutions.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Identity => 1,
            Self::Null => 0,
            Self::Regular { solutions, .. } => solutions.len(),
        }
    }

    /// The solutions of the multiset.
    ///
    /// `Identity` yields one empty solution.
    #[must_use]
    pub fn solutions(&self) -> &[Solution] {
        match self {
            Self::Identity => &IDENTITY_SOLUTIONS,
            Self::Null => &[],
            Self::Regular { solutions, .. } => solutions,
        }
    }

    /// All variables appearing in the multiset.
    #[must_use]
    pub fn variables(&self) -> BTreeSet<String> {
        match self {
            Self::Identity | Self::Null => BTreeSet::new(),
            Self::Regular { variables, .. } => variables.clone(),
        }
    }

    /// Variables bound in every solution.
    #[must_use]
    pub fn fixed_variables(&self) -> BTreeSet<String> {
        match self {
            Self::Identity | Self::Null => BTreeSet::new(),
            Self::Regular {
                variables,
                solutions,
            } => {
                if solutions.is_empty() {
                    return BTreeSet::new();
                }
                variables
                    .iter()
                    .filter(|name| solutions.iter().all(|s| s.has_name(name)))
                    .cloned()
                    .collect()
            }
        }
    }

    /// Variables bound in some but not all solutions.
    #[must_use]
    pub fn floating_variables(&self) -> BTreeSet<String> {
        let fixed = self.fixed_variables();
        self.variables()
            .into_iter()
            .filter(|name| !fixed.contains(name))
            .collect()
    }

    /// Join two multisets: every compatible pair of solutions, merged.
    ///
    /// `Identity` is the unit and `Null` is absorbing on either side. When
    /// both sides have fixed variables in common, the right side is
    /// partitioned on them; otherwise every pair is compared.
    #[must_use]
    pub fn join(&self, other: &Self) -> Self {
        match (self, other) {
            (Self::Null, _) | (_, Self::Null) => Self::Null,
            (Self::Identity, rhs) => rhs.clone(),
            (lhs, Self::Identity) => lhs.clone(),
            _ => {
                let variables = union(&self.variables(), &other.variables());
                let shared: Vec<String> = self
                    .fixed_variables()
                    .intersection(&other.fixed_variables())
                    .cloned()
                    .collect();

                let solutions = if shared.is_empty() {
                    nested_loop_join(self.solutions(), other.solutions())
                } else {
                    hash_join(self.solutions(), other.solutions(), &shared)
                };
                Self::from_solutions(variables, solutions)
            }
        }
    }

    /// Optional join: every left solution merged with each compatible right
    /// solution accepted by `accept`, or kept unchanged if there is none.
    #[must_use]
    pub fn left_join(&self, other: &Self, mut accept: impl FnMut(&Solution) -> bool) -> Self {
        if self.is_null() {
            return Self::Null;
        }
        let variables = union(&self.variables(), &other.variables());
        let mut solutions = Vec::with_capacity(self.len());

        for left in self.solutions() {
            let before = solutions.len();
            for right in other.solutions() {
                if let Some(merged) = left.merge(right) {
                    if accept(&merged) {
                        solutions.push(merged);
                    }
                }
            }
            if solutions.len() == before {
                solutions.push(left.clone());
            }
        }

        Self::from_solutions(variables, solutions)
    }

    /// Bag union. Two `Null` sides give `Null`.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        match (self, other) {
            (Self::Null, Self::Null) => Self::Null,
            (Self::Null, only) | (only, Self::Null) => only.clone(),
            _ => {
                let variables = union(&self.variables(), &other.variables());
                let mut solutions = Vec::with_capacity(self.len() + other.len());
                solutions.extend_from_slice(self.solutions());
                solutions.extend_from_slice(other.solutions());
                Self::from_solutions(variables, solutions)
            }
        }
    }

    /// Keep the left solutions that have at least one compatible right
    /// solution (`must_exist`) or none at all (`!must_exist`).
    #[must_use]
    pub fn semi_join(&self, other: &Self, must_exist: bool) -> Self {
        self.retain(|left| {
            let exists = other
                .solutions()
                .iter()
                .any(|right| left.is_compatible_with(right));
            exists == must_exist
        })
    }

    /// Remove the left solutions that are compatible with, and share at
    /// least one variable with, some right solution.
    #[must_use]
    pub fn minus(&self, other: &Self) -> Self {
        self.retain(|left| {
            !other
                .solutions()
                .iter()
                .any(|right| left.shares_variable_with(right) && left.is_compatible_with(right))
        })
    }

    /// Keep the solutions accepted by `keep`, preserving order.
    ///
    /// The declared variables are unchanged. `Identity` stays `Identity` when
    /// its empty solution is kept.
    #[must_use]
    pub fn retain(&self, mut keep: impl FnMut(&Solution) -> bool) -> Self {
        match self {
            Self::Null => Self::Null,
            Self::Identity => {
                if keep(&IDENTITY_SOLUTIONS[0]) {
                    Self::Identity
                } else {
                    Self::empty(BTreeSet::new())
                }
            }
            Self::Regular {
                variables,
                solutions,
            } => Self::Regular {
                variables: variables.clone(),
                solutions: solutions.iter().filter(|&s| keep(s)).cloned().collect(),
            },
        }
    }

    /// Remove duplicate solutions, keeping the first occurrence of each.
    #[must_use]
    pub fn distinct(&self) -> Self {
        let mut seen = HashSet::new();
        self.retain(|solution| seen.insert(solution.clone()))
    }

    /// Restrict every solution to the listed variables. Duplicates are kept.
    #[must_use]
    pub fn project(&self, variables: &[Variable]) -> Self {
        match self {
            Self::Identity | Self::Null => self.clone(),
            Self::Regular { solutions, .. } => Self::Regular {
                variables: variables.iter().map(|v| v.name.clone()).collect(),
                solutions: solutions.iter().map(|s| s.project(variables)).collect(),
            },
        }
    }

    /// Skip `offset` solutions, then keep at most `limit`.
    #[must_use]
    pub fn slice(&self, offset: usize, limit: Option<usize>) -> Self {
        let limit = limit.unwrap_or(usize::MAX);
        match self {
            Self::Null => Self::Null,
            Self::Identity => {
                if offset == 0 && limit > 0 {
                    Self::Identity
                } else {
                    Self::empty(BTreeSet::new())
                }
            }
            Self::Regular {
                variables,
                solutions,
            } => Self::Regular {
                variables: variables.clone(),
                solutions: solutions.iter().skip(offset).take(limit).cloned().collect(),
            },
        }
    }
}

fn union(a: &BTreeSet<String>, b: &BTreeSet<String>) -> BTreeSet<String> {
    a.union(b).cloned().collect()
}

fn nested_loop_join(left: &[Solution], right: &[Solution]) -> Vec<Solution> {
    let mut out = Vec::new();
    for l in left {
        for r in right {
            if let Some(merged) = l.merge(r) {
                out.push(merged);
            }
        }
    }
    out
}

/// Join on variables bound in every solution of both sides.
fn hash_join(left: &[Solution], right: &[Solution], shared: &[String]) -> Vec<Solution> {
    let key_of = |solution: &Solution| -> Option<Vec<Term>> {
        shared
            .iter()
            .map(|name| solution.get_by_name(name).cloned())
            .collect()
    };

    let mut buckets: HashMap<Vec<Term>, Vec<&Solution>> = HashMap::new();
    for r in right {
        if let Some(key) = key_of(r) {
            buckets.entry(key).or_default().push(r);
        }
    }

    let mut out = Vec::new();
    for l in left {
        let Some(key) = key_of(l) else { continue };
        let Some(partners) = buckets.get(&key) else {
            continue;
        };
        for r in partners {
            if let Some(merged) = l.merge(r) {
                out.push(merged);
            }
        }
    }
    out
}
