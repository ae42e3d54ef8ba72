//! The algebra tree consumed by the evaluator.
//!
//! Nodes are immutable. An optimizer rewrites a tree by rebuilding nodes
//! through [`Algebra::copy_with_children`], which keeps every operator
//! parameter and swaps only the children.
//!
//! # Variable rules
//!
//! | Operator | Fixed | Floating |
//! |---|---|---|
//! | Pattern, Bgp | all variables | none |
//! | Join | F(L) ∪ F(R) | (Fl(L) ∪ Fl(R)) − Fixed |
//! | LeftJoin | F(L) | (Fl(L) ∪ Fl(R) ∪ F(R)) − F(L) |
//! | Union | F(L) ∩ F(R) | Variables − Fixed |
//! | Extend | F(inner) | (Fl(inner) ∪ assigned) − Fixed |
//! | Project | F(inner) ∩ vars | vars − Fixed |
//! | ExistsJoin, Minus, Filter, Distinct, Slice | as the first child | as the first child |

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use super::error::AlgebraError;
use super::expression::Expression;
use super::format::{NTriplesFormatter, TermFormatter};
use super::pattern::TriplePattern;
use crate::term::Variable;

/// One `(variable, expression)` pair of an extend node.
#[derive(Debug, Clone)]
pub struct Assignment {
    pub variable: Variable,
    pub expression: Arc<dyn Expression>,
}

impl Assignment {
    pub fn new(variable: Variable, expression: impl Expression + 'static) -> Self {
        Self {
            variable,
            expression: Arc::new(expression),
        }
    }
}

/// The ordered, non-empty assignments of an extend node.
#[derive(Debug, Clone)]
pub struct Assignments(Vec<Assignment>);

impl Assignments {
    /// # Errors
    ///
    /// Returns [`AlgebraError::EmptyExtend`] if `assignments` is empty.
    pub fn new(assignments: Vec<Assignment>) -> Result<Self, AlgebraError> {
        if assignments.is_empty() {
            return Err(AlgebraError::EmptyExtend);
        }
        Ok(Self(assignments))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Assignment> {
        self.0.iter()
    }

    fn assigned(&self) -> BTreeSet<String> {
        self.0.iter().map(|a| a.variable.name.clone()).collect()
    }
}

/// An algebra operator with its children.
#[derive(Debug, Clone)]
pub enum Algebra {
    Pattern(TriplePattern),
    /// A basic graph pattern: a chain of joined triple patterns.
    Bgp(Vec<TriplePattern>),
    Join {
        left: Box<Self>,
        right: Box<Self>,
    },
    /// Optional join. A missing filter accepts every merged solution.
    LeftJoin {
        left: Box<Self>,
        right: Box<Self>,
        filter: Option<Arc<dyn Expression>>,
    },
    Union {
        left: Box<Self>,
        right: Box<Self>,
    },
    /// `EXISTS` when `must_exist`, `NOT EXISTS` otherwise.
    ExistsJoin {
        left: Box<Self>,
        right: Box<Self>,
        must_exist: bool,
    },
    Extend {
        inner: Box<Self>,
        assignments: Assignments,
    },
    Filter {
        inner: Box<Self>,
        expression: Arc<dyn Expression>,
    },
    Minus {
        left: Box<Self>,
        right: Box<Self>,
    },
    Distinct {
        inner: Box<Self>,
    },
    Project {
        inner: Box<Self>,
        variables: Vec<Variable>,
    },
    Slice {
        inner: Box<Self>,
        offset: usize,
        limit: Option<usize>,
    },
}

impl Algebra {
    #[must_use]
    pub const fn pattern(pattern: TriplePattern) -> Self {
        Self::Pattern(pattern)
    }

    #[must_use]
    pub const fn bgp(patterns: Vec<TriplePattern>) -> Self {
        Self::Bgp(patterns)
    }

    #[must_use]
    pub fn join(left: Self, right: Self) -> Self {
        Self::Join {
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    #[must_use]
    pub fn left_join(left: Self, right: Self, filter: Option<Arc<dyn Expression>>) -> Self {
        Self::LeftJoin {
            left: Box::new(left),
            right: Box::new(right),
            filter,
        }
    }

    #[must_use]
    pub fn union(left: Self, right: Self) -> Self {
        Self::Union {
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    #[must_use]
    pub fn exists(left: Self, right: Self) -> Self {
        Self::ExistsJoin {
            left: Box::new(left),
            right: Box::new(right),
            must_exist: true,
        }
    }

    #[must_use]
    pub fn not_exists(left: Self, right: Self) -> Self {
        Self::ExistsJoin {
            left: Box::new(left),
            right: Box::new(right),
            must_exist: false,
        }
    }

    /// # Errors
    ///
    /// Returns [`AlgebraError::EmptyExtend`] if `assignments` is empty.
    pub fn extend(inner: Self, assignments: Vec<Assignment>) -> Result<Self, AlgebraError> {
        Ok(Self::Extend {
            inner: Box::new(inner),
            assignments: Assignments::new(assignments)?,
        })
    }

    pub fn filter(inner: Self, expression: impl Expression + 'static) -> Self {
        Self::Filter {
            inner: Box::new(inner),
            expression: Arc::new(expression),
        }
    }

    #[must_use]
    pub fn minus(left: Self, right: Self) -> Self {
        Self::Minus {
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    #[must_use]
    pub fn distinct(inner: Self) -> Self {
        Self::Distinct {
            inner: Box::new(inner),
        }
    }

    #[must_use]
    pub fn project(inner: Self, variables: Vec<Variable>) -> Self {
        Self::Project {
            inner: Box::new(inner),
            variables,
        }
    }

    #[must_use]
    pub fn slice(inner: Self, offset: usize, limit: Option<usize>) -> Self {
        Self::Slice {
            inner: Box::new(inner),
            offset,
            limit,
        }
    }

    /// The operator name used in rendered output and errors.
    #[must_use]
    pub const fn operator_name(&self) -> &'static str {
        match self {
            Self::Pattern(_) => "triple",
            Self::Bgp(_) => "bgp",
            Self::Join { .. } => "join",
            Self::LeftJoin { .. } => "leftjoin",
            Self::Union { .. } => "union",
            Self::ExistsJoin {
                must_exist: true, ..
            } => "exists",
            Self::ExistsJoin {
                must_exist: false, ..
            } => "notexists",
            Self::Extend { .. } => "extend",
            Self::Filter { .. } => "filter",
            Self::Minus { .. } => "minus",
            Self::Distinct { .. } => "distinct",
            Self::Project { .. } => "project",
            Self::Slice { .. } => "slice",
        }
    }

    /// The child nodes, left to right.
    #[must_use]
    pub fn children(&self) -> Vec<&Self> {
        match self {
            Self::Pattern(_) | Self::Bgp(_) => Vec::new(),
            Self::Join { left, right }
            | Self::LeftJoin { left, right, .. }
            | Self::Union { left, right }
            | Self::ExistsJoin { left, right, .. }
            | Self::Minus { left, right } => vec![left.as_ref(), right.as_ref()],
            Self::Extend { inner, .. }
            | Self::Filter { inner, .. }
            | Self::Distinct { inner }
            | Self::Project { inner, .. }
            | Self::Slice { inner, .. } => vec![inner.as_ref()],
        }
    }

    /// Rebuild this node with new children and the same parameters.
    ///
    /// # Errors
    ///
    /// Returns [`AlgebraError::ChildCount`] if the number of children does not
    /// match the operator.
    pub fn copy_with_children(&self, children: Vec<Self>) -> Result<Self, AlgebraError> {
        let expected = self.children().len();
        if children.len() != expected {
            return Err(AlgebraError::ChildCount {
                operator: self.operator_name(),
                expected,
                actual: children.len(),
            });
        }
        let mut children = children.into_iter().map(Box::new);
        let mut next = || {
            children.next().ok_or(AlgebraError::ChildCount {
                operator: self.operator_name(),
                expected,
                actual: 0,
            })
        };

        Ok(match self {
            Self::Pattern(p) => Self::Pattern(p.clone()),
            Self::Bgp(ps) => Self::Bgp(ps.clone()),
            Self::Join { .. } => Self::Join {
                left: next()?,
                right: next()?,
            },
            Self::LeftJoin { filter, .. } => Self::LeftJoin {
                left: next()?,
                right: next()?,
                filter: filter.clone(),
            },
            Self::Union { .. } => Self::Union {
                left: next()?,
                right: next()?,
            },
            Self::ExistsJoin { must_exist, .. } => Self::ExistsJoin {
                left: next()?,
                right: next()?,
                must_exist: *must_exist,
            },
            Self::Extend { assignments, .. } => Self::Extend {
                inner: next()?,
                assignments: assignments.clone(),
            },
            Self::Filter { expression, .. } => Self::Filter {
                inner: next()?,
                expression: Arc::clone(expression),
            },
            Self::Minus { .. } => Self::Minus {
                left: next()?,
                right: next()?,
            },
            Self::Distinct { .. } => Self::Distinct { inner: next()? },
            Self::Project { variables, .. } => Self::Project {
                inner: next()?,
                variables: variables.clone(),
            },
            Self::Slice { offset, limit, .. } => Self::Slice {
                inner: next()?,
                offset: *offset,
                limit: *limit,
            },
        })
    }

    /// All variables the node may bind.
    #[must_use]
    pub fn variables(&self) -> BTreeSet<String> {
        let (fixed, floating) = self.variable_sets();
        fixed.union(&floating).cloned().collect()
    }

    /// Variables bound in every solution the node produces.
    #[must_use]
    pub fn fixed_variables(&self) -> BTreeSet<String> {
        self.variable_sets().0
    }

    /// Variables bound in some but not necessarily all solutions.
    #[must_use]
    pub fn floating_variables(&self) -> BTreeSet<String> {
        self.variable_sets().1
    }

    /// `(fixed, floating)`, disjoint.
    fn variable_sets(&self) -> (BTreeSet<String>, BTreeSet<String>) {
        match self {
            Self::Pattern(p) => (p.variables(), BTreeSet::new()),
            Self::Bgp(ps) => (
                ps.iter().flat_map(TriplePattern::variables).collect(),
                BTreeSet::new(),
            ),
            Self::Join { left, right } => {
                let (lf, lfl) = left.variable_sets();
                let (rf, rfl) = right.variable_sets();
                let fixed: BTreeSet<String> = lf.union(&rf).cloned().collect();
                let floating = lfl
                    .union(&rfl)
                    .filter(|v| !fixed.contains(*v))
                    .cloned()
                    .collect();
                (fixed, floating)
            }
            Self::LeftJoin { left, right, .. } => {
                let (lf, lfl) = left.variable_sets();
                let (rf, rfl) = right.variable_sets();
                let floating = lfl
                    .into_iter()
                    .chain(rfl)
                    .chain(rf)
                    .filter(|v| !lf.contains(v))
                    .collect();
                (lf, floating)
            }
            Self::Union { left, right } => {
                let (lf, lfl) = left.variable_sets();
                let (rf, rfl) = right.variable_sets();
                let fixed: BTreeSet<String> = lf.intersection(&rf).cloned().collect();
                let floating = lf
                    .iter()
                    .chain(&lfl)
                    .chain(&rf)
                    .chain(&rfl)
                    .filter(|v| !fixed.contains(*v))
                    .cloned()
                    .collect();
                (fixed, floating)
            }
            Self::Extend { inner, assignments } => {
                let (fixed, inner_floating) = inner.variable_sets();
                let floating = inner_floating
                    .into_iter()
                    .chain(assignments.assigned())
                    .filter(|v| !fixed.contains(v))
                    .collect();
                (fixed, floating)
            }
            Self::Project { inner, variables } => {
                let inner_fixed = inner.fixed_variables();
                let (fixed, floating): (BTreeSet<String>, BTreeSet<String>) = variables
                    .iter()
                    .map(|v| v.name.clone())
                    .partition(|v| inner_fixed.contains(v));
                (fixed, floating)
            }
            Self::ExistsJoin { left: inner, .. }
            | Self::Minus { left: inner, .. }
            | Self::Filter { inner, .. }
            | Self::Distinct { inner }
            | Self::Slice { inner, .. } => inner.variable_sets(),
        }
    }

    /// Check if this node is an extend node.
    #[must_use]
    pub const fn is_extend(&self) -> bool {
        matches!(self, Self::Extend { .. })
    }

    /// Render in the canonical parenthesized form.
    #[must_use]
    pub fn render(&self, formatter: &dyn TermFormatter) -> String {
        let name = self.operator_name();
        match self {
            Self::Pattern(p) => p.render(formatter),
            Self::Bgp(ps) => {
                let mut out = String::from("(bgp");
                for p in ps {
                    out.push(' ');
                    out.push_str(&p.render(formatter));
                }
                out.push(')');
                out
            }
            Self::Join { left, right }
            | Self::Union { left, right }
            | Self::ExistsJoin { left, right, .. }
            | Self::Minus { left, right } => format!(
                "({name} {} {})",
                left.render(formatter),
                right.render(formatter)
            ),
            Self::LeftJoin {
                left,
                right,
                filter,
            } => match filter {
                Some(filter) => format!(
                    "({name} {} {} {})",
                    left.render(formatter),
                    right.render(formatter),
                    filter.render(formatter)
                ),
                None => format!(
                    "({name} {} {})",
                    left.render(formatter),
                    right.render(formatter)
                ),
            },
            Self::Extend { inner, assignments } => {
                let bindings: Vec<String> = assignments
                    .iter()
                    .map(|a| format!("({} {})", a.variable, a.expression.render(formatter)))
                    .collect();
                format!("({name} ({}) {})", bindings.join(" "), inner.render(formatter))
            }
            Self::Filter { inner, expression } => format!(
                "({name} {} {})",
                expression.render(formatter),
                inner.render(formatter)
            ),
            Self::Distinct { inner } => format!("({name} {})", inner.render(formatter)),
            Self::Project { inner, variables } => {
                let names: Vec<String> = variables.iter().map(ToString::to_string).collect();
                format!("({name} ({}) {})", names.join(" "), inner.render(formatter))
            }
            Self::Slice {
                inner,
                offset,
                limit,
            } => {
                let limit = limit.map_or_else(|| "_".to_owned(), |l| l.to_string());
                format!("({name} {offset} {limit} {})", inner.render(formatter))
            }
        }
    }
}

impl fmt::Display for Algebra {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(&NTriplesFormatter))
    }
}
