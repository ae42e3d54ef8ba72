//! Query engine implementation.
//!
//! The `QueryEngine` evaluates an algebra tree against a dataset. Evaluation
//! is a depth-first walk with one exhaustive match over the operators:
//!
//! - Patterns and BGPs query the dataset through the matcher
//! - Join, LeftJoin, ExistsJoin and Minus evaluate their left side first and
//!   skip the right side when the left side has no solutions
//! - Union evaluates both sides from the same input
//! - Extend, Filter, Distinct, Project and Slice transform their child's result;
//!   Project and Slice evaluate their child from `Identity`
//!
//! The input multiset in the context is set before recursing into a child and
//! restored afterwards. The deadline is checked after every child evaluation
//! and every combinator application.

use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::{debug, debug_span, trace};

use super::algebra::{Algebra, Assignments};
use super::context::EvaluationContext;
use super::error::EvaluationError;
use super::expression::{Expression, effective_boolean_value};
use super::matcher::match_pattern;
use super::multiset::Multiset;
use super::pattern::TriplePattern;
use super::solution::Solution;
use crate::config::EngineConfig;
use crate::dataset::Dataset;
use crate::time::{SystemTimeSource, TimeSource};

static SYSTEM_TIME: SystemTimeSource = SystemTimeSource;

/// The query engine evaluates algebra trees against a dataset.
pub struct QueryEngine<'a> {
    dataset: &'a dyn Dataset,
    config: &'a EngineConfig,
    time: &'a dyn TimeSource,
}

impl<'a> QueryEngine<'a> {
    /// Create a new query engine reading the system clock.
    pub fn new(dataset: &'a dyn Dataset, config: &'a EngineConfig) -> Self {
        Self {
            dataset,
            config,
            time: &SYSTEM_TIME,
        }
    }

    /// Use a different time source for deadlines.
    #[must_use]
    pub fn with_time_source(mut self, time: &'a dyn TimeSource) -> Self {
        self.time = time;
        self
    }

    /// Evaluate a tree starting from `Identity`.
    ///
    /// # Errors
    ///
    /// Returns an error if the deadline passes, the dataset fails, or an
    /// extend node tries to rebind a variable.
    pub fn evaluate(&self, algebra: &Algebra) -> Result<Multiset, EvaluationError> {
        self.evaluate_with_input(algebra, Multiset::Identity)
    }

    /// Evaluate a tree against an initial input multiset.
    ///
    /// # Errors
    ///
    /// See [`QueryEngine::evaluate`].
    pub fn evaluate_with_input(
        &self,
        algebra: &Algebra,
        input: Multiset,
    ) -> Result<Multiset, EvaluationError> {
        let span = debug_span!("evaluate", operator = algebra.operator_name());
        let _guard = span.enter();

        let mut ctx = EvaluationContext::new(input, self.dataset, self.config, self.time);
        let result = evaluate_node(algebra, &mut ctx)?;
        debug!(solutions = result.len(), "evaluation finished");
        Ok(result)
    }
}

/// Evaluate one node against the context's current input.
fn evaluate_node(
    algebra: &Algebra,
    ctx: &mut EvaluationContext<'_>,
) -> Result<Multiset, EvaluationError> {
    match algebra {
        Algebra::Pattern(pattern) => {
            let result = match_pattern(pattern, ctx)?;
            ctx.check_timeout()?;
            Ok(result)
        }
        Algebra::Bgp(patterns) => evaluate_bgp(patterns, ctx),
        Algebra::Join { left, right } => {
            let Some(left) = evaluate_left(left, ctx)? else {
                return Ok(Multiset::Null);
            };
            let right = ctx.with_input(Arc::clone(&left), |ctx| evaluate_node(right, ctx))?;
            ctx.check_timeout()?;
            let result = left.join(&right);
            ctx.check_timeout()?;
            Ok(result)
        }
        Algebra::LeftJoin {
            left: left_node,
            right: right_node,
            filter,
        } => {
            let upstream = ctx.input().variables();
            let Some(left) = evaluate_left(left_node, ctx)? else {
                return Ok(Multiset::Null);
            };
            let right_input = if should_linearize(left_node, right_node, &upstream) {
                Arc::clone(&left)
            } else {
                Arc::new(Multiset::Identity)
            };
            let right = ctx.with_input(right_input, |ctx| evaluate_node(right_node, ctx))?;
            ctx.check_timeout()?;
            let result = left.left_join(&right, |merged| passes(filter.as_deref(), merged));
            ctx.check_timeout()?;
            Ok(result)
        }
        Algebra::Union { left, right } => {
            let initial = if left.is_extend() || right.is_extend() {
                Arc::new(Multiset::Identity)
            } else {
                ctx.shared_input()
            };
            let left = ctx.with_input(Arc::clone(&initial), |ctx| evaluate_node(left, ctx))?;
            ctx.check_timeout()?;
            let right = ctx.with_input(initial, |ctx| evaluate_node(right, ctx))?;
            ctx.check_timeout()?;
            let result = left.union(&right);
            ctx.check_timeout()?;
            Ok(result)
        }
        Algebra::ExistsJoin {
            left,
            right,
            must_exist,
        } => {
            let Some(left) = evaluate_left(left, ctx)? else {
                return Ok(Multiset::Null);
            };
            let right = ctx.with_input(Arc::clone(&left), |ctx| evaluate_node(right, ctx))?;
            ctx.check_timeout()?;
            let result = left.semi_join(&right, *must_exist);
            ctx.check_timeout()?;
            Ok(result)
        }
        Algebra::Extend { inner, assignments } => {
            let inner = evaluate_node(inner, ctx)?;
            ctx.check_timeout()?;
            let result = extend(&inner, assignments)?;
            ctx.check_timeout()?;
            Ok(result)
        }
        Algebra::Filter { inner, expression } => {
            let inner = evaluate_node(inner, ctx)?;
            ctx.check_timeout()?;
            let result = inner.retain(|solution| passes(Some(&**expression), solution));
            ctx.check_timeout()?;
            Ok(result)
        }
        Algebra::Minus { left, right } => {
            let Some(left) = evaluate_left(left, ctx)? else {
                return Ok(Multiset::Null);
            };
            let right = ctx.with_input(Arc::new(Multiset::Identity), |ctx| {
                evaluate_node(right, ctx)
            })?;
            ctx.check_timeout()?;
            let result = left.minus(&right);
            ctx.check_timeout()?;
            Ok(result)
        }
        Algebra::Distinct { inner } => {
            let inner = evaluate_node(inner, ctx)?;
            ctx.check_timeout()?;
            let result = inner.distinct();
            ctx.check_timeout()?;
            Ok(result)
        }
        Algebra::Project { inner, variables } => {
            // Projection can drop a narrowed variable, so the child never
            // sees outer bindings.
            let inner = ctx.with_input(Arc::new(Multiset::Identity), |ctx| {
                evaluate_node(inner, ctx)
            })?;
            ctx.check_timeout()?;
            let result = inner.project(variables);
            ctx.check_timeout()?;
            Ok(result)
        }
        Algebra::Slice {
            inner,
            offset,
            limit,
        } => {
            let inner = ctx.with_input(Arc::new(Multiset::Identity), |ctx| {
                evaluate_node(inner, ctx)
            })?;
            ctx.check_timeout()?;
            let result = inner.slice(*offset, *limit);
            ctx.check_timeout()?;
            Ok(result)
        }
    }
}

/// Evaluate the left side of a binary operator.
///
/// Returns `None` when the left side is `Null` or has no solutions, in which
/// case the right side must not be evaluated.
fn evaluate_left(
    left: &Algebra,
    ctx: &mut EvaluationContext<'_>,
) -> Result<Option<Arc<Multiset>>, EvaluationError> {
    let result = evaluate_node(left, ctx)?;
    ctx.check_timeout()?;
    if result.is_empty() {
        debug!(
            operator = left.operator_name(),
            "left side has no solutions, skipping right side"
        );
        return Ok(None);
    }
    Ok(Some(Arc::new(result)))
}

/// A BGP is a left-deep chain of joins over its patterns.
fn evaluate_bgp(
    patterns: &[TriplePattern],
    ctx: &mut EvaluationContext<'_>,
) -> Result<Multiset, EvaluationError> {
    let Some((first, rest)) = patterns.split_first() else {
        return Ok(Multiset::Identity);
    };
    let mut acc = match_pattern(first, ctx)?;
    ctx.check_timeout()?;
    for pattern in rest {
        if acc.is_empty() {
            debug!(%pattern, "bgp prefix has no solutions, skipping remaining patterns");
            return Ok(Multiset::Null);
        }
        let left = Arc::new(acc);
        let right = ctx.with_input(Arc::clone(&left), |ctx| match_pattern(pattern, ctx))?;
        ctx.check_timeout()?;
        acc = left.join(&right);
        ctx.check_timeout()?;
    }
    Ok(acc)
}

/// Decide whether the left side's bindings may flow into the right side of
/// an optional join.
fn should_linearize(left: &Algebra, right: &Algebra, upstream: &BTreeSet<String>) -> bool {
    let left_fixed = left.fixed_variables();
    let left_floating = left.floating_variables();
    let right_fixed = right.fixed_variables();
    let right_floating = right.floating_variables();

    // (a) left floating variables must not already be bound upstream
    let upstream_clash = left_floating.iter().any(|v| upstream.contains(v));
    // (b) no variable floats on one side while bound on the other
    let conflict = right_floating
        .iter()
        .any(|v| left_floating.contains(v) || left_fixed.contains(v))
        || right_fixed.iter().any(|v| left_floating.contains(v));
    // (c) the sides must share a variable
    let shared = left.variables().intersection(&right.variables()).next().is_some();

    let linearize = !upstream_clash && !conflict && shared;
    trace!(
        upstream_clash,
        conflict, shared, linearize, "left join linearization"
    );
    linearize
}

/// Check a solution against an optional filter. Errors reject the solution.
fn passes(filter: Option<&dyn Expression>, solution: &Solution) -> bool {
    let Some(filter) = filter else {
        return true;
    };
    match filter
        .evaluate(solution)
        .and_then(|value| effective_boolean_value(&value))
    {
        Ok(value) => value,
        Err(e) => {
            trace!(error = %e, "filter error, rejecting solution");
            false
        }
    }
}

/// Apply extend assignments to every solution, in order.
fn extend(inner: &Multiset, assignments: &Assignments) -> Result<Multiset, EvaluationError> {
    if inner.is_null() {
        return Ok(Multiset::Null);
    }

    let mut solutions = Vec::with_capacity(inner.len());
    for (index, source) in inner.solutions().iter().enumerate() {
        let mut solution = source.clone();
        for assignment in assignments.iter() {
            let value = match assignment.expression.evaluate(&solution) {
                Ok(value) => value,
                Err(e) => {
                    trace!(
                        variable = %assignment.variable,
                        error = %e,
                        "extend expression failed, leaving variable unbound"
                    );
                    continue;
                }
            };
            match solution.get(&assignment.variable) {
                Some(existing) if *existing != value => {
                    return Err(EvaluationError::Rebinding {
                        variable: assignment.variable.name.clone(),
                        solution_index: index,
                    });
                }
                Some(_) => {}
                None => {
                    solution.set(&assignment.variable, value);
                }
            }
        }
        solutions.push(solution);
    }

    let mut variables = inner.variables();
    variables.extend(assignments.iter().map(|a| a.variable.name.clone()));
    Ok(Multiset::from_solutions(variables, solutions))
}
