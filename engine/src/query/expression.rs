//! Expressions evaluated against a single solution.
//!
//! The evaluator only depends on the [`Expression`] trait, so an upstream
//! compiler can plug in its own expression tree. [`Expr`] is the built-in
//! implementation covering the operators the engine needs for `BIND`-style
//! extensions and filters.

use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;

use oxrdf::vocab::xsd;

use super::format::{NTriplesFormatter, TermFormatter};
use super::solution::Solution;
use crate::term::{Literal, Term, Variable};

/// An expression over the bindings of one solution.
pub trait Expression: fmt::Debug {
    /// Compute the value of the expression for a solution.
    ///
    /// # Errors
    ///
    /// Returns an error if an operand is unbound or has the wrong type.
    fn evaluate(&self, solution: &Solution) -> Result<Term, ExpressionError>;

    /// The variables the expression reads.
    fn variables(&self) -> BTreeSet<String>;

    /// Render in the canonical parenthesized form.
    fn render(&self, formatter: &dyn TermFormatter) -> String;
}

/// Errors raised while evaluating an expression for one solution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExpressionError {
    /// A variable the expression reads is not bound.
    UnboundVariable(String),
    /// An operand has a type the operator does not accept.
    TypeError(String),
}

impl fmt::Display for ExpressionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnboundVariable(name) => write!(f, "variable ?{name} is not bound"),
            Self::TypeError(message) => write!(f, "type error: {message}"),
        }
    }
}

impl std::error::Error for ExpressionError {}

/// The built-in expression language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    Variable(Variable),
    Constant(Term),
    Bound(Variable),
    Not(Box<Self>),
    And(Box<Self>, Box<Self>),
    Or(Box<Self>, Box<Self>),
    Equal(Box<Self>, Box<Self>),
    NotEqual(Box<Self>, Box<Self>),
    Less(Box<Self>, Box<Self>),
    Greater(Box<Self>, Box<Self>),
    Add(Box<Self>, Box<Self>),
    Str(Box<Self>),
    IsIri(Box<Self>),
    IsLiteral(Box<Self>),
}

impl Expr {
    pub fn var(name: impl Into<String>) -> Self {
        Self::Variable(Variable::new(name))
    }

    pub fn constant(term: impl Into<Term>) -> Self {
        Self::Constant(term.into())
    }

    pub fn bound(name: impl Into<String>) -> Self {
        Self::Bound(Variable::new(name))
    }

    #[allow(clippy::should_implement_trait)]
    #[must_use]
    pub fn not(inner: Self) -> Self {
        Self::Not(Box::new(inner))
    }

    #[must_use]
    pub fn and(left: Self, right: Self) -> Self {
        Self::And(Box::new(left), Box::new(right))
    }

    #[must_use]
    pub fn or(left: Self, right: Self) -> Self {
        Self::Or(Box::new(left), Box::new(right))
    }

    #[must_use]
    pub fn equal(left: Self, right: Self) -> Self {
        Self::Equal(Box::new(left), Box::new(right))
    }

    #[must_use]
    pub fn not_equal(left: Self, right: Self) -> Self {
        Self::NotEqual(Box::new(left), Box::new(right))
    }

    #[must_use]
    pub fn less(left: Self, right: Self) -> Self {
        Self::Less(Box::new(left), Box::new(right))
    }

    #[must_use]
    pub fn greater(left: Self, right: Self) -> Self {
        Self::Greater(Box::new(left), Box::new(right))
    }

    #[allow(clippy::should_implement_trait)]
    #[must_use]
    pub fn add(left: Self, right: Self) -> Self {
        Self::Add(Box::new(left), Box::new(right))
    }

    #[must_use]
    pub fn str(inner: Self) -> Self {
        Self::Str(Box::new(inner))
    }

    #[must_use]
    pub fn is_iri(inner: Self) -> Self {
        Self::IsIri(Box::new(inner))
    }

    #[must_use]
    pub fn is_literal(inner: Self) -> Self {
        Self::IsLiteral(Box::new(inner))
    }

    fn collect_variables(&self, out: &mut BTreeSet<String>) {
        match self {
            Self::Variable(v) | Self::Bound(v) => {
                out.insert(v.name.clone());
            }
            Self::Constant(_) => {}
            Self::Not(inner) | Self::Str(inner) | Self::IsIri(inner) | Self::IsLiteral(inner) => {
                inner.collect_variables(out);
            }
            Self::And(l, r)
            | Self::Or(l, r)
            | Self::Equal(l, r)
            | Self::NotEqual(l, r)
            | Self::Less(l, r)
            | Self::Greater(l, r)
            | Self::Add(l, r) => {
                l.collect_variables(out);
                r.collect_variables(out);
            }
        }
    }
}

impl Expression for Expr {
    fn evaluate(&self, solution: &Solution) -> Result<Term, ExpressionError> {
        match self {
            Self::Variable(v) => solution
                .get(v)
                .cloned()
                .ok_or_else(|| ExpressionError::UnboundVariable(v.name.clone())),
            Self::Constant(term) => Ok(term.clone()),
            Self::Bound(v) => Ok(boolean(solution.has(v))),
            Self::Not(inner) => {
                let value = effective_boolean_value(&inner.evaluate(solution)?)?;
                Ok(boolean(!value))
            }
            Self::And(l, r) => {
                let left = l.evaluate(solution).and_then(|t| effective_boolean_value(&t));
                let right = r.evaluate(solution).and_then(|t| effective_boolean_value(&t));
                match (left, right) {
                    (Ok(false), _) | (_, Ok(false)) => Ok(boolean(false)),
                    (Ok(true), Ok(true)) => Ok(boolean(true)),
                    (Err(e), _) | (_, Err(e)) => Err(e),
                }
            }
            Self::Or(l, r) => {
                let left = l.evaluate(solution).and_then(|t| effective_boolean_value(&t));
                let right = r.evaluate(solution).and_then(|t| effective_boolean_value(&t));
                match (left, right) {
                    (Ok(true), _) | (_, Ok(true)) => Ok(boolean(true)),
                    (Ok(false), Ok(false)) => Ok(boolean(false)),
                    (Err(e), _) | (_, Err(e)) => Err(e),
                }
            }
            Self::Equal(l, r) => {
                let equal = terms_equal(&l.evaluate(solution)?, &r.evaluate(solution)?);
                Ok(boolean(equal))
            }
            Self::NotEqual(l, r) => {
                let equal = terms_equal(&l.evaluate(solution)?, &r.evaluate(solution)?);
                Ok(boolean(!equal))
            }
            Self::Less(l, r) => {
                let ordering = compare(&l.evaluate(solution)?, &r.evaluate(solution)?)?;
                Ok(boolean(ordering == Ordering::Less))
            }
            Self::Greater(l, r) => {
                let ordering = compare(&l.evaluate(solution)?, &r.evaluate(solution)?)?;
                Ok(boolean(ordering == Ordering::Greater))
            }
            Self::Add(l, r) => {
                let left = Numeric::from_term(&l.evaluate(solution)?)?;
                let right = Numeric::from_term(&r.evaluate(solution)?)?;
                Ok(left.add(right).into_term())
            }
            Self::Str(inner) => match inner.evaluate(solution)? {
                Term::NamedNode(node) => Ok(Literal::new_simple_literal(node.as_str()).into()),
                Term::Literal(literal) => Ok(Literal::new_simple_literal(literal.value()).into()),
                other => Err(ExpressionError::TypeError(format!(
                    "str() is not defined for {other}"
                ))),
            },
            Self::IsIri(inner) => Ok(boolean(inner.evaluate(solution)?.is_named_node())),
            Self::IsLiteral(inner) => Ok(boolean(inner.evaluate(solution)?.is_literal())),
        }
    }

    fn variables(&self) -> BTreeSet<String> {
        let mut out = BTreeSet::new();
        self.collect_variables(&mut out);
        out
    }

    fn render(&self, formatter: &dyn TermFormatter) -> String {
        let binary = |op: &str, l: &Self, r: &Self| {
            format!("({op} {} {})", l.render(formatter), r.render(formatter))
        };
        let unary = |op: &str, inner: &Self| format!("({op} {})", inner.render(formatter));
        match self {
            Self::Variable(v) => v.to_string(),
            Self::Constant(term) => formatter.format_term(term),
            Self::Bound(v) => format!("(bound {v})"),
            Self::Not(inner) => unary("!", inner),
            Self::And(l, r) => binary("&&", l, r),
            Self::Or(l, r) => binary("||", l, r),
            Self::Equal(l, r) => binary("=", l, r),
            Self::NotEqual(l, r) => binary("!=", l, r),
            Self::Less(l, r) => binary("<", l, r),
            Self::Greater(l, r) => binary(">", l, r),
            Self::Add(l, r) => binary("+", l, r),
            Self::Str(inner) => unary("str", inner),
            Self::IsIri(inner) => unary("isIRI", inner),
            Self::IsLiteral(inner) => unary("isLiteral", inner),
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(&NTriplesFormatter))
    }
}

/// The effective boolean value of a term.
///
/// Booleans are themselves, numbers are true unless zero or NaN, and plain
/// strings are true unless empty. Everything else is a type error.
///
/// # Errors
///
/// Returns an error if the term has no effective boolean value.
pub fn effective_boolean_value(term: &Term) -> Result<bool, ExpressionError> {
    let Term::Literal(literal) = term else {
        return Err(ExpressionError::TypeError(format!(
            "{term} has no boolean value"
        )));
    };
    let datatype = literal.datatype();
    if datatype == xsd::BOOLEAN {
        return match literal.value() {
            "true" | "1" => Ok(true),
            "false" | "0" => Ok(false),
            other => Err(ExpressionError::TypeError(format!(
                "invalid boolean lexical form {other:?}"
            ))),
        };
    }
    if datatype == xsd::STRING {
        return Ok(!literal.value().is_empty());
    }
    if let Ok(number) = Numeric::from_literal(literal) {
        return Ok(number.is_truthy());
    }
    Err(ExpressionError::TypeError(format!(
        "{term} has no boolean value"
    )))
}

fn boolean(value: bool) -> Term {
    Literal::from(value).into()
}

fn terms_equal(left: &Term, right: &Term) -> bool {
    match (Numeric::from_term(left), Numeric::from_term(right)) {
        (Ok(l), Ok(r)) => l.partial_cmp(r) == Some(Ordering::Equal),
        _ => left == right,
    }
}

fn compare(left: &Term, right: &Term) -> Result<Ordering, ExpressionError> {
    if let (Ok(l), Ok(r)) = (Numeric::from_term(left), Numeric::from_term(right)) {
        return l.partial_cmp(r).ok_or_else(|| {
            ExpressionError::TypeError(format!("{left} and {right} are not ordered"))
        });
    }
    if let (Term::Literal(l), Term::Literal(r)) = (left, right) {
        if l.datatype() == xsd::STRING && r.datatype() == xsd::STRING {
            return Ok(l.value().cmp(r.value()));
        }
    }
    Err(ExpressionError::TypeError(format!(
        "cannot compare {left} with {right}"
    )))
}

#[derive(Debug, Clone, Copy)]
enum Numeric {
    Integer(i64),
    Double(f64),
}

impl Numeric {
    fn from_term(term: &Term) -> Result<Self, ExpressionError> {
        match term {
            Term::Literal(literal) => Self::from_literal(literal),
            other => Err(ExpressionError::TypeError(format!("{other} is not a number"))),
        }
    }

    fn from_literal(literal: &Literal) -> Result<Self, ExpressionError> {
        let datatype = literal.datatype();
        let value = literal.value();
        let invalid = || ExpressionError::TypeError(format!("{literal} is not a number"));
        if datatype == xsd::INTEGER
            || datatype == xsd::INT
            || datatype == xsd::LONG
            || datatype == xsd::SHORT
        {
            return value.parse().map(Self::Integer).map_err(|_| invalid());
        }
        if datatype == xsd::DECIMAL || datatype == xsd::DOUBLE || datatype == xsd::FLOAT {
            return value.parse().map(Self::Double).map_err(|_| invalid());
        }
        Err(invalid())
    }

    #[allow(clippy::cast_precision_loss)]
    const fn as_f64(self) -> f64 {
        match self {
            Self::Integer(i) => i as f64,
            Self::Double(d) => d,
        }
    }

    fn is_truthy(self) -> bool {
        match self {
            Self::Integer(i) => i != 0,
            Self::Double(d) => d != 0.0 && !d.is_nan(),
        }
    }

    fn partial_cmp(self, other: Self) -> Option<Ordering> {
        match (self, other) {
            (Self::Integer(l), Self::Integer(r)) => Some(l.cmp(&r)),
            _ => self.as_f64().partial_cmp(&other.as_f64()),
        }
    }

    fn add(self, other: Self) -> Self {
        match (self, other) {
            (Self::Integer(l), Self::Integer(r)) => l
                .checked_add(r)
                .map_or_else(|| Self::Double(self.as_f64() + other.as_f64()), Self::Integer),
            _ => Self::Double(self.as_f64() + other.as_f64()),
        }
    }

    fn into_term(self) -> Term {
        match self {
            Self::Integer(i) => Literal::from(i).into(),
            Self::Double(d) => Literal::from(d).into(),
        }
    }
}
