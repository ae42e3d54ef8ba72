//! Query algebra evaluation.
//!
//! This module evaluates compiled algebra trees over a triple dataset. It
//! supports:
//! - Triple patterns and basic graph patterns
//! - Join, optional join (with filter), union and minus
//! - EXISTS / NOT EXISTS
//! - Extend, filter, distinct, project and slice
//!
//! # Example
//!
//! ```
//! use engine::config::EngineConfig;
//! use engine::dataset::MemoryDataset;
//! use engine::query::{Algebra, PatternItem, QueryEngine, TriplePattern};
//! use engine::term::{NamedNode, Term};
//!
//! let iri = |name: &str| {
//!     Term::from(NamedNode::new_unchecked(format!("http://example.org/{name}")))
//! };
//!
//! let mut dataset = MemoryDataset::new();
//! dataset.insert_terms(iri("alice"), iri("knows"), iri("bob")).unwrap();
//! let config = EngineConfig::default();
//! let engine = QueryEngine::new(&dataset, &config);
//!
//! let tree = Algebra::pattern(
//!     TriplePattern::new(
//!         PatternItem::variable("who"),
//!         PatternItem::constant(iri("knows")),
//!         PatternItem::constant(iri("bob")),
//!     )
//!     .unwrap(),
//! );
//!
//! let result = engine.evaluate(&tree).unwrap();
//! assert_eq!(result.solutions()[0].get_by_name("who"), Some(&iri("alice")));
//! ```

pub mod algebra;
pub mod context;
pub mod engine;
pub mod error;
pub mod expression;
pub mod format;
pub mod matcher;
pub mod multiset;
pub mod pattern;
pub mod solution;

pub use algebra::{Algebra, Assignment, Assignments};
pub use context::EvaluationContext;
pub use engine::QueryEngine;
pub use error::{AlgebraError, EvaluationError, PatternError};
pub use expression::{Expr, Expression, ExpressionError, effective_boolean_value};
pub use format::{NTriplesFormatter, PrefixFormatter, TermFormatter};
pub use matcher::match_pattern;
pub use multiset::Multiset;
pub use pattern::{IndexPath, PatternItem, TriplePattern};
pub use solution::Solution;
