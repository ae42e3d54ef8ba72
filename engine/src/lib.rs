// Life of a query:
// 1. An upstream parser/optimizer hands over a compiled algebra tree
// 2. The evaluator walks the tree depth-first:
//     - Patterns and BGPs look up candidate triples in the dataset
//     - Binary operators evaluate the left side first and feed its
//       bindings into the right side where that is safe
//     - Modifiers (extend, filter, distinct, project, slice) transform
//       their child's result
// 3. The resulting multiset of solutions goes to a downstream serializer
//
// System components:
//  - Dataset contract (plus an in-memory implementation)
//  - Multiset combinators
//  - Recursive evaluator with a per-query deadline

pub mod config;
pub mod dataset;
pub mod query;
pub mod term;
pub mod time;

#[cfg(test)]
mod e2e_tests;

pub use config::EngineConfig;
pub use dataset::{Dataset, DatasetError, MemoryDataset};
pub use query::{Algebra, EvaluationError, Multiset, QueryEngine, Solution};
pub use term::{Position, Triple, Variable};
