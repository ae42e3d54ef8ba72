//! End-to-end tests at the algebra tree level.
//!
//! Each test file covers a specific scenario: a dataset, a tree, and the
//! multiset the evaluator must produce for it.

#![cfg(test)]


mod test_exists;
mod test_extend;
mod test_join;
mod test_left_join;
mod test_rendering;
mod test_timeout;
