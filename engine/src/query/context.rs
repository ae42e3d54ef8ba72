//! Per-query evaluation state.
//!
//! The `EvaluationContext` holds the input multiset for the node currently
//! being evaluated, together with the dataset, the configuration and the
//! deadline. It is created for one evaluation and passed by `&mut` through
//! the recursion; nothing else mutates it.

use std::sync::Arc;

use tracing::debug;

use super::error::EvaluationError;
use super::multiset::Multiset;
use crate::config::EngineConfig;
use crate::dataset::Dataset;
use crate::time::{Deadline, TimeSource};

/// The mutable state of one evaluation.
pub struct EvaluationContext<'a> {
    input: Arc<Multiset>,
    dataset: &'a dyn Dataset,
    config: &'a EngineConfig,
    time: &'a dyn TimeSource,
    deadline: Deadline,
}

impl<'a> EvaluationContext<'a> {
    /// Start an evaluation: the deadline is taken from the time source now.
    pub fn new(
        input: Multiset,
        dataset: &'a dyn Dataset,
        config: &'a EngineConfig,
        time: &'a dyn TimeSource,
    ) -> Self {
        let deadline = Deadline::start(time.now_ms(), config.query_timeout_ms);
        Self {
            input: Arc::new(input),
            dataset,
            config,
            time,
            deadline,
        }
    }

    /// The multiset the current node is evaluated against.
    #[must_use]
    pub fn input(&self) -> &Multiset {
        &self.input
    }

    /// A shared handle to the current input.
    #[must_use]
    pub fn shared_input(&self) -> Arc<Multiset> {
        Arc::clone(&self.input)
    }

    /// Replace the input, returning the previous one.
    pub fn replace_input(&mut self, input: Arc<Multiset>) -> Arc<Multiset> {
        std::mem::replace(&mut self.input, input)
    }

    /// Run `f` with `input` installed, restoring the previous input afterwards,
    /// whether `f` succeeds or not.
    pub fn with_input<T>(
        &mut self,
        input: Arc<Multiset>,
        f: impl FnOnce(&mut Self) -> Result<T, EvaluationError>,
    ) -> Result<T, EvaluationError> {
        let previous = self.replace_input(input);
        let result = f(self);
        self.input = previous;
        result
    }

    #[must_use]
    pub fn dataset(&self) -> &'a dyn Dataset {
        self.dataset
    }

    #[must_use]
    pub const fn config(&self) -> &'a EngineConfig {
        self.config
    }

    /// Fail if the deadline has passed.
    ///
    /// # Errors
    ///
    /// Returns [`EvaluationError::Timeout`] once the time budget is spent.
    pub fn check_timeout(&self) -> Result<(), EvaluationError> {
        let Some(limit_ms) = self.deadline.limit_ms() else {
            return Ok(());
        };
        let now = self.time.now_ms();
        if self.deadline.is_expired(now) {
            let elapsed_ms = self.deadline.elapsed_ms(now);
            debug!(limit_ms, elapsed_ms, "query deadline exceeded");
            return Err(EvaluationError::Timeout {
                limit_ms,
                elapsed_ms,
            });
        }
        Ok(())
    }
}
