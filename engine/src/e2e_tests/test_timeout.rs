//! Test the per-query deadline with simulated time.

use crate::config::EngineConfig;
use crate::e2e_tests::helpers::{init_tracing, pattern, social_dataset};
use crate::query::{Algebra, EvaluationError, QueryEngine};
use crate::testing::SimulatedTimeSource;

fn nested_joins() -> Algebra {
    Algebra::join(
        Algebra::join(pattern("?a", "knows", "?b"), pattern("?b", "knows", "?c")),
        pattern("?c", "knows", "?a"),
    )
}

/// The clock moves 30ms per read and the budget is 100ms, so the fourth
/// deadline check fails from inside the nested join.
#[test]
fn test_timeout_unwinds_from_nested_node() {
    init_tracing();
    let dataset = social_dataset();
    let config = EngineConfig::default().with_timeout_ms(100);
    let time = SimulatedTimeSource::new(0).with_step(30);

    let result = QueryEngine::new(&dataset, &config)
        .with_time_source(&time)
        .evaluate(&nested_joins());

    assert_eq!(
        result,
        Err(EvaluationError::Timeout {
            limit_ms: 100,
            elapsed_ms: 120,
        })
    );
    // One read to start the deadline plus four checks.
    assert_eq!(time.reads(), 5);
}

/// Exactly reaching the limit is not a timeout.
#[test]
fn test_timeout_boundary() {
    init_tracing();
    let dataset = social_dataset();
    let config = EngineConfig::default().with_timeout_ms(100);
    let time = SimulatedTimeSource::new(0).with_step(100);

    let result = QueryEngine::new(&dataset, &config)
        .with_time_source(&time)
        .evaluate(&pattern("?a", "knows", "?b"));

    assert_eq!(result.map(|m| m.len()), Ok(3));
    assert_eq!(time.reads(), 2);
}

/// A slow clock with a generous budget finishes normally.
#[test]
fn test_evaluation_within_budget() {
    init_tracing();
    let dataset = social_dataset();
    let config = EngineConfig::default().with_timeout_ms(10_000);
    let time = SimulatedTimeSource::default_start().with_step(1);

    let result = QueryEngine::new(&dataset, &config)
        .with_time_source(&time)
        .evaluate(&nested_joins())
        .expect("finishes within budget");

    assert_eq!(result.len(), 3);
}

/// With the timeout disabled the clock is only read to start the deadline.
#[test]
fn test_disabled_timeout_ignores_clock() {
    init_tracing();
    let dataset = social_dataset();
    let config = EngineConfig::default().without_timeout();
    let time = SimulatedTimeSource::new(0).with_step(1_000_000);

    let result = QueryEngine::new(&dataset, &config)
        .with_time_source(&time)
        .evaluate(&nested_joins())
        .expect("no deadline");

    assert_eq!(result.len(), 3);
    assert_eq!(time.reads(), 1);
}

/// Each evaluation gets its own deadline.
#[test]
fn test_deadline_per_evaluation() {
    init_tracing();
    let dataset = social_dataset();
    let config = EngineConfig::default().with_timeout_ms(100);
    let time = SimulatedTimeSource::new(0);
    let engine = QueryEngine::new(&dataset, &config).with_time_source(&time);

    assert!(engine.evaluate(&pattern("?a", "knows", "?b")).is_ok());
    time.advance(1_000);
    assert!(engine.evaluate(&pattern("?a", "knows", "?b")).is_ok());
}
