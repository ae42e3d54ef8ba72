//! Time source abstraction and per-query deadlines.
//!
//! The evaluator never reads the clock directly. It asks a `TimeSource`, so
//! tests can drive timeouts with simulated time.

use std::time::{SystemTime, UNIX_EPOCH};

/// Abstraction over time operations.
pub trait TimeSource {
    /// Get the current time in milliseconds since Unix epoch.
    fn now_ms(&self) -> u64;
}

/// Real time source using system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    // Milliseconds won't overflow u64 for billions of years
    #[allow(clippy::cast_possible_truncation)]
    fn now_ms(&self) -> u64 {
        // A clock set before 1970 reads as the epoch.
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |duration| duration.as_millis() as u64)
    }
}

/// A fixed point in time after which a query must stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deadline {
    started_ms: u64,
    limit_ms: Option<u64>,
}

impl Deadline {
    /// Start a deadline now. `None` never expires.
    #[must_use]
    pub const fn start(now_ms: u64, limit_ms: Option<u64>) -> Self {
        Self {
            started_ms: now_ms,
            limit_ms,
        }
    }

    /// The time budget, if any.
    #[must_use]
    pub const fn limit_ms(&self) -> Option<u64> {
        self.limit_ms
    }

    /// Milliseconds since the deadline was started.
    #[must_use]
    pub const fn elapsed_ms(&self, now_ms: u64) -> u64 {
        now_ms.saturating_sub(self.started_ms)
    }

    /// Check if more than the budget has elapsed.
    #[must_use]
    pub const fn is_expired(&self, now_ms: u64) -> bool {
        match self.limit_ms {
            Some(limit) => self.elapsed_ms(now_ms) > limit,
            None => false,
        }
    }
}
