//! Polling an operation until it satisfies a predicate
//!
//! The sensor applies reboots, resets and firmware updates in the
//! background, so their effects can only be observed by asking again. The
//! [`poll`] function does the asking with a fixed interval and a hard
//! attempt budget.
//!
//! # Attempts
//!
//! Each attempt runs the operation once:
//! - `Err(_)` is logged and counted as a failed attempt, never propagated
//! - `Ok(v)` where the predicate holds ends the poll with `Found`
//! - `Ok(v)` where it does not is a failed attempt
//!
//! The engine sleeps between attempts but not after the last one. Running
//! out of attempts yields [`PollOutcome::NotFound`]; deciding whether that
//! is fatal is up to the caller.
//!
//! # Examples
//!
//! ```rust
//! use sensorpc_client::{poll, RetrySpec};
//! use std::time::Duration;
//!
//! # async fn example() {
//! let mut calls = 0;
//! let outcome = poll(
//!     &RetrySpec::new(5, Duration::ZERO),
//!     || {
//!         calls += 1;
//!         let n = calls;
//!         async move { Ok::<_, String>(n) }
//!     },
//!     |n| *n == 3,
//! )
//! .await;
//! assert_eq!(outcome.found(), Some(3));
//! # }
//! ```

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

/// Attempt budget used by the convergence checks unless overridden
pub const DEFAULT_MAX_ATTEMPTS: u32 = 15;
/// Interval used by the convergence checks unless overridden
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(1);

/// Fixed-interval attempt budget for a single poll
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetrySpec {
    max_attempts: u32,
    interval: Duration,
}

impl RetrySpec {
    /// Create a budget; `max_attempts` below 1 is raised to 1
    pub fn new(max_attempts: u32, interval: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            interval,
        }
    }

    /// Maximum number of attempts
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Pause between attempts
    pub fn interval(&self) -> Duration {
        self.interval
    }
}

impl Default for RetrySpec {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS, DEFAULT_INTERVAL)
    }
}

/// Result of a poll
#[derive(Debug, Clone, PartialEq)]
pub enum PollOutcome<T> {
    /// The predicate held
    Found {
        /// The accepted value
        value: T,
        /// Attempts used, including the successful one
        attempts: u32,
    },
    /// The budget ran out
    NotFound {
        /// Attempts used
        attempts: u32,
    },
}

impl<T> PollOutcome<T> {
    /// The accepted value, if any
    pub fn found(self) -> Option<T> {
        match self {
            PollOutcome::Found { value, .. } => Some(value),
            PollOutcome::NotFound { .. } => None,
        }
    }

    /// True for `Found`
    pub fn is_found(&self) -> bool {
        matches!(self, PollOutcome::Found { .. })
    }

    /// Attempts spent either way
    pub fn attempts(&self) -> u32 {
        match self {
            PollOutcome::Found { attempts, .. } | PollOutcome::NotFound { attempts } => *attempts,
        }
    }
}

/// Run `operation` until `predicate` accepts its output or the budget runs out
pub async fn poll<T, E, F, Fut, P>(retry: &RetrySpec, mut operation: F, mut predicate: P) -> PollOutcome<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
    P: FnMut(&T) -> bool,
{
    for attempt in 1..=retry.max_attempts {
        match operation().await {
            Ok(value) if predicate(&value) => {
                tracing::debug!(attempt, "Poll condition met");
                return PollOutcome::Found {
                    value,
                    attempts: attempt,
                };
            }
            Ok(_) => {
                tracing::debug!(attempt, max_attempts = retry.max_attempts, "Poll condition not met");
            }
            Err(e) => {
                tracing::debug!(attempt, max_attempts = retry.max_attempts, error = %e, "Poll attempt failed");
            }
        }

        if attempt < retry.max_attempts && !retry.interval.is_zero() {
            tokio::time::sleep(retry.interval).await;
        }
    }

    tracing::warn!(attempts = retry.max_attempts, "Poll budget exhausted");
    PollOutcome::NotFound {
        attempts: retry.max_attempts,
    }
}
