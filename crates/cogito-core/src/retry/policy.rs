use std::time::Duration;

use crate::transport::{HttpOutcome, TransportError};

/// Delays bounding one retry session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Delay before the second attempt.
    pub first_delay: Duration,
    /// Upper bound on a single backoff delay.
    pub backoff_limit: Duration,
    /// Upper bound on the cumulative sleep of the session.
    pub upper_bound: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            first_delay: Duration::from_secs(2),
            backoff_limit: Duration::from_secs(60),
            upper_bound: Duration::from_secs(15 * 60),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PolicyError {
    #[error("retry first delay must be positive")]
    ZeroFirstDelay,
    #[error("retry backoff limit ({limit:?}) must not be smaller than the first delay ({first:?})")]
    LimitBelowFirst { first: Duration, limit: Duration },
    #[error("retry upper bound ({bound:?}) must not be smaller than the first delay ({first:?})")]
    BoundBelowFirst { first: Duration, bound: Duration },
}

impl RetryPolicy {
    /// Checks `upper_bound >= first_delay > 0` and `backoff_limit >= first_delay`.
    pub fn validate(&self) -> Result<(), PolicyError> {
        if self.first_delay.is_zero() {
            return Err(PolicyError::ZeroFirstDelay);
        }
        if self.backoff_limit < self.first_delay {
            return Err(PolicyError::LimitBelowFirst {
                first: self.first_delay,
                limit: self.backoff_limit,
            });
        }
        if self.upper_bound < self.first_delay {
            return Err(PolicyError::BoundBelowFirst {
                first: self.first_delay,
                bound: self.upper_bound,
            });
        }
        Ok(())
    }
}

/// Exponential backoff: `previous` on the first retry, then doubling up to `limit`.
pub fn exponential(first: bool, previous: Duration, limit: Duration) -> Duration {
    if first {
        return previous;
    }
    previous.saturating_mul(2).min(limit)
}

/// Backoff for commit-status writes.
///
/// A rate-limited response carries the instant the quota resets; the delay is
/// taken from the response's own `Date`, so client clock skew does not matter.
/// A reset at or before `Date` (server race, skew, missing header) falls back
/// to [`exponential`] instead of giving up.
pub fn backoff(
    first: bool,
    previous: Duration,
    limit: Duration,
    last: &Result<HttpOutcome, TransportError>,
) -> Duration {
    if let Ok(outcome) = last {
        if outcome.is_rate_limited() {
            let server_delay = outcome.rate_limit_reset - outcome.date;
            if let Ok(delay) = server_delay.to_std() {
                if !delay.is_zero() {
                    return delay;
                }
            }
            tracing::debug!(
                reset = %outcome.rate_limit_reset,
                date = %outcome.date,
                "rate limit reset not in the future, using exponential backoff"
            );
        }
    }
    exponential(first, previous, limit)
}
