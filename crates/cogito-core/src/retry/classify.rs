//! Classify an HTTP exchange into a retry verdict.

use crate::transport::{HttpOutcome, TransportError};

/// What the retrier should do with the last attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Success,
    /// Retry after a backoff delay.
    SoftFail,
    /// Stop; the last attempt is the final error.
    HardFail,
}

/// Classifier for commit-status writes.
///
/// Transport failures are not retried blind. A 403 is retried only when the
/// rate-limit quota is exhausted; any other 403 is an authorization failure.
pub fn classify(last: &Result<HttpOutcome, TransportError>) -> Verdict {
    let outcome = match last {
        Ok(o) => o,
        Err(_) => return Verdict::HardFail,
    };
    match outcome.status {
        200..=299 => Verdict::Success,
        500 | 502 | 503 | 504 => Verdict::SoftFail,
        403 if outcome.rate_limit_remaining == 0 => Verdict::SoftFail,
        _ => Verdict::HardFail,
    }
}
