//! Retry loop: run a work function until success, hard failure, or budget exhaustion.

use std::time::Duration;

use super::classify::Verdict;
use super::error::RetryFailure;
use super::policy::{PolicyError, RetryPolicy};

/// Sequential retry driver. One `run` call is one retry session.
///
/// Sleeping goes through an injectable function so sessions are
/// deterministic under test.
pub struct Retrier<'s> {
    policy: RetryPolicy,
    sleep: Box<dyn FnMut(Duration) + 's>,
}

impl Retrier<'static> {
    /// Retrier that sleeps on the calling thread.
    pub fn new(policy: RetryPolicy) -> Result<Self, PolicyError> {
        Self::with_sleep(policy, std::thread::sleep)
    }
}

impl<'s> Retrier<'s> {
    /// Fails on a policy whose session could never end (zero first delay)
    /// or whose limits sit below the first delay.
    pub fn with_sleep(
        policy: RetryPolicy,
        sleep: impl FnMut(Duration) + 's,
    ) -> Result<Self, PolicyError> {
        policy.validate()?;
        Ok(Self {
            policy,
            sleep: Box::new(sleep),
        })
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Runs `work` until `classify` accepts its result.
    ///
    /// On a soft failure `backoff(first, previous, limit, last)` picks the next
    /// delay. If the cumulative sleep would go beyond the policy's upper bound,
    /// the session ends without sleeping and the last result is returned as
    /// the failure.
    pub fn run<O, E, W, C, B>(
        &mut self,
        mut work: W,
        classify: C,
        backoff: B,
    ) -> Result<O, RetryFailure<O, E>>
    where
        W: FnMut() -> Result<O, E>,
        C: Fn(&Result<O, E>) -> Verdict,
        B: Fn(bool, Duration, Duration, &Result<O, E>) -> Duration,
    {
        let mut delay = self.policy.first_delay;
        let mut cumulative = Duration::ZERO;
        let mut attempt = 1u32;
        loop {
            let last = work();
            match classify(&last) {
                Verdict::Success => {
                    return last.map_err(|e| RetryFailure {
                        last: Err(e),
                        attempts: attempt,
                        budget_exceeded: false,
                    });
                }
                Verdict::HardFail => {
                    return Err(RetryFailure {
                        last,
                        attempts: attempt,
                        budget_exceeded: false,
                    });
                }
                Verdict::SoftFail => {
                    let next = backoff(attempt == 1, delay, self.policy.backoff_limit, &last);
                    cumulative = cumulative.saturating_add(next);
                    if cumulative > self.policy.upper_bound {
                        tracing::warn!(
                            attempt,
                            next = ?next,
                            upper_bound = ?self.policy.upper_bound,
                            "retry budget exhausted"
                        );
                        return Err(RetryFailure {
                            last,
                            attempts: attempt,
                            budget_exceeded: true,
                        });
                    }
                    tracing::info!(attempt, delay = ?next, "soft failure, retrying");
                    (self.sleep)(next);
                    delay = next;
                    attempt += 1;
                }
            }
        }
    }
}
