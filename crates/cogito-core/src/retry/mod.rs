//! Retry and backoff policy.
//!
//! This module encapsulates outcome classification (transient upstream
//! failures, rate limiting) and backoff decisions, plus a generic driver that
//! runs a work function until it succeeds, fails hard, or exhausts the
//! session budget.

mod classify;
mod error;
mod policy;
mod run;

pub use classify::{classify, Verdict};
pub use error::RetryFailure;
pub use policy::{backoff, exponential, PolicyError, RetryPolicy};
pub use run::Retrier;
