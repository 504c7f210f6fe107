//! Terminal result of a retry session that did not succeed.

/// The last attempt of a failed session, verbatim.
#[derive(Debug)]
pub struct RetryFailure<O, E> {
    pub last: Result<O, E>,
    /// Number of attempts performed, including the last one.
    pub attempts: u32,
    /// True when the session stopped because the next sleep would exceed the
    /// upper bound, false on a hard failure.
    pub budget_exceeded: bool,
}

impl<O, E> RetryFailure<O, E> {
    pub fn into_last(self) -> Result<O, E> {
        self.last
    }
}
