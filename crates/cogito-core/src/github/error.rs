//! Errors surfaced by the commit-status client.

use std::fmt;
use std::time::Duration;

use super::app_token::TokenError;
use crate::retry::PolicyError;
use crate::transport::{HttpOutcome, TransportError};

/// Terminal, user-facing failure of a commit-status write.
///
/// Displays as `<what>\n<details>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusError {
    pub what: String,
    pub status: u16,
    pub details: String,
}

impl fmt::Display for StatusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\n{}", self.what, self.details)
    }
}

impl std::error::Error for StatusError {}

/// Request facts the hint line refers to.
pub(crate) struct HintContext<'a> {
    pub web_url: &'a str,
    pub owner: &'a str,
    pub repo: &'a str,
    pub upper_bound: Duration,
}

impl StatusError {
    pub(crate) fn from_outcome(
        state: &str,
        sha: &str,
        url: &str,
        outcome: &HttpOutcome,
        ctx: &HintContext<'_>,
    ) -> Self {
        let short_sha = sha.get(..7).unwrap_or(sha);
        let what = format!(
            "failed to add state \"{}\" for commit {}: {}",
            state,
            short_sha,
            outcome.status_line()
        );
        let details = format!(
            "Body: {}\nHint: {}\nAction: POST {}\nOAuth: X-Accepted-Oauth-Scopes: {}, X-Oauth-Scopes: {}",
            outcome.body,
            hint(outcome, ctx),
            url,
            outcome.accepted_oauth_scopes,
            outcome.oauth_scopes,
        );
        Self {
            what,
            status: outcome.status,
            details,
        }
    }
}

fn hint(outcome: &HttpOutcome, ctx: &HintContext<'_>) -> String {
    match outcome.status {
        404 => format!(
            "One of the following happened:\n    \
             1. The repo {}/{}/{} doesn't exist\n    \
             2. The user who issued the token doesn't have write access to the repo\n    \
             3. The token doesn't have scope repo:status",
            ctx.web_url, ctx.owner, ctx.repo
        ),
        401 => "Either wrong credentials or the access token has expired (or has been revoked)"
            .to_string(),
        500 => "GitHub API is down".to_string(),
        403 if outcome.rate_limit_remaining == 0 => format!(
            "Rate limited but the wait time to reset would be longer than {:?}",
            ctx.upper_bound
        ),
        _ => "none".to_string(),
    }
}

/// Any failure of [`super::StatusClient::add`].
#[derive(Debug, thiserror::Error)]
pub enum GitHubError {
    #[error(transparent)]
    Status(#[from] StatusError),
    #[error("http client Do: {0}")]
    Transport(TransportError),
    #[error(transparent)]
    Token(#[from] TokenError),
    #[error("encoding commit status: {0}")]
    Encode(serde_json::Error),
    #[error(transparent)]
    Policy(#[from] PolicyError),
}
