//! Commit-status client: `POST /repos/{owner}/{repo}/statuses/{sha}`.

use http::Method;
use serde::Serialize;
use std::fmt;
use std::time::Duration;

use super::app_token::mint_installation_token;
use super::error::{GitHubError, HintContext, StatusError};
use super::{Credentials, Target};
use crate::retry::{backoff, classify, Retrier};
use crate::transport::{self, Request};

/// States accepted by the commit-status API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusState {
    Pending,
    Success,
    Failure,
    Error,
}

impl StatusState {
    pub fn as_str(self) -> &'static str {
        match self {
            StatusState::Pending => "pending",
            StatusState::Success => "success",
            StatusState::Failure => "failure",
            StatusState::Error => "error",
        }
    }
}

impl fmt::Display for StatusState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitStatusRequest {
    pub owner: String,
    pub repo: String,
    /// Full hex commit digest.
    pub sha: String,
    pub state: StatusState,
    pub context: String,
    pub target_url: Option<String>,
    pub description: Option<String>,
}

#[derive(Serialize)]
struct StatusBody<'a> {
    state: StatusState,
    target_url: Option<&'a str>,
    description: Option<&'a str>,
    context: &'a str,
}

/// Publishes commit statuses for one [`Target`].
pub struct StatusClient<'s> {
    target: Target,
    credentials: Credentials,
    retrier: Retrier<'s>,
}

impl StatusClient<'static> {
    pub fn new(target: Target, credentials: Credentials) -> Result<Self, GitHubError> {
        let retrier = Retrier::new(target.retry)?;
        Ok(Self {
            target,
            credentials,
            retrier,
        })
    }
}

impl<'s> StatusClient<'s> {
    /// Client whose retries sleep through `sleep` instead of the thread.
    pub fn with_sleep(
        target: Target,
        credentials: Credentials,
        sleep: impl FnMut(Duration) + 's,
    ) -> Result<Self, GitHubError> {
        let retrier = Retrier::with_sleep(target.retry, sleep)?;
        Ok(Self {
            target,
            credentials,
            retrier,
        })
    }

    pub fn target(&self) -> &Target {
        &self.target
    }

    /// Adds one commit status, retrying on rate limiting and transient
    /// upstream failures.
    pub fn add(&mut self, req: &CommitStatusRequest) -> Result<(), GitHubError> {
        let url = format!(
            "{}/repos/{}/{}/statuses/{}",
            self.target.server, req.owner, req.repo, req.sha
        );

        let authorization = match &self.credentials {
            Credentials::PersonalToken(token) => format!("token {}", token),
            Credentials::App(identity) => {
                let token = mint_installation_token(&self.target.server, identity)?;
                format!("Bearer {}", token)
            }
        };

        let body = serde_json::to_vec(&StatusBody {
            state: req.state,
            target_url: req.target_url.as_deref(),
            description: req.description.as_deref(),
            context: &req.context,
        })
        .map_err(GitHubError::Encode)?;

        let request = Request::new(Method::POST, &url)
            .header("Authorization", authorization)
            .header("Accept", "application/vnd.github.v3+json")
            .header("Content-Type", "application/json")
            .body(body);

        tracing::debug!(
            state = %req.state,
            context = %req.context,
            sha = %req.sha,
            "adding commit status"
        );

        match self
            .retrier
            .run(|| transport::execute(&request), classify, backoff)
        {
            Ok(outcome) => {
                tracing::info!(
                    state = %req.state,
                    status = outcome.status,
                    remaining = outcome.rate_limit_remaining,
                    "commit status added"
                );
                Ok(())
            }
            Err(failure) => match failure.last {
                Err(e) => Err(GitHubError::Transport(e)),
                Ok(outcome) => {
                    let web_url = self.target.web_url();
                    let ctx = HintContext {
                        web_url: &web_url,
                        owner: &req.owner,
                        repo: &req.repo,
                        upper_bound: self.target.retry.upper_bound,
                    };
                    Err(StatusError::from_outcome(
                        req.state.as_str(),
                        &req.sha,
                        &url,
                        &outcome,
                        &ctx,
                    )
                    .into())
                }
            },
        }
    }
}
