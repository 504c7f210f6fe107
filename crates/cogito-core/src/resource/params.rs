//! `out` step parameters.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::source::Sink;
use crate::gchat::redact_webhook;
use crate::github::StatusState;

/// Build state as named by the pipeline. `abort` has no GitHub counterpart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildState {
    Pending,
    Success,
    Failure,
    Error,
    Abort,
}

impl BuildState {
    pub fn as_str(self) -> &'static str {
        match self {
            BuildState::Pending => "pending",
            BuildState::Success => "success",
            BuildState::Failure => "failure",
            BuildState::Error => "error",
            BuildState::Abort => "abort",
        }
    }

    /// State sent on the wire; an aborted build is reported as `error`.
    pub fn status_state(self) -> StatusState {
        match self {
            BuildState::Pending => StatusState::Pending,
            BuildState::Success => StatusState::Success,
            BuildState::Failure => StatusState::Failure,
            BuildState::Error | BuildState::Abort => StatusState::Error,
        }
    }
}

impl fmt::Display for BuildState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// States that trigger a chat notification unless configured otherwise.
pub const DEFAULT_CHAT_NOTIFY_ON_STATES: [BuildState; 3] =
    [BuildState::Abort, BuildState::Error, BuildState::Failure];

#[derive(Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PutParams {
    pub state: Option<BuildState>,
    /// Overrides the default context (the job name).
    pub context: Option<String>,
    pub chat_message: Option<String>,
    /// Path relative to the inputs directory.
    pub chat_message_file: Option<String>,
    pub chat_append_summary: Option<bool>,
    pub chat_notify_on_states: Option<Vec<BuildState>>,
    pub gchat_webhook: Option<String>,
    pub sinks: Option<Vec<Sink>>,
}

impl fmt::Debug for PutParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PutParams")
            .field("state", &self.state)
            .field("context", &self.context)
            .field("chat_message", &self.chat_message)
            .field("chat_message_file", &self.chat_message_file)
            .field("chat_append_summary", &self.chat_append_summary)
            .field("chat_notify_on_states", &self.chat_notify_on_states)
            .field(
                "gchat_webhook",
                &self.gchat_webhook.as_deref().map(redact_webhook),
            )
            .field("sinks", &self.sinks)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParamsError {
    #[error("put params: missing keys: state")]
    MissingState,
    #[error("put params: chat_message and chat_message_file are mutually exclusive")]
    ChatMessageConflict,
}

impl PutParams {
    /// Validates and returns the build state.
    pub fn validate(&self) -> Result<BuildState, ParamsError> {
        let state = self.state.ok_or(ParamsError::MissingState)?;
        if self.chat_message.is_some() && self.chat_message_file.is_some() {
            return Err(ParamsError::ChatMessageConflict);
        }
        Ok(state)
    }
}
