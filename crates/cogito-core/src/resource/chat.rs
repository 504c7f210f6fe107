//! Chat message composition for the `out` step.

use super::env::BuildEnv;
use super::params::BuildState;
use crate::gchat::ChatMessage;
use crate::git::RepoMetadata;

/// Build facts appended to (or standing in for) a custom chat message.
pub fn summary(state: BuildState, env: &BuildEnv, repo: &RepoMetadata) -> String {
    let short_sha = repo.sha.get(..7).unwrap_or(&repo.sha);
    format!(
        "*state* {}\n*pipeline* {}\n*job* {} #{}\n*commit* {} ({}/{})\n{}",
        state,
        env.pipeline,
        env.job,
        env.build_name,
        short_sha,
        repo.owner,
        repo.repo,
        env.build_url()
    )
}

/// Custom text, followed by the summary when `append_summary` is set. Without
/// custom text the summary is the message.
pub fn compose(
    custom: Option<&str>,
    append_summary: bool,
    state: BuildState,
    env: &BuildEnv,
    repo: &RepoMetadata,
) -> ChatMessage {
    let text = match custom.map(str::trim).filter(|c| !c.is_empty()) {
        Some(c) if append_summary => format!("{}\n\n{}", c, summary(state, env, repo)),
        Some(c) => c.to_string(),
        None => summary(state, env, repo),
    };
    ChatMessage {
        text,
        thread_key: format!("{} {}", env.pipeline, repo.sha),
    }
}
