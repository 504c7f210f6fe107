//! `out`: publish the build state to the configured sinks.

use anyhow::{anyhow, bail, Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use super::chat;
use super::env::BuildEnv;
use super::params::{BuildState, DEFAULT_CHAT_NOTIFY_ON_STATES};
use super::source::Sink;
use super::{Metadata, PutRequest, Version, VersionResponse};
use crate::gchat;
use crate::git::{self, RepoMetadata};
use crate::github::{api_base_url, CommitStatusRequest, StatusClient, Target};
use crate::retry::RetryPolicy;

/// Everything `out` takes from its surroundings besides the request.
#[derive(Debug, Clone)]
pub struct PutContext {
    /// Directory holding the step inputs (argv[1] of `out`).
    pub inputs_dir: PathBuf,
    pub env: BuildEnv,
    pub retry: RetryPolicy,
}

pub fn run(req: PutRequest, ctx: &PutContext) -> Result<VersionResponse> {
    let source = &req.source;
    let params = &req.params;
    source.validate()?;
    let state = params.validate()?;
    tracing::debug!(source = ?source, params = ?params, "put");

    let webhook = params
        .gchat_webhook
        .as_deref()
        .or(source.gchat_webhook.as_deref())
        .filter(|w| !w.trim().is_empty());
    let sinks = effective_sinks(params.sinks.as_deref().or(source.sinks.as_deref()), webhook)?;

    let repo_dir = find_repo_dir(&ctx.inputs_dir, params.chat_message_file.as_deref())?;
    let repo = git::read_metadata(&repo_dir)
        .with_context(|| format!("reading git metadata of {}", repo_dir.display()))?;
    check_same_repo(source.owner.as_str(), source.repo.as_str(), &repo)?;

    let mut errors: Vec<anyhow::Error> = Vec::new();

    if sinks.contains(&Sink::Github) {
        if let Err(e) = publish_status(&req, state, &repo, ctx) {
            errors.push(e);
        }
    }

    if let (true, Some(webhook)) = (sinks.contains(&Sink::Gchat), webhook) {
        let notify_on = params
            .chat_notify_on_states
            .as_deref()
            .or(source.chat_notify_on_states.as_deref())
            .unwrap_or(&DEFAULT_CHAT_NOTIFY_ON_STATES);
        if notify_on.contains(&state) {
            if let Err(e) = notify_chat(&req, state, &repo, webhook, ctx) {
                errors.push(e);
            }
        } else {
            tracing::debug!(%state, "state not in chat_notify_on_states, skipping chat");
        }
    }

    if !errors.is_empty() {
        let joined: Vec<String> = errors.iter().map(|e| format!("{:#}", e)).collect();
        bail!(joined.join("\n"));
    }

    Ok(VersionResponse {
        version: Version::dummy(),
        metadata: vec![Metadata {
            name: "state".to_string(),
            value: state.to_string(),
        }],
    })
}

/// Explicit sinks win; otherwise GitHub, plus chat when a webhook is configured.
fn effective_sinks(configured: Option<&[Sink]>, webhook: Option<&str>) -> Result<Vec<Sink>> {
    let sinks = match configured {
        Some(s) if !s.is_empty() => s.to_vec(),
        _ => {
            let mut s = vec![Sink::Github];
            if webhook.is_some() {
                s.push(Sink::Gchat);
            }
            s
        }
    };
    if sinks.contains(&Sink::Gchat) && webhook.is_none() {
        bail!("sink gchat requires gchat_webhook (in source or params)");
    }
    Ok(sinks)
}

/// The single input directory that is a git repository. The directory of
/// `chat_message_file`, if any, is not a candidate.
fn find_repo_dir(inputs_dir: &Path, chat_message_file: Option<&str>) -> Result<PathBuf> {
    let message_dir = chat_message_file
        .and_then(|f| Path::new(f).components().next())
        .map(|c| c.as_os_str().to_os_string());

    let mut candidates = Vec::new();
    let entries = fs::read_dir(inputs_dir)
        .with_context(|| format!("listing inputs directory {}", inputs_dir.display()))?;
    for entry in entries {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        if message_dir.as_deref() == Some(entry.file_name().as_os_str()) {
            continue;
        }
        candidates.push(entry.path());
    }
    candidates.sort();

    match candidates.len() {
        0 => bail!(
            "put step needs a git repository as input, found none in {}",
            inputs_dir.display()
        ),
        1 => Ok(candidates.remove(0)),
        _ => {
            let names: Vec<String> = candidates
                .iter()
                .filter_map(|p| p.file_name())
                .map(|n| n.to_string_lossy().into_owned())
                .collect();
            bail!(
                "put step needs exactly one git repository as input, found {}: {} (restrict them with 'inputs:')",
                names.len(),
                names.join(", ")
            )
        }
    }
}

fn check_same_repo(owner: &str, repo: &str, git: &RepoMetadata) -> Result<()> {
    if owner.eq_ignore_ascii_case(&git.owner) && repo.eq_ignore_ascii_case(&git.repo) {
        return Ok(());
    }
    Err(anyhow!(
        "the received git repository is incompatible with the source configuration.\n\n\
         Git repository configuration (received as 'inputs:' in this put step):\n      \
         url: {}\n    \
         owner: {}\n     \
         repo: {}\n\n\
         Source configuration:\n    \
         owner: {}\n     \
         repo: {}",
        git.url,
        git.owner,
        git.repo,
        owner,
        repo
    ))
}

fn publish_status(
    req: &PutRequest,
    state: BuildState,
    repo: &RepoMetadata,
    ctx: &PutContext,
) -> Result<()> {
    let source = &req.source;
    let target = Target::new(api_base_url(source.github_hostname.as_deref()), ctx.retry);
    let mut client = StatusClient::new(target, source.credentials()?)?;

    let target_url = if source.omit_target_url {
        None
    } else {
        Some(ctx.env.build_url())
    };
    let status = CommitStatusRequest {
        owner: source.owner.clone(),
        repo: source.repo.clone(),
        sha: repo.sha.clone(),
        state: state.status_state(),
        context: ctx.env.context(
            source.context_prefix.as_deref(),
            req.params.context.as_deref(),
        ),
        target_url,
        description: Some(ctx.env.description()),
    };
    client.add(&status)?;
    Ok(())
}

fn notify_chat(
    req: &PutRequest,
    state: BuildState,
    repo: &RepoMetadata,
    webhook: &str,
    ctx: &PutContext,
) -> Result<()> {
    let params = &req.params;
    let custom = match (&params.chat_message, &params.chat_message_file) {
        (Some(m), _) => Some(m.clone()),
        (None, Some(file)) => {
            let path = ctx.inputs_dir.join(file);
            Some(
                fs::read_to_string(&path)
                    .with_context(|| format!("reading chat_message_file {}", path.display()))?,
            )
        }
        (None, None) => None,
    };
    let append_summary = params
        .chat_append_summary
        .or(req.source.chat_append_summary)
        .unwrap_or(true);
    let msg = chat::compose(custom.as_deref(), append_summary, state, &ctx.env, repo);
    gchat::send(webhook, &msg)?;
    Ok(())
}
