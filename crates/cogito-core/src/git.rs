//! Git metadata of the repository handed to `out` as an input.
//!
//! Reads `.git` directly: HEAD (detached or symbolic, loose or packed ref)
//! and the `origin` remote URL, from which owner and repo are derived.

use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum GitError {
    #[error("{path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{0}: no remote \"origin\" url in git config")]
    NoOrigin(PathBuf),
    #[error("cannot extract owner and repo from git remote url {0:?}")]
    RemoteUrl(String),
    #[error("cannot resolve git ref {name:?} in {dir}")]
    UnresolvedRef { name: String, dir: PathBuf },
    #[error("{0}: HEAD is not a commit id: {1:?}")]
    BadHead(PathBuf, String),
}

/// What `out` needs to know about the checked-out commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoMetadata {
    pub url: String,
    pub owner: String,
    pub repo: String,
    pub sha: String,
}

/// Reads metadata of the repository rooted at `dir` (the directory holding `.git`).
pub fn read_metadata(dir: &Path) -> Result<RepoMetadata, GitError> {
    let git_dir = dir.join(".git");
    let url = origin_url(&git_dir)?;
    let (owner, repo) = parse_remote_url(&url)?;
    let sha = head_commit(&git_dir)?;
    Ok(RepoMetadata {
        url,
        owner,
        repo,
        sha,
    })
}

fn read(path: &Path) -> Result<String, GitError> {
    fs::read_to_string(path).map_err(|source| GitError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// `url` of `[remote "origin"]` in `.git/config`.
fn origin_url(git_dir: &Path) -> Result<String, GitError> {
    let path = git_dir.join("config");
    let config = read(&path)?;
    let mut in_origin = false;
    for line in config.lines() {
        let line = line.trim();
        if line.starts_with('[') {
            let section: String = line.chars().filter(|c| !c.is_whitespace()).collect();
            in_origin = section == "[remote\"origin\"]";
            continue;
        }
        if !in_origin {
            continue;
        }
        if let Some((key, value)) = line.split_once('=') {
            if key.trim().eq_ignore_ascii_case("url") {
                return Ok(value.trim().to_string());
            }
        }
    }
    Err(GitError::NoOrigin(path))
}

/// Commit id of HEAD, following one symbolic ref if needed.
fn head_commit(git_dir: &Path) -> Result<String, GitError> {
    let head_path = git_dir.join("HEAD");
    let head = read(&head_path)?;
    let head = head.trim();
    let sha = match head.strip_prefix("ref:") {
        Some(name) => resolve_ref(git_dir, name.trim())?,
        None => head.to_string(),
    };
    if !is_commit_id(&sha) {
        return Err(GitError::BadHead(head_path, sha));
    }
    Ok(sha)
}

fn resolve_ref(git_dir: &Path, name: &str) -> Result<String, GitError> {
    let loose = git_dir.join(name);
    if loose.is_file() {
        return Ok(read(&loose)?.trim().to_string());
    }
    let packed = git_dir.join("packed-refs");
    if packed.is_file() {
        for line in read(&packed)?.lines() {
            if line.starts_with('#') || line.starts_with('^') {
                continue;
            }
            if let Some((sha, ref_name)) = line.split_once(' ') {
                if ref_name.trim() == name {
                    return Ok(sha.trim().to_string());
                }
            }
        }
    }
    Err(GitError::UnresolvedRef {
        name: name.to_string(),
        dir: git_dir.to_path_buf(),
    })
}

fn is_commit_id(s: &str) -> bool {
    s.len() == 40 && s.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Owner and repo from `https://host/o/r.git`, `ssh://git@host:22/o/r`
/// or scp-like `git@host:o/r.git`.
pub fn parse_remote_url(raw: &str) -> Result<(String, String), GitError> {
    let path = if raw.contains("://") {
        let parsed = url::Url::parse(raw).map_err(|_| GitError::RemoteUrl(raw.to_string()))?;
        parsed.path().to_string()
    } else {
        // scp-like syntax: [user@]host:path
        match raw.split_once(':') {
            Some((_, path)) => path.to_string(),
            None => return Err(GitError::RemoteUrl(raw.to_string())),
        }
    };

    let mut segments = path.trim_matches('/').split('/');
    match (segments.next(), segments.next(), segments.next()) {
        (Some(owner), Some(repo), None) if !owner.is_empty() && !repo.is_empty() => {
            let repo = repo.strip_suffix(".git").unwrap_or(repo);
            if repo.is_empty() {
                return Err(GitError::RemoteUrl(raw.to_string()));
            }
            Ok((owner.to_string(), repo.to_string()))
        }
        _ => Err(GitError::RemoteUrl(raw.to_string())),
    }
}
