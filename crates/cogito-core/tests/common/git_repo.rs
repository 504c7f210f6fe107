//! Fake git checkouts: just enough of `.git` for metadata reading.

#![allow(dead_code)]

use std::fs;
use std::path::Path;

pub const SHA: &str = "32e4b4f91bb8de500f6a7aa2011f93c3f322381c";

/// Creates `<inputs>/<name>/.git` with a detached HEAD at [`SHA`] and an
/// `origin` remote pointing at `url`.
pub fn create(inputs: &Path, name: &str, url: &str) {
    let git = inputs.join(name).join(".git");
    fs::create_dir_all(git.join("refs/heads")).unwrap();
    fs::write(git.join("HEAD"), format!("{}\n", SHA)).unwrap();
    fs::write(
        git.join("config"),
        format!(
            "[core]\n\trepositoryformatversion = 0\n[remote \"origin\"]\n\turl = {}\n\tfetch = +refs/heads/*:refs/remotes/origin/*\n",
            url
        ),
    )
    .unwrap();
}
