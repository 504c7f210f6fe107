pub mod github_server;
pub mod git_repo;
