pub mod config;
pub mod logging;

pub mod gchat;
pub mod git;
pub mod github;
pub mod resource;
pub mod retry;
pub mod transport;
