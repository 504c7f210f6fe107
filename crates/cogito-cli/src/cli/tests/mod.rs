//! CLI dispatch tests (multi-file to keep each file small).

use super::{parse_invocation, CliCommand};

pub(super) fn args(argv: &[&str]) -> Vec<String> {
    argv.iter().map(|s| s.to_string()).collect()
}

pub(super) fn parse(argv: &[&str]) -> CliCommand {
    parse_invocation(&args(argv)).unwrap().command
}
