//! Logging init: stderr only, since stdout carries the resource protocol.

use tracing_subscriber::EnvFilter;

/// Level used when neither `RUST_LOG` nor `source.log_level` says otherwise.
pub const DEFAULT_LEVEL: &str = "info";

/// Initialize structured logging to stderr at `level` (`debug`, `info`, ...).
///
/// `RUST_LOG` wins when set. Calling this more than once is harmless; the
/// first subscriber stays installed.
pub fn init_logging(level: Option<&str>) {
    let level = level.filter(|l| !l.trim().is_empty()).unwrap_or(DEFAULT_LEVEL);
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LEVEL));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(false)
        .try_init();
}
