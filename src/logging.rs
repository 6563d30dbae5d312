//! tracing subscriber setup for the binary.

use tracing_subscriber::{fmt, EnvFilter};

/// Filter comes from `RUST_LOG`, `info` when unset. Logs go to stderr so the
/// tables on stdout stay clean.
pub fn init() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!("logger initialized");
}
