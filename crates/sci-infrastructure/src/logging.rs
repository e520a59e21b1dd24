//! Logging bootstrap.
//!
//! One tracing-subscriber installation per process, filtered by `RUST_LOG`
//! with a sensible default. The MCP transport logs to stderr so stdout
//! stays clean for the protocol stream.

use tracing_subscriber::EnvFilter;

/// Install the global subscriber for server and CLI runs.
pub fn init(default_directive: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// Install the global subscriber for stdio transports: everything to
/// stderr, stdout reserved for the protocol.
pub fn init_stderr(default_directive: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
