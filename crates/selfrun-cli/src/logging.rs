//! Diagnostic logging for the binaries.
//!
//! Off unless asked for: the launcher shares stderr with the payload, so the
//! default filter only lets warnings through. Set `SELFRUN_LOG=debug` to
//! trace trailer lookup and bootstrap stages.

use selfrun_runtime::LOG_ENV;
use tracing_subscriber::EnvFilter;

/// Install the stderr subscriber. Safe to call more than once.
pub fn init() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
