//! Tracing/logging initialization.
//!
//! The sync engine runs embedded in a desktop shell, so logs go to stderr as
//! JSON lines the shell can collect. `RUST_LOG` overrides the filter; the
//! default keeps the engine's own crates at debug and everything else at
//! info, which is what field diagnostics of flaky-connectivity reports need.

use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "info,safetycheck_sync=debug,safetycheck_gateway=debug";

/// Initialize tracing/logging for the process.
///
/// Safe to call multiple times (subsequent calls are no-ops).
pub fn init() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .json()
        .with_timer(tracing_subscriber::fmt::time::SystemTime)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init();
}

#[cfg(test)]
mod tests {
    #[test]
    fn init_is_idempotent() {
        super::init();
        super::init();
    }
}
