//! Process-wide tracing setup for embedding applications.

pub mod tracing;

/// Initialize tracing/logging for the host process.
///
/// Safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    tracing::init();
}
