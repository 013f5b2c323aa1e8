//! Tracing / logging setup shared by the service binaries.

/// Tracing configuration (filters, formatter).
pub mod tracing;

/// Initialize process-wide tracing with `default_filter` as the fallback
/// directive when `RUST_LOG` is not set.
///
/// Safe to call multiple times; subsequent calls are no-ops.
pub fn init(default_filter: &str) {
    tracing::init(default_filter);
}
