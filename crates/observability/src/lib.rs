//! Logging setup shared by services embedding the import ledger.

/// Initialize process-wide logging.
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    tracing::init();
}

/// Initialize with explicit filter directives, ignoring `RUST_LOG`.
pub fn init_with_filter(directives: &str) {
    tracing::init_with_filter(directives);
}

/// Tracing configuration (filters, layers).
pub mod tracing;
