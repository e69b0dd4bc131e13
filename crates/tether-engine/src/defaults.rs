//! Default constants for engine configuration.

/// Unloading an assembly logs a warning once it has waited this long (ms)
/// for other holders to release the context.
pub const DEFAULT_UNLOAD_WARN_AFTER_MS: u64 = 200;

/// Unloading an assembly gives up after waiting this long (ms).
pub const DEFAULT_UNLOAD_TIMEOUT_MS: u64 = 1000;

/// Interval (ms) between holder-count checks while unloading.
pub const DEFAULT_UNLOAD_POLL_INTERVAL_MS: u64 = 10;
