//! Loader configuration
//!
//! Options can be built in code, or read from a JSON document where every key
//! is optional:
//!
//! ```json
//! { "unload_warn_after_ms": 200, "unload_timeout_ms": 1000, "unload_poll_interval_ms": 10 }
//! ```

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::defaults::{
    DEFAULT_UNLOAD_POLL_INTERVAL_MS, DEFAULT_UNLOAD_TIMEOUT_MS, DEFAULT_UNLOAD_WARN_AFTER_MS,
};
use crate::error::{ReflectError, ReflectResult};

/// Options for [`AssemblyLoader`](crate::AssemblyLoader)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoaderOptions {
    /// Log a warning once an unload has waited this long (ms)
    pub unload_warn_after_ms: u64,
    /// Give up unloading after this long (ms)
    pub unload_timeout_ms: u64,
    /// Poll interval while waiting for holders to release (ms)
    pub unload_poll_interval_ms: u64,
}

impl Default for LoaderOptions {
    fn default() -> Self {
        Self {
            unload_warn_after_ms: DEFAULT_UNLOAD_WARN_AFTER_MS,
            unload_timeout_ms: DEFAULT_UNLOAD_TIMEOUT_MS,
            unload_poll_interval_ms: DEFAULT_UNLOAD_POLL_INTERVAL_MS,
        }
    }
}

impl LoaderOptions {
    /// Parse options from a JSON string
    pub fn from_json_str(json: &str) -> ReflectResult<Self> {
        let options: Self =
            serde_json::from_str(json).map_err(|e| ReflectError::Config(e.to_string()))?;
        options.validate()?;
        Ok(options)
    }

    /// Read options from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> ReflectResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| ReflectError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_json_str(&json)
    }

    /// Set the unload timeout
    pub fn with_unload_timeout(mut self, timeout: Duration) -> Self {
        self.unload_timeout_ms = saturating_millis(timeout);
        self
    }

    /// Set the slow-unload warning threshold
    pub fn with_unload_warn_after(mut self, after: Duration) -> Self {
        self.unload_warn_after_ms = saturating_millis(after);
        self
    }

    /// Unload warning threshold
    pub fn unload_warn_after(&self) -> Duration {
        Duration::from_millis(self.unload_warn_after_ms)
    }

    /// Unload timeout
    pub fn unload_timeout(&self) -> Duration {
        Duration::from_millis(self.unload_timeout_ms)
    }

    /// Poll interval while unloading
    pub fn unload_poll_interval(&self) -> Duration {
        Duration::from_millis(self.unload_poll_interval_ms)
    }

    fn validate(&self) -> ReflectResult<()> {
        if self.unload_poll_interval_ms == 0 {
            return Err(ReflectError::Config(
                "unload_poll_interval_ms must be greater than zero".to_string(),
            ));
        }
        if self.unload_warn_after_ms > self.unload_timeout_ms {
            return Err(ReflectError::Config(format!(
                "unload_warn_after_ms ({}) exceeds unload_timeout_ms ({})",
                self.unload_warn_after_ms, self.unload_timeout_ms
            )));
        }
        Ok(())
    }
}

fn saturating_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
