//! Runtime configuration.
//!
//! The hosting platform ships a [`RuntimeConfig`] with each job. Every field
//! has a default, so a partial document deserializes cleanly:
//!
//! ```
//! use xqrt_runtime::RuntimeConfig;
//!
//! let config: RuntimeConfig = serde_json::from_str(r#"{ "chunk_size": 64 }"#).unwrap();
//! assert_eq!(config.chunk_size, 64);
//! assert_eq!(config.max_call_depth, 256);
//! ```

use serde::{Deserialize, Serialize};

/// Default materialization chunk size, in items.
pub const DEFAULT_CHUNK_SIZE: usize = 1024;

/// Default maximum number of items a single materialization may hold.
pub const DEFAULT_MAX_MATERIALIZED_ITEMS: usize = 1_000_000;

/// Default maximum nesting of user-defined function calls.
pub const DEFAULT_MAX_CALL_DEPTH: usize = 256;

/// Configuration options for plan evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Growth step for materialized buffers, in items.
    ///
    /// This mirrors the platform's record-batch size. It is a capacity hint
    /// only; results are never split at chunk boundaries.
    pub chunk_size: usize,
    /// Maximum number of items a single materialization may hold.
    ///
    /// Exceeding it raises `XQRT0001`. Set to 0 to disable the limit.
    pub max_materialized_items: usize,
    /// Maximum nesting depth of user-defined function calls.
    ///
    /// Exceeding it raises `XQRT0002`.
    pub max_call_depth: usize,
}

impl RuntimeConfig {
    /// Creates a new configuration with defaults.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            max_materialized_items: DEFAULT_MAX_MATERIALIZED_ITEMS,
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
        }
    }

    /// Sets the materialization chunk size.
    #[must_use]
    pub const fn with_chunk_size(mut self, size: usize) -> Self {
        self.chunk_size = size;
        self
    }

    /// Sets the maximum number of items per materialization.
    #[must_use]
    pub const fn with_max_materialized_items(mut self, limit: usize) -> Self {
        self.max_materialized_items = limit;
        self
    }

    /// Sets the maximum call depth.
    #[must_use]
    pub const fn with_max_call_depth(mut self, depth: usize) -> Self {
        self.max_call_depth = depth;
        self
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self::new()
    }
}
