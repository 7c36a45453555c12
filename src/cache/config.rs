//! Cache configuration.
//!
//! Controls the transient store and flush pipeline via `vetrina.toml`.

use std::num::NonZeroUsize;

use serde::Deserialize;
use time::Duration;

const DEFAULT_TRANSIENT_TTL_SECONDS: u64 = 12 * 60 * 60;
const DEFAULT_TRANSIENT_CAPACITY: usize = 64;
const DEFAULT_CONSUME_BATCH_LIMIT: usize = 100;

/// Cache configuration from `vetrina.toml`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Enable the transient store.
    pub enabled: bool,
    /// Seconds before a transient entry expires.
    pub transient_ttl_seconds: u64,
    /// Maximum transient entries before LRU eviction.
    pub transient_capacity: usize,
    /// Maximum events per flush batch.
    pub consume_batch_limit: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            transient_ttl_seconds: DEFAULT_TRANSIENT_TTL_SECONDS,
            transient_capacity: DEFAULT_TRANSIENT_CAPACITY,
            consume_batch_limit: DEFAULT_CONSUME_BATCH_LIMIT,
        }
    }
}

impl From<&crate::config::CacheSettings> for CacheConfig {
    fn from(settings: &crate::config::CacheSettings) -> Self {
        Self {
            enabled: settings.enabled,
            transient_ttl_seconds: settings.transient_ttl_seconds,
            transient_capacity: settings.transient_capacity,
            consume_batch_limit: settings.consume_batch_limit,
        }
    }
}

impl CacheConfig {
    /// Returns true if the transient store is enabled.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Returns the entry TTL as a duration.
    pub fn transient_ttl(&self) -> Duration {
        Duration::seconds(self.transient_ttl_seconds as i64)
    }

    /// Returns the transient capacity as NonZeroUsize, clamping to 1 if zero.
    pub fn transient_capacity_non_zero(&self) -> NonZeroUsize {
        NonZeroUsize::new(self.transient_capacity).unwrap_or(NonZeroUsize::MIN)
    }
}
