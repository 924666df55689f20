//! Ledger tuning.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Timeouts and retry budget for store interaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Upper bound for a single store call (ms)
    #[serde(default = "default_store_timeout_ms")]
    pub store_timeout_ms: u64,

    /// Re-fetch attempts after losing an insert race
    #[serde(default = "default_conflict_retries")]
    pub conflict_retries: u32,

    /// Pause between re-fetch attempts (ms)
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
}

fn default_store_timeout_ms() -> u64 {
    2_000
}

fn default_conflict_retries() -> u32 {
    3
}

fn default_retry_delay_ms() -> u64 {
    25
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            store_timeout_ms: default_store_timeout_ms(),
            conflict_retries: default_conflict_retries(),
            retry_delay_ms: default_retry_delay_ms(),
        }
    }
}

impl LedgerConfig {
    pub fn store_timeout(&self) -> Duration {
        Duration::from_millis(self.store_timeout_ms)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}
