//! Error types for mutant-ledger

use thiserror::Error;

use crate::key::ContentKey;

/// Failures reported by a [`LedgerStore`](crate::store::LedgerStore).
///
/// A store must never report an outage as a missing record: `Ok(None)`
/// from `get` means the key is genuinely absent.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Database error: {0}")]
    Database(#[from] sled::Error),

    #[error("Codec error: {0}")]
    Codec(String),

    #[error("Corrupt entry: {0}")]
    Corrupt(String),
}

impl From<rmp_serde::encode::Error> for StoreError {
    fn from(e: rmp_serde::encode::Error) -> Self {
        StoreError::Codec(format!("Serialization error: {}", e))
    }
}

impl From<rmp_serde::decode::Error> for StoreError {
    fn from(e: rmp_serde::decode::Error) -> Self {
        StoreError::Codec(format!("Deserialization error: {}", e))
    }
}

/// Failures surfaced by [`AnalysisLedger`](crate::AnalysisLedger).
#[derive(Error, Debug)]
pub enum LedgerError {
    /// The backing store failed or is unreachable.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A store call did not finish within the configured timeout.
    #[error("Store {operation} timed out after {after_ms}ms")]
    Timeout {
        operation: &'static str,
        after_ms: u64,
    },

    /// Another caller won the insert race but its record never became
    /// readable within the retry budget.
    #[error("Record {key} still unreadable after {attempts} re-fetch attempts")]
    Contended { key: ContentKey, attempts: u32 },
}

impl LedgerError {
    /// Whether the caller may simply resubmit the same grid.
    pub fn is_retryable(&self) -> bool {
        matches!(self, LedgerError::Timeout { .. } | LedgerError::Contended { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        let timeout = LedgerError::Timeout {
            operation: "get",
            after_ms: 10,
        };
        assert!(timeout.is_retryable());

        let contended = LedgerError::Contended {
            key: ContentKey::from_bytes([0u8; 32]),
            attempts: 3,
        };
        assert!(contended.is_retryable());
        assert!(contended.to_string().contains("after 3 re-fetch attempts"));

        let down = LedgerError::from(StoreError::Unavailable("connection refused".into()));
        assert!(!down.is_retryable());
        assert_eq!(down.to_string(), "Store unavailable: connection refused");
    }
}
