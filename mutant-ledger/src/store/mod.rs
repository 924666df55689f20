//! Backing stores for the analysis ledger.
//!
//! The ledger only needs three capabilities from a store, captured by
//! [`LedgerStore`]:
//!
//! - point lookup of a record by content key
//! - a conditional insert that fails when the key already exists, bumping the
//!   record's verdict counter in the same atomic step
//! - a read of both counters
//!
//! Two implementations are provided: [`MemoryStore`] for tests and
//! single-process use, [`SledStore`] for on-disk persistence.

use async_trait::async_trait;

use crate::error::StoreError;
use crate::key::ContentKey;
use crate::record::{AnalysisRecord, Counters};

pub mod memory;
pub mod sled_store;

pub use memory::MemoryStore;
pub use sled_store::SledStore;

/// Outcome of a conditional insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateOutcome {
    /// The record was inserted and its counter incremented.
    Created,
    /// A record already existed under the key; nothing was written.
    AlreadyExists,
}

/// Key-value capability the ledger is built on.
///
/// Implementations must make `create_if_absent` atomic per key: among any
/// number of concurrent calls for the same key exactly one returns
/// [`CreateOutcome::Created`], and no reader may observe the record before it
/// is fully written. Calls for different keys must not serialise on a
/// store-wide lock.
///
/// The ledger bounds each call with a timer, which can only fire at an await
/// point. Blocking backends should run their work off the async workers, as
/// [`SledStore`] does with `spawn_blocking`.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &str;

    /// Look up a record. `Ok(None)` means absent, never "unreachable".
    async fn get(&self, key: &ContentKey) -> Result<Option<AnalysisRecord>, StoreError>;

    /// Insert `record` unless its key exists; on insert, increment the counter
    /// for `record.verdict()` atomically with it.
    async fn create_if_absent(&self, record: &AnalysisRecord) -> Result<CreateOutcome, StoreError>;

    /// Current counter values.
    async fn counters(&self) -> Result<Counters, StoreError>;
}
