//! Persistent ledger store on sled
//!
//! Layout:
//!
//! ```text
//! records   content key (32 bytes)  ->  AnalysisRecord (MessagePack)
//! counters  "mutant" | "human"      ->  u64 big-endian
//! ```
//!
//! A record insert and its counter increment run in one transaction over
//! both trees, so a crash can never leave a record without its count.
//!
//! sled calls block, so each store operation runs on tokio's blocking pool
//! and the ledger's per-call timeout can fire while one is stuck. A timed-out
//! insert may still commit afterwards; the next lookup then finds it.

use async_trait::async_trait;
use sled::transaction::{ConflictableTransactionError, ConflictableTransactionResult, TransactionError};
use sled::{Db, Transactional, Tree};
use std::path::Path;
use tracing::info;

use super::{CreateOutcome, LedgerStore};
use crate::error::StoreError;
use crate::key::ContentKey;
use crate::record::{AnalysisRecord, Counters, Verdict};

const RECORDS_TREE: &str = "records";
const COUNTERS_TREE: &str = "counters";

fn counter_key(verdict: Verdict) -> &'static [u8] {
    verdict.as_str().as_bytes()
}

fn decode_count(raw: &[u8]) -> Result<u64, StoreError> {
    let bytes: [u8; 8] = raw
        .try_into()
        .map_err(|_| StoreError::Corrupt(format!("counter value has {} bytes, expected 8", raw.len())))?;
    Ok(u64::from_be_bytes(bytes))
}

/// sled-backed store
pub struct SledStore {
    db: Db,
    records: Tree,
    counters: Tree,
}

impl SledStore {
    /// Open or create a store at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let db = sled::open(path.as_ref())?;
        let store = Self::from_db(db)?;
        info!(
            path = %path.as_ref().display(),
            records = store.records.len(),
            "Opened ledger database"
        );
        Ok(store)
    }

    /// Open a throwaway store that is removed when dropped (for tests).
    pub fn temporary() -> Result<Self, StoreError> {
        let db = sled::Config::new().temporary(true).open()?;
        Self::from_db(db)
    }

    fn from_db(db: Db) -> Result<Self, StoreError> {
        let records = db.open_tree(RECORDS_TREE)?;
        let counters = db.open_tree(COUNTERS_TREE)?;
        Ok(Self { db, records, counters })
    }

    /// Number of records held
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Flush dirty pages to disk, returning the bytes written.
    pub async fn flush(&self) -> Result<usize, StoreError> {
        Ok(self.db.flush_async().await?)
    }

    /// Run `op` against both trees on the blocking pool.
    async fn blocking<T, F>(&self, op: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&Tree, &Tree) -> Result<T, StoreError> + Send + 'static,
    {
        let records = self.records.clone();
        let counters = self.counters.clone();
        tokio::task::spawn_blocking(move || op(&records, &counters))
            .await
            .map_err(|e| StoreError::Unavailable(format!("sled task failed: {}", e)))?
    }
}

fn read_counter(counters: &Tree, verdict: Verdict) -> Result<u64, StoreError> {
    match counters.get(counter_key(verdict))? {
        Some(raw) => decode_count(&raw),
        None => Ok(0),
    }
}

fn insert_if_absent(
    records: &Tree,
    counters: &Tree,
    key: &[u8],
    value: &[u8],
    counter: &'static [u8],
) -> Result<CreateOutcome, StoreError> {
    let result = (records, counters).transaction(
        |(records, counters)| -> ConflictableTransactionResult<CreateOutcome, StoreError> {
            if records.get(key)?.is_some() {
                return Ok(CreateOutcome::AlreadyExists);
            }

            let current = match counters.get(counter)? {
                Some(raw) => decode_count(&raw).map_err(ConflictableTransactionError::Abort)?,
                None => 0,
            };

            records.insert(key, value)?;
            counters.insert(counter, (current + 1).to_be_bytes().to_vec())?;
            Ok(CreateOutcome::Created)
        },
    );

    match result {
        Ok(outcome) => Ok(outcome),
        Err(TransactionError::Abort(e)) => Err(e),
        Err(TransactionError::Storage(e)) => Err(StoreError::Database(e)),
    }
}

#[async_trait]
impl LedgerStore for SledStore {
    fn name(&self) -> &str {
        "sled"
    }

    async fn get(&self, key: &ContentKey) -> Result<Option<AnalysisRecord>, StoreError> {
        let key = *key;
        self.blocking(move |records, _| match records.get(key.as_bytes())? {
            Some(value) => Ok(Some(rmp_serde::from_slice(&value)?)),
            None => Ok(None),
        })
        .await
    }

    async fn create_if_absent(&self, record: &AnalysisRecord) -> Result<CreateOutcome, StoreError> {
        let key = record.content_key;
        let value = rmp_serde::to_vec(record)?;
        let counter = counter_key(record.verdict());

        self.blocking(move |records, counters| {
            insert_if_absent(records, counters, key.as_bytes(), &value, counter)
        })
        .await
    }

    async fn counters(&self) -> Result<Counters, StoreError> {
        self.blocking(|_, counters| {
            Ok(Counters {
                mutant: read_counter(counters, Verdict::Mutant)?,
                human: read_counter(counters, Verdict::Human)?,
            })
        })
        .await
    }
}
