//! In-memory ledger store
//!
//! Records live in a `DashMap`, whose per-shard entry guard provides the
//! conditional insert. Counters are plain atomics.

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use super::{CreateOutcome, LedgerStore};
use crate::error::StoreError;
use crate::key::ContentKey;
use crate::record::{AnalysisRecord, Counters, Verdict};

/// Volatile store; contents are lost when dropped.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: DashMap<ContentKey, AnalysisRecord>,
    mutant: AtomicU64,
    human: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records held
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn counter(&self, verdict: Verdict) -> &AtomicU64 {
        match verdict {
            Verdict::Mutant => &self.mutant,
            Verdict::Human => &self.human,
        }
    }
}

#[async_trait]
impl LedgerStore for MemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn get(&self, key: &ContentKey) -> Result<Option<AnalysisRecord>, StoreError> {
        Ok(self.records.get(key).map(|entry| entry.value().clone()))
    }

    async fn create_if_absent(&self, record: &AnalysisRecord) -> Result<CreateOutcome, StoreError> {
        match self.records.entry(record.content_key) {
            Entry::Occupied(_) => Ok(CreateOutcome::AlreadyExists),
            Entry::Vacant(slot) => {
                // Counter moves while the shard guard is still held.
                self.counter(record.verdict()).fetch_add(1, Ordering::SeqCst);
                slot.insert(record.clone());
                Ok(CreateOutcome::Created)
            }
        }
    }

    async fn counters(&self) -> Result<Counters, StoreError> {
        Ok(Counters {
            mutant: self.mutant.load(Ordering::SeqCst),
            human: self.human.load(Ordering::SeqCst),
        })
    }
}
