//! The analysis ledger.
//!
//! Each distinct grid is classified and recorded at most once. The flow for a
//! submission is:
//!
//! ```text
//! grid ─► ContentKey ─► store.get ──hit──► stored verdict (was_new = false)
//!                           │
//!                          miss
//!                           ▼
//!                      classify (no store access, no lock held)
//!                           ▼
//!                 store.create_if_absent ──Created──► verdict (was_new = true)
//!                           │
//!                     AlreadyExists
//!                           ▼
//!                 bounded re-fetch of the winner's record
//! ```
//!
//! Callers racing on the same grid all converge on the record written by the
//! winner of `create_if_absent`; their own classification is discarded.

use mutant_detector::Grid;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::config::LedgerConfig;
use crate::error::{LedgerError, StoreError};
use crate::key::ContentKey;
use crate::record::{AnalysisRecord, ClassificationResult, Stats};
use crate::store::{CreateOutcome, LedgerStore};

/// Outcome of [`AnalysisLedger::analyze_or_fetch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Analysis {
    pub content_key: ContentKey,
    pub is_mutant: bool,
    /// `true` only for the call that created the record
    pub was_new: bool,
}

impl Analysis {
    fn existing(record: &AnalysisRecord) -> Self {
        Self {
            content_key: record.content_key,
            is_mutant: record.is_mutant,
            was_new: false,
        }
    }
}

/// Content-addressed, write-once ledger of grid analyses.
pub struct AnalysisLedger<S> {
    store: Arc<S>,
    config: LedgerConfig,
    classifier: fn(&Grid) -> bool,
}

impl<S> Clone for AnalysisLedger<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            config: self.config.clone(),
            classifier: self.classifier,
        }
    }
}

impl<S: LedgerStore> AnalysisLedger<S> {
    pub fn new(store: S, config: LedgerConfig) -> Self {
        Self::from_shared(Arc::new(store), config)
    }

    /// Build a ledger over a store that is also used elsewhere.
    pub fn from_shared(store: Arc<S>, config: LedgerConfig) -> Self {
        Self {
            store,
            config,
            classifier: mutant_detector::classify,
        }
    }

    /// Replace the detection engine.
    pub fn with_classifier(mut self, classifier: fn(&Grid) -> bool) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Return the recorded verdict for `grid`, analysing and recording it
    /// first if it has never been seen.
    ///
    /// Counters change only when this call creates the record.
    pub async fn analyze_or_fetch(&self, grid: &Grid) -> Result<Analysis, LedgerError> {
        let key = ContentKey::of(grid);

        if let Some(record) = self.timed("get", self.store.get(&key)).await? {
            debug!(key = %key, is_mutant = record.is_mutant, "Analysis cache hit");
            return Ok(Analysis::existing(&record));
        }

        let is_mutant = (self.classifier)(grid);
        let record = AnalysisRecord::new(key, is_mutant, grid.size());

        match self
            .timed("create_if_absent", self.store.create_if_absent(&record))
            .await?
        {
            CreateOutcome::Created => {
                info!(
                    key = %key,
                    size = grid.size(),
                    verdict = record.verdict().as_str(),
                    store = self.store.name(),
                    "Recorded new analysis"
                );
                Ok(Analysis {
                    content_key: key,
                    is_mutant,
                    was_new: true,
                })
            }
            CreateOutcome::AlreadyExists => self.fetch_winner(key).await,
        }
    }

    /// Transport-facing entry point: classify `grid`, recording it if new.
    pub async fn classify_and_record(&self, grid: &Grid) -> Result<ClassificationResult, LedgerError> {
        let analysis = self.analyze_or_fetch(grid).await?;
        Ok(ClassificationResult {
            is_mutant: analysis.is_mutant,
        })
    }

    /// Snapshot of the aggregate counters and the mutant ratio.
    pub async fn stats(&self) -> Result<Stats, LedgerError> {
        let counters = self.timed("counters", self.store.counters()).await?;
        Ok(counters.into())
    }

    /// Alias of [`stats`](Self::stats) under the transport-facing name.
    pub async fn get_stats(&self) -> Result<Stats, LedgerError> {
        self.stats().await
    }

    /// Fetch the stored record for a key, if any.
    pub async fn lookup(&self, key: &ContentKey) -> Result<Option<AnalysisRecord>, LedgerError> {
        self.timed("get", self.store.get(key)).await
    }

    /// Another caller created the record first. It is committed by now, so
    /// re-read it; a store may still need a moment before it is visible.
    async fn fetch_winner(&self, key: ContentKey) -> Result<Analysis, LedgerError> {
        let attempts = self.config.conflict_retries.max(1);

        for attempt in 1..=attempts {
            if let Some(record) = self.timed("get", self.store.get(&key)).await? {
                debug!(key = %key, attempt, "Lost insert race, using stored analysis");
                return Ok(Analysis::existing(&record));
            }

            warn!(key = %key, attempt, attempts, "Conflicting record not readable yet");
            if attempt < attempts {
                tokio::time::sleep(self.config.retry_delay()).await;
            }
        }

        Err(LedgerError::Contended { key, attempts })
    }

    async fn timed<T, F>(&self, operation: &'static str, call: F) -> Result<T, LedgerError>
    where
        F: Future<Output = Result<T, StoreError>>,
    {
        match tokio::time::timeout(self.config.store_timeout(), call).await {
            Ok(result) => Ok(result?),
            Err(_) => {
                warn!(
                    operation,
                    store = self.store.name(),
                    timeout_ms = self.config.store_timeout_ms,
                    "Store call timed out"
                );
                Err(LedgerError::Timeout {
                    operation,
                    after_ms: self.config.store_timeout_ms,
                })
            }
        }
    }
}
