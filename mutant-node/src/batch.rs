//! Concurrent batch submission
//!
//! Input is a JSON array of request bodies, each `{"dna": ["ATGC", ...]}`.
//! Entries are analysed on separate tasks, at most `max_in_flight` at once;
//! a bad entry is reported in its own output line and does not stop the batch.

use futures::stream::{self, StreamExt};
use mutant_detector::Grid;
use mutant_ledger::{AnalysisLedger, LedgerStore};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// One submission, in the shape clients post it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DnaRequest {
    pub dna: Vec<String>,
}

/// Per-entry outcome, in input order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BatchLine {
    Analysed {
        index: usize,
        key: String,
        is_mutant: bool,
        was_new: bool,
    },
    Failed {
        index: usize,
        error: String,
        retryable: bool,
    },
}

pub fn parse_requests(json: &str) -> Result<Vec<DnaRequest>, serde_json::Error> {
    serde_json::from_str(json)
}

pub async fn run_batch<S>(
    ledger: &AnalysisLedger<S>,
    requests: Vec<DnaRequest>,
    max_in_flight: usize,
) -> Vec<BatchLine>
where
    S: LedgerStore + 'static,
{
    let total = requests.len();
    // `buffered` spawns lazily and yields in input order.
    let lines: Vec<BatchLine> = stream::iter(requests.into_iter().enumerate())
        .map(|(index, request)| {
            let ledger = ledger.clone();
            tokio::spawn(async move { analyse_one(&ledger, index, request).await })
        })
        .buffered(max_in_flight.max(1))
        .enumerate()
        .map(|(index, joined)| {
            joined.unwrap_or_else(|e| BatchLine::Failed {
                index,
                error: format!("task failed: {}", e),
                retryable: false,
            })
        })
        .collect()
        .await;

    let failed = lines
        .iter()
        .filter(|line| matches!(line, BatchLine::Failed { .. }))
        .count();
    info!(total, failed, "Batch complete");
    lines
}

async fn analyse_one<S: LedgerStore>(
    ledger: &AnalysisLedger<S>,
    index: usize,
    request: DnaRequest,
) -> BatchLine {
    let grid = match Grid::parse(&request.dna) {
        Ok(grid) => grid,
        Err(e) => {
            warn!(index, error = %e, "Rejected batch entry");
            return BatchLine::Failed {
                index,
                error: e.to_string(),
                retryable: false,
            };
        }
    };

    match ledger.analyze_or_fetch(&grid).await {
        Ok(analysis) => BatchLine::Analysed {
            index,
            key: analysis.content_key.to_hex(),
            is_mutant: analysis.is_mutant,
            was_new: analysis.was_new,
        },
        Err(e) => BatchLine::Failed {
            index,
            retryable: e.is_retryable(),
            error: e.to_string(),
        },
    }
}
