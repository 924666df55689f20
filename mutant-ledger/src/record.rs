//! Analysis records, counters and derived statistics.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::key::ContentKey;

/// Classification outcome, also the counter a new record bumps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Mutant,
    Human,
}

impl Verdict {
    pub fn from_is_mutant(is_mutant: bool) -> Self {
        if is_mutant {
            Verdict::Mutant
        } else {
            Verdict::Human
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Mutant => "mutant",
            Verdict::Human => "human",
        }
    }
}

/// Durable, write-once result of analysing one distinct grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRecord {
    /// Digest of the grid content (primary key)
    pub content_key: ContentKey,
    /// Classification result
    pub is_mutant: bool,
    /// Grid side length N
    pub size: usize,
    /// When the grid was first analysed
    pub recorded_at: DateTime<Utc>,
}

impl AnalysisRecord {
    pub fn new(content_key: ContentKey, is_mutant: bool, size: usize) -> Self {
        Self {
            content_key,
            is_mutant,
            size,
            recorded_at: Utc::now(),
        }
    }

    pub fn verdict(&self) -> Verdict {
        Verdict::from_is_mutant(self.is_mutant)
    }
}

/// Raw aggregate counters as held by a store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counters {
    pub mutant: u64,
    pub human: u64,
}

/// Aggregate statistics over every grid ever recorded.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    #[serde(rename = "count_mutant_dna")]
    pub mutant_count: u64,
    #[serde(rename = "count_human_dna")]
    pub human_count: u64,
    /// `mutant / (mutant + human)`, 0.0 when nothing has been recorded
    pub ratio: f64,
}

impl Stats {
    pub fn from_counts(mutant_count: u64, human_count: u64) -> Self {
        let total = mutant_count + human_count;
        let ratio = if total == 0 {
            0.0
        } else {
            mutant_count as f64 / total as f64
        };

        Self {
            mutant_count,
            human_count,
            ratio,
        }
    }
}

impl From<Counters> for Stats {
    fn from(counters: Counters) -> Self {
        Stats::from_counts(counters.mutant, counters.human)
    }
}

/// Result handed back to the transport layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub is_mutant: bool,
}
