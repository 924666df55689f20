//! Mutant Ledger - content-addressed record of DNA analyses
//!
//! Every distinct grid submitted is classified by [`mutant_detector`] once
//! and the verdict is stored under the grid's [`ContentKey`]. Later
//! submissions of the same content are answered from the store without
//! re-running the engine, and aggregate counters are updated only when a new
//! record is created.
//!
//! ## Components
//!
//! - [`AnalysisLedger`]: `analyze_or_fetch`, `classify_and_record`, `stats`
//! - [`LedgerStore`]: injected store capability (get / create-if-absent /
//!   counters)
//! - [`MemoryStore`]: `DashMap` + atomics, for tests and ephemeral use
//! - [`SledStore`]: persistent store, record and counter written in one
//!   transaction
//! - [`Stats`]: counters plus `mutant / (mutant + human)` ratio
//!
//! ## Concurrency
//!
//! Same-content races are settled by the store's conditional insert, never by
//! a ledger-wide lock: exactly one caller creates the record and bumps a
//! counter, the rest re-read the winner's record. Different contents never
//! contend with each other in the ledger.

pub mod config;
pub mod error;
pub mod key;
pub mod ledger;
pub mod record;
pub mod store;

// Re-exports
pub use config::LedgerConfig;
pub use error::{LedgerError, StoreError};
pub use key::ContentKey;
pub use ledger::{Analysis, AnalysisLedger};
pub use record::{AnalysisRecord, ClassificationResult, Counters, Stats, Verdict};
pub use store::{CreateOutcome, LedgerStore, MemoryStore, SledStore};
