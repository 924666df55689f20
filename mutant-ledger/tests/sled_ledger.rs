//! End-to-end ledger tests over the persistent sled store

use futures::future::join_all;
use mutant_detector::Grid;
use mutant_ledger::{AnalysisLedger, ContentKey, LedgerConfig, LedgerError, SledStore};
use std::sync::Arc;
use tempfile::TempDir;

fn grid(rows: &[&str]) -> Grid {
    Grid::parse(rows).unwrap()
}

/// Helper to open a ledger over a sled database inside `dir`
fn open_ledger(dir: &TempDir) -> AnalysisLedger<SledStore> {
    let store = SledStore::open(dir.path().join("ledger.sled")).unwrap();
    AnalysisLedger::new(store, LedgerConfig::default())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_same_grid_single_record() {
    let temp_dir = TempDir::new().unwrap();
    let ledger = open_ledger(&temp_dir);
    let dna = Arc::new(grid(&["ATGCGA", "CAGTGC", "TTATGT", "AGAAGG", "CCCCTA", "TCACTG"]));

    let tasks = (0..32).map(|_| {
        let ledger = ledger.clone();
        let dna = Arc::clone(&dna);
        tokio::spawn(async move { ledger.analyze_or_fetch(&dna).await })
    });

    let results: Vec<_> = join_all(tasks)
        .await
        .into_iter()
        .map(|joined| joined.unwrap().unwrap())
        .collect();

    assert_eq!(results.iter().filter(|a| a.was_new).count(), 1);
    assert!(results.iter().all(|a| a.is_mutant));

    let stats = ledger.stats().await.unwrap();
    assert_eq!(stats.mutant_count, 1);
    assert_eq!(stats.human_count, 0);
    assert_eq!(stats.ratio, 1.0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_distinct_grids_all_recorded() {
    let temp_dir = TempDir::new().unwrap();
    let ledger = open_ledger(&temp_dir);

    // Twelve distinct grids, six of them mutant.
    let mut grids = Vec::new();
    for first in ["AAAA", "TTTT", "CCCC", "GGGG"] {
        grids.push(grid(&[first, first, "ATCG", "GCTA"]));
    }
    grids.push(grid(&["AAAA", "AAAA", "AAAA", "AAAA"]));
    grids.push(grid(&["GTCG", "GTGA", "GGCG", "GATC"]));
    grids.push(grid(&["ATGC", "CAGT", "TTAT", "AGAC"]));
    grids.push(grid(&["AAAA", "TCGT", "GTCA", "CGTC"]));
    grids.push(grid(&["CTGA", "TCAC", "ATCC", "AGGC"]));
    grids.push(grid(&["ATG", "CAG", "TTA"]));
    grids.push(grid(&["A"]));
    grids.push(grid(&["TC", "GA"]));

    let expected_mutants = grids.iter().filter(|g| mutant_detector::classify(g)).count() as u64;
    assert_eq!(expected_mutants, 6);

    // Submit every grid three times, interleaved.
    let tasks = grids
        .iter()
        .cycle()
        .take(grids.len() * 3)
        .cloned()
        .map(|g| {
            let ledger = ledger.clone();
            tokio::spawn(async move { ledger.analyze_or_fetch(&g).await })
        });

    let results: Vec<_> = join_all(tasks)
        .await
        .into_iter()
        .map(|joined| joined.unwrap().unwrap())
        .collect();
    assert_eq!(results.iter().filter(|a| a.was_new).count(), grids.len());

    let stats = ledger.stats().await.unwrap();
    assert_eq!(stats.mutant_count, expected_mutants);
    assert_eq!(stats.human_count, grids.len() as u64 - expected_mutants);
    assert_eq!(stats.ratio, 6.0 / 12.0);
}

#[tokio::test]
async fn test_ledger_survives_restart() {
    let temp_dir = TempDir::new().unwrap();
    let dna = grid(&["ATGCGA", "CAGTGC", "TTATTT", "AGACGG", "GCGTCA", "TCACTG"]);

    {
        let ledger = open_ledger(&temp_dir);
        let analysis = ledger.analyze_or_fetch(&dna).await.unwrap();
        assert!(analysis.was_new);
        assert!(!analysis.is_mutant);
        ledger.store().flush().await.unwrap();
    }

    let ledger = open_ledger(&temp_dir);
    let analysis = ledger.analyze_or_fetch(&dna).await.unwrap();
    assert!(!analysis.was_new);
    assert!(!analysis.is_mutant);

    let record = ledger.lookup(&ContentKey::of(&dna)).await.unwrap().unwrap();
    assert_eq!(record.size, 6);

    let stats = ledger.stats().await.unwrap();
    assert_eq!((stats.mutant_count, stats.human_count), (0, 1));
    assert_eq!(stats.ratio, 0.0);
}

#[test]
fn test_timeout_fires_while_sled_call_is_queued() {
    // A single blocking thread, held by another task, keeps the sled call waiting.
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .max_blocking_threads(1)
        .enable_all()
        .build()
        .unwrap();

    runtime.block_on(async {
        let config = LedgerConfig {
            store_timeout_ms: 50,
            ..LedgerConfig::default()
        };
        let ledger = AnalysisLedger::new(SledStore::temporary().unwrap(), config);
        let dna = grid(&["AAAA", "CCCC", "TCAG", "GGTC"]);

        let (release, wait) = std::sync::mpsc::channel::<()>();
        let blocker = tokio::task::spawn_blocking(move || {
            let _ = wait.recv();
        });

        let err = ledger.analyze_or_fetch(&dna).await.unwrap_err();
        assert!(matches!(err, LedgerError::Timeout { operation: "get", after_ms: 50 }));
        assert!(err.is_retryable());

        release.send(()).unwrap();
        blocker.await.unwrap();

        let analysis = ledger.analyze_or_fetch(&dna).await.unwrap();
        assert!(analysis.was_new);
        assert!(analysis.is_mutant);
    });
}
