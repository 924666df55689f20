//! Mutant Node
//!
//! Command-line host for the mutant DNA ledger.
//!
//! ## Usage
//!
//! ```bash
//! # Classify and record one sample
//! mutant-node analyze ATGCGA CAGTGC TTATGT AGAAGG CCCCTA TCACTG
//!
//! # Show the runs behind a verdict (nothing is recorded)
//! mutant-node explain ATGCGA CAGTGC TTATGT AGAAGG CCCCTA TCACTG
//!
//! # Submit a JSON array of {"dna": [...]} bodies concurrently
//! mutant-node batch samples.json
//!
//! # Aggregate counts and ratio
//! mutant-node stats
//!
//! # Write a config file with every default filled in
//! mutant-node init-config mutant.toml
//!
//! # Use a throwaway in-memory ledger, or a custom data directory
//! mutant-node --memory analyze AAAA AAAA AAAA AAAA
//! mutant-node --data-dir /data/mutant stats
//! ```
//!
//! Results are printed to stdout as JSON; logs go to stderr.

mod batch;
mod config;

use anyhow::Context;
use clap::{Parser, Subcommand};
use config::NodeConfig;
use mutant_detector::{find_runs, Grid, MUTANT_THRESHOLD};
use mutant_ledger::{AnalysisLedger, LedgerStore, MemoryStore, SledStore};
use serde_json::json;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "mutant-node")]
#[command(about = "Classify DNA samples and keep a ledger of every distinct one")]
struct Args {
    /// Path to config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Ledger data directory
    #[arg(long, env = "MUTANT_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Keep the ledger in memory only
    #[arg(long)]
    memory: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Classify a sample and record it if unseen
    Analyze {
        /// Grid rows, e.g. `ATGC CAGT TTAT AGAA` or `ATGC,CAGT,TTAT,AGAA`
        #[arg(required = true)]
        rows: Vec<String>,
    },
    /// List the runs found in a sample without recording it
    Explain {
        #[arg(required = true)]
        rows: Vec<String>,
    },
    /// Analyse every entry of a JSON file concurrently
    Batch {
        file: PathBuf,
    },
    /// Print aggregate counters and the mutant ratio
    Stats,
    /// Write the effective configuration to a TOML file
    InitConfig {
        path: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Load config
    let mut config = match &args.config {
        Some(path) => NodeConfig::load(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => NodeConfig::default(),
    };

    // Apply CLI overrides
    if let Some(dir) = args.data_dir {
        config.data_dir = dir;
    }

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    match &args.command {
        Command::Explain { rows } => return explain(rows),
        Command::InitConfig { path } => {
            config
                .save(path)
                .with_context(|| format!("writing config to {}", path.display()))?;
            info!(path = %path.display(), "Wrote config");
            return Ok(());
        }
        _ => {}
    }

    if args.memory {
        info!("Using in-memory ledger");
        let ledger = AnalysisLedger::new(MemoryStore::new(), config.ledger.clone());
        return run(&ledger, args.command, config.batch_concurrency).await;
    }

    std::fs::create_dir_all(&config.data_dir)
        .with_context(|| format!("creating {}", config.data_dir.display()))?;
    let store = SledStore::open(config.ledger_db_path()).context("opening ledger database")?;
    let ledger = AnalysisLedger::new(store, config.ledger.clone());

    let outcome = run(&ledger, args.command, config.batch_concurrency).await;
    ledger.store().flush().await.context("flushing ledger database")?;
    outcome
}

async fn run<S: LedgerStore + 'static>(
    ledger: &AnalysisLedger<S>,
    command: Command,
    batch_concurrency: usize,
) -> anyhow::Result<()> {
    match command {
        Command::Analyze { rows } => {
            let grid = parse_rows(&rows)?;
            let analysis = ledger.analyze_or_fetch(&grid).await?;
            println!(
                "{}",
                json!({
                    "is_mutant": analysis.is_mutant,
                    "was_new": analysis.was_new,
                    "key": analysis.content_key.to_hex(),
                })
            );
        }
        Command::Batch { file } => {
            let content = std::fs::read_to_string(&file)
                .with_context(|| format!("reading {}", file.display()))?;
            let requests = batch::parse_requests(&content)
                .with_context(|| format!("parsing {}", file.display()))?;
            for line in batch::run_batch(ledger, requests, batch_concurrency).await {
                println!("{}", serde_json::to_string(&line)?);
            }
        }
        Command::Stats => {
            let stats = ledger.get_stats().await?;
            println!("{}", serde_json::to_string(&stats)?);
        }
        Command::Explain { rows } => explain(&rows)?,
        Command::InitConfig { .. } => unreachable!("handled before the ledger is opened"),
    }

    Ok(())
}

fn explain(rows: &[String]) -> anyhow::Result<()> {
    let grid = parse_rows(rows)?;
    let runs = find_runs(&grid, usize::MAX);
    println!(
        "{}",
        json!({
            "size": grid.size(),
            "is_mutant": runs.len() >= MUTANT_THRESHOLD,
            "runs": runs,
        })
    );
    Ok(())
}

/// Rows may be given as separate arguments, comma-joined, or both.
fn parse_rows(rows: &[String]) -> Result<Grid, mutant_detector::GridError> {
    rows.join(",").parse()
}
