//! Configuration for mutant-node

use mutant_ledger::LedgerConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default data directory
pub fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("mutant-node")
}

/// Configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeConfig {
    /// Directory holding the ledger database
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// tracing filter used when RUST_LOG is unset
    #[serde(default = "default_log_filter")]
    pub log_filter: String,

    /// Upper bound on batch entries analysed at once
    #[serde(default = "default_batch_concurrency")]
    pub batch_concurrency: usize,

    /// Store timeouts and retry budget
    #[serde(default)]
    pub ledger: LedgerConfig,
}

fn default_log_filter() -> String {
    "mutant_node=info,mutant_ledger=info".to_string()
}

fn default_batch_concurrency() -> usize {
    32
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            log_filter: default_log_filter(),
            batch_concurrency: default_batch_concurrency(),
            ledger: LedgerConfig::default(),
        }
    }
}

impl NodeConfig {
    /// Load config from file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    }

    /// Save config to file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), std::io::Error> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, content)
    }

    /// Get ledger database path
    pub fn ledger_db_path(&self) -> PathBuf {
        self.data_dir.join("ledger.sled")
    }
}
