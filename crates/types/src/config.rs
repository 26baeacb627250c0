use eyre::{ensure, WrapErr as _};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// # Cross-chain Configuration
///
/// Settings for the cross-chain cache and the service that drives it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CrossChainConfig {
    /// Starting value of the data-validation flag. While it is set, callers
    /// skip strict validation of cross-chain data; it is cleared once the
    /// initial sync completes.
    pub data_validation_ignored: bool,

    /// Upper bound on pending entries held per chain. Entries past it are
    /// rejected until eviction frees room.
    pub max_cached_entries_per_chain: usize,

    /// How often the sync service retries bootstrapping while the local
    /// chain has no irreversible block yet.
    pub initial_sync_retry_interval_ms: u64,
}

impl Default for CrossChainConfig {
    fn default() -> Self {
        Self {
            data_validation_ignored: true,
            max_cached_entries_per_chain: 64,
            initial_sync_retry_interval_ms: 4000,
        }
    }
}

impl CrossChainConfig {
    /// Reads and validates a TOML config file.
    pub fn load(path: impl AsRef<Path>) -> eyre::Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("failed to read config file {}", path.display()))?;
        let config = toml::from_str::<Self>(&contents)
            .wrap_err_with(|| format!("failed to parse config file {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> eyre::Result<()> {
        ensure!(
            self.max_cached_entries_per_chain > 0,
            "max_cached_entries_per_chain must be greater than zero"
        );
        ensure!(
            self.initial_sync_retry_interval_ms > 0,
            "initial_sync_retry_interval_ms must be greater than zero"
        );
        Ok(())
    }

    pub fn initial_sync_retry_interval(&self) -> Duration {
        Duration::from_millis(self.initial_sync_retry_interval_ms)
    }

    pub fn testing() -> Self {
        Self {
            initial_sync_retry_interval_ms: 20,
            ..Self::default()
        }
    }
}
