//! Store configuration for mnemos
//!
//! Configuration is stored in `<store>/config.toml`. Every field has a
//! default, so a missing or partial file is valid.

pub mod types;

use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::error::{MnemosError, Result};

pub use types::{CompactionConfig, ScoringConfig, StoreConfig, STORE_FORMAT_VERSION};

impl StoreConfig {
    /// Lock acquisition timeout
    pub fn lock_timeout(&self) -> Duration {
        Duration::from_millis(self.lock_timeout_ms)
    }

    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| MnemosError::io_operation("read", path.display(), e))?;
        let config: StoreConfig = toml::from_str(&content)?;

        if config.version > STORE_FORMAT_VERSION {
            return Err(MnemosError::InvalidStore {
                reason: format!(
                    "config version {} is newer than supported version {}",
                    config.version, STORE_FORMAT_VERSION
                ),
            });
        }
        if config.compaction.item_max_chars == 0 || config.compaction.digest_max_chars == 0 {
            return Err(MnemosError::InvalidStore {
                reason: "compaction digest limits must be positive".to_string(),
            });
        }

        Ok(config)
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content).map_err(|e| MnemosError::io_operation("write", path.display(), e))
    }
}
