//! Configuration type definitions

use serde::{Deserialize, Serialize};

/// Current store format version
pub const STORE_FORMAT_VERSION: u32 = 1;

/// Store configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Store format version for compatibility checking
    #[serde(default = "default_version")]
    pub version: u32,

    /// Bounded wait for the store write lock, in milliseconds
    #[serde(default = "default_lock_timeout_ms")]
    pub lock_timeout_ms: u64,

    /// Compaction thresholds and digest limits
    #[serde(default)]
    pub compaction: CompactionConfig,

    /// Classifier score parameters
    #[serde(default)]
    pub scoring: ScoringConfig,
}

/// Configuration for compaction triggers and summary digests
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompactionConfig {
    /// Record count above which `compact_if_needed` compacts
    #[serde(default = "default_max_records")]
    pub max_records: usize,

    /// Primary-log size in bytes above which `compact_if_needed` compacts
    #[serde(default = "default_max_bytes")]
    pub max_bytes: u64,

    /// Maximum characters in a summary record's content
    #[serde(default = "default_digest_max_chars")]
    pub digest_max_chars: usize,

    /// Maximum characters kept from each summarized record
    #[serde(default = "default_item_max_chars")]
    pub item_max_chars: usize,
}

/// Configuration for the classifier's secondary score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// Recency boost numerator (default 0.1)
    #[serde(default = "default_recency_boost_numerator")]
    pub recency_boost_numerator: f64,

    /// Recency decay in days (default 7.0)
    #[serde(default = "default_recency_decay_days")]
    pub recency_decay_days: f64,
}

fn default_version() -> u32 {
    STORE_FORMAT_VERSION
}

fn default_lock_timeout_ms() -> u64 {
    5000
}

fn default_max_records() -> usize {
    200
}

fn default_max_bytes() -> u64 {
    256 * 1024
}

fn default_digest_max_chars() -> usize {
    2000
}

fn default_item_max_chars() -> usize {
    240
}

fn default_recency_boost_numerator() -> f64 {
    0.1
}

fn default_recency_decay_days() -> f64 {
    7.0
}

impl Default for CompactionConfig {
    fn default() -> Self {
        CompactionConfig {
            max_records: default_max_records(),
            max_bytes: default_max_bytes(),
            digest_max_chars: default_digest_max_chars(),
            item_max_chars: default_item_max_chars(),
        }
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        ScoringConfig {
            recency_boost_numerator: default_recency_boost_numerator(),
            recency_decay_days: default_recency_decay_days(),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig {
            version: STORE_FORMAT_VERSION,
            lock_timeout_ms: default_lock_timeout_ms(),
            compaction: CompactionConfig::default(),
            scoring: ScoringConfig::default(),
        }
    }
}
