//! When to compact

use std::fmt;

use serde::Serialize;

use crate::config::CompactionConfig;

/// Coarse load indicator derived from the primary-log record count
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MemoryPressure {
    Low,
    Medium,
    High,
    Critical,
}

impl MemoryPressure {
    pub fn from_record_count(count: usize) -> Self {
        match count {
            0..50 => MemoryPressure::Low,
            50..100 => MemoryPressure::Medium,
            100..200 => MemoryPressure::High,
            _ => MemoryPressure::Critical,
        }
    }
}

impl fmt::Display for MemoryPressure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MemoryPressure::Low => "low",
            MemoryPressure::Medium => "medium",
            MemoryPressure::High => "high",
            MemoryPressure::Critical => "critical",
        };
        f.write_str(s)
    }
}

/// A configured threshold the primary log has exceeded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "threshold", rename_all = "snake_case")]
pub enum CompactionTrigger {
    RecordCount { records: usize, max: usize },
    Bytes { bytes: u64, max: u64 },
}

impl fmt::Display for CompactionTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompactionTrigger::RecordCount { records, max } => {
                write!(f, "{records} records exceeds limit of {max}")
            }
            CompactionTrigger::Bytes { bytes, max } => {
                write!(f, "{bytes} bytes exceeds limit of {max}")
            }
        }
    }
}

/// First exceeded threshold, record count checked before size
pub fn check(records: usize, bytes: u64, config: &CompactionConfig) -> Option<CompactionTrigger> {
    if records > config.max_records {
        Some(CompactionTrigger::RecordCount {
            records,
            max: config.max_records,
        })
    } else if bytes > config.max_bytes {
        Some(CompactionTrigger::Bytes {
            bytes,
            max: config.max_bytes,
        })
    } else {
        None
    }
}
