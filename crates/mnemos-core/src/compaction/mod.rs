//! Compaction of the primary log
//!
//! Contiguous runs of compressible records sharing one investigation are
//! replaced by a single summary record. Preserved records, unreadable lines
//! and records left out of any summary are written back byte-for-byte, in
//! their original order. The rewrite is atomic and runs under the store lock.
//! The replaced originals go to the archive log before the swap.

mod archive;
mod digest;
mod plan;
mod trigger;
mod validation;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::classify::StoreStats;
use crate::config::StoreConfig;
use crate::error::{MnemosError, Result};
use crate::lock::StoreLock;
use crate::log::AppendLog;
use crate::record::Record;

pub use archive::{latest_runs, ArchivedRun};
pub use plan::{CompactionPlan, Slot};
pub use trigger::{check as check_trigger, CompactionTrigger, MemoryPressure};

/// Outcome of one compaction
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CompactionReport {
    pub records_before: usize,
    pub records_after: usize,
    pub bytes_before: u64,
    pub bytes_after: u64,
    pub groups_summarized: usize,
    pub records_summarized: usize,
    /// Unreadable lines carried through unchanged
    pub anomalies: usize,
    /// Whether the log file was replaced
    pub rewritten: bool,
}

impl CompactionReport {
    pub fn bytes_saved(&self) -> u64 {
        self.bytes_before.saturating_sub(self.bytes_after)
    }
}

/// Compact `log`, archiving replaced records to `archive`. The caller holds
/// `lock` for the whole call.
pub fn compact(
    log: &AppendLog<Record>,
    archive: &AppendLog<ArchivedRun>,
    lock: &StoreLock,
    config: &StoreConfig,
    now: DateTime<Utc>,
) -> Result<CompactionReport> {
    let lines = log.scan()?;
    let records: Vec<Record> = lines
        .iter()
        .filter_map(|l| l.parsed.as_ref().ok().cloned())
        .collect();
    let anomalies = lines.len() - records.len();
    let bytes_before = log.size_bytes()?;

    let stats = StoreStats::from_records(&records, &config.scoring);
    let plan = CompactionPlan::build(&lines, &stats, &config.compaction, now)?;

    let mut report = CompactionReport {
        records_before: records.len(),
        records_after: records.len(),
        bytes_before,
        bytes_after: bytes_before,
        groups_summarized: plan.groups_summarized,
        records_summarized: plan.records_summarized,
        anomalies,
        rewritten: false,
    };

    if plan.is_noop() {
        tracing::info!(log = %log.path().display(), records = records.len(), "nothing to compact");
        return Ok(report);
    }

    let errors = plan.validate(&lines, &stats);
    if !errors.is_empty() {
        for error in &errors {
            tracing::error!(log = %log.path().display(), %error, "compaction plan rejected");
        }
        return Err(MnemosError::InvariantViolation(format!(
            "compaction aborted: {}",
            errors.join("; ")
        )));
    }

    for run in plan.archived_runs(now) {
        archive.append(&run, lock)?;
    }

    report.bytes_after = log.rewrite(plan.slots.iter().map(Slot::bytes), lock)?;
    report.records_after = plan.record_count();
    report.rewritten = true;

    tracing::info!(
        log = %log.path().display(),
        records_before = report.records_before,
        records_after = report.records_after,
        bytes_saved = report.bytes_saved(),
        groups = report.groups_summarized,
        "compacted log"
    );
    Ok(report)
}
