//! Compaction entry points

use std::time::Instant;

use chrono::Utc;

use crate::compaction::{self, ArchivedRun, CompactionReport, CompactionTrigger};
use crate::error::{MnemosError, Result};
use crate::id::RecordId;
use crate::trace_time;

use super::Store;

impl Store {
    /// Compact the primary log under the store lock
    #[tracing::instrument(skip(self), fields(namespace = %self.namespace))]
    pub fn compact(&self) -> Result<CompactionReport> {
        let start = Instant::now();
        let lock = self.lock()?;
        let report = compaction::compact(
            &self.records,
            &self.archive,
            &lock,
            &self.config,
            Utc::now(),
        )?;
        trace_time!(start, "compact", groups = report.groups_summarized);
        Ok(report)
    }

    /// The configured threshold the primary log currently exceeds, if any
    pub fn needs_compaction(&self) -> Result<Option<CompactionTrigger>> {
        let records = self.records.read_all()?.entries.len();
        let bytes = self.records.size_bytes()?;
        Ok(compaction::check_trigger(records, bytes, &self.config.compaction))
    }

    /// Compact only when a threshold is exceeded
    pub fn compact_if_needed(&self) -> Result<Option<CompactionReport>> {
        match self.needs_compaction()? {
            Some(trigger) => {
                tracing::info!(%trigger, "compaction threshold exceeded");
                self.compact().map(Some)
            }
            None => Ok(None),
        }
    }

    /// Runs replaced by compaction, one per summary, oldest first
    pub fn archived_runs(&self) -> Result<Vec<ArchivedRun>> {
        Ok(compaction::latest_runs(self.archive.read_all()?.entries))
    }

    /// The original records behind a summary
    pub fn expand(&self, summary_id: &RecordId) -> Result<ArchivedRun> {
        self.archived_runs()?
            .into_iter()
            .find(|run| &run.summary_id == summary_id)
            .ok_or_else(|| MnemosError::not_found("archived run", summary_id))
    }
}
