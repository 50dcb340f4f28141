//! Archive of records replaced by compaction
//!
//! Every summarized run is appended to the namespace's archive log, keyed by
//! its summary id, before the compacted log is swapped in. The originals can
//! then be expanded from a summary at any later time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::id::RecordId;
use crate::log::Versioned;
use crate::record::{Record, RECORD_VERSION};

fn default_version() -> u32 {
    RECORD_VERSION
}

/// The records one summary replaced, in their original write order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchivedRun {
    #[serde(rename = "v", default = "default_version")]
    pub version: u32,
    pub summary_id: RecordId,
    pub archived_at: DateTime<Utc>,
    pub records: Vec<Record>,
}

impl ArchivedRun {
    pub fn new(summary_id: RecordId, records: Vec<Record>, archived_at: DateTime<Utc>) -> Self {
        Self {
            version: RECORD_VERSION,
            summary_id,
            archived_at,
            records,
        }
    }

    pub fn count(&self) -> usize {
        self.records.len()
    }
}

impl Versioned for ArchivedRun {
    fn version(&self) -> u32 {
        self.version
    }
}

/// One entry per summary id, the latest archived wins.
///
/// A compaction whose swap failed leaves its runs archived; the next attempt
/// archives the same summary ids again.
pub fn latest_runs(runs: Vec<ArchivedRun>) -> Vec<ArchivedRun> {
    let mut latest: Vec<ArchivedRun> = Vec::with_capacity(runs.len());
    for run in runs {
        match latest.iter_mut().find(|r| r.summary_id == run.summary_id) {
            Some(slot) => *slot = run,
            None => latest.push(run),
        }
    }
    latest
}
