//! Store status snapshot

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use crate::classify::StoreStats;
use crate::compaction::{CompactionTrigger, MemoryPressure};
use crate::investigation::{self, Investigation};
use crate::log::Anomaly;
use crate::record::{IssueStatus, Record, RecordKind};

/// Number of location hotspots reported
pub const HOTSPOT_LIMIT: usize = 5;

/// A location that records cluster around
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocationHotspot {
    pub location: String,
    pub records: usize,
    pub open_issues: usize,
}

/// A skipped line and the log file it was found in
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogAnomaly {
    pub log: String,
    #[serde(flatten)]
    pub anomaly: Anomaly,
}

/// Point-in-time view of one namespace
#[derive(Debug, Clone, Serialize)]
pub struct StatusView {
    pub namespace: String,
    pub active_investigation: Option<Investigation>,
    pub investigations: usize,
    pub total_records: usize,
    pub counts: BTreeMap<RecordKind, usize>,
    pub summaries: usize,
    pub open_issues: Vec<Record>,
    pub reflections: usize,
    pub hotspots: Vec<LocationHotspot>,
    pub anomalies: Vec<LogAnomaly>,
    pub bytes: u64,
    pub pressure: MemoryPressure,
    pub compaction_due: Option<CompactionTrigger>,
}

/// Inputs gathered by the store for [`StatusView::build`]
pub struct StatusInputs<'a> {
    pub namespace: &'a str,
    pub records: &'a [Record],
    pub reflections: usize,
    pub investigations: &'a [Investigation],
    pub anomalies: Vec<LogAnomaly>,
    pub bytes: u64,
    pub compaction_due: Option<CompactionTrigger>,
    pub stats: &'a StoreStats,
}

impl StatusView {
    pub fn build(inputs: StatusInputs<'_>) -> Self {
        let records = inputs.records;
        let mut counts: BTreeMap<RecordKind, usize> = BTreeMap::new();
        for record in records {
            *counts.entry(record.kind).or_default() += 1;
        }

        let open_issues: Vec<Record> = records
            .iter()
            .filter(|r| inputs.stats.issue_status(r) == Some(IssueStatus::Open))
            .cloned()
            .collect();

        StatusView {
            namespace: inputs.namespace.to_string(),
            active_investigation: investigation::active(inputs.investigations).cloned(),
            investigations: inputs.investigations.len(),
            total_records: records.len(),
            counts,
            summaries: records.iter().filter(|r| r.is_summary()).count(),
            hotspots: location_hotspots(records, inputs.stats),
            open_issues,
            reflections: inputs.reflections,
            anomalies: inputs.anomalies,
            bytes: inputs.bytes,
            pressure: MemoryPressure::from_record_count(records.len()),
            compaction_due: inputs.compaction_due,
        }
    }
}

/// Locations with the most open issues, then the most records
pub fn location_hotspots(records: &[Record], stats: &StoreStats) -> Vec<LocationHotspot> {
    let mut by_location: HashMap<&str, LocationHotspot> = HashMap::new();
    for record in records {
        let Some(location) = record.location.as_deref() else {
            continue;
        };
        let entry = by_location
            .entry(location)
            .or_insert_with(|| LocationHotspot {
                location: location.to_string(),
                records: 0,
                open_issues: 0,
            });
        entry.records += 1;
        if stats.issue_status(record) == Some(IssueStatus::Open) {
            entry.open_issues += 1;
        }
    }

    let mut hotspots: Vec<LocationHotspot> = by_location.into_values().collect();
    hotspots.sort_by(|a, b| {
        b.open_issues
            .cmp(&a.open_issues)
            .then_with(|| b.records.cmp(&a.records))
            .then_with(|| a.location.cmp(&b.location))
    });
    hotspots.truncate(HOTSPOT_LIMIT);
    hotspots
}
