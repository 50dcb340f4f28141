//! Grouping of compressible records into summary candidates

use chrono::{DateTime, Utc};

use crate::classify::{classify, StoreStats, Tier};
use crate::config::CompactionConfig;
use crate::error::Result;
use crate::id::InvestigationId;
use crate::log::ScannedLine;
use crate::record::Record;

use super::archive::ArchivedRun;
use super::digest::summarize;

/// One line of the rewritten log
#[derive(Debug, Clone)]
pub enum Slot<'a> {
    /// An original line, written back byte-for-byte
    Keep {
        raw: &'a [u8],
        record: Option<&'a Record>,
    },
    /// A summary replacing a run of compressible records
    Summary {
        record: Record,
        line: Vec<u8>,
        replaced: Vec<&'a Record>,
    },
}

impl Slot<'_> {
    pub fn bytes(&self) -> &[u8] {
        match self {
            Slot::Keep { raw, .. } => raw,
            Slot::Summary { line, .. } => line,
        }
    }

    pub fn record(&self) -> Option<&Record> {
        match self {
            Slot::Keep { record, .. } => *record,
            Slot::Summary { record, .. } => Some(record),
        }
    }
}

/// The rewritten log, slot by slot, in original relative order
#[derive(Debug, Clone, Default)]
pub struct CompactionPlan<'a> {
    pub slots: Vec<Slot<'a>>,
    pub groups_summarized: usize,
    pub records_summarized: usize,
}

/// A contiguous run of compressible records sharing one investigation
struct Run<'a> {
    key: Option<InvestigationId>,
    members: Vec<(&'a [u8], &'a Record)>,
}

impl<'a> CompactionPlan<'a> {
    /// Plan a compaction of `lines`.
    ///
    /// Runs are bounded by any preserved or unreadable line and by a change
    /// of investigation. A run of two or more records becomes one summary,
    /// unless the summary line would not be smaller than the lines it
    /// replaces.
    pub fn build(
        lines: &'a [ScannedLine<Record>],
        stats: &StoreStats,
        config: &CompactionConfig,
        now: DateTime<Utc>,
    ) -> Result<Self> {
        let mut plan = CompactionPlan::default();
        let mut run: Option<Run<'a>> = None;

        for line in lines {
            match &line.parsed {
                Ok(record) if classify(record, stats).tier == Tier::Compressible => {
                    let same_run = run
                        .as_ref()
                        .is_some_and(|r| r.key == record.investigation_id);
                    if !same_run {
                        if let Some(done) = run.take() {
                            plan.flush(done, config, now)?;
                        }
                        run = Some(Run {
                            key: record.investigation_id.clone(),
                            members: Vec::new(),
                        });
                    }
                    if let Some(current) = run.as_mut() {
                        current.members.push((line.raw.as_slice(), record));
                    }
                }
                parsed => {
                    if let Some(done) = run.take() {
                        plan.flush(done, config, now)?;
                    }
                    plan.slots.push(Slot::Keep {
                        raw: &line.raw,
                        record: parsed.as_ref().ok(),
                    });
                }
            }
        }
        if let Some(done) = run.take() {
            plan.flush(done, config, now)?;
        }

        Ok(plan)
    }

    fn keep_all(&mut self, run: Run<'a>) {
        for (raw, record) in run.members {
            self.slots.push(Slot::Keep {
                raw,
                record: Some(record),
            });
        }
    }

    fn flush(&mut self, run: Run<'a>, config: &CompactionConfig, now: DateTime<Utc>) -> Result<()> {
        if run.members.len() < 2 {
            self.keep_all(run);
            return Ok(());
        }

        let records: Vec<&'a Record> = run.members.iter().map(|(_, r)| *r).collect();
        let Some(summary) = summarize(&records, config, now) else {
            self.keep_all(run);
            return Ok(());
        };
        let line = serde_json::to_vec(&summary)?;
        let replaced_bytes: usize = run.members.iter().map(|(raw, _)| raw.len() + 1).sum();

        // Each record line carries a fixed JSON envelope, so short runs
        // (a resolved issue and its resolution, for instance) usually fail
        // this and stay as they are.
        if line.len() + 1 >= replaced_bytes {
            tracing::debug!(
                records = run.members.len(),
                replaced_bytes,
                summary_bytes = line.len() + 1,
                "group left as-is, summary would not shrink it"
            );
            self.keep_all(run);
            return Ok(());
        }

        self.groups_summarized += 1;
        self.records_summarized += run.members.len();
        self.slots.push(Slot::Summary {
            record: summary,
            line,
            replaced: records,
        });
        Ok(())
    }

    /// Number of well-formed records in the planned log
    pub fn record_count(&self) -> usize {
        self.slots.iter().filter(|s| s.record().is_some()).count()
    }

    /// Planned size in bytes, newlines included
    pub fn byte_len(&self) -> u64 {
        self.slots.iter().map(|s| s.bytes().len() as u64 + 1).sum()
    }

    /// The originals behind every summary, for the archive
    pub fn archived_runs(&self, now: DateTime<Utc>) -> Vec<ArchivedRun> {
        self.slots
            .iter()
            .filter_map(|slot| match slot {
                Slot::Summary {
                    record, replaced, ..
                } => Some(ArchivedRun::new(
                    record.id.clone(),
                    replaced.iter().map(|r| (*r).clone()).collect(),
                    now,
                )),
                Slot::Keep { .. } => None,
            })
            .collect()
    }

    /// Whether the plan changes anything
    pub fn is_noop(&self) -> bool {
        self.groups_summarized == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScoringConfig;
    use crate::log::{Anomaly, AnomalyKind};
    use crate::record::{validate, RecordDraft, RecordKind};

    fn scanned(records: &[Record]) -> Vec<ScannedLine<Record>> {
        records
            .iter()
            .map(|r| ScannedLine {
                raw: serde_json::to_vec(r).unwrap(),
                parsed: Ok(r.clone()),
            })
            .collect()
    }

    fn rec(kind: RecordKind, content: &str, inv: Option<&InvestigationId>) -> Record {
        let mut record = validate(RecordDraft::new(kind, content), &[], Utc::now()).unwrap();
        record.investigation_id = inv.cloned();
        record
    }

    fn run(kind: RecordKind, n: usize, inv: Option<&InvestigationId>) -> Vec<Record> {
        (0..n).map(|i| rec(kind, &format!("note {i}"), inv)).collect()
    }

    fn build<'a>(lines: &'a [ScannedLine<Record>], records: &[Record]) -> CompactionPlan<'a> {
        let stats = StoreStats::from_records(records, &ScoringConfig::default());
        CompactionPlan::build(lines, &stats, &CompactionConfig::default(), Utc::now()).unwrap()
    }

    fn kinds(plan: &CompactionPlan<'_>) -> Vec<Option<RecordKind>> {
        plan.slots.iter().map(|s| s.record().map(|r| r.kind)).collect()
    }

    #[test]
    fn test_preserved_record_splits_runs() {
        let mut records = run(RecordKind::Observation, 5, None);
        records.push(rec(RecordKind::Discovery, "root cause", None));
        records.push(rec(RecordKind::Observation, "after", None));
        let lines = scanned(&records);
        let plan = build(&lines, &records);

        assert_eq!(plan.groups_summarized, 1);
        assert_eq!(plan.records_summarized, 5);
        assert_eq!(
            kinds(&plan),
            vec![
                Some(RecordKind::Observation),
                Some(RecordKind::Discovery),
                Some(RecordKind::Observation)
            ]
        );
    }

    #[test]
    fn test_investigation_change_splits_runs() {
        let a = InvestigationId::generate();
        let b = InvestigationId::generate();
        let mut records = run(RecordKind::Insight, 5, Some(&a));
        records.extend(run(RecordKind::Insight, 5, Some(&b)));
        records.push(rec(RecordKind::Insight, "unscoped", None));
        let lines = scanned(&records);
        let plan = build(&lines, &records);

        assert_eq!(plan.groups_summarized, 2);
        assert_eq!(plan.record_count(), 3);
        let keys: Vec<_> = plan
            .slots
            .iter()
            .map(|s| s.record().and_then(|r| r.investigation_id.clone()))
            .collect();
        assert_eq!(keys, vec![Some(a), Some(b), None]);
    }

    #[test]
    fn test_singletons_left_alone() {
        let records = vec![
            rec(RecordKind::Observation, "alone", None),
            rec(RecordKind::Pattern, "kept", None),
            rec(RecordKind::Observation, "also alone", None),
        ];
        let lines = scanned(&records);
        let plan = build(&lines, &records);
        assert!(plan.is_noop());
        assert_eq!(plan.record_count(), 3);
    }

    #[test]
    fn test_group_kept_when_summary_is_larger() {
        let records = run(RecordKind::Observation, 2, None);
        let lines = scanned(&records);
        let plan = build(&lines, &records);
        assert!(plan.is_noop());
        for (slot, line) in plan.slots.iter().zip(&lines) {
            assert_eq!(slot.bytes(), line.raw.as_slice());
        }
    }

    #[test]
    fn test_issue_and_resolution_pair_kept() {
        let issue = rec(RecordKind::Issue, "leak in pool", None);
        let fix = validate(
            RecordDraft::new(RecordKind::Issue, "pool drained on drop").resolving(issue.id.clone()),
            &[],
            Utc::now(),
        )
        .unwrap();
        let records = vec![issue, fix];
        let lines = scanned(&records);
        let plan = build(&lines, &records);

        assert!(plan.is_noop());
        assert_eq!(plan.record_count(), 2);
    }

    #[test]
    fn test_corrupt_line_bounds_run_and_is_kept() {
        let records = run(RecordKind::Observation, 8, None);
        let mut lines = scanned(&records);
        lines.insert(
            4,
            ScannedLine {
                raw: b"{broken".to_vec(),
                parsed: Err(Anomaly {
                    line: 5,
                    kind: AnomalyKind::Malformed,
                    reason: "eof".into(),
                }),
            },
        );
        let plan = build(&lines, &records);

        // two runs of four either side of the corrupt line
        assert_eq!(plan.slots.len(), 3);
        assert_eq!(plan.groups_summarized, 2);
        assert_eq!(plan.slots[1].bytes(), b"{broken");
        assert!(plan.slots[1].record().is_none());
    }

    #[test]
    fn test_archived_runs_hold_originals() {
        let mut records = run(RecordKind::Observation, 6, None);
        records.push(rec(RecordKind::Discovery, "root cause", None));
        let lines = scanned(&records);
        let plan = build(&lines, &records);

        let runs = plan.archived_runs(Utc::now());
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].records, records[..6]);
        assert_eq!(Some(&runs[0].summary_id), plan.slots[0].record().map(|r| &r.id));
    }

    #[test]
    fn test_summary_shrinks_log() {
        let records = run(RecordKind::Observation, 8, None);
        let lines = scanned(&records);
        let before: u64 = lines.iter().map(|l| l.raw.len() as u64 + 1).sum();
        let plan = build(&lines, &records);

        assert_eq!(plan.groups_summarized, 1);
        assert!(plan.byte_len() < before);
        assert_eq!(plan.record_count(), 1);
    }
}
