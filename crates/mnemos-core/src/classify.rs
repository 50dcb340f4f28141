//! Retention classifier
//!
//! Maps a record to a retention [`Tier`] and a secondary importance score.
//! The tier depends only on kind, effective issue status and whether the
//! record is already a compaction summary; the score never overrides it.

use std::collections::HashSet;

use chrono::{DateTime, Utc};

use crate::config::ScoringConfig;
use crate::id::RecordId;
use crate::record::{IssueStatus, Record, RecordKind, Severity};

/// Retention tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tier {
    /// Never rewritten by compaction
    Preserve,
    /// May be merged into a summary record
    Compressible,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Classification {
    pub tier: Tier,
    pub score: f64,
}

/// Log-wide facts the classifier needs, computed once per snapshot
#[derive(Debug, Clone)]
pub struct StoreStats {
    /// Reference time for recency; the newest `created_at` in the snapshot
    pub now: DateTime<Utc>,
    /// Issue ids resolved by some record in the snapshot
    pub resolved: HashSet<RecordId>,
    pub scoring: ScoringConfig,
}

impl StoreStats {
    pub fn from_records(records: &[Record], scoring: &ScoringConfig) -> Self {
        let now = records
            .iter()
            .map(|r| r.created_at)
            .max()
            .unwrap_or(DateTime::<Utc>::UNIX_EPOCH);
        Self {
            now,
            resolved: resolved_issue_ids(records),
            scoring: scoring.clone(),
        }
    }

    /// Effective status of an issue record after folding resolutions
    pub fn issue_status(&self, record: &Record) -> Option<IssueStatus> {
        if record.kind != RecordKind::Issue {
            return None;
        }
        if record.status == Some(IssueStatus::Resolved) || self.resolved.contains(&record.id) {
            Some(IssueStatus::Resolved)
        } else {
            Some(IssueStatus::Open)
        }
    }
}

/// Every issue id that some record lists in `resolves`
pub fn resolved_issue_ids(records: &[Record]) -> HashSet<RecordId> {
    records
        .iter()
        .flat_map(|r| r.resolves.iter().cloned())
        .collect()
}

/// Classify a record. Pure and deterministic for a given `stats`.
pub fn classify(record: &Record, stats: &StoreStats) -> Classification {
    Classification {
        tier: tier(record, stats),
        score: score(record, stats),
    }
}

fn tier(record: &Record, stats: &StoreStats) -> Tier {
    if record.is_summary() {
        return Tier::Preserve;
    }
    match record.kind {
        RecordKind::Discovery
        | RecordKind::Pattern
        | RecordKind::Principle
        | RecordKind::Antipattern
        | RecordKind::Reflection => Tier::Preserve,
        RecordKind::Issue => match stats.issue_status(record) {
            Some(IssueStatus::Resolved) => Tier::Compressible,
            _ => Tier::Preserve,
        },
        RecordKind::Observation | RecordKind::Insight => Tier::Compressible,
    }
}

fn kind_weight(kind: RecordKind) -> f64 {
    match kind {
        RecordKind::Discovery => 1.0,
        RecordKind::Principle | RecordKind::Pattern => 0.9,
        RecordKind::Antipattern => 0.8,
        RecordKind::Reflection => 0.7,
        RecordKind::Issue => 0.6,
        RecordKind::Insight => 0.5,
        RecordKind::Observation => 0.3,
    }
}

fn severity_boost(severity: Option<Severity>) -> f64 {
    match severity {
        Some(Severity::Critical) => 0.3,
        Some(Severity::High) => 0.2,
        Some(Severity::Medium) => 0.1,
        Some(Severity::Low) | None => 0.0,
    }
}

fn score(record: &Record, stats: &StoreStats) -> f64 {
    let length = (record.content.chars().count() as f64 / 500.0).min(1.0) * 0.2;
    let age_days = (stats.now - record.created_at).num_seconds().max(0) as f64 / 86_400.0;
    let decay = stats.scoring.recency_decay_days.max(f64::EPSILON);
    let recency = stats.scoring.recency_boost_numerator / (1.0 + age_days / decay);
    kind_weight(record.kind) + severity_boost(record.severity) + length + recency
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{validate, CompactedFrom, RecordDraft};
    use chrono::Duration;

    fn make(kind: RecordKind) -> Record {
        validate(RecordDraft::new(kind, "content"), &[], Utc::now()).unwrap()
    }

    fn stats(records: &[Record]) -> StoreStats {
        StoreStats::from_records(records, &ScoringConfig::default())
    }

    #[test]
    fn test_high_value_kinds_preserved() {
        for kind in [
            RecordKind::Discovery,
            RecordKind::Pattern,
            RecordKind::Principle,
            RecordKind::Antipattern,
            RecordKind::Reflection,
        ] {
            let record = make(kind);
            assert_eq!(classify(&record, &stats(&[])).tier, Tier::Preserve, "{kind}");
        }
    }

    #[test]
    fn test_routine_kinds_compressible() {
        for kind in [RecordKind::Observation, RecordKind::Insight] {
            let record = make(kind);
            assert_eq!(classify(&record, &stats(&[])).tier, Tier::Compressible);
        }
    }

    #[test]
    fn test_open_issue_preserved_until_resolved() {
        let issue = make(RecordKind::Issue);
        assert_eq!(classify(&issue, &stats(&[issue.clone()])).tier, Tier::Preserve);

        let resolution = validate(
            RecordDraft::new(RecordKind::Issue, "fixed").resolving(issue.id.clone()),
            &[],
            Utc::now(),
        )
        .unwrap();
        let snapshot = [issue.clone(), resolution.clone()];
        let stats = stats(&snapshot);
        assert_eq!(classify(&issue, &stats).tier, Tier::Compressible);
        assert_eq!(classify(&resolution, &stats).tier, Tier::Compressible);
    }

    #[test]
    fn test_summary_preserved_regardless_of_kind() {
        let mut summary = make(RecordKind::Observation);
        summary.compacted_from = Some(CompactedFrom {
            count: 3,
            first_id: summary.id.clone(),
            last_id: summary.id.clone(),
            from: summary.created_at,
            to: summary.created_at,
            compacted_at: summary.created_at,
        });
        assert_eq!(classify(&summary, &stats(&[])).tier, Tier::Preserve);
    }

    #[test]
    fn test_score_is_deterministic_and_ranks_kinds() {
        let discovery = make(RecordKind::Discovery);
        let observation = make(RecordKind::Observation);
        let snapshot = [discovery.clone(), observation.clone()];
        let stats = stats(&snapshot);
        let a = classify(&discovery, &stats).score;
        assert_eq!(a, classify(&discovery, &stats).score);
        assert!(a > classify(&observation, &stats).score);
    }

    #[test]
    fn test_recency_raises_score() {
        let mut old = make(RecordKind::Observation);
        old.created_at -= Duration::days(30);
        let fresh = make(RecordKind::Observation);
        let snapshot = [old.clone(), fresh.clone()];
        let stats = stats(&snapshot);
        assert!(classify(&fresh, &stats).score > classify(&old, &stats).score);
    }
}
