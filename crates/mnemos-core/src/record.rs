//! Record model: the typed entry schema and its validation rules
//!
//! A [`Record`] is the atomic, append-only unit of the memory log. Callers
//! build a [`RecordDraft`] and turn it into a record with [`validate`], which
//! is pure: it reads the known investigations but performs no I/O.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{MnemosError, Result};
use crate::id::{InvestigationId, RecordId};
use crate::investigation::{Investigation, InvestigationState};

/// Current record schema version, written as `"v"` on every line
pub const RECORD_VERSION: u32 = 1;

fn default_version() -> u32 {
    RECORD_VERSION
}

/// Closed set of record kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    /// Raw finding - what was seen
    Observation,
    /// Analyzed understanding of observations
    Insight,
    /// Breakthrough that changes the picture
    Discovery,
    /// Problem found at a location
    Issue,
    /// Architectural pattern worth keeping across projects
    Pattern,
    /// Design rule with its rationale
    Principle,
    /// Something to avoid and why
    Antipattern,
    /// Meta-analysis over other records
    Reflection,
}

impl RecordKind {
    /// Every kind, in declaration order
    pub const ALL: [RecordKind; 8] = [
        RecordKind::Observation,
        RecordKind::Insight,
        RecordKind::Discovery,
        RecordKind::Issue,
        RecordKind::Pattern,
        RecordKind::Principle,
        RecordKind::Antipattern,
        RecordKind::Reflection,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RecordKind::Observation => "observation",
            RecordKind::Insight => "insight",
            RecordKind::Discovery => "discovery",
            RecordKind::Issue => "issue",
            RecordKind::Pattern => "pattern",
            RecordKind::Principle => "principle",
            RecordKind::Antipattern => "antipattern",
            RecordKind::Reflection => "reflection",
        }
    }

    /// Plural label used in digests and human output
    pub fn plural(&self) -> &'static str {
        match self {
            RecordKind::Observation => "observations",
            RecordKind::Insight => "insights",
            RecordKind::Discovery => "discoveries",
            RecordKind::Issue => "issues",
            RecordKind::Pattern => "patterns",
            RecordKind::Principle => "principles",
            RecordKind::Antipattern => "antipatterns",
            RecordKind::Reflection => "reflections",
        }
    }
}

impl FromStr for RecordKind {
    type Err = MnemosError;

    fn from_str(s: &str) -> Result<Self> {
        let lowered = s.trim().to_lowercase();
        RecordKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == lowered)
            .ok_or_else(|| {
                MnemosError::validation(
                    "kind",
                    format!(
                        "unknown kind '{}' (expected one of: {})",
                        s,
                        RecordKind::ALL.map(|k| k.as_str()).join(", ")
                    ),
                )
            })
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle of an issue record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueStatus {
    #[default]
    Open,
    Resolved,
}

impl fmt::Display for IssueStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IssueStatus::Open => f.write_str("open"),
            IssueStatus::Resolved => f.write_str("resolved"),
        }
    }
}

/// Severity of an issue record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

impl FromStr for Severity {
    type Err = MnemosError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(Severity::Low),
            "medium" => Ok(Severity::Medium),
            "high" => Ok(Severity::High),
            "critical" => Ok(Severity::Critical),
            other => Err(MnemosError::validation(
                "severity",
                format!("unknown severity '{other}' (expected: low, medium, high, critical)"),
            )),
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Low => f.write_str("low"),
            Severity::Medium => f.write_str("medium"),
            Severity::High => f.write_str("high"),
            Severity::Critical => f.write_str("critical"),
        }
    }
}

/// Provenance of a summary record produced by compaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompactedFrom {
    /// Number of records replaced
    pub count: usize,
    /// Id of the first replaced record
    pub first_id: RecordId,
    /// Id of the last replaced record
    pub last_id: RecordId,
    /// `created_at` of the first replaced record
    pub from: DateTime<Utc>,
    /// `created_at` of the last replaced record
    pub to: DateTime<Utc>,
    /// When the compaction ran
    pub compacted_at: DateTime<Utc>,
}

/// One logged note
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Record schema version
    #[serde(rename = "v", default = "default_version")]
    pub version: u32,
    pub id: RecordId,
    pub kind: RecordKind,
    pub content: String,
    /// Secondary text: context, evidence, impact or rationale
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// Only present on issues
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<IssueStatus>,
    /// Only present on issues
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<Severity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub investigation_id: Option<InvestigationId>,
    /// Issue ids this record marks as resolved
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub resolves: Vec<RecordId>,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compacted_from: Option<CompactedFrom>,
}

impl Record {
    /// Whether this record is a compaction summary
    pub fn is_summary(&self) -> bool {
        self.compacted_from.is_some()
    }
}

/// Unvalidated input for a new record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordDraft {
    pub kind: RecordKind,
    pub content: String,
    pub detail: Option<String>,
    pub location: Option<String>,
    pub status: Option<IssueStatus>,
    pub severity: Option<Severity>,
    pub investigation_id: Option<InvestigationId>,
    pub resolves: Vec<RecordId>,
    pub id: Option<RecordId>,
    pub created_at: Option<DateTime<Utc>>,
    /// Permit attaching the record to a closed investigation
    pub allow_closed_investigation: bool,
}

impl RecordDraft {
    pub fn new(kind: RecordKind, content: impl Into<String>) -> Self {
        Self {
            kind,
            content: content.into(),
            detail: None,
            location: None,
            status: None,
            severity: None,
            investigation_id: None,
            resolves: Vec::new(),
            id: None,
            created_at: None,
            allow_closed_investigation: false,
        }
    }

    /// Build a draft from a kind name, rejecting unknown kinds
    pub fn parse(kind: &str, content: impl Into<String>) -> Result<Self> {
        Ok(Self::new(kind.parse()?, content))
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn at_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_status(mut self, status: IssueStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = Some(severity);
        self
    }

    pub fn in_investigation(mut self, id: InvestigationId) -> Self {
        self.investigation_id = Some(id);
        self
    }

    pub fn with_id(mut self, id: RecordId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn created_at(mut self, at: DateTime<Utc>) -> Self {
        self.created_at = Some(at);
        self
    }

    /// Turn the draft into a resolution of `issue_id`
    pub fn resolving(mut self, issue_id: RecordId) -> Self {
        self.resolves.push(issue_id);
        self.status = Some(IssueStatus::Resolved);
        self.allow_closed_investigation = true;
        self
    }

    pub fn allow_closed_investigation(mut self) -> Self {
        self.allow_closed_investigation = true;
        self
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Validate a draft against the known investigations and build the record.
///
/// Assigns `id` and `created_at` when the draft does not carry them.
pub fn validate(
    draft: RecordDraft,
    investigations: &[Investigation],
    now: DateTime<Utc>,
) -> Result<Record> {
    let content = draft.content.trim().to_string();
    if content.is_empty() {
        crate::bail_invalid!("content", "must not be empty");
    }

    let is_issue = draft.kind == RecordKind::Issue;
    if !is_issue && draft.status.is_some() {
        crate::bail_invalid!(
            "status",
            format!("status is only allowed on issues, not {}", draft.kind)
        );
    }
    if !is_issue && draft.severity.is_some() {
        crate::bail_invalid!(
            "severity",
            format!("severity is only allowed on issues, not {}", draft.kind)
        );
    }
    if !draft.resolves.is_empty() {
        if !is_issue {
            crate::bail_invalid!("resolves", "only issue records can resolve issues");
        }
        if draft.status == Some(IssueStatus::Open) {
            crate::bail_invalid!("status", "a resolution record cannot be open");
        }
    }

    if let Some(investigation_id) = &draft.investigation_id {
        let investigation = investigations
            .iter()
            .find(|inv| &inv.id == investigation_id)
            .ok_or_else(|| {
                MnemosError::validation(
                    "investigation_id",
                    format!("unknown investigation {investigation_id}"),
                )
            })?;
        if investigation.state == InvestigationState::Closed && !draft.allow_closed_investigation
        {
            crate::bail_invalid!(
                "investigation_id",
                format!("investigation {investigation_id} is closed")
            );
        }
    }

    let (status, severity) = if is_issue {
        let status = if draft.resolves.is_empty() {
            draft.status.unwrap_or_default()
        } else {
            IssueStatus::Resolved
        };
        (Some(status), Some(draft.severity.unwrap_or_default()))
    } else {
        (None, None)
    };

    Ok(Record {
        version: RECORD_VERSION,
        id: draft.id.unwrap_or_else(RecordId::generate),
        kind: draft.kind,
        content,
        detail: non_empty(draft.detail),
        location: non_empty(draft.location),
        status,
        severity,
        investigation_id: draft.investigation_id,
        resolves: draft.resolves,
        created_at: draft.created_at.unwrap_or(now),
        compacted_from: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn investigation(topic: &str, state: InvestigationState) -> Investigation {
        Investigation {
            id: InvestigationId::generate(),
            topic: topic.to_string(),
            started_at: Utc::now(),
            ended_at: (state == InvestigationState::Closed).then(Utc::now),
            state,
        }
    }

    #[test]
    fn test_validate_assigns_id_and_timestamp() {
        let now = Utc::now();
        let record = validate(
            RecordDraft::new(RecordKind::Observation, "  cache misses spike  "),
            &[],
            now,
        )
        .unwrap();
        assert_eq!(record.content, "cache misses spike");
        assert_eq!(record.created_at, now);
        assert_eq!(record.version, RECORD_VERSION);
        assert!(record.status.is_none());
    }

    #[test]
    fn test_validate_rejects_empty_content() {
        let err = validate(RecordDraft::new(RecordKind::Insight, "   "), &[], Utc::now())
            .unwrap_err();
        assert!(matches!(err, MnemosError::Validation { ref field, .. } if field == "content"));
    }

    #[test]
    fn test_unknown_kind_rejected() {
        let err = RecordDraft::parse("hunch", "maybe").unwrap_err();
        assert!(err.to_string().contains("unknown kind 'hunch'"));
    }

    #[test]
    fn test_status_on_non_issue_rejected() {
        let draft =
            RecordDraft::new(RecordKind::Discovery, "found it").with_status(IssueStatus::Open);
        assert!(validate(draft, &[], Utc::now()).is_err());
    }

    #[test]
    fn test_severity_on_non_issue_rejected() {
        let draft =
            RecordDraft::new(RecordKind::Pattern, "retry loop").with_severity(Severity::High);
        assert!(validate(draft, &[], Utc::now()).is_err());
    }

    #[test]
    fn test_issue_defaults_to_open_medium() {
        let record = validate(
            RecordDraft::new(RecordKind::Issue, "null deref").at_location("src/lib.rs:42"),
            &[],
            Utc::now(),
        )
        .unwrap();
        assert_eq!(record.status, Some(IssueStatus::Open));
        assert_eq!(record.severity, Some(Severity::Medium));
        assert_eq!(record.location.as_deref(), Some("src/lib.rs:42"));
    }

    #[test]
    fn test_resolution_is_resolved_issue() {
        let target = RecordId::generate();
        let record = validate(
            RecordDraft::new(RecordKind::Issue, "guard added").resolving(target.clone()),
            &[],
            Utc::now(),
        )
        .unwrap();
        assert_eq!(record.status, Some(IssueStatus::Resolved));
        assert_eq!(record.resolves, vec![target]);
    }

    #[test]
    fn test_unknown_investigation_rejected() {
        let draft = RecordDraft::new(RecordKind::Observation, "x")
            .in_investigation(InvestigationId::generate());
        let err = validate(draft, &[], Utc::now()).unwrap_err();
        assert!(err.to_string().contains("unknown investigation"));
    }

    #[test]
    fn test_closed_investigation_needs_permission() {
        let closed = investigation("old", InvestigationState::Closed);
        let draft =
            RecordDraft::new(RecordKind::Observation, "late note").in_investigation(closed.id.clone());
        assert!(validate(draft.clone(), std::slice::from_ref(&closed), Utc::now()).is_err());

        let allowed = draft.allow_closed_investigation();
        assert!(validate(allowed, std::slice::from_ref(&closed), Utc::now()).is_ok());
    }

    #[test]
    fn test_active_investigation_accepted() {
        let active = investigation("T1", InvestigationState::Active);
        let record = validate(
            RecordDraft::new(RecordKind::Observation, "x").in_investigation(active.id.clone()),
            std::slice::from_ref(&active),
            Utc::now(),
        )
        .unwrap();
        assert_eq!(record.investigation_id, Some(active.id));
    }

    #[test]
    fn test_serialized_shape_omits_absent_fields() {
        let record = validate(
            RecordDraft::new(RecordKind::Observation, "plain"),
            &[],
            Utc::now(),
        )
        .unwrap();
        let line = serde_json::to_string(&record).unwrap();
        assert!(line.starts_with("{\"v\":1,"));
        assert!(!line.contains("status"));
        assert!(!line.contains("compacted_from"));
        let back: Record = serde_json::from_str(&line).unwrap();
        assert_eq!(back, record);
    }
}
