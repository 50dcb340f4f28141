//! Meta-reflection over recent records
//!
//! Looks for clusters in the most recent records (issue hotspots by module,
//! bursts of discoveries, repeated critical issues) and renders them as a
//! `reflection` record.

use std::collections::HashMap;

use serde::Serialize;

use crate::investigation::Investigation;
use crate::record::{Record, RecordKind, Severity};

/// Records examined by default
pub const DEFAULT_WINDOW: usize = 50;

/// Fewer records than this in the window yields no reflection
pub const MIN_RECORDS: usize = 10;

/// Only the most recent issues count towards hotspots
const HOTSPOT_ISSUES: usize = 10;

const HOTSPOT_LIMIT: usize = 3;
const UNKNOWN_MODULE: &str = "unknown";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModuleHotspot {
    pub module: String,
    pub issues: usize,
}

/// What the analysis found
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReflectionAnalysis {
    pub records_analyzed: usize,
    pub issue_hotspots: Vec<ModuleHotspot>,
    pub closed_investigations: usize,
    pub discoveries: usize,
    pub critical_issues: usize,
    pub insights: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ReflectionOutcome {
    /// Not enough history to say anything
    InsufficientData { records: usize, required: usize },
    /// A reflection was written
    Recorded {
        reflection: Record,
        analysis: ReflectionAnalysis,
    },
}

/// Module of a location: its first path segment
fn module_of(location: Option<&str>) -> &str {
    match location.map(str::trim).filter(|l| !l.is_empty()) {
        Some(location) => location.split('/').next().unwrap_or(location),
        None => UNKNOWN_MODULE,
    }
}

/// Analyze `recent` (already cut to the window, in write order)
pub fn analyze(recent: &[Record], investigations: &[Investigation]) -> ReflectionAnalysis {
    let issues: Vec<&Record> = recent
        .iter()
        .filter(|r| r.kind == RecordKind::Issue && r.resolves.is_empty())
        .collect();
    let discoveries = recent
        .iter()
        .filter(|r| r.kind == RecordKind::Discovery)
        .count();
    let critical_issues = issues
        .iter()
        .filter(|r| r.severity == Some(Severity::Critical))
        .count();

    let mut by_module: HashMap<&str, usize> = HashMap::new();
    let skip = issues.len().saturating_sub(HOTSPOT_ISSUES);
    for issue in issues.iter().skip(skip) {
        *by_module.entry(module_of(issue.location.as_deref())).or_default() += 1;
    }
    let mut issue_hotspots: Vec<ModuleHotspot> = by_module
        .into_iter()
        .map(|(module, issues)| ModuleHotspot {
            module: module.to_string(),
            issues,
        })
        .collect();
    issue_hotspots.sort_by(|a, b| b.issues.cmp(&a.issues).then_with(|| a.module.cmp(&b.module)));
    issue_hotspots.truncate(HOTSPOT_LIMIT);

    let mut insights = Vec::new();
    if let Some(hottest) = issue_hotspots.first().filter(|h| h.issues >= 2) {
        insights.push(format!(
            "Issue hotspot: {} module ({} issues)",
            hottest.module, hottest.issues
        ));
    }
    if discoveries >= 3 {
        insights.push(format!("High discovery rate: {discoveries} recent discoveries"));
    }
    if critical_issues >= 2 {
        insights.push(format!(
            "{critical_issues} critical issues suggest systemic problems"
        ));
    }
    if insights.is_empty() {
        insights.push("No clear patterns detected yet".to_string());
    }

    ReflectionAnalysis {
        records_analyzed: recent.len(),
        issue_hotspots,
        closed_investigations: investigations.iter().filter(|inv| !inv.is_active()).count(),
        discoveries,
        critical_issues,
        insights,
    }
}

impl ReflectionAnalysis {
    /// Content of the reflection record
    pub fn render_insights(&self) -> String {
        let mut out = format!("Reflection over {} records:", self.records_analyzed);
        for insight in &self.insights {
            out.push_str("\n- ");
            out.push_str(insight);
        }
        out
    }

    /// Detail of the reflection record
    pub fn render_hotspots(&self) -> Option<String> {
        if self.issue_hotspots.is_empty() {
            return None;
        }
        let parts: Vec<String> = self
            .issue_hotspots
            .iter()
            .map(|h| format!("{}: {}", h.module, h.issues))
            .collect();
        Some(format!(
            "issue hotspots: {}; closed investigations: {}",
            parts.join(", "),
            self.closed_investigations
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{validate, RecordDraft};
    use chrono::Utc;

    fn issue(location: &str, severity: Severity) -> Record {
        validate(
            RecordDraft::new(RecordKind::Issue, "broken")
                .at_location(location)
                .with_severity(severity),
            &[],
            Utc::now(),
        )
        .unwrap()
    }

    fn discovery() -> Record {
        validate(RecordDraft::new(RecordKind::Discovery, "found"), &[], Utc::now()).unwrap()
    }

    #[test]
    fn test_module_of() {
        assert_eq!(module_of(Some("auth/login.rs:12")), "auth");
        assert_eq!(module_of(Some("main.rs")), "main.rs");
        assert_eq!(module_of(None), "unknown");
        assert_eq!(module_of(Some("  ")), "unknown");
    }

    #[test]
    fn test_hotspot_and_systemic_insights() {
        let records = vec![
            issue("auth/login.rs", Severity::Critical),
            issue("auth/token.rs", Severity::Critical),
            issue("db/pool.rs", Severity::Low),
        ];
        let analysis = analyze(&records, &[]);

        assert_eq!(analysis.issue_hotspots[0].module, "auth");
        assert_eq!(analysis.issue_hotspots[0].issues, 2);
        assert_eq!(analysis.critical_issues, 2);
        assert!(analysis.insights.iter().any(|i| i.contains("auth module")));
        assert!(analysis.insights.iter().any(|i| i.contains("systemic")));
    }

    #[test]
    fn test_discovery_rate_insight() {
        let records = vec![discovery(), discovery(), discovery()];
        let analysis = analyze(&records, &[]);
        assert_eq!(analysis.insights, vec!["High discovery rate: 3 recent discoveries"]);
        assert_eq!(analysis.render_hotspots(), None);
    }

    #[test]
    fn test_no_patterns() {
        let analysis = analyze(&[discovery()], &[]);
        assert_eq!(analysis.insights, vec!["No clear patterns detected yet"]);
        assert!(analysis.render_insights().starts_with("Reflection over 1 records:"));
    }
}
