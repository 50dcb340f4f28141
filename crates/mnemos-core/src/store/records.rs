//! Record writes and reads

use std::time::Instant;

use chrono::Utc;

use crate::classify::resolved_issue_ids;
use crate::error::{MnemosError, Result};
use crate::id::RecordId;
use crate::investigation;
use crate::lock::StoreLock;
use crate::log::ReadResult;
use crate::record::{validate, IssueStatus, Record, RecordDraft, RecordKind};
use crate::trace_time;

use super::Store;

impl Store {
    /// Validate and durably append a record.
    ///
    /// Reflections go to the reflections log, everything else to the primary
    /// log. A draft without an investigation joins the active one, if any.
    /// The returned record is only handed back once it is synced to disk.
    #[tracing::instrument(skip(self, draft), fields(kind = %draft.kind))]
    pub fn append(&self, draft: RecordDraft) -> Result<Record> {
        let lock = self.lock()?;
        self.append_locked(draft, &lock)
    }

    pub(super) fn append_locked(&self, mut draft: RecordDraft, lock: &StoreLock) -> Result<Record> {
        let investigations = investigation::fold(&self.investigations.read_all()?.entries);
        // resolutions carry their issue's investigation, even when it has none
        if draft.investigation_id.is_none() && draft.resolves.is_empty() {
            draft.investigation_id =
                investigation::active(&investigations).map(|inv| inv.id.clone());
        }

        let explicit_id = draft.id.is_some();
        let log = self.log_for(draft.kind);
        let mut record = validate(draft, &investigations, Utc::now())?;

        let last = log.last_entry()?;
        let last_id = last.as_ref().map(|r| &r.id);
        if explicit_id {
            if let Some(last_id) = last_id.filter(|last_id| record.id <= **last_id) {
                crate::bail_invariant!(
                    "record id {} does not sort after the last record {}",
                    record.id,
                    last_id
                );
            }
        } else {
            record.id = record.id.ordered_after(last_id)?;
        }

        log.append(&record, lock)?;
        tracing::debug!(id = %record.id, kind = %record.kind, "record appended");
        Ok(record)
    }

    /// Append a resolution for an open issue.
    ///
    /// The resolution is an `issue` record with `status = resolved` whose
    /// `resolves` names the original. It inherits the issue's investigation
    /// and severity.
    #[tracing::instrument(skip(self, solution), fields(issue = %issue_id))]
    pub fn resolve_issue(&self, issue_id: &RecordId, solution: &str) -> Result<Record> {
        let lock = self.lock()?;
        let records = self.records.read_all()?.entries;

        let issue = records
            .iter()
            .find(|r| &r.id == issue_id && r.kind == RecordKind::Issue)
            .ok_or_else(|| MnemosError::not_found("issue", issue_id))?;
        if issue.status == Some(IssueStatus::Resolved)
            || resolved_issue_ids(&records).contains(issue_id)
        {
            crate::bail_invariant!("issue {} is already resolved", issue_id);
        }

        let mut draft = RecordDraft::new(RecordKind::Issue, solution)
            .resolving(issue_id.clone())
            .with_severity(issue.severity.unwrap_or_default());
        if let Some(location) = &issue.location {
            draft = draft.at_location(location.clone());
        }
        if let Some(investigation_id) = &issue.investigation_id {
            draft = draft.in_investigation(investigation_id.clone());
        }

        let resolution = self.append_locked(draft, &lock)?;
        tracing::info!(issue = %issue_id, resolution = %resolution.id, "issue resolved");
        Ok(resolution)
    }

    /// All well-formed primary-log records in write order, with the lines
    /// that were skipped
    pub fn read_all(&self) -> Result<ReadResult<Record>> {
        let start = Instant::now();
        let result = self.records.read_all()?;
        trace_time!(start, "read_all", records = result.entries.len());
        Ok(result)
    }

    /// All reflections in write order
    pub fn reflections(&self) -> Result<ReadResult<Record>> {
        self.reflections.read_all()
    }

    /// Case-insensitive substring search over content, detail and location.
    ///
    /// Returns at most `limit` of the most recent matches, in write order.
    pub fn search(&self, term: &str, kind: Option<RecordKind>, limit: usize) -> Result<Vec<Record>> {
        let needle = term.trim().to_lowercase();
        if needle.is_empty() {
            crate::bail_invalid!("term", "search term must not be empty");
        }

        let mut records = self.read_all()?.entries;
        records.extend(self.reflections()?.entries);
        records.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));

        let matches: Vec<Record> = records
            .into_iter()
            .filter(|r| kind.is_none_or(|k| r.kind == k))
            .filter(|r| {
                [Some(&r.content), r.detail.as_ref(), r.location.as_ref()]
                    .into_iter()
                    .flatten()
                    .any(|field| field.to_lowercase().contains(&needle))
            })
            .collect();

        let skip = matches.len().saturating_sub(limit);
        Ok(matches.into_iter().skip(skip).collect())
    }
}
