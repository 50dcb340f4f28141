//! Summary record synthesis
//!
//! A digest is a count header followed by a bullet list of the distinct
//! contents of the replaced records, in write order. Repeats are collapsed
//! into a `(xN)` suffix. Items and the whole digest are capped in length.

use std::collections::BTreeMap;

use chrono::{DateTime, SubsecRound, Utc};

use crate::config::CompactionConfig;
use crate::id::RecordId;
use crate::record::{CompactedFrom, IssueStatus, Record, RecordKind, RECORD_VERSION};

const ELLIPSIS: char = '…';

/// Room kept at the end of a digest for the "more items" line
const OVERFLOW_RESERVE: usize = 32;

/// Build the summary record replacing `group` (at least one record, in write
/// order, all sharing one investigation).
///
/// `compacted_at` is truncated to whole seconds so the serialized width of a
/// summary does not depend on the clock's sub-second digits.
pub(crate) fn summarize(
    group: &[&Record],
    config: &CompactionConfig,
    now: DateTime<Utc>,
) -> Option<Record> {
    let (first, last) = (group.first()?, group.last()?);
    let uniform_kind = group
        .iter()
        .all(|r| r.kind == first.kind)
        .then_some(first.kind);
    let kind = uniform_kind.unwrap_or(RecordKind::Observation);

    let location = group
        .iter()
        .all(|r| r.location == first.location)
        .then(|| first.location.clone())
        .flatten();

    let (status, severity) = if kind == RecordKind::Issue {
        (
            Some(IssueStatus::Resolved),
            group.iter().filter_map(|r| r.severity).max(),
        )
    } else {
        (None, None)
    };

    let mut resolves: Vec<RecordId> = Vec::new();
    for id in group.iter().flat_map(|r| r.resolves.iter()) {
        if !resolves.contains(id) {
            resolves.push(id.clone());
        }
    }

    Some(Record {
        version: RECORD_VERSION,
        id: RecordId::summary_of(&first.id, group.len()),
        kind,
        content: digest(group, uniform_kind, config),
        detail: None,
        location,
        status,
        severity,
        investigation_id: first.investigation_id.clone(),
        resolves,
        created_at: first.created_at,
        compacted_from: Some(CompactedFrom {
            count: group.len(),
            first_id: first.id.clone(),
            last_id: last.id.clone(),
            from: first.created_at,
            to: last.created_at,
            compacted_at: now.trunc_subsecs(0),
        }),
    })
}

fn header(group: &[&Record], uniform_kind: Option<RecordKind>) -> String {
    match uniform_kind {
        Some(kind) => format!("{} {} compacted:", group.len(), kind.plural()),
        None => {
            let mut by_kind: BTreeMap<RecordKind, usize> = BTreeMap::new();
            for record in group {
                *by_kind.entry(record.kind).or_default() += 1;
            }
            let breakdown: Vec<String> = by_kind
                .iter()
                .map(|(kind, n)| {
                    let label = if *n == 1 { kind.as_str() } else { kind.plural() };
                    format!("{n} {label}")
                })
                .collect();
            format!(
                "{} records compacted ({}):",
                group.len(),
                breakdown.join(", ")
            )
        }
    }
}

/// Distinct contents in first-seen order with their repeat counts
fn distinct_items<'a>(group: &[&'a Record]) -> Vec<(&'a str, usize)> {
    let mut items: Vec<(&'a str, usize)> = Vec::new();
    for &record in group {
        let content = record.content.trim();
        match items.iter_mut().find(|(seen, _)| *seen == content) {
            Some((_, n)) => *n += 1,
            None => items.push((content, 1)),
        }
    }
    items
}

fn truncate_chars(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max.saturating_sub(1)).collect();
    out.push(ELLIPSIS);
    out
}

fn digest(group: &[&Record], uniform_kind: Option<RecordKind>, config: &CompactionConfig) -> String {
    let mut out = header(group, uniform_kind);
    let mut used = out.chars().count();
    let items = distinct_items(group);
    let budget = config.digest_max_chars.saturating_sub(OVERFLOW_RESERVE);

    let mut written = 0;
    for (content, repeats) in &items {
        let single_line = content.replace('\n', " ");
        let mut bullet = format!("\n- {}", truncate_chars(&single_line, config.item_max_chars));
        if *repeats > 1 {
            bullet.push_str(&format!(" (x{repeats})"));
        }
        let len = bullet.chars().count();
        if used + len > budget {
            break;
        }
        out.push_str(&bullet);
        used += len;
        written += 1;
    }

    let omitted = items.len() - written;
    if omitted > 0 {
        out.push_str(&format!("\n- {ELLIPSIS} and {omitted} more"));
    }
    truncate_chars(&out, config.digest_max_chars)
}
