//! Compaction invariant validation

use std::collections::HashSet;

use crate::classify::{classify, StoreStats, Tier};
use crate::log::ScannedLine;
use crate::record::Record;

use super::plan::{CompactionPlan, Slot};

impl CompactionPlan<'_> {
    /// Check the plan against the log it replaces.
    /// Returns a list of error messages (empty if valid)
    pub fn validate(&self, original: &[ScannedLine<Record>], stats: &StoreStats) -> Vec<String> {
        let mut errors = Vec::new();

        let before_records = original.iter().filter(|l| l.parsed.is_ok()).count();
        if self.record_count() > before_records {
            errors.push(format!(
                "record count would grow from {} to {}",
                before_records,
                self.record_count()
            ));
        }

        let before_bytes: u64 = original.iter().map(|l| l.raw.len() as u64 + 1).sum();
        if self.byte_len() > before_bytes {
            errors.push(format!(
                "log would grow from {} to {} bytes",
                before_bytes,
                self.byte_len()
            ));
        }

        // Preserved records must survive unchanged and in order
        let preserved_before: Vec<&[u8]> = original
            .iter()
            .filter(|l| matches!(&l.parsed, Ok(r) if classify(r, stats).tier == Tier::Preserve))
            .map(|l| l.raw.as_slice())
            .collect();
        let preserved_after: Vec<&[u8]> = self
            .slots
            .iter()
            .filter_map(|slot| match slot {
                Slot::Keep {
                    raw,
                    record: Some(r),
                } if classify(r, stats).tier == Tier::Preserve => Some(*raw),
                _ => None,
            })
            .collect();
        if preserved_before != preserved_after {
            errors.push(format!(
                "preserved records changed: {} before, {} after",
                preserved_before.len(),
                preserved_after.len()
            ));
        }

        // Unreadable lines are carried through untouched
        let corrupt_before = original.iter().filter(|l| l.parsed.is_err()).count();
        let corrupt_after = self
            .slots
            .iter()
            .filter(|s| matches!(s, Slot::Keep { record: None, .. }))
            .count();
        if corrupt_before != corrupt_after {
            errors.push(format!(
                "unreadable lines changed: {corrupt_before} before, {corrupt_after} after"
            ));
        }

        let mut seen = HashSet::new();
        for record in self.slots.iter().filter_map(Slot::record) {
            if !seen.insert(record.id.as_str()) {
                errors.push(format!("duplicate record id after compaction: {}", record.id));
            }
        }

        for slot in &self.slots {
            if let Slot::Summary {
                record, replaced, ..
            } = slot
            {
                if replaced.len() < 2 {
                    errors.push(format!("summary {} replaces fewer than two records", record.id));
                }
            }
        }

        errors
    }
}
