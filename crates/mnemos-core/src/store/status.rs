//! Status and reflection views

use std::path::Path;

use crate::classify::StoreStats;
use crate::compaction;
use crate::error::Result;
use crate::investigation;
use crate::record::{RecordDraft, RecordKind};
use crate::reflect::{self, ReflectionOutcome};
use crate::status::{LogAnomaly, StatusInputs, StatusView};

use super::Store;

impl Store {
    /// Snapshot of the namespace. Takes no lock.
    pub fn status(&self) -> Result<StatusView> {
        let read = self.records.read_all()?;
        let reflections = self.reflections.read_all()?;
        let events = self.investigations.read_all()?;
        let archive = self.archive.read_all()?;
        let investigations = investigation::fold(&events.entries);
        let bytes = self.records.size_bytes()?;
        let stats = StoreStats::from_records(&read.entries, &self.config.scoring);

        let anomalies = [
            (&self.paths.records, read.anomalies),
            (&self.paths.reflections, reflections.anomalies),
            (&self.paths.investigations, events.anomalies),
            (&self.paths.archive, archive.anomalies),
        ]
        .into_iter()
        .flat_map(|(path, anomalies)| {
            let log = log_name(path);
            anomalies.into_iter().map(move |anomaly| LogAnomaly {
                log: log.clone(),
                anomaly,
            })
        })
        .collect();

        Ok(StatusView::build(StatusInputs {
            namespace: self.namespace.as_str(),
            records: &read.entries,
            reflections: reflections.entries.len(),
            investigations: &investigations,
            anomalies,
            bytes,
            compaction_due: compaction::check_trigger(
                read.entries.len(),
                bytes,
                &self.config.compaction,
            ),
            stats: &stats,
        }))
    }

    /// Reflect over the last `window` records and log the result as a
    /// reflection, unless fewer than [`reflect::MIN_RECORDS`] are available.
    #[tracing::instrument(skip(self))]
    pub fn reflect(&self, window: usize) -> Result<ReflectionOutcome> {
        let lock = self.lock()?;
        let records = self.records.read_all()?.entries;
        let recent = &records[records.len().saturating_sub(window)..];
        if recent.len() < reflect::MIN_RECORDS {
            tracing::debug!(records = recent.len(), "not enough records to reflect");
            return Ok(ReflectionOutcome::InsufficientData {
                records: recent.len(),
                required: reflect::MIN_RECORDS,
            });
        }

        let investigations = investigation::fold(&self.investigations.read_all()?.entries);
        let analysis = reflect::analyze(recent, &investigations);

        let mut draft = RecordDraft::new(RecordKind::Reflection, analysis.render_insights());
        if let Some(detail) = analysis.render_hotspots() {
            draft = draft.with_detail(detail);
        }
        let reflection = self.append_locked(draft, &lock)?;
        tracing::info!(id = %reflection.id, insights = analysis.insights.len(), "reflection recorded");

        Ok(ReflectionOutcome::Recorded {
            reflection,
            analysis,
        })
    }
}

fn log_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
