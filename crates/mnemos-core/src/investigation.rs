//! Investigations: named sessions grouping records
//!
//! Lifecycle changes are appended as [`InvestigationEvent`]s to their own log.
//! The current state is never held in memory between calls; it is always
//! derived by folding the event history with [`fold`].

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::id::InvestigationId;
use crate::record::RECORD_VERSION;

fn default_version() -> u32 {
    RECORD_VERSION
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvestigationState {
    Active,
    Closed,
}

impl fmt::Display for InvestigationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvestigationState::Active => f.write_str("active"),
            InvestigationState::Closed => f.write_str("closed"),
        }
    }
}

/// A named investigation session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Investigation {
    pub id: InvestigationId,
    pub topic: String,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub state: InvestigationState,
}

impl Investigation {
    pub fn is_active(&self) -> bool {
        self.state == InvestigationState::Active
    }
}

/// Why an investigation was closed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CloseReason {
    /// Explicit stop/complete
    #[default]
    Completed,
    /// Replaced by a newly started investigation
    Superseded,
}

/// What happened to an investigation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum InvestigationChange {
    Started {
        id: InvestigationId,
        topic: String,
    },
    Closed {
        id: InvestigationId,
        #[serde(default)]
        reason: CloseReason,
    },
}

/// One line of the investigations log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvestigationEvent {
    #[serde(rename = "v", default = "default_version")]
    pub version: u32,
    pub at: DateTime<Utc>,
    #[serde(flatten)]
    pub change: InvestigationChange,
}

impl InvestigationEvent {
    pub fn started(id: InvestigationId, topic: impl Into<String>, at: DateTime<Utc>) -> Self {
        Self {
            version: RECORD_VERSION,
            at,
            change: InvestigationChange::Started {
                id,
                topic: topic.into(),
            },
        }
    }

    pub fn closed(id: InvestigationId, reason: CloseReason, at: DateTime<Utc>) -> Self {
        Self {
            version: RECORD_VERSION,
            at,
            change: InvestigationChange::Closed { id, reason },
        }
    }
}

/// Fold the event history into investigations, in start order.
///
/// A `Started` event while another investigation is active closes the
/// previous one at the new start time, so the folded state never has more
/// than one active investigation.
pub fn fold(events: &[InvestigationEvent]) -> Vec<Investigation> {
    let mut investigations: Vec<Investigation> = Vec::new();

    for event in events {
        match &event.change {
            InvestigationChange::Started { id, topic } => {
                if investigations.iter().any(|inv| &inv.id == id) {
                    tracing::warn!(investigation = %id, "duplicate start event ignored");
                    continue;
                }
                for previous in investigations.iter_mut().filter(|inv| inv.is_active()) {
                    previous.state = InvestigationState::Closed;
                    previous.ended_at = Some(event.at);
                }
                investigations.push(Investigation {
                    id: id.clone(),
                    topic: topic.clone(),
                    started_at: event.at,
                    ended_at: None,
                    state: InvestigationState::Active,
                });
            }
            InvestigationChange::Closed { id, .. } => {
                match investigations.iter_mut().find(|inv| &inv.id == id) {
                    Some(inv) if inv.is_active() => {
                        inv.state = InvestigationState::Closed;
                        inv.ended_at = Some(event.at);
                    }
                    Some(_) => {
                        tracing::warn!(investigation = %id, "close of closed investigation ignored")
                    }
                    None => {
                        tracing::warn!(investigation = %id, "close of unknown investigation ignored")
                    }
                }
            }
        }
    }

    investigations
}

/// The active investigation, if any
pub fn active(investigations: &[Investigation]) -> Option<&Investigation> {
    investigations.iter().find(|inv| inv.is_active())
}
