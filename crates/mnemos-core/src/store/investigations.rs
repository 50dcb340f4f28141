//! Investigation lifecycle

use chrono::Utc;

use crate::error::{MnemosError, Result};
use crate::id::InvestigationId;
use crate::investigation::{self, CloseReason, Investigation, InvestigationEvent};

use super::Store;

impl Store {
    /// Every investigation in start order
    pub fn investigations(&self) -> Result<Vec<Investigation>> {
        Ok(investigation::fold(&self.investigations.read_all()?.entries))
    }

    /// The active investigation, if any
    pub fn active_investigation(&self) -> Result<Option<Investigation>> {
        Ok(investigation::active(&self.investigations()?).cloned())
    }

    /// Start a new investigation, closing the active one as superseded.
    #[tracing::instrument(skip(self))]
    pub fn start_investigation(&self, topic: &str) -> Result<Investigation> {
        let topic = topic.trim();
        if topic.is_empty() {
            crate::bail_invalid!("topic", "must not be empty");
        }

        let lock = self.lock()?;
        let now = Utc::now();
        let current = investigation::fold(&self.investigations.read_all()?.entries);

        if let Some(previous) = investigation::active(&current) {
            self.investigations.append(
                &InvestigationEvent::closed(previous.id.clone(), CloseReason::Superseded, now),
                &lock,
            )?;
            tracing::info!(investigation = %previous.id, topic = %previous.topic, "investigation superseded");
        }

        let id = InvestigationId::generate();
        self.investigations
            .append(&InvestigationEvent::started(id.clone(), topic, now), &lock)?;
        tracing::info!(investigation = %id, topic, "investigation started");

        Ok(Investigation {
            id,
            topic: topic.to_string(),
            started_at: now,
            ended_at: None,
            state: investigation::InvestigationState::Active,
        })
    }

    /// Close an investigation; the active one when `id` is `None`.
    #[tracing::instrument(skip(self))]
    pub fn close_investigation(&self, id: Option<&InvestigationId>) -> Result<Investigation> {
        let lock = self.lock()?;
        let now = Utc::now();
        let current = investigation::fold(&self.investigations.read_all()?.entries);

        let target = match id {
            Some(id) => current
                .iter()
                .find(|inv| &inv.id == id)
                .ok_or_else(|| MnemosError::not_found("investigation", id))?,
            None => investigation::active(&current)
                .ok_or_else(|| MnemosError::not_found("investigation", "no active investigation"))?,
        };
        if !target.is_active() {
            crate::bail_invariant!("investigation {} is already closed", target.id);
        }

        self.investigations.append(
            &InvestigationEvent::closed(target.id.clone(), CloseReason::Completed, now),
            &lock,
        )?;
        tracing::info!(investigation = %target.id, topic = %target.topic, "investigation closed");

        Ok(Investigation {
            ended_at: Some(now),
            state: investigation::InvestigationState::Closed,
            ..target.clone()
        })
    }
}
