//! Fixed Outcome Source
//!
//! Answers the configured outcome (default `true`) for every event
//! reference. A data-feed backed source replaces this type without any
//! change to the pipeline.

use anyhow::Result;
use async_trait::async_trait;
use tracing::debug;

use crate::domain::bet::Outcome;
use crate::ports::outcome_source::OutcomeSource;

/// Outcome source returning a constant.
#[derive(Debug, Clone, Copy)]
pub struct FixedOutcomeSource {
    outcome: Outcome,
}

impl FixedOutcomeSource {
    pub const fn new(outcome: Outcome) -> Self {
        Self { outcome }
    }
}

impl Default for FixedOutcomeSource {
    fn default() -> Self {
        Self::new(true)
    }
}

#[async_trait]
impl OutcomeSource for FixedOutcomeSource {
    fn name(&self) -> &'static str {
        "fixed"
    }

    async fn resolve(&self, event_id: &str) -> Result<Outcome> {
        debug!(event_id, outcome = self.outcome, "Fixed outcome returned");
        Ok(self.outcome)
    }
}
