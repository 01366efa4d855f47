//! Outcome Source Port - Real-world Result Lookup
//!
//! Maps an event reference to the boolean outcome recorded on-chain.
//! Implementations must be free of side effects: resolving the same
//! reference twice yields the same answer.

use async_trait::async_trait;

use crate::domain::bet::Outcome;

/// Capability `resolve(event_id) -> outcome`.
#[async_trait]
pub trait OutcomeSource: Send + Sync {
  /// Short name for logs.
  fn name(&self) -> &'static str;

  /// Outcome for the event behind `event_id`.
  async fn resolve(&self, event_id: &str) -> anyhow::Result<Outcome>;
}
