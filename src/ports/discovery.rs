//! Bet Discovery Port - Finding Bets Awaiting Resolution
//!
//! Two implementations exist: the contract's unresolved pointer (used by
//! default) and the `NewBet` event stream. The pipeline only sees this
//! trait.

use async_trait::async_trait;

use crate::domain::bet::BetId;

/// Source of the next bet to resolve.
#[async_trait]
pub trait BetDiscovery: Send + Sync {
  /// Short name for logs.
  fn name(&self) -> &'static str;

  /// The next bet awaiting resolution, or `None` when nothing is pending.
  ///
  /// # Errors
  /// Returns an error when the underlying read fails. Implementations
  /// never turn a failed read into `None`.
  async fn next_pending(&self) -> anyhow::Result<Option<BetId>>;

  /// Whether `bet_id` is still awaiting resolution.
  ///
  /// Implementations that cannot tell return `Ok(true)`.
  async fn still_pending(&self, bet_id: BetId) -> anyhow::Result<bool>;
}
