//! Bet discovery over the prediction market contract.

use alloy::eips::BlockNumberOrTag;
use anyhow::Result;
use async_trait::async_trait;
use tracing::debug;

use crate::domain::bet::BetId;
use crate::ports::chain_client::ChainClient;
use crate::ports::discovery::BetDiscovery;

use super::contracts::BetContract;

/// Primary discovery: the contract's `nextUnresolvedBetId()` pointer.
pub struct UnresolvedPointerDiscovery<C: ChainClient> {
    contract: BetContract<C>,
}

impl<C: ChainClient> UnresolvedPointerDiscovery<C> {
    pub const fn new(contract: BetContract<C>) -> Self {
        Self { contract }
    }
}

#[async_trait]
impl<C: ChainClient> BetDiscovery for UnresolvedPointerDiscovery<C> {
    fn name(&self) -> &'static str {
        "unresolved_pointer"
    }

    async fn next_pending(&self) -> Result<Option<BetId>> {
        let pointer = self.contract.next_unresolved_bet_id().await?;
        Ok(BetId::from_pointer(pointer))
    }

    /// Still pending while the pointer has not moved past `bet_id`.
    async fn still_pending(&self, bet_id: BetId) -> Result<bool> {
        let pointer = self.contract.next_unresolved_bet_id().await?;
        Ok(BetId::from_pointer(pointer) == Some(bet_id))
    }
}

/// Secondary discovery: `NewBet` logs from a starting block.
///
/// Logs carry no resolution status, so every candidate is checked
/// against the unresolved pointer: bets are resolved in id order, so an
/// id below the pointer (or any id once the pointer reads `0`) is
/// already resolved. Picks the earliest bet still pending.
pub struct NewBetEventDiscovery<C: ChainClient> {
    contract: BetContract<C>,
    from_block: BlockNumberOrTag,
}

impl<C: ChainClient> NewBetEventDiscovery<C> {
    pub const fn new(contract: BetContract<C>, from_block: BlockNumberOrTag) -> Self {
        Self {
            contract,
            from_block,
        }
    }

    /// Lowest bet id that may still be unresolved, `None` when nothing is.
    async fn resolution_floor(&self) -> Result<Option<BetId>> {
        let pointer = self.contract.next_unresolved_bet_id().await?;
        Ok(BetId::from_pointer(pointer))
    }
}

#[async_trait]
impl<C: ChainClient> BetDiscovery for NewBetEventDiscovery<C> {
    fn name(&self) -> &'static str {
        "new_bet_events"
    }

    async fn next_pending(&self) -> Result<Option<BetId>> {
        let events = self.contract.new_bet_events_since(self.from_block).await?;
        debug!(count = events.len(), from_block = ?self.from_block, "NewBet events observed");
        if events.is_empty() {
            return Ok(None);
        }

        let Some(floor) = self.resolution_floor().await? else {
            debug!("Unresolved pointer is zero, every observed bet is resolved");
            return Ok(None);
        };
        let pending = events
            .iter()
            .map(|event| event.bet_id)
            .find(|bet_id| *bet_id >= floor);
        if pending.is_none() {
            debug!(floor = %floor, "All observed bets are below the unresolved pointer");
        }
        Ok(pending)
    }

    async fn still_pending(&self, bet_id: BetId) -> Result<bool> {
        Ok(self
            .resolution_floor()
            .await?
            .is_some_and(|floor| bet_id >= floor))
    }
}
