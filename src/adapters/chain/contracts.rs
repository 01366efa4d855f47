//! Prediction Market Contract Binding
//!
//! Typed façade over the two entry points and one event topic the
//! resolver uses, against a fixed deployed address:
//! - `nextUnresolvedBetId()` read call
//! - `resolveBet(betId, outcome)` transaction builder (no signing here)
//! - `NewBet` log query
//!
//! The ABI is declared with alloy's `sol!` macro; only selectors, call
//! encoding and the event signature hash are taken from it.

use std::sync::Arc;

use alloy::eips::BlockNumberOrTag;
use alloy::primitives::{Address, Bytes, U256};
use alloy::rpc::types::Filter;
use alloy::sol;
use alloy::sol_types::{SolCall, SolEvent};
use anyhow::{Context, Result, ensure};
use tracing::{debug, instrument, warn};

use crate::domain::bet::{BetId, NewBetEvent, Outcome};
use crate::domain::transaction::{TransactionIntent, TxParams};
use crate::ports::chain_client::ChainClient;

sol! {
    #[derive(Debug)]
    interface IPredictionMarket {
        function nextUnresolvedBetId() external view returns (uint256);
        function resolveBet(uint256 betId, bool actualOutcome) external;
        event NewBet(uint256 indexed betId, address indexed bettor, bool prediction, uint256 amount);
    }
}

/// ABI-encoded `resolveBet(betId, outcome)` call data.
pub fn resolve_bet_calldata(bet_id: BetId, outcome: Outcome) -> Bytes {
    IPredictionMarket::resolveBetCall {
        betId: bet_id.as_u256(),
        actualOutcome: outcome,
    }
    .abi_encode()
    .into()
}

/// ABI-encoded `nextUnresolvedBetId()` call data.
pub fn next_unresolved_calldata() -> Bytes {
    IPredictionMarket::nextUnresolvedBetIdCall {}.abi_encode().into()
}

/// Binding to the deployed prediction market contract.
pub struct BetContract<C: ChainClient> {
    chain: Arc<C>,
    address: Address,
}

impl<C: ChainClient> Clone for BetContract<C> {
    fn clone(&self) -> Self {
        Self {
            chain: Arc::clone(&self.chain),
            address: self.address,
        }
    }
}

impl<C: ChainClient> BetContract<C> {
    pub const fn new(chain: Arc<C>, address: Address) -> Self {
        Self { chain, address }
    }

    pub const fn address(&self) -> Address {
        self.address
    }

    /// Shared chain client.
    pub fn chain(&self) -> &C {
        &self.chain
    }

    /// Read the contract's unresolved pointer (`0` = nothing pending).
    ///
    /// # Errors
    /// Fails when the call fails or returns anything but one `uint256`
    /// word. A failure is never reported as `0`.
    #[instrument(skip(self), fields(contract = %self.address))]
    pub async fn next_unresolved_bet_id(&self) -> Result<U256> {
        let result = self
            .chain
            .call(self.address, next_unresolved_calldata())
            .await
            .context("nextUnresolvedBetId() call failed")?;

        ensure!(
            result.len() == 32,
            "nextUnresolvedBetId() returned {} bytes, expected 32",
            result.len()
        );
        let pointer = U256::from_be_slice(&result);

        debug!(pointer = %pointer, "Unresolved pointer read");
        Ok(pointer)
    }

    /// Assemble a `resolveBet` transaction. Does not sign or send.
    pub fn build_resolve_bet_tx(
        &self,
        bet_id: BetId,
        outcome: Outcome,
        params: TxParams,
    ) -> TransactionIntent {
        TransactionIntent {
            to: self.address,
            bet_id,
            outcome,
            input: resolve_bet_calldata(bet_id, outcome),
            params,
        }
    }

    /// `NewBet` events emitted from `from_block` onward, in log order.
    ///
    /// Logs with a malformed topic layout are skipped with a warning.
    #[instrument(skip(self), fields(contract = %self.address))]
    pub async fn new_bet_events_since(&self, from_block: BlockNumberOrTag) -> Result<Vec<NewBetEvent>> {
        let filter = Filter::new()
            .address(self.address)
            .event_signature(IPredictionMarket::NewBet::SIGNATURE_HASH)
            .from_block(from_block);

        let logs = self
            .chain
            .logs(&filter)
            .await
            .context("NewBet log query failed")?;

        let mut events = Vec::with_capacity(logs.len());
        for log in logs {
            // topic0 = signature, topic1 = indexed betId
            let topics = log.topics();
            if topics.first() != Some(&IPredictionMarket::NewBet::SIGNATURE_HASH) {
                continue;
            }
            let Some(bet_topic) = topics.get(1) else {
                warn!(tx_hash = ?log.transaction_hash, "NewBet log without betId topic");
                continue;
            };
            let Some(bet_id) = BetId::from_pointer(U256::from_be_bytes(bet_topic.0)) else {
                warn!(tx_hash = ?log.transaction_hash, "NewBet log with zero betId");
                continue;
            };

            events.push(NewBetEvent {
                bet_id,
                block_number: log.block_number,
                transaction_hash: log.transaction_hash,
            });
        }

        debug!(count = events.len(), "NewBet events decoded");
        Ok(events)
    }
}
