//! Chain Client Port - EVM JSON-RPC Interface
//!
//! Defines the trait for the handful of JSON-RPC calls the resolver
//! needs: network identity, deployed code, nonces, gas price, read-only
//! calls, log queries and raw transaction broadcast. Transport details
//! (HTTP, timeouts) stay in the adapter.

use alloy::primitives::{Address, Bytes, TxHash};
use alloy::rpc::types::{Filter, Log};
use async_trait::async_trait;

/// Trait for on-chain reads and raw submission via alloy-rs.
#[async_trait]
pub trait ChainClient: Send + Sync + 'static {
  /// Chain id reported by the endpoint (`eth_chainId`).
  async fn chain_id(&self) -> anyhow::Result<u64>;

  /// Deployed bytecode at an address. Empty means no contract.
  async fn code_at(&self, address: Address) -> anyhow::Result<Bytes>;

  /// Next nonce for a sender.
  ///
  /// Must be read immediately before building a transaction; callers
  /// never cache it.
  async fn transaction_count(&self, address: Address) -> anyhow::Result<u64>;

  /// Current network gas price in wei.
  async fn gas_price(&self) -> anyhow::Result<u128>;

  /// Read-only `eth_call` against the latest block.
  async fn call(&self, to: Address, input: Bytes) -> anyhow::Result<Bytes>;

  /// Logs matching a filter.
  async fn logs(&self, filter: &Filter) -> anyhow::Result<Vec<Log>>;

  /// Broadcast a signed, EIP-2718 encoded transaction.
  ///
  /// # Errors
  /// Propagates the node's rejection (nonce conflict, insufficient
  /// funds, underpriced gas) with its original message.
  async fn submit_raw(&self, raw: Bytes) -> anyhow::Result<TxHash>;
}
