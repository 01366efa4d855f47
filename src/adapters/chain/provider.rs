//! Sapphire RPC Provider - alloy-rs 0.9 Connection Management
//!
//! Implements the `ChainClient` port over an HTTP(S) JSON-RPC endpoint.
//! Every call is bounded by the configured timeout; the transport's own
//! defaults are never relied on.
//!
//! The provider is built with `on_builtin`, which boxes the transport,
//! and stored as a type-erased `dyn Provider` to keep the API clean
//! across the adapter layer.

use std::future::IntoFuture;
use std::sync::Arc;
use std::time::Duration;

use alloy::primitives::{Address, Bytes, TxHash};
use alloy::providers::{Provider, ProviderBuilder};
use alloy::rpc::types::{Filter, Log, TransactionRequest};
use alloy::transports::TransportResult;
use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use tracing::{debug, info, instrument};

use crate::config::NetworkConfig;
use crate::ports::chain_client::ChainClient;

/// JSON-RPC chain client backed by alloy-rs 0.9.
///
/// Uses `dyn Provider` for type erasure so the filler and transport
/// types never leak into the ports.
pub struct RpcChainClient {
    /// The alloy HTTP provider (type-erased).
    provider: Arc<dyn Provider + Send + Sync>,
    /// Upper bound for every RPC call.
    timeout: Duration,
}

impl RpcChainClient {
    /// Build an HTTP provider for the configured endpoint.
    ///
    /// alloy's HTTP transport is lazy: reachability is only known at the
    /// first call, which the pipeline makes in its connecting stage.
    ///
    /// # Errors
    /// Fails when the RPC URL is not a usable connection string.
    #[instrument(skip_all, fields(rpc_url = %config.rpc_url))]
    pub async fn connect(config: &NetworkConfig) -> Result<Self> {
        // HTTP(S) URLs connect without any network round trip.
        let provider = ProviderBuilder::new()
            .on_builtin(&config.rpc_url)
            .await
            .with_context(|| format!("Invalid RPC URL: {}", config.rpc_url))?;
        let provider: Arc<dyn Provider + Send + Sync> = Arc::new(provider);

        info!(
            expected_chain_id = config.chain_id,
            timeout_secs = config.timeout_seconds,
            "RPC provider configured"
        );

        Ok(Self {
            provider,
            timeout: Duration::from_secs(config.timeout_seconds),
        })
    }

    /// Await an RPC call, bounded by the configured timeout.
    async fn bounded<T, F>(&self, what: &'static str, call: F) -> Result<T>
    where
        F: IntoFuture<Output = TransportResult<T>>,
    {
        tokio::time::timeout(self.timeout, call)
            .await
            .map_err(|_| anyhow!("{what} timed out after {}s", self.timeout.as_secs()))?
            .with_context(|| format!("{what} failed"))
    }
}

#[async_trait]
impl ChainClient for RpcChainClient {
    #[instrument(skip(self))]
    async fn chain_id(&self) -> Result<u64> {
        let chain_id = self
            .bounded("eth_chainId", self.provider.get_chain_id())
            .await?;
        debug!(chain_id, "Chain id received");
        Ok(chain_id)
    }

    #[instrument(skip(self), fields(address = %address))]
    async fn code_at(&self, address: Address) -> Result<Bytes> {
        self.bounded("eth_getCode", self.provider.get_code_at(address))
            .await
    }

    #[instrument(skip(self), fields(address = %address))]
    async fn transaction_count(&self, address: Address) -> Result<u64> {
        self.bounded(
            "eth_getTransactionCount",
            self.provider.get_transaction_count(address).pending(),
        )
        .await
    }

    #[instrument(skip(self))]
    async fn gas_price(&self) -> Result<u128> {
        self.bounded("eth_gasPrice", self.provider.get_gas_price())
            .await
    }

    #[instrument(skip(self, input), fields(to = %to))]
    async fn call(&self, to: Address, input: Bytes) -> Result<Bytes> {
        let tx = TransactionRequest::default().to(to).input(input.into());
        self.bounded("eth_call", self.provider.call(&tx)).await
    }

    #[instrument(skip(self, filter))]
    async fn logs(&self, filter: &Filter) -> Result<Vec<Log>> {
        self.bounded("eth_getLogs", self.provider.get_logs(filter))
            .await
    }

    #[instrument(skip(self, raw), fields(bytes = raw.len()))]
    async fn submit_raw(&self, raw: Bytes) -> Result<TxHash> {
        let pending = self
            .bounded(
                "eth_sendRawTransaction",
                self.provider.send_raw_transaction(&raw),
            )
            .await?;
        Ok(*pending.tx_hash())
    }
}
