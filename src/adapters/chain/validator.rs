//! Network and Contract Validator - Preflight Checks
//!
//! Runs before any contract call:
//! 1. The endpoint answers `eth_chainId` with the expected id
//! 2. Code exists at the contract address (not an EOA or a typo)
//!
//! Failures are returned as typed resolver errors so the pipeline can
//! stop before discovery or submission.

use alloy::primitives::Address;
use tracing::{info, instrument, warn};

use crate::domain::error::ResolverError;
use crate::ports::chain_client::ChainClient;

/// Result of validating the contract address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationResult {
    /// Address that was validated.
    pub address: Address,
    /// Size of the deployed bytecode.
    pub code_size: usize,
}

/// Preflight checks against a chain client.
pub struct ContractValidator<'a, C: ChainClient + ?Sized> {
    chain: &'a C,
}

impl<'a, C: ChainClient + ?Sized> ContractValidator<'a, C> {
    pub const fn new(chain: &'a C) -> Self {
        Self { chain }
    }

    /// Confirm the endpoint is reachable and on the expected network.
    ///
    /// # Errors
    /// `ResolverError::Connection` when the call fails or the chain id
    /// differs from `expected`.
    #[instrument(skip(self))]
    pub async fn check_network(&self, expected: u64) -> Result<u64, ResolverError> {
        let chain_id = self.chain.chain_id().await.map_err(|e| {
            ResolverError::Connection(format!("endpoint unreachable: {}", ResolverError::chain(&e)))
        })?;

        if chain_id != expected {
            warn!(chain_id, expected, "Connected to the wrong network");
            return Err(ResolverError::Connection(format!(
                "expected chain id {expected}, endpoint reports {chain_id}"
            )));
        }

        info!(chain_id, "Connected to chain");
        Ok(chain_id)
    }

    /// Confirm contract code is deployed at `address`.
    ///
    /// # Errors
    /// `ResolverError::Deployment` when the code is empty;
    /// `ResolverError::Connection` when the query itself fails.
    #[instrument(skip(self), fields(address = %address))]
    pub async fn check_deployment(&self, address: Address) -> Result<ValidationResult, ResolverError> {
        let code = self.chain.code_at(address).await.map_err(|e| {
            ResolverError::Connection(format!(
                "code query for {address} failed: {}",
                ResolverError::chain(&e)
            ))
        })?;

        if code.is_empty() {
            warn!(address = %address, "No contract code found at this address");
            return Err(ResolverError::Deployment { address });
        }

        info!(address = %address, code_size = code.len(), "Contract code found");
        Ok(ValidationResult {
            address,
            code_size: code.len(),
        })
    }
}
