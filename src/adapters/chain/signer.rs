//! Local Key Signer - Legacy Transaction Signing with alloy-rs
//!
//! Implements the `TransactionSigner` port with a secp256k1 key read
//! from the environment. The key is parsed on every call and dropped as
//! soon as the call returns (alloy's `PrivateKeySigner` zeroizes its
//! scalar on drop); it is never cached, logged, or written anywhere.
//!
//! Transactions are EIP-155 legacy transactions: a single fixed gas
//! price, matching what the Sapphire testnet gateway accepts.

use alloy::consensus::{SignableTransaction, TxEnvelope, TxLegacy};
use alloy::eips::eip2718::Encodable2718;
use alloy::network::TxSignerSync;
use alloy::primitives::{Address, Bytes, TxKind, U256};
use alloy::signers::local::PrivateKeySigner;
use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use tracing::{debug, instrument};

use crate::domain::transaction::{SignedTransaction, TransactionIntent};
use crate::ports::signer::TransactionSigner;

/// Where the hex private key comes from.
#[derive(Clone)]
pub enum KeySource {
    /// Name of an environment variable holding the key.
    Env(String),
    /// The key itself (tests and tooling).
    Hex(String),
}

impl std::fmt::Debug for KeySource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Env(var) => f.debug_tuple("Env").field(var).finish(),
            Self::Hex(_) => f.write_str("Hex(<redacted>)"),
        }
    }
}

/// Signs with a key loaded on demand from a [`KeySource`].
#[derive(Debug, Clone)]
pub struct LocalKeySigner {
    source: KeySource,
}

impl LocalKeySigner {
    pub const fn new(source: KeySource) -> Self {
        Self { source }
    }

    /// Signer reading the key from `var` at signing time.
    pub fn from_env(var: impl Into<String>) -> Self {
        Self::new(KeySource::Env(var.into()))
    }

    /// Parse the key. The returned signer must not outlive the call.
    fn load(&self) -> Result<PrivateKeySigner> {
        let key = match &self.source {
            KeySource::Env(var) => std::env::var(var)
                .with_context(|| format!("Signing key variable {var} is not set"))?,
            KeySource::Hex(key) => key.clone(),
        };

        let key = key.trim();
        if key.is_empty() {
            bail!("Signing key is empty");
        }

        key.parse::<PrivateKeySigner>()
            .context("Signing key is not a valid secp256k1 private key")
    }
}

/// Legacy transaction for an intent.
fn legacy_tx(intent: &TransactionIntent) -> TxLegacy {
    TxLegacy {
        chain_id: Some(intent.params.chain_id),
        nonce: intent.params.nonce,
        gas_price: intent.params.gas_price,
        gas_limit: intent.params.gas_limit,
        to: TxKind::Call(intent.to),
        value: U256::ZERO,
        input: intent.input.clone(),
    }
}

#[async_trait]
impl TransactionSigner for LocalKeySigner {
    async fn address(&self) -> Result<Address> {
        Ok(self.load()?.address())
    }

    #[instrument(skip_all, fields(bet_id = %intent.bet_id, nonce = intent.params.nonce))]
    async fn sign(&self, intent: &TransactionIntent) -> Result<SignedTransaction> {
        let key = self.load()?;

        let mut tx = legacy_tx(intent);
        let signature = key
            .sign_transaction_sync(&mut tx)
            .context("Failed to sign resolveBet transaction")?;
        drop(key);

        let signed = tx.into_signed(signature);
        let hash = *signed.hash();
        let raw: Bytes = TxEnvelope::from(signed).encoded_2718().into();

        debug!(tx_hash = %hash, bytes = raw.len(), "Transaction signed");
        Ok(SignedTransaction::new(intent.clone(), raw, hash))
    }
}
