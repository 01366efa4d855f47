//! Transaction intent and signed transaction.
//!
//! An intent is built fresh for every run and is never persisted. Signing
//! turns it into an immutable [`SignedTransaction`] carrying the EIP-2718
//! bytes that go on the wire.

use alloy::primitives::{Address, Bytes, TxHash};

use super::bet::{BetId, Outcome};

/// Envelope parameters for a `resolveBet` transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TxParams {
    /// Target chain id (replay protection).
    pub chain_id: u64,
    /// Gas limit in units.
    pub gas_limit: u64,
    /// Gas price in wei.
    pub gas_price: u128,
    /// Sender nonce, read immediately before building.
    pub nonce: u64,
}

/// Unsigned `resolveBet(betId, outcome)` call ready for signing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionIntent {
    /// Contract the call is addressed to.
    pub to: Address,
    /// Bet being resolved.
    pub bet_id: BetId,
    /// Outcome being recorded.
    pub outcome: Outcome,
    /// ABI-encoded call data.
    pub input: Bytes,
    /// Chain id, gas and nonce.
    pub params: TxParams,
}

impl TransactionIntent {
    pub const fn nonce(&self) -> u64 {
        self.params.nonce
    }
}

/// Intent plus signature, encoded for `eth_sendRawTransaction`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTransaction {
    intent: TransactionIntent,
    raw: Bytes,
    hash: TxHash,
}

impl SignedTransaction {
    /// Wrap signer output. Only signers construct this.
    pub const fn new(intent: TransactionIntent, raw: Bytes, hash: TxHash) -> Self {
        Self { intent, raw, hash }
    }

    pub const fn intent(&self) -> &TransactionIntent {
        &self.intent
    }

    /// EIP-2718 encoded bytes.
    pub const fn raw(&self) -> &Bytes {
        &self.raw
    }

    /// Hash the network will report for this transaction.
    pub const fn hash(&self) -> TxHash {
        self.hash
    }
}
