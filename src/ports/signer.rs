//! Transaction Signer Port
//!
//! The pipeline never touches key material directly. Signers load the
//! key only for the duration of a call.

use alloy::primitives::Address;
use async_trait::async_trait;

use crate::domain::transaction::{SignedTransaction, TransactionIntent};

/// Signs resolution transactions on behalf of the oracle account.
#[async_trait]
pub trait TransactionSigner: Send + Sync {
  /// Address of the oracle account (the transaction sender).
  async fn address(&self) -> anyhow::Result<Address>;

  /// Sign an intent and encode it for broadcast.
  async fn sign(&self, intent: &TransactionIntent) -> anyhow::Result<SignedTransaction>;
}
