//! Chain Adapters - Sapphire (EVM) Interaction Layer
//!
//! Provides on-chain access via alloy-rs 0.9 for:
//! - RPC provider with per-call timeouts (`ChainClient` port)
//! - Prediction market contract binding (`sol!` ABI)
//! - Bet discovery by unresolved pointer or `NewBet` logs
//! - Local key signing of legacy transactions
//! - Gas unit conversion and network price check
//! - Preflight network/contract validation

pub mod contracts;
pub mod discovery;
pub mod gas;
pub mod provider;
pub mod signer;
pub mod validator;

pub use contracts::BetContract;
pub use discovery::{NewBetEventDiscovery, UnresolvedPointerDiscovery};
pub use provider::RpcChainClient;
pub use signer::{KeySource, LocalKeySigner};
pub use validator::ContractValidator;
