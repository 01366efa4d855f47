//! Ports Layer - Hexagonal Architecture Boundaries
//!
//! Defines the interfaces (traits) that the usecases layer requires
//! from the outside world. Adapters implement these traits.
//!
//! Port categories:
//! - `ChainClient`: JSON-RPC reads and raw transaction submission
//! - `BetDiscovery`: finding the next bet awaiting resolution
//! - `OutcomeSource`: real-world outcome lookup
//! - `TransactionSigner`: signing with the oracle key

pub mod chain_client;
pub mod discovery;
pub mod outcome_source;
pub mod signer;
