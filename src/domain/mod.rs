//! Domain layer - Core resolver types.
//!
//! Bets, transaction intents, run results and the error taxonomy.
//! Depends only on alloy primitives; no I/O happens here.

pub mod bet;
pub mod error;
pub mod run;
pub mod transaction;

// Re-export core types for convenience
pub use bet::{BetId, NewBetEvent, Outcome};
pub use error::{ResolverError, SubmissionFailure};
pub use run::{RunOutcome, Stage};
pub use transaction::{SignedTransaction, TransactionIntent, TxParams};
