//! Bet domain types.
//!
//! A bet is identified by the contract-assigned `uint256` id. The resolver
//! never creates ids; it only reads them from the contract's unresolved
//! pointer or from `NewBet` logs.

use alloy::primitives::{TxHash, U256};

/// Outcome written on-chain for a bet's underlying event.
pub type Outcome = bool;

// ────────────────────────────────────────────
// Bet identifier
// ────────────────────────────────────────────

/// Contract-assigned identifier of a pending bet.
///
/// Never zero: the contract uses `0` as the "no pending bet" sentinel,
/// so [`BetId::from_pointer`] maps it to `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BetId(U256);

impl BetId {
    /// Interpret the value returned by `nextUnresolvedBetId()`.
    pub fn from_pointer(pointer: U256) -> Option<Self> {
        if pointer.is_zero() {
            None
        } else {
            Some(Self(pointer))
        }
    }

    /// Raw `uint256` value for ABI encoding.
    pub const fn as_u256(&self) -> U256 {
        self.0
    }

    /// Event reference handed to the outcome source (decimal string).
    pub fn event_ref(&self) -> String {
        self.0.to_string()
    }
}

impl From<u64> for BetId {
    fn from(value: u64) -> Self {
        Self(U256::from(value))
    }
}

impl std::fmt::Display for BetId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ────────────────────────────────────────────
// Bet creation events
// ────────────────────────────────────────────

/// A decoded `NewBet` log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBetEvent {
    /// Id of the bet that was created.
    pub bet_id: BetId,
    /// Block the log was emitted in (absent for pending logs).
    pub block_number: Option<u64>,
    /// Transaction that emitted the log.
    pub transaction_hash: Option<TxHash>,
}
