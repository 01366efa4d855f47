//! Resolution run states and results.

use alloy::primitives::TxHash;

use super::bet::{BetId, Outcome};

/// Pipeline stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Idle,
    Connecting,
    Verifying,
    Discovering,
    Resolving,
    Signing,
    Submitting,
    Reporting,
    Done,
    Failed,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Connecting => "connecting",
            Self::Verifying => "verifying",
            Self::Discovering => "discovering",
            Self::Resolving => "resolving",
            Self::Signing => "signing",
            Self::Submitting => "submitting",
            Self::Reporting => "reporting",
            Self::Done => "done",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Successful end of a run. Every variant maps to exit code 0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Discovery found no bet awaiting resolution.
    NothingPending,
    /// `resolveBet` was broadcast.
    Resolved {
        bet_id: BetId,
        outcome: Outcome,
        nonce: u64,
        tx_hash: TxHash,
    },
    /// The bet stopped being pending between discovery and submission.
    AlreadyResolved { bet_id: BetId },
    /// Built and signed, but submission was disabled.
    DryRun {
        bet_id: BetId,
        outcome: Outcome,
        nonce: u64,
        tx_hash: TxHash,
    },
}

impl RunOutcome {
    pub const fn bet_id(&self) -> Option<BetId> {
        match self {
            Self::NothingPending => None,
            Self::Resolved { bet_id, .. }
            | Self::AlreadyResolved { bet_id }
            | Self::DryRun { bet_id, .. } => Some(*bet_id),
        }
    }

    pub const fn status(&self) -> &'static str {
        match self {
            Self::NothingPending => "nothing_pending",
            Self::Resolved { .. } => "resolved",
            Self::AlreadyResolved { .. } => "already_resolved",
            Self::DryRun { .. } => "dry_run",
        }
    }
}

impl std::fmt::Display for RunOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NothingPending => write!(f, "No pending bets to resolve."),
            Self::Resolved { bet_id, tx_hash, .. } => {
                write!(f, "Resolved bet {bet_id} in tx: {tx_hash}")
            }
            Self::AlreadyResolved { bet_id } => {
                write!(f, "Bet {bet_id} was resolved by another party; nothing submitted.")
            }
            Self::DryRun { bet_id, tx_hash, .. } => {
                write!(f, "Dry run: bet {bet_id} would be resolved in tx: {tx_hash}")
            }
        }
    }
}
