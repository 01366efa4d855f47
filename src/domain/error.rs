//! Resolver error taxonomy.
//!
//! Every failure a run can end with is one of these variants. Each maps to
//! a distinct process exit code so external schedulers can tell a
//! misconfigured resolver from a rejected transaction.

use alloy::primitives::Address;
use thiserror::Error;

use super::bet::BetId;

/// Why the network refused a submitted transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionFailure {
    /// Nonce too low / too high / already used.
    NonceConflict,
    /// Sender cannot pay for gas.
    InsufficientFunds,
    /// Gas price below the node's minimum or a replacement's bump.
    Underpriced,
    /// Node already has this exact transaction.
    AlreadyKnown,
    /// Transport deadline elapsed before the node answered.
    Timeout,
    /// Any other rejection.
    Rejected,
}

impl SubmissionFailure {
    /// Classify an RPC error message.
    pub fn classify(message: &str) -> Self {
        let msg = message.to_ascii_lowercase();

        if msg.contains("nonce too low")
            || msg.contains("nonce too high")
            || msg.contains("invalid nonce")
            || msg.contains("nonce has already been used")
        {
            Self::NonceConflict
        } else if msg.contains("insufficient funds") || msg.contains("insufficient balance") {
            Self::InsufficientFunds
        } else if msg.contains("underpriced")
            || msg.contains("fee too low")
            || msg.contains("gas price too low")
        {
            Self::Underpriced
        } else if msg.contains("already known") || msg.contains("known transaction") {
            Self::AlreadyKnown
        } else if msg.contains("timed out") || msg.contains("timeout") {
            Self::Timeout
        } else {
            Self::Rejected
        }
    }
}

impl std::fmt::Display for SubmissionFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NonceConflict => write!(f, "nonce conflict"),
            Self::InsufficientFunds => write!(f, "insufficient funds"),
            Self::Underpriced => write!(f, "underpriced"),
            Self::AlreadyKnown => write!(f, "already known"),
            Self::Timeout => write!(f, "timeout"),
            Self::Rejected => write!(f, "rejected"),
        }
    }
}

/// Terminal failure of a resolution run.
#[derive(Debug, Error)]
pub enum ResolverError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("connection error: {0}")]
    Connection(String),

    #[error("no contract code deployed at {address}")]
    Deployment { address: Address },

    #[error("failed to read next unresolved bet id: {0}")]
    Read(String),

    #[error("outcome resolution failed for bet {bet_id}: {reason}")]
    Resolution { bet_id: BetId, reason: String },

    #[error("signing failed: {0}")]
    Signing(String),

    #[error("submission for bet {bet_id} failed ({kind}): {reason}")]
    Submission {
        bet_id: BetId,
        kind: SubmissionFailure,
        reason: String,
    },
}

impl ResolverError {
    /// Render an `anyhow` chain on one line (`outer: inner: root`).
    pub fn chain(err: &anyhow::Error) -> String {
        format!("{err:#}")
    }

    /// Classify a failed submission from its error chain.
    pub fn submission(bet_id: BetId, err: &anyhow::Error) -> Self {
        let reason = Self::chain(err);
        Self::Submission {
            bet_id,
            kind: SubmissionFailure::classify(&reason),
            reason,
        }
    }

    /// Short machine-readable name of the failure class.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Config(_) => "config",
            Self::Connection(_) => "connection",
            Self::Deployment { .. } => "deployment",
            Self::Read(_) => "read",
            Self::Resolution { .. } => "resolution",
            Self::Signing(_) => "signing",
            Self::Submission { .. } => "submission",
        }
    }

    /// Process exit code for this failure class. Never zero.
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Config(_) => 2,
            Self::Connection(_) => 10,
            Self::Deployment { .. } => 11,
            Self::Read(_) => 12,
            Self::Resolution { .. } => 13,
            Self::Signing(_) => 14,
            Self::Submission { .. } => 15,
        }
    }
}
