//! Run Report - Final Summary of a Resolution Run
//!
//! Flattens the typed run result into one serializable record: a human
//! line for terminals and a JSON line for log collectors.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::domain::error::ResolverError;
use crate::domain::run::RunOutcome;

/// Summary of one run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
  /// Correlates the report with the run's log span.
  pub run_id: Uuid,
  /// `resolved`, `nothing_pending`, `already_resolved`, `dry_run` or `failed`.
  pub status: &'static str,
  /// Bet the run worked on, when known.
  pub bet_id: Option<String>,
  /// Outcome recorded (or signed, for dry runs).
  pub outcome: Option<bool>,
  /// Nonce of the submitted transaction.
  pub nonce: Option<u64>,
  /// Transaction hash.
  pub tx_hash: Option<String>,
  /// Failure class on error.
  pub error_kind: Option<&'static str>,
  /// Human-readable summary.
  pub message: String,
  /// Process exit code (0 on success).
  pub exit_code: u8,
  /// When the run ended.
  pub finished_at: DateTime<Utc>,
}

impl RunReport {
  /// Build a report from a run result.
  pub fn new(run_id: Uuid, result: &Result<RunOutcome, ResolverError>) -> Self {
    let mut report = Self {
      run_id,
      status: "failed",
      bet_id: None,
      outcome: None,
      nonce: None,
      tx_hash: None,
      error_kind: None,
      message: String::new(),
      exit_code: 0,
      finished_at: Utc::now(),
    };

    match result {
      Ok(run) => {
        report.status = run.status();
        report.bet_id = run.bet_id().map(|id| id.to_string());
        report.message = run.to_string();
        match run {
          RunOutcome::Resolved {
            outcome,
            nonce,
            tx_hash,
            ..
          }
          | RunOutcome::DryRun {
            outcome,
            nonce,
            tx_hash,
            ..
          } => {
            report.outcome = Some(*outcome);
            report.nonce = Some(*nonce);
            report.tx_hash = Some(tx_hash.to_string());
          }
          RunOutcome::NothingPending | RunOutcome::AlreadyResolved { .. } => {}
        }
      }
      Err(e) => {
        report.error_kind = Some(e.kind());
        report.exit_code = e.exit_code();
        report.message = format!("Resolution run failed: {e}");
        report.bet_id = match e {
          ResolverError::Resolution { bet_id, .. } | ResolverError::Submission { bet_id, .. } => {
            Some(bet_id.to_string())
          }
          _ => None,
        };
      }
    }

    report
  }

  pub const fn is_success(&self) -> bool {
    self.exit_code == 0
  }

  /// Single-line JSON rendering.
  pub fn to_json(&self) -> serde_json::Result<String> {
    serde_json::to_string(self)
  }
}
