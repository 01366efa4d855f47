//! Resolution Use Case - Single-shot Bet Resolution Pipeline
//!
//! Resolves at most one bet per run:
//! 1. Connecting: the endpoint reports the expected chain id
//! 2. Verifying: contract code exists (optional preflight)
//! 3. Discovering: next bet awaiting resolution (none = done)
//! 4. Resolving: outcome for the bet's event reference
//! 5. Signing: fresh nonce, fixed gas, signed `resolveBet`
//! 6. Submitting: broadcast once, classify rejections
//! 7. Reporting: typed result for the caller
//!
//! No state survives a run; every run re-derives everything from the
//! chain. Overlapping runs are not guarded against and must be
//! serialized by the scheduler.

use alloy::primitives::{Address, TxHash};
use tracing::{error, info, warn};

use crate::adapters::chain::contracts::BetContract;
use crate::adapters::chain::gas::check_fixed_gas_price;
use crate::adapters::chain::validator::ContractValidator;
use crate::config::{AppConfig, ReadFailurePolicy};
use crate::domain::bet::{BetId, Outcome};
use crate::domain::error::{ResolverError, SubmissionFailure};
use crate::domain::run::{RunOutcome, Stage};
use crate::domain::transaction::{SignedTransaction, TxParams};
use crate::ports::chain_client::ChainClient;
use crate::ports::discovery::BetDiscovery;
use crate::ports::outcome_source::OutcomeSource;
use crate::ports::signer::TransactionSigner;

/// Per-run knobs derived from [`AppConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineSettings {
  /// Chain id the endpoint must report; also signed into every tx.
  pub chain_id: u64,
  /// Run the bytecode preflight.
  pub verify_code: bool,
  /// Fixed gas limit.
  pub gas_limit: u64,
  /// Fixed gas price in wei.
  pub gas_price: u128,
  /// Sign but never broadcast.
  pub dry_run: bool,
  /// Meaning of a failed discovery read.
  pub read_failure: ReadFailurePolicy,
  /// Re-check the bet is still pending right before broadcast.
  pub recheck_before_submit: bool,
  /// One extra attempt with a re-read nonce after a nonce conflict.
  pub retry_on_nonce_conflict: bool,
}

impl PipelineSettings {
  /// Derive settings from a validated config.
  ///
  /// # Errors
  /// Fails when the gas price cannot be converted to wei.
  pub fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
    Ok(Self {
      chain_id: config.network.chain_id,
      verify_code: config.contract.verify_code,
      gas_limit: config.transaction.gas_limit,
      gas_price: config.gas_price_wei()?,
      dry_run: config.resolver.dry_run,
      read_failure: config.discovery.read_failure,
      recheck_before_submit: config.discovery.recheck_before_submit,
      retry_on_nonce_conflict: config.transaction.retry_on_nonce_conflict,
    })
  }
}

impl Default for PipelineSettings {
  fn default() -> Self {
    Self {
      chain_id: 23295,
      verify_code: true,
      gas_limit: 200_000,
      gas_price: 100_000_000_000,
      dry_run: false,
      read_failure: ReadFailurePolicy::Fail,
      recheck_before_submit: true,
      retry_on_nonce_conflict: false,
    }
  }
}

/// Orchestrates one resolution run.
///
/// Discovery, outcome lookup and signing are trait objects so any of them
/// can be swapped without touching the state machine.
pub struct ResolutionPipeline<C: ChainClient> {
  contract: BetContract<C>,
  discovery: Box<dyn BetDiscovery>,
  outcomes: Box<dyn OutcomeSource>,
  signer: Box<dyn TransactionSigner>,
  settings: PipelineSettings,
}

impl<C: ChainClient> ResolutionPipeline<C> {
  pub fn new(
    contract: BetContract<C>,
    discovery: Box<dyn BetDiscovery>,
    outcomes: Box<dyn OutcomeSource>,
    signer: Box<dyn TransactionSigner>,
    settings: PipelineSettings,
  ) -> Self {
    Self {
      contract,
      discovery,
      outcomes,
      signer,
      settings,
    }
  }

  /// Run the pipeline once.
  ///
  /// Every failure is caught here and returned as a typed error; nothing
  /// is retried except the opt-in nonce-conflict resubmission.
  pub async fn run(&self) -> Result<RunOutcome, ResolverError> {
    info!(
      stage = %Stage::Idle,
      contract = %self.contract.address(),
      discovery = self.discovery.name(),
      outcome_source = self.outcomes.name(),
      dry_run = self.settings.dry_run,
      "Resolution run starting"
    );

    let result = self.execute().await;

    enter(Stage::Reporting);
    match &result {
      Ok(outcome) => info!(
        stage = %Stage::Done,
        status = outcome.status(),
        bet_id = ?outcome.bet_id().map(|id| id.to_string()),
        "{outcome}"
      ),
      Err(e) => error!(
        stage = %Stage::Failed,
        kind = e.kind(),
        error = %e,
        "Resolution run failed"
      ),
    }

    result
  }

  async fn execute(&self) -> Result<RunOutcome, ResolverError> {
    let validator = ContractValidator::new(self.contract.chain());

    enter(Stage::Connecting);
    validator.check_network(self.settings.chain_id).await?;

    if self.settings.verify_code {
      enter(Stage::Verifying);
      validator.check_deployment(self.contract.address()).await?;
    }

    enter(Stage::Discovering);
    let Some(bet_id) = self.discover().await? else {
      return Ok(RunOutcome::NothingPending);
    };

    enter(Stage::Resolving);
    let outcome = self
      .outcomes
      .resolve(&bet_id.event_ref())
      .await
      .map_err(|e| ResolverError::Resolution {
        bet_id,
        reason: ResolverError::chain(&e),
      })?;
    info!(bet_id = %bet_id, outcome, "Outcome resolved");

    enter(Stage::Signing);
    let sender = self
      .signer
      .address()
      .await
      .map_err(|e| ResolverError::Signing(ResolverError::chain(&e)))?;
    check_fixed_gas_price(self.contract.chain(), self.settings.gas_price).await;
    let signed = self.build_and_sign(sender, bet_id, outcome).await?;

    if self.settings.dry_run {
      warn!(bet_id = %bet_id, "Dry-run mode - transaction signed but NOT submitted");
      return Ok(RunOutcome::DryRun {
        bet_id,
        outcome,
        nonce: signed.intent().nonce(),
        tx_hash: signed.hash(),
      });
    }

    if self.settings.recheck_before_submit && !self.still_pending(bet_id).await {
      info!(bet_id = %bet_id, "Bet no longer pending, skipping submission");
      return Ok(RunOutcome::AlreadyResolved { bet_id });
    }

    enter(Stage::Submitting);
    let (tx_hash, nonce) = self.submit(sender, signed).await?;

    Ok(RunOutcome::Resolved {
      bet_id,
      outcome,
      nonce,
      tx_hash,
    })
  }

  /// Discovery stage, applying the read-failure policy.
  async fn discover(&self) -> Result<Option<BetId>, ResolverError> {
    match self.discovery.next_pending().await {
      Ok(Some(bet_id)) => {
        info!(bet_id = %bet_id, discovery = self.discovery.name(), "Next unresolved bet");
        Ok(Some(bet_id))
      }
      Ok(None) => {
        info!(discovery = self.discovery.name(), "No pending bets");
        Ok(None)
      }
      Err(e) => match self.settings.read_failure {
        ReadFailurePolicy::Fail => Err(ResolverError::Read(ResolverError::chain(&e))),
        ReadFailurePolicy::TreatAsEmpty => {
          warn!(
            error = %ResolverError::chain(&e),
            "Discovery read failed, treating as no pending bets"
          );
          Ok(None)
        }
      },
    }
  }

  /// Read a fresh nonce, build the intent and sign it.
  async fn build_and_sign(
    &self,
    sender: Address,
    bet_id: BetId,
    outcome: Outcome,
  ) -> Result<SignedTransaction, ResolverError> {
    let nonce = self
      .contract
      .chain()
      .transaction_count(sender)
      .await
      .map_err(|e| {
        ResolverError::Connection(format!(
          "nonce query for {sender} failed: {}",
          ResolverError::chain(&e)
        ))
      })?;

    let params = TxParams {
      chain_id: self.settings.chain_id,
      gas_limit: self.settings.gas_limit,
      gas_price: self.settings.gas_price,
      nonce,
    };
    let intent = self.contract.build_resolve_bet_tx(bet_id, outcome, params);
    info!(
      bet_id = %bet_id,
      outcome,
      nonce,
      gas_limit = params.gas_limit,
      "Built resolveBet transaction"
    );

    self
      .signer
      .sign(&intent)
      .await
      .map_err(|e| ResolverError::Signing(ResolverError::chain(&e)))
  }

  /// Duplicate-submission guard. A failed check does not block submission.
  async fn still_pending(&self, bet_id: BetId) -> bool {
    match self.discovery.still_pending(bet_id).await {
      Ok(pending) => pending,
      Err(e) => {
        warn!(
          bet_id = %bet_id,
          error = %ResolverError::chain(&e),
          "Pending re-check failed, submitting anyway"
        );
        true
      }
    }
  }

  /// Broadcast, with at most one nonce-conflict resubmission when enabled.
  async fn submit(
    &self,
    sender: Address,
    signed: SignedTransaction,
  ) -> Result<(TxHash, u64), ResolverError> {
    let intent = signed.intent();
    let bet_id = intent.bet_id;

    let err = match self.broadcast(&signed).await {
      Ok(tx_hash) => return Ok((tx_hash, intent.nonce())),
      Err(err) => err,
    };

    let nonce_conflict = matches!(
      err,
      ResolverError::Submission {
        kind: SubmissionFailure::NonceConflict,
        ..
      }
    );
    if !(self.settings.retry_on_nonce_conflict && nonce_conflict) {
      return Err(err);
    }

    warn!(
      bet_id = %bet_id,
      stale_nonce = intent.nonce(),
      error = %err,
      "Nonce conflict, re-reading nonce for a single retry"
    );
    let retry = self.build_and_sign(sender, bet_id, intent.outcome).await?;
    let tx_hash = self.broadcast(&retry).await?;
    Ok((tx_hash, retry.intent().nonce()))
  }

  async fn broadcast(&self, signed: &SignedTransaction) -> Result<TxHash, ResolverError> {
    let bet_id = signed.intent().bet_id;
    let tx_hash = self
      .contract
      .chain()
      .submit_raw(signed.raw().clone())
      .await
      .map_err(|e| ResolverError::submission(bet_id, &e))?;

    if tx_hash != signed.hash() {
      warn!(
        expected = %signed.hash(),
        reported = %tx_hash,
        "Node reported a different transaction hash"
      );
    }
    info!(bet_id = %bet_id, tx_hash = %tx_hash, nonce = signed.intent().nonce(), "Transaction submitted");
    Ok(tx_hash)
  }
}

fn enter(stage: Stage) {
  info!(stage = %stage, "Entering stage");
}
