//! Integration Tests - End-to-end Resolution Pipeline
//!
//! Drives `ResolutionPipeline` against a mocked JSON-RPC client and the
//! real local signer. Uses mockall for trait mocking and tokio::test for
//! async tests.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use alloy::consensus::TxEnvelope;
use alloy::eips::BlockNumberOrTag;
use alloy::eips::eip2718::Decodable2718;
use alloy::primitives::{Address, B256, Bytes, LogData, TxHash, U256, keccak256};
use alloy::rpc::types::{Filter, Log};
use alloy::signers::local::PrivateKeySigner;
use mockall::mock;
use mockall::predicate::*;

use bet_oracle_resolver::adapters::chain::contracts::resolve_bet_calldata;
use bet_oracle_resolver::adapters::chain::{
    BetContract, KeySource, LocalKeySigner, NewBetEventDiscovery, UnresolvedPointerDiscovery,
};
use bet_oracle_resolver::adapters::outcome::FixedOutcomeSource;
use bet_oracle_resolver::config::ReadFailurePolicy;
use bet_oracle_resolver::domain::bet::BetId;
use bet_oracle_resolver::domain::error::{ResolverError, SubmissionFailure};
use bet_oracle_resolver::domain::run::RunOutcome;
use bet_oracle_resolver::ports::discovery::BetDiscovery;
use bet_oracle_resolver::ports::outcome_source::OutcomeSource;
use bet_oracle_resolver::usecases::{PipelineSettings, ResolutionPipeline, RunReport};

// ---- Mock Definitions ----

mock! {
    pub ChainCli {}

    #[async_trait::async_trait]
    impl bet_oracle_resolver::ports::chain_client::ChainClient for ChainCli {
        async fn chain_id(&self) -> anyhow::Result<u64>;
        async fn code_at(&self, address: Address) -> anyhow::Result<Bytes>;
        async fn transaction_count(&self, address: Address) -> anyhow::Result<u64>;
        async fn gas_price(&self) -> anyhow::Result<u128>;
        async fn call(&self, to: Address, input: Bytes) -> anyhow::Result<Bytes>;
        async fn logs(&self, filter: &Filter) -> anyhow::Result<Vec<Log>>;
        async fn submit_raw(&self, raw: Bytes) -> anyhow::Result<TxHash>;
    }
}

mock! {
    pub Outcomes {}

    #[async_trait::async_trait]
    impl OutcomeSource for Outcomes {
        fn name(&self) -> &'static str;
        async fn resolve(&self, event_id: &str) -> anyhow::Result<bool>;
    }
}

// ---- Fixtures ----

const TEST_KEY: &str = "0x0101010101010101010101010101010101010101010101010101010101010101";
const CHAIN_ID: u64 = 23295;

fn contract_address() -> Address {
    Address::repeat_byte(0xae)
}

fn sender() -> Address {
    TEST_KEY.parse::<PrivateKeySigner>().unwrap().address()
}

/// `nextUnresolvedBetId()` return data for `n`.
fn pointer_word(n: u64) -> Bytes {
    Bytes::from(U256::from(n).to_be_bytes::<32>().to_vec())
}

fn deployed_code() -> Bytes {
    Bytes::from_static(&[0x60, 0x80, 0x60, 0x40, 0x52])
}

/// Chain that answers the preflight checks and the network gas price.
fn healthy_chain() -> MockChainCli {
    let mut chain = MockChainCli::new();
    chain.expect_chain_id().returning(|| Ok(CHAIN_ID));
    chain
        .expect_code_at()
        .with(eq(contract_address()))
        .returning(|_| Ok(deployed_code()));
    chain.expect_gas_price().returning(|| Ok(100_000_000_000));
    chain
}

fn settings() -> PipelineSettings {
    PipelineSettings {
        chain_id: CHAIN_ID,
        ..PipelineSettings::default()
    }
}

fn pointer_pipeline(
    chain: MockChainCli,
    settings: PipelineSettings,
) -> ResolutionPipeline<MockChainCli> {
    let contract = BetContract::new(Arc::new(chain), contract_address());
    let discovery = Box::new(UnresolvedPointerDiscovery::new(contract.clone()));
    pipeline_with(contract, discovery, Box::new(FixedOutcomeSource::default()), settings)
}

fn pipeline_with(
    contract: BetContract<MockChainCli>,
    discovery: Box<dyn BetDiscovery>,
    outcomes: Box<dyn OutcomeSource>,
    settings: PipelineSettings,
) -> ResolutionPipeline<MockChainCli> {
    let signer = Box::new(LocalKeySigner::new(KeySource::Hex(TEST_KEY.to_string())));
    ResolutionPipeline::new(contract, discovery, outcomes, signer, settings)
}

fn decode(raw: &Bytes) -> alloy::consensus::TxLegacy {
    match TxEnvelope::decode_2718(&mut &raw[..]).unwrap() {
        TxEnvelope::Legacy(signed) => signed.tx().clone(),
        other => panic!("expected a legacy transaction, got {other:?}"),
    }
}

// ---- Preflight ----

#[tokio::test]
async fn test_unreachable_endpoint_is_connection_error() {
    let mut chain = MockChainCli::new();
    chain
        .expect_chain_id()
        .times(1)
        .returning(|| Err(anyhow::anyhow!("error sending request: connection refused")));
    chain.expect_code_at().never();
    chain.expect_call().never();
    chain.expect_submit_raw().never();

    let err = pointer_pipeline(chain, settings()).run().await.unwrap_err();

    assert!(matches!(err, ResolverError::Connection(_)), "got {err:?}");
    assert_eq!(err.exit_code(), 10);
}

#[tokio::test]
async fn test_wrong_chain_id_is_connection_error() {
    let mut chain = MockChainCli::new();
    chain.expect_chain_id().returning(|| Ok(1));
    chain.expect_code_at().never();
    chain.expect_call().never();

    let err = pointer_pipeline(chain, settings()).run().await.unwrap_err();

    match err {
        ResolverError::Connection(reason) => assert!(reason.contains("23295"), "{reason}"),
        other => panic!("expected Connection, got {other:?}"),
    }
}

#[tokio::test]
async fn test_missing_bytecode_stops_before_discovery() {
    let mut chain = MockChainCli::new();
    chain.expect_chain_id().returning(|| Ok(CHAIN_ID));
    chain.expect_code_at().returning(|_| Ok(Bytes::new()));
    chain.expect_call().never();
    chain.expect_submit_raw().never();

    let err = pointer_pipeline(chain, settings()).run().await.unwrap_err();

    match err {
        ResolverError::Deployment { address } => assert_eq!(address, contract_address()),
        other => panic!("expected Deployment, got {other:?}"),
    }
}

#[tokio::test]
async fn test_bytecode_check_can_be_skipped() {
    let mut chain = MockChainCli::new();
    chain.expect_chain_id().returning(|| Ok(CHAIN_ID));
    chain.expect_code_at().never();
    chain.expect_call().times(1).returning(|_, _| Ok(pointer_word(0)));

    let settings = PipelineSettings {
        verify_code: false,
        ..settings()
    };
    let outcome = pointer_pipeline(chain, settings).run().await.unwrap();

    assert_eq!(outcome, RunOutcome::NothingPending);
}

// ---- Discovery ----

#[tokio::test]
async fn test_zero_pointer_means_nothing_pending() {
    let mut chain = healthy_chain();
    chain.expect_call().times(1).returning(|_, _| Ok(pointer_word(0)));
    chain.expect_transaction_count().never();
    chain.expect_submit_raw().never();

    let mut outcomes = MockOutcomes::new();
    outcomes.expect_name().return_const("mock");
    outcomes.expect_resolve().never();

    let contract = BetContract::new(Arc::new(chain), contract_address());
    let discovery = Box::new(UnresolvedPointerDiscovery::new(contract.clone()));
    let pipeline = pipeline_with(contract, discovery, Box::new(outcomes), settings());

    let result = pipeline.run().await;
    let report = RunReport::new(uuid::Uuid::nil(), &result);

    assert_eq!(result.unwrap(), RunOutcome::NothingPending);
    assert_eq!(report.message, "No pending bets to resolve.");
    assert_eq!(report.exit_code, 0);
}

#[tokio::test]
async fn test_read_failure_is_not_reported_as_empty() {
    let mut chain = healthy_chain();
    chain
        .expect_call()
        .returning(|_, _| Err(anyhow::anyhow!("execution reverted")));
    chain.expect_submit_raw().never();

    let err = pointer_pipeline(chain, settings()).run().await.unwrap_err();

    match err {
        ResolverError::Read(reason) => assert!(reason.contains("execution reverted"), "{reason}"),
        other => panic!("expected Read, got {other:?}"),
    }
}

#[tokio::test]
async fn test_read_failure_can_be_treated_as_empty() {
    let mut chain = healthy_chain();
    chain
        .expect_call()
        .returning(|_, _| Err(anyhow::anyhow!("execution reverted")));
    chain.expect_submit_raw().never();

    let settings = PipelineSettings {
        read_failure: ReadFailurePolicy::TreatAsEmpty,
        ..settings()
    };
    let outcome = pointer_pipeline(chain, settings).run().await.unwrap();

    assert_eq!(outcome, RunOutcome::NothingPending);
}

#[tokio::test]
async fn test_short_pointer_word_is_read_error() {
    let mut chain = healthy_chain();
    chain
        .expect_call()
        .returning(|_, _| Ok(Bytes::from_static(&[0x07])));

    let err = pointer_pipeline(chain, settings()).run().await.unwrap_err();

    assert!(matches!(err, ResolverError::Read(_)), "got {err:?}");
}

// ---- Resolution and submission ----

#[tokio::test]
async fn test_resolves_pending_bet() {
    let submitted = Arc::new(Mutex::new(Vec::<Bytes>::new()));

    let mut chain = healthy_chain();
    chain
        .expect_call()
        .with(eq(contract_address()), always())
        .times(2)
        .returning(|_, _| Ok(pointer_word(7)));
    chain
        .expect_transaction_count()
        .with(eq(sender()))
        .times(1)
        .returning(|_| Ok(42));
    let sink = Arc::clone(&submitted);
    chain.expect_submit_raw().times(1).returning(move |raw| {
        sink.lock().unwrap().push(raw);
        Ok(TxHash::repeat_byte(0xab))
    });

    let mut outcomes = MockOutcomes::new();
    outcomes.expect_name().return_const("mock");
    outcomes
        .expect_resolve()
        .with(eq("7"))
        .times(1)
        .returning(|_| Ok(true));

    let contract = BetContract::new(Arc::new(chain), contract_address());
    let discovery = Box::new(UnresolvedPointerDiscovery::new(contract.clone()));
    let pipeline = pipeline_with(contract, discovery, Box::new(outcomes), settings());

    let outcome = pipeline.run().await.unwrap();

    assert_eq!(
        outcome,
        RunOutcome::Resolved {
            bet_id: BetId::from(7),
            outcome: true,
            nonce: 42,
            tx_hash: TxHash::repeat_byte(0xab),
        }
    );
    assert!(outcome.to_string().starts_with("Resolved bet 7 in tx: 0xabab"));

    let submitted = submitted.lock().unwrap();
    assert_eq!(submitted.len(), 1);
    let tx = decode(&submitted[0]);
    assert_eq!(tx.input, resolve_bet_calldata(BetId::from(7), true));
    assert_eq!(tx.nonce, 42);
    assert_eq!(tx.chain_id, Some(CHAIN_ID));
    assert_eq!(tx.gas_limit, 200_000);
    assert_eq!(tx.gas_price, 100_000_000_000);
    assert_eq!(tx.to, alloy::primitives::TxKind::Call(contract_address()));
}

#[tokio::test]
async fn test_stale_nonce_is_submission_error() {
    let mut chain = healthy_chain();
    chain.expect_call().returning(|_, _| Ok(pointer_word(7)));
    chain.expect_transaction_count().times(1).returning(|_| Ok(5));
    chain.expect_submit_raw().times(1).returning(|_| {
        Err(anyhow::anyhow!(
            "server returned an error response: error code -32000: nonce too low"
        ))
    });

    let err = pointer_pipeline(chain, settings()).run().await.unwrap_err();

    match &err {
        ResolverError::Submission { bet_id, kind, .. } => {
            assert_eq!(*bet_id, BetId::from(7));
            assert_eq!(*kind, SubmissionFailure::NonceConflict);
        }
        other => panic!("expected Submission, got {other:?}"),
    }
    assert_eq!(err.exit_code(), 15);
}

#[tokio::test]
async fn test_nonce_conflict_retry_resubmits_once() {
    let nonces = Arc::new(AtomicU64::new(5));
    let attempts = Arc::new(AtomicUsize::new(0));

    let mut chain = healthy_chain();
    chain.expect_call().returning(|_, _| Ok(pointer_word(7)));
    let next_nonce = Arc::clone(&nonces);
    chain
        .expect_transaction_count()
        .times(2)
        .returning(move |_| Ok(next_nonce.fetch_add(1, Ordering::SeqCst)));
    let counter = Arc::clone(&attempts);
    chain.expect_submit_raw().times(2).returning(move |raw| {
        if counter.fetch_add(1, Ordering::SeqCst) == 0 {
            Err(anyhow::anyhow!("nonce too low"))
        } else {
            assert_eq!(decode(&raw).nonce, 6);
            Ok(TxHash::repeat_byte(0xcd))
        }
    });

    let settings = PipelineSettings {
        retry_on_nonce_conflict: true,
        ..settings()
    };
    let outcome = pointer_pipeline(chain, settings).run().await.unwrap();

    assert_eq!(attempts.load(Ordering::SeqCst), 2);
    match outcome {
        RunOutcome::Resolved { nonce, tx_hash, .. } => {
            assert_eq!(nonce, 6);
            assert_eq!(tx_hash, TxHash::repeat_byte(0xcd));
        }
        other => panic!("expected Resolved, got {other:?}"),
    }
}

#[tokio::test]
async fn test_other_rejections_are_not_retried() {
    let mut chain = healthy_chain();
    chain.expect_call().returning(|_, _| Ok(pointer_word(7)));
    chain.expect_transaction_count().times(1).returning(|_| Ok(5));
    chain
        .expect_submit_raw()
        .times(1)
        .returning(|_| Err(anyhow::anyhow!("insufficient funds for gas * price + value")));

    let settings = PipelineSettings {
        retry_on_nonce_conflict: true,
        ..settings()
    };
    let err = pointer_pipeline(chain, settings).run().await.unwrap_err();

    assert!(
        matches!(
            err,
            ResolverError::Submission {
                kind: SubmissionFailure::InsufficientFunds,
                ..
            }
        ),
        "got {err:?}"
    );
}

#[tokio::test]
async fn test_dry_run_signs_without_submitting() {
    let mut chain = healthy_chain();
    chain.expect_call().times(1).returning(|_, _| Ok(pointer_word(7)));
    chain.expect_transaction_count().returning(|_| Ok(3));
    chain.expect_submit_raw().never();

    let settings = PipelineSettings {
        dry_run: true,
        ..settings()
    };
    let outcome = pointer_pipeline(chain, settings).run().await.unwrap();

    match outcome {
        RunOutcome::DryRun {
            bet_id,
            outcome,
            nonce,
            ..
        } => {
            assert_eq!(bet_id, BetId::from(7));
            assert!(outcome);
            assert_eq!(nonce, 3);
        }
        other => panic!("expected DryRun, got {other:?}"),
    }
}

#[tokio::test]
async fn test_moved_pointer_skips_submission() {
    let reads = Arc::new(AtomicU64::new(7));

    let mut chain = healthy_chain();
    let pointer = Arc::clone(&reads);
    chain
        .expect_call()
        .times(2)
        .returning(move |_, _| Ok(pointer_word(pointer.fetch_add(1, Ordering::SeqCst))));
    chain.expect_transaction_count().returning(|_| Ok(9));
    chain.expect_submit_raw().never();

    let outcome = pointer_pipeline(chain, settings()).run().await.unwrap();

    assert_eq!(
        outcome,
        RunOutcome::AlreadyResolved {
            bet_id: BetId::from(7)
        }
    );
}

#[tokio::test]
async fn test_outcome_failure_is_resolution_error() {
    let mut chain = healthy_chain();
    chain.expect_call().returning(|_, _| Ok(pointer_word(7)));
    chain.expect_transaction_count().never();
    chain.expect_submit_raw().never();

    let mut outcomes = MockOutcomes::new();
    outcomes.expect_name().return_const("mock");
    outcomes
        .expect_resolve()
        .returning(|_| Err(anyhow::anyhow!("feed unavailable")));

    let contract = BetContract::new(Arc::new(chain), contract_address());
    let discovery = Box::new(UnresolvedPointerDiscovery::new(contract.clone()));
    let pipeline = pipeline_with(contract, discovery, Box::new(outcomes), settings());

    let err = pipeline.run().await.unwrap_err();

    match err {
        ResolverError::Resolution { bet_id, reason } => {
            assert_eq!(bet_id, BetId::from(7));
            assert!(reason.contains("feed unavailable"));
        }
        other => panic!("expected Resolution, got {other:?}"),
    }
}

#[tokio::test]
async fn test_missing_key_is_signing_error() {
    let mut chain = healthy_chain();
    chain.expect_call().returning(|_, _| Ok(pointer_word(7)));
    chain.expect_submit_raw().never();

    let contract = BetContract::new(Arc::new(chain), contract_address());
    let discovery = Box::new(UnresolvedPointerDiscovery::new(contract.clone()));
    let signer = Box::new(LocalKeySigner::from_env(
        "BET_ORACLE_RESOLVER_TEST_UNSET_KEY",
    ));
    let pipeline = ResolutionPipeline::new(
        contract,
        discovery,
        Box::new(FixedOutcomeSource::default()),
        signer,
        settings(),
    );

    let err = pipeline.run().await.unwrap_err();

    match err {
        ResolverError::Signing(reason) => {
            assert!(reason.contains("BET_ORACLE_RESOLVER_TEST_UNSET_KEY"), "{reason}");
        }
        other => panic!("expected Signing, got {other:?}"),
    }
}

#[tokio::test]
async fn test_nonce_query_failure_is_connection_error() {
    let mut chain = healthy_chain();
    chain.expect_call().returning(|_, _| Ok(pointer_word(7)));
    chain
        .expect_transaction_count()
        .returning(|_| Err(anyhow::anyhow!("request timed out")));
    chain.expect_submit_raw().never();

    let err = pointer_pipeline(chain, settings()).run().await.unwrap_err();

    assert!(matches!(err, ResolverError::Connection(_)), "got {err:?}");
}

// ---- Event discovery ----

fn new_bet_log(bet_id: u64, block: u64) -> Log {
    let topics = vec![
        keccak256(b"NewBet(uint256,address,bool,uint256)"),
        B256::from(U256::from(bet_id)),
        B256::left_padding_from(Address::repeat_byte(0x22).as_slice()),
    ];
    Log {
        inner: alloy::primitives::Log {
            address: contract_address(),
            data: LogData::new_unchecked(topics, Bytes::from(vec![0u8; 64])),
        },
        block_number: Some(block),
        transaction_hash: Some(TxHash::repeat_byte(block as u8)),
        ..Log::default()
    }
}

#[tokio::test]
async fn test_event_discovery_resolves_earliest_bet() {
    let submitted = Arc::new(Mutex::new(Vec::<Bytes>::new()));

    let mut chain = healthy_chain();
    // Discovery plus the pre-submit re-check.
    chain
        .expect_call()
        .times(2)
        .returning(|_, _| Ok(pointer_word(3)));
    chain
        .expect_logs()
        .times(1)
        .returning(|_| Ok(vec![new_bet_log(1, 90), new_bet_log(3, 100), new_bet_log(4, 101)]));
    chain.expect_transaction_count().returning(|_| Ok(0));
    let sink = Arc::clone(&submitted);
    chain.expect_submit_raw().times(1).returning(move |raw| {
        sink.lock().unwrap().push(raw);
        Ok(TxHash::repeat_byte(0x01))
    });

    let contract = BetContract::new(Arc::new(chain), contract_address());
    let discovery = Box::new(NewBetEventDiscovery::new(
        contract.clone(),
        BlockNumberOrTag::Number(100),
    ));
    let pipeline = pipeline_with(
        contract,
        discovery,
        Box::new(FixedOutcomeSource::default()),
        settings(),
    );

    let outcome = pipeline.run().await.unwrap();

    assert_eq!(outcome.bet_id(), Some(BetId::from(3)));
    let submitted = submitted.lock().unwrap();
    assert_eq!(
        decode(&submitted[0]).input,
        resolve_bet_calldata(BetId::from(3), true)
    );
}

#[tokio::test]
async fn test_event_discovery_without_logs_is_nothing_pending() {
    let mut chain = healthy_chain();
    chain.expect_logs().returning(|_| Ok(Vec::new()));
    chain.expect_call().never();
    chain.expect_submit_raw().never();

    let contract = BetContract::new(Arc::new(chain), contract_address());
    let discovery = Box::new(NewBetEventDiscovery::new(
        contract.clone(),
        BlockNumberOrTag::Earliest,
    ));
    let pipeline = pipeline_with(
        contract,
        discovery,
        Box::new(FixedOutcomeSource::default()),
        settings(),
    );

    assert_eq!(pipeline.run().await.unwrap(), RunOutcome::NothingPending);
}

fn event_pipeline(chain: MockChainCli) -> ResolutionPipeline<MockChainCli> {
    let contract = BetContract::new(Arc::new(chain), contract_address());
    let discovery = Box::new(NewBetEventDiscovery::new(
        contract.clone(),
        BlockNumberOrTag::Earliest,
    ));
    pipeline_with(
        contract,
        discovery,
        Box::new(FixedOutcomeSource::default()),
        settings(),
    )
}

#[tokio::test]
async fn test_event_discovery_skips_resolved_bets() {
    let mut chain = healthy_chain();
    chain
        .expect_logs()
        .returning(|_| Ok(vec![new_bet_log(1, 90), new_bet_log(2, 91)]));
    chain.expect_call().times(1).returning(|_, _| Ok(pointer_word(5)));
    chain.expect_transaction_count().never();
    chain.expect_submit_raw().never();

    assert_eq!(event_pipeline(chain).run().await.unwrap(), RunOutcome::NothingPending);
}

#[tokio::test]
async fn test_event_discovery_zero_pointer_is_nothing_pending() {
    let mut chain = healthy_chain();
    chain.expect_logs().returning(|_| Ok(vec![new_bet_log(1, 90)]));
    chain.expect_call().times(1).returning(|_, _| Ok(pointer_word(0)));
    chain.expect_submit_raw().never();

    assert_eq!(event_pipeline(chain).run().await.unwrap(), RunOutcome::NothingPending);
}

#[tokio::test]
async fn test_event_discovery_recheck_catches_resolved_bet() {
    let reads = Arc::new(AtomicU64::new(0));

    let mut chain = healthy_chain();
    chain.expect_logs().returning(|_| Ok(vec![new_bet_log(2, 90)]));
    let pointer = Arc::clone(&reads);
    // Pointer is 2 at discovery, then moves to 3 before submission.
    chain.expect_call().times(2).returning(move |_, _| {
        Ok(pointer_word(2 + pointer.fetch_add(1, Ordering::SeqCst)))
    });
    chain.expect_transaction_count().returning(|_| Ok(0));
    chain.expect_submit_raw().never();

    assert_eq!(
        event_pipeline(chain).run().await.unwrap(),
        RunOutcome::AlreadyResolved {
            bet_id: BetId::from(2)
        }
    );
}
